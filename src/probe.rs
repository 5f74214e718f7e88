/*
    uft-core
    https://github.com/uft-project/uft-core

    Copyright 2026 UFT Project Developers

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/probe.rs

    Probabilistic format detection. Every registered adapter scores the
    input buffer over several evidence channels (magic bytes, size ladder,
    structural checks, filename extension); no channel short-circuits, so a
    failed magic check still lets a strong size + structure case surface.
    Candidates are ranked by clamped confidence and flagged ambiguous when
    the runner-up comes within 70% of the winner.
*/
use std::fmt::Write as _;

use crate::{adapter::FormatId, registry};

/// Runner-up threshold: second-best >= 0.7 * best is an ambiguous call.
pub const AMBIGUITY_RATIO: f64 = 0.7;

/// Evidence strength classes and their score weights.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WeightClass {
    Low,
    Medium,
    High,
    /// Reserved for unmistakable magic signatures.
    Magic,
}

impl WeightClass {
    pub fn weight(&self) -> i32 {
        match self {
            WeightClass::Low => 10,
            WeightClass::Medium => 25,
            WeightClass::High => 40,
            WeightClass::Magic => 60,
        }
    }
}

/// One piece of evidence for or against a format.
#[derive(Clone, Debug)]
pub struct Evidence {
    pub name:    &'static str,
    pub class:   WeightClass,
    pub matched: bool,
    pub note:    Option<String>,
}

/// Accumulated evidence for one adapter. Matched evidence adds its class
/// weight; explicit mismatch evidence subtracts it. Evidence that does not
/// apply is simply not recorded.
#[derive(Clone, Debug, Default)]
pub struct ProbeScore {
    score:    i32,
    evidence: Vec<Evidence>,
}

impl ProbeScore {
    pub fn new() -> ProbeScore {
        ProbeScore::default()
    }

    /// Record matched evidence.
    pub fn add(&mut self, name: &'static str, class: WeightClass) -> &mut Self {
        self.push(name, class, true, None)
    }

    /// Record explicit counter-evidence.
    pub fn against(&mut self, name: &'static str, class: WeightClass) -> &mut Self {
        self.push(name, class, false, None)
    }

    pub fn add_note(&mut self, name: &'static str, class: WeightClass, note: String) -> &mut Self {
        self.push(name, class, true, Some(note))
    }

    fn push(&mut self, name: &'static str, class: WeightClass, matched: bool, note: Option<String>) -> &mut Self {
        self.score += if matched { class.weight() } else { -class.weight() };
        self.evidence.push(Evidence {
            name,
            class,
            matched,
            note,
        });
        self
    }

    /// Raw signed score, before clamping.
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Confidence in percent, clamped to 0..=100.
    pub fn confidence(&self) -> u8 {
        self.score.clamp(0, 100) as u8
    }

    pub fn evidence(&self) -> &[Evidence] {
        &self.evidence
    }
}

/// One ranked probe result.
#[derive(Clone, Debug)]
pub struct ProbeCandidate {
    pub format: FormatId,
    pub name:   &'static str,
    pub score:  ProbeScore,
}

impl ProbeCandidate {
    /// Human-readable one-line explanation, e.g.
    /// `G64 detected (100%): magic, version, track count`.
    pub fn explanation(&self) -> String {
        let mut out = format!("{} detected ({}%):", self.name, self.score.confidence());
        let mut first = true;
        for ev in self.score.evidence() {
            let sep = if first { " " } else { ", " };
            first = false;
            let polarity = if ev.matched { "" } else { "!" };
            let _ = write!(out, "{sep}{polarity}{}", ev.name);
        }
        out
    }
}

/// The full ranked outcome of probing one buffer.
#[derive(Clone, Debug)]
pub struct ProbeReport {
    /// All candidates with positive confidence, best first.
    pub candidates:   Vec<ProbeCandidate>,
    pub is_ambiguous: bool,
    /// Set when the call is ambiguous, naming the contenders.
    pub warning: Option<String>,
}

impl ProbeReport {
    /// The winning candidate, if any scored above zero.
    pub fn best(&self) -> Option<&ProbeCandidate> {
        self.candidates.first()
    }
}

/// Probe `bytes` against every registered adapter. Every adapter always
/// evaluates all of its evidence channels; detection never stops at the
/// first match.
pub fn probe(bytes: &[u8], filename: Option<&str>) -> ProbeReport {
    let mut candidates: Vec<ProbeCandidate> = registry::enumerate()
        .into_iter()
        .map(|adapter| {
            let desc = adapter.descriptor();
            ProbeCandidate {
                format: desc.id,
                name:   desc.name,
                score:  adapter.probe(bytes, filename),
            }
        })
        .filter(|c| c.score.confidence() > 0)
        .collect();
    candidates.sort_by(|a, b| {
        b.score
            .score()
            .cmp(&a.score.score())
            .then_with(|| a.format.cmp(&b.format))
    });

    let mut is_ambiguous = false;
    let mut warning = None;
    if candidates.len() >= 2 {
        let best = candidates[0].score.confidence() as f64;
        let second = candidates[1].score.confidence() as f64;
        if second >= AMBIGUITY_RATIO * best {
            is_ambiguous = true;
            let msg = format!(
                "ambiguous probe: {} ({}%) vs {} ({}%)",
                candidates[0].name,
                candidates[0].score.confidence(),
                candidates[1].name,
                candidates[1].score.confidence()
            );
            log::warn!("{msg}");
            warning = Some(msg);
        }
    }

    ProbeReport {
        candidates,
        is_ambiguous,
        warning,
    }
}

/// Score a fixed magic signature at offset 0.
pub fn score_magic(score: &mut ProbeScore, bytes: &[u8], magic: &[u8]) {
    if bytes.len() >= magic.len() && &bytes[..magic.len()] == magic {
        score.add("magic", WeightClass::Magic);
    }
    else {
        score.against("magic", WeightClass::Magic);
    }
}

/// Signatures of well-known non-disk containers. A size or structure match
/// on a buffer opening with one of these is almost certainly wrong, so
/// adapters without a magic of their own count the conflict as strong
/// counter-evidence.
const FOREIGN_MAGICS: &[&[u8]] = &[b"PK\x03\x04", b"NESM\x1A", &[0x1F, 0x8B]];

/// Penalize a candidate when the buffer carries a recognized foreign magic.
/// Absence of any foreign magic records nothing.
pub fn score_foreign_magic(score: &mut ProbeScore, bytes: &[u8]) {
    if FOREIGN_MAGICS
        .iter()
        .any(|m| bytes.len() >= m.len() && &bytes[..m.len()] == *m)
    {
        score.against("foreign magic", WeightClass::Magic);
    }
}

/// Score the file size against one or more expected sizes. Exact hits are
/// near-conclusive for headerless sector images; near-misses still count a
/// little, anything further off is counter-evidence.
pub fn score_size(score: &mut ProbeScore, actual: usize, expected: &[usize]) {
    let Some(&closest) = expected.iter().min_by_key(|&&e| actual.abs_diff(e)) else {
        return;
    };
    if actual == closest {
        score.add("size exact", WeightClass::High);
        score.add("size", WeightClass::Low);
        return;
    }
    let deviation = actual.abs_diff(closest) as f64 / closest as f64;
    if deviation <= 0.01 {
        score.add("size within 1%", WeightClass::High);
    }
    else if deviation <= 0.05 {
        score.add("size within 5%", WeightClass::Medium);
    }
    else {
        score.against("size", WeightClass::Low);
    }
}

/// Score the filename extension. A match is weak supporting evidence; a
/// mismatch is neutral because users rename images freely.
pub fn score_extension(score: &mut ProbeScore, filename: Option<&str>, extensions: &[&str]) {
    let Some(name) = filename else {
        return;
    };
    let Some(ext) = name.rsplit('.').next() else {
        return;
    };
    let ext = ext.to_ascii_lowercase();
    if extensions.iter().any(|&e| e == ext) {
        score.add("extension", WeightClass::Low);
    }
}
