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

    src/standard_format.rs

    Presets for well-known uniform disk formats. Since the formats are well
    known, we can provide default geometry, gap, interleave and fill
    parameters for them, and resolve a raw sector image to a preset from its
    file size alone.
*/
use crate::{chs::DiskChsn, geometry::Geometry, DataRate, DiskRpm, TrackEncoding};
use std::fmt::{Display, Formatter};
use strum::EnumIter;

/// Controller family a format was authored for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FdcDialect {
    /// NEC uPD765 and descendants (PC, PC-98).
    Nec765,
    /// WD177x/179x (Atari ST, TR-DOS, Acorn, CPC).
    Wd177x,
    /// Amiga Paula/Agnus custom chips (full-track DMA).
    AmigaPaula,
    /// Commodore drive-resident GCR controllers.
    CbmGcr,
}

/// An enumeration of standard (non-copy-protected) disk formats.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, EnumIter)]
pub enum StandardFormat {
    PcFloppy160,
    PcFloppy180,
    PcFloppy320,
    PcFloppy360,
    PcFloppy640,
    PcFloppy720,
    PcFloppy1200,
    PcFloppy1440,
    PcFloppy2880,
    AmigaDd880,
    AmigaHd1760,
    CbmD81,
    AtariSt720,
    TrDos640,
    Pc98Floppy1232,
    HpLif264,
    AcornDfs200,
    Thomson320,
    Ql720,
}

impl Display for StandardFormat {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            StandardFormat::PcFloppy160 => write!(f, "160K 5.25\" DD"),
            StandardFormat::PcFloppy180 => write!(f, "180K 5.25\" DD"),
            StandardFormat::PcFloppy320 => write!(f, "320K 5.25\" DD"),
            StandardFormat::PcFloppy360 => write!(f, "360K 5.25\" DD"),
            StandardFormat::PcFloppy640 => write!(f, "640K 3.5\" DD"),
            StandardFormat::PcFloppy720 => write!(f, "720K 3.5\" DD"),
            StandardFormat::PcFloppy1200 => write!(f, "1.2M 5.25\" HD"),
            StandardFormat::PcFloppy1440 => write!(f, "1.44M 3.5\" HD"),
            StandardFormat::PcFloppy2880 => write!(f, "2.88M 3.5\" ED"),
            StandardFormat::AmigaDd880 => write!(f, "Amiga 880K DD"),
            StandardFormat::AmigaHd1760 => write!(f, "Amiga 1.76M HD"),
            StandardFormat::CbmD81 => write!(f, "Commodore 1581 800K"),
            StandardFormat::AtariSt720 => write!(f, "Atari ST 720K"),
            StandardFormat::TrDos640 => write!(f, "TR-DOS 640K"),
            StandardFormat::Pc98Floppy1232 => write!(f, "PC-98 1.232M"),
            StandardFormat::HpLif264 => write!(f, "HP LIF 264K"),
            StandardFormat::AcornDfs200 => write!(f, "Acorn DFS 200K"),
            StandardFormat::Thomson320 => write!(f, "Thomson 320K"),
            StandardFormat::Ql720 => write!(f, "Sinclair QL 720K"),
        }
    }
}

impl StandardFormat {
    /// Returns the CHSN drive geometry of the preset.
    pub fn chsn(&self) -> DiskChsn {
        match self {
            StandardFormat::PcFloppy160 => DiskChsn::new(40, 1, 8, 2),
            StandardFormat::PcFloppy180 => DiskChsn::new(40, 1, 9, 2),
            StandardFormat::PcFloppy320 => DiskChsn::new(40, 2, 8, 2),
            StandardFormat::PcFloppy360 => DiskChsn::new(40, 2, 9, 2),
            StandardFormat::PcFloppy640 => DiskChsn::new(80, 2, 8, 2),
            StandardFormat::PcFloppy720 => DiskChsn::new(80, 2, 9, 2),
            StandardFormat::PcFloppy1200 => DiskChsn::new(80, 2, 15, 2),
            StandardFormat::PcFloppy1440 => DiskChsn::new(80, 2, 18, 2),
            StandardFormat::PcFloppy2880 => DiskChsn::new(80, 2, 36, 2),
            StandardFormat::AmigaDd880 => DiskChsn::new(80, 2, 11, 2),
            StandardFormat::AmigaHd1760 => DiskChsn::new(80, 2, 22, 2),
            StandardFormat::CbmD81 => DiskChsn::new(80, 2, 10, 2),
            StandardFormat::AtariSt720 => DiskChsn::new(80, 2, 9, 2),
            StandardFormat::TrDos640 => DiskChsn::new(80, 2, 16, 1),
            StandardFormat::Pc98Floppy1232 => DiskChsn::new(77, 2, 8, 3),
            StandardFormat::HpLif264 => DiskChsn::new(77, 2, 16, 1),
            StandardFormat::AcornDfs200 => DiskChsn::new(80, 1, 10, 1),
            StandardFormat::Thomson320 => DiskChsn::new(80, 1, 16, 1),
            StandardFormat::Ql720 => DiskChsn::new(80, 2, 9, 2),
        }
    }

    pub fn encoding(&self) -> TrackEncoding {
        match self {
            StandardFormat::AmigaDd880 | StandardFormat::AmigaHd1760 => TrackEncoding::AmigaMfm,
            StandardFormat::AcornDfs200 => TrackEncoding::Fm,
            _ => TrackEncoding::Mfm,
        }
    }

    pub fn data_rate(&self) -> DataRate {
        match self {
            StandardFormat::PcFloppy1200
            | StandardFormat::PcFloppy1440
            | StandardFormat::AmigaHd1760
            | StandardFormat::Pc98Floppy1232 => DataRate::Rate500Kbps,
            StandardFormat::PcFloppy2880 => DataRate::Rate1000Kbps,
            StandardFormat::AcornDfs200 => DataRate::Rate125Kbps,
            _ => DataRate::Rate250Kbps,
        }
    }

    pub fn rpm(&self) -> DiskRpm {
        match self {
            StandardFormat::PcFloppy1200 | StandardFormat::Pc98Floppy1232 => DiskRpm::Rpm360,
            _ => DiskRpm::Rpm300,
        }
    }

    pub fn dialect(&self) -> FdcDialect {
        match self {
            StandardFormat::AmigaDd880 | StandardFormat::AmigaHd1760 => FdcDialect::AmigaPaula,
            StandardFormat::CbmD81 => FdcDialect::CbmGcr,
            StandardFormat::AtariSt720
            | StandardFormat::TrDos640
            | StandardFormat::AcornDfs200
            | StandardFormat::Thomson320
            | StandardFormat::Ql720 => FdcDialect::Wd177x,
            _ => FdcDialect::Nec765,
        }
    }

    /// Default GAP3 value used when formatting.
    pub fn gap3(&self) -> u8 {
        match self {
            StandardFormat::PcFloppy1200 => 0x54,
            StandardFormat::PcFloppy1440 => 0x6C,
            StandardFormat::PcFloppy2880 => 0x53,
            StandardFormat::TrDos640 => 0x2A,
            StandardFormat::AcornDfs200 => 0x1B,
            _ => 0x50,
        }
    }

    /// Logical sector interleave (1 = none). Every preset here is a
    /// sequentially-formatted layout; interleaved variants are not standard
    /// images.
    pub fn interleave(&self) -> u8 {
        1
    }

    /// Head/track skew applied when formatting.
    pub fn skew(&self) -> u8 {
        0
    }

    /// Format fill byte.
    pub fn fill_byte(&self) -> u8 {
        match self {
            StandardFormat::AmigaDd880 | StandardFormat::AmigaHd1760 => 0x00,
            StandardFormat::CbmD81 | StandardFormat::TrDos640 => 0x00,
            StandardFormat::AcornDfs200 => 0xE5,
            _ => 0xF6,
        }
    }

    pub fn geometry(&self) -> Geometry {
        let chsn = self.chsn();
        Geometry::uniform(chsn.c(), chsn.h(), chsn.s(), chsn.n(), 1)
    }

    pub fn size(&self) -> usize {
        let chsn = self.chsn();
        chsn.c() as usize * chsn.h() as usize * chsn.s() as usize * chsn.n_size()
    }

    /// Resolve a raw sector image size to a preset. Where two presets share
    /// a size (720K PC / Atari ST / QL; 640K PC / TR-DOS; 320K PC /
    /// Thomson), the PC interpretation wins; adapters that know better pass
    /// their preset explicitly.
    pub fn from_size(size: usize) -> Option<StandardFormat> {
        match size {
            163_840 => Some(StandardFormat::PcFloppy160),
            184_320 => Some(StandardFormat::PcFloppy180),
            327_680 => Some(StandardFormat::PcFloppy320),
            368_640 => Some(StandardFormat::PcFloppy360),
            655_360 => Some(StandardFormat::PcFloppy640),
            737_280 => Some(StandardFormat::PcFloppy720),
            1_228_800 => Some(StandardFormat::PcFloppy1200),
            1_474_560 => Some(StandardFormat::PcFloppy1440),
            2_949_120 => Some(StandardFormat::PcFloppy2880),
            901_120 => Some(StandardFormat::AmigaDd880),
            1_802_240 => Some(StandardFormat::AmigaHd1760),
            819_200 => Some(StandardFormat::CbmD81),
            1_261_568 => Some(StandardFormat::Pc98Floppy1232),
            630_784 => Some(StandardFormat::HpLif264),
            204_800 => Some(StandardFormat::AcornDfs200),
            _ => None,
        }
    }
}
