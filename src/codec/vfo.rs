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

    src/codec/vfo.rs

    PID-controlled data-separation VFO.

    The VFO tracks the width of one bit cell against a stream of observed
    flux pulse positions. Each pulse's phase error (pulse centre minus cell
    centre) is low-pass filtered over a four-tap weighted history and fed
    into a PID controller that retunes the working cell size. The integrator
    is clamped to keep I*Ki within +/-40% of the reference cell width, and
    the cell itself is clamped to +/-40% of nominal, absorbing spindle speed
    error, wow and oscillator drift.

    Two gain settings are provided: HIGH while hunting for sync, LOW once a
    sync pattern has locked. The in-use gain slews toward the selected gain
    by a fixed per-pulse step so a gain switch never produces a control
    discontinuity.
*/
use crate::UftError;

pub const DEFAULT_WINDOW_RATIO: f64 = 0.75;
pub const DEFAULT_KP: f64 = 1.0 / 4.0;
pub const DEFAULT_KI: f64 = 1.0 / 64.0;
pub const DEFAULT_KD: f64 = 1.0 / 16.0;

const GAIN_LOW: f64 = 0.5;
const GAIN_HIGH: f64 = 1.0;
/// Per-pulse slew step applied to the in-use gain.
const GAIN_STEP: f64 = 0.05;
/// Integrator clamp: |I * Ki| <= INTEGRAL_LIMIT_RATIO * C0.
const INTEGRAL_LIMIT_RATIO: f64 = 0.4;
/// Working cell clamp: C0 / CELL_TOLERANCE ..= C0 * CELL_TOLERANCE.
const CELL_TOLERANCE: f64 = 1.4;

/// Gain schedule selection. HIGH while hunting sync, LOW once locked.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum VfoGain {
    Low,
    #[default]
    High,
}

#[derive(Clone, Debug)]
pub struct PidVfo {
    /// Reference cell size C0 = sample_rate / data_rate, in samples.
    reference_cell: f64,
    /// Working cell size, retuned per pulse.
    cell: f64,
    window_ratio: f64,

    kp: f64,
    ki: f64,
    kd: f64,

    selected_gain: f64,
    gain_in_use:   f64,

    last_pos:       f64,
    last_phase_err: f64,
    integral:       f64,

    /// Four-tap pulse position history; index 3 is newest.
    history: [f64; 4],
}

impl PidVfo {
    /// Create a VFO for the given sample clock and nominal data rate, with
    /// the default 0.75 window ratio.
    pub fn new(sample_rate: f64, data_rate: f64) -> Result<PidVfo, UftError> {
        Self::with_window(sample_rate, data_rate, DEFAULT_WINDOW_RATIO)
    }

    /// Create a VFO with an explicit window ratio in [0.2, 0.9].
    pub fn with_window(sample_rate: f64, data_rate: f64, window_ratio: f64) -> Result<PidVfo, UftError> {
        if sample_rate <= 0.0 || data_rate <= 0.0 || sample_rate < data_rate {
            return Err(UftError::InvalidArg);
        }
        if !(0.2..=0.9).contains(&window_ratio) {
            return Err(UftError::InvalidArg);
        }
        let reference_cell = sample_rate / data_rate;
        let mut vfo = PidVfo {
            reference_cell,
            cell: reference_cell,
            window_ratio,
            kp: DEFAULT_KP,
            ki: DEFAULT_KI,
            kd: DEFAULT_KD,
            selected_gain: GAIN_HIGH,
            gain_in_use: GAIN_HIGH,
            last_pos: 0.0,
            last_phase_err: 0.0,
            integral: 0.0,
            history: [0.0; 4],
        };
        vfo.seed_history();
        Ok(vfo)
    }

    fn seed_history(&mut self) {
        let centre = self.reference_cell / 2.0;
        self.history = [centre; 4];
        self.last_pos = centre;
    }

    /// Override the PID coefficients.
    pub fn set_params(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Select the gain schedule. The change takes effect gradually.
    pub fn set_gain(&mut self, gain: VfoGain) {
        self.selected_gain = match gain {
            VfoGain::Low => GAIN_LOW,
            VfoGain::High => GAIN_HIGH,
        };
    }

    /// Soft reset: re-seed the pulse history and clear the controller state,
    /// preserving configured gains and coefficients.
    pub fn reset(&mut self) {
        self.cell = self.reference_cell;
        self.integral = 0.0;
        self.last_phase_err = 0.0;
        self.seed_history();
    }

    /// The reference cell size C0 in samples.
    pub fn reference_cell(&self) -> f64 {
        self.reference_cell
    }

    /// The current working cell size in samples.
    pub fn cell_size(&self) -> f64 {
        self.cell
    }

    /// The current integrator value.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// The inspection window (offset, width) within the current cell.
    pub fn window(&self) -> (f64, f64) {
        let width = self.window_ratio * self.cell;
        ((self.cell - width) / 2.0, width)
    }

    /// Feed one observed pulse position (in samples, relative to the start
    /// of its cell window) and retune the cell size. Returns the new cell
    /// size.
    pub fn update(&mut self, pulse_pos: f64) -> f64 {
        // 1. Unwrap against the previous position: a shift of nearly a whole
        //    cell is a wrap across the cell boundary, not real jitter.
        let mut pos = pulse_pos;
        if pos - self.last_pos > self.cell - 1.1 {
            pos -= self.cell;
        }
        else if self.last_pos - pos > self.cell - 1.1 {
            pos += self.cell;
        }

        // 2. Slew the in-use gain toward the selected gain.
        if self.gain_in_use < self.selected_gain {
            self.gain_in_use = (self.gain_in_use + GAIN_STEP).min(self.selected_gain);
        }
        else if self.gain_in_use > self.selected_gain {
            self.gain_in_use = (self.gain_in_use - GAIN_STEP).max(self.selected_gain);
        }

        // 3. Push into the history and low-pass filter, newest weighted
        //    highest: weights 1,2,3,4 / 10.
        self.history.rotate_left(1);
        self.history[3] = pos;
        let filtered =
            (self.history[0] + 2.0 * self.history[1] + 3.0 * self.history[2] + 4.0 * self.history[3]) / 10.0;

        // 4. PID terms from the filtered phase error.
        let cell_centre = self.cell / 2.0;
        let p = cell_centre - filtered;
        let d = p - self.last_phase_err;
        self.integral += p;

        // 5. Anti-windup: keep I*Ki within +/-0.4 * C0.
        let integral_limit = INTEGRAL_LIMIT_RATIO * self.reference_cell / self.ki;
        self.integral = self.integral.clamp(-integral_limit, integral_limit);

        // 6. Retune and clamp to +/-40% of nominal.
        let adjust = (p * self.kp - d * self.kd + self.integral * self.ki) * self.gain_in_use;
        self.cell = (self.reference_cell - adjust)
            .clamp(self.reference_cell / CELL_TOLERANCE, self.reference_cell * CELL_TOLERANCE);

        self.last_phase_err = p;
        self.last_pos = pos;
        self.cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centred_vfo() -> PidVfo {
        // 24 MHz sample clock, 500 kbps: C0 = 48 samples.
        PidVfo::new(24_000_000.0, 500_000.0).unwrap()
    }

    #[test]
    fn construction_validates_params() {
        assert!(PidVfo::new(24e6, 500e3).is_ok());
        assert!(PidVfo::new(0.0, 500e3).is_err());
        assert!(PidVfo::new(24e6, 0.0).is_err());
        assert!(PidVfo::with_window(24e6, 500e3, 0.1).is_err());
        assert!(PidVfo::with_window(24e6, 500e3, 0.95).is_err());
        assert!(PidVfo::with_window(24e6, 500e3, 0.2).is_ok());
    }

    #[test]
    fn derived_quantities() {
        let vfo = centred_vfo();
        assert_eq!(vfo.reference_cell(), 48.0);
        let (offset, width) = vfo.window();
        assert!((width - 36.0).abs() < 1e-9); // 0.75 * 48
        assert!((offset - 6.0).abs() < 1e-9); // (48 - 36) / 2
    }

    #[test]
    fn locks_on_nominal_pulse_train() {
        // Pulses dead-centre in their cells: after 64 samples the cell must
        // be within 0.1% of C0 and the integrator bounded.
        let mut vfo = centred_vfo();
        for _ in 0..256 {
            vfo.update(vfo.cell_size() / 2.0);
        }
        assert!((vfo.cell_size() - 48.0).abs() / 48.0 < 1e-3);
        assert!((vfo.cell_size() - 48.0).abs() < 0.05);
        assert!(vfo.integral().abs() * DEFAULT_KI <= 0.4 * 48.0 + 1e-9);
    }

    #[test]
    fn tracks_two_percent_step() {
        // A 2% slow spindle: pulses arrive every 48.96 samples while the
        // cell window starts at 48. The controller must converge to the
        // stretched interval within 128 pulses without escaping the +/-40%
        // clamp.
        let mut vfo = centred_vfo();
        let target = 48.0 * 1.02;
        // Start the window so the first pulse lands dead-centre.
        let mut window_start = target - vfo.cell_size() / 2.0;
        let mut t = 0.0f64;
        for _ in 0..128 {
            t += target;
            let pos = t - window_start;
            let cell = vfo.update(pos);
            assert!(cell >= 48.0 / 1.4 - 1e-9 && cell <= 48.0 * 1.4 + 1e-9);
            // One pulse per cell: the window advances by the retuned cell.
            window_start += cell;
        }
        assert!((vfo.cell_size() - target).abs() / target < 0.02);
    }

    #[test]
    fn gain_switch_is_gradual() {
        let mut vfo = centred_vfo();
        vfo.set_gain(VfoGain::Low);
        // One update moves the in-use gain by a single step, not all the way.
        vfo.update(24.0);
        assert!(vfo.gain_in_use > 0.5 && vfo.gain_in_use < 1.0);
        for _ in 0..32 {
            vfo.update(vfo.cell_size() / 2.0);
        }
        assert!((vfo.gain_in_use - 0.5).abs() < 1e-9);
    }

    #[test]
    fn reset_preserves_configuration() {
        let mut vfo = centred_vfo();
        vfo.set_params(0.5, 0.01, 0.1);
        vfo.set_gain(VfoGain::Low);
        for _ in 0..16 {
            vfo.update(30.0);
        }
        vfo.reset();
        assert_eq!(vfo.cell_size(), 48.0);
        assert_eq!(vfo.integral(), 0.0);
        assert_eq!(vfo.kp, 0.5);
        assert_eq!(vfo.selected_gain, GAIN_LOW);
        // History re-seeded to C0/2.
        assert_eq!(vfo.history, [24.0; 4]);
    }
}
