//! Waveform math. Everything is in radians and surface pixels; no state.

use std::f64::consts::{PI, TAU};

use crate::config::{MIN_MARKER_WAVELENGTH, StandingWaveConfig, WaveParameters};

/// `speed / frequency`, or infinity when the frequency is zero.
#[inline]
pub fn wavelength(w: &WaveParameters) -> f64 {
    if w.frequency == 0.0 {
        f64::INFINITY
    } else {
        w.speed / w.frequency
    }
}

/// `2π / λ`. An infinite wavelength contributes no spatial variation.
#[inline]
pub fn wave_number(w: &WaveParameters) -> f64 {
    let lambda = wavelength(w);
    if lambda.is_finite() && lambda != 0.0 { TAU / lambda } else { 0.0 }
}

#[inline]
pub fn angular_frequency(frequency: f64) -> f64 {
    TAU * frequency
}

/// Precomputed traveling-wave coefficients for one source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Traveling {
    pub amplitude: f64,
    pub k: f64,
    pub omega: f64,
    pub phase: f64,
}

impl Traveling {
    pub fn new(w: &WaveParameters) -> Self {
        Self {
            amplitude: w.amplitude,
            k: wave_number(w),
            omega: angular_frequency(w.frequency),
            phase: w.phase,
        }
    }

    /// y = A·sin(kx − ωt + φ)
    #[inline]
    pub fn displacement(&self, x: f64, t: f64) -> f64 {
        self.amplitude * (self.k * x - self.omega * t + self.phase).sin()
    }
}

/// Standing-wave coefficients. k comes from the node count, not the frequency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Standing {
    pub amplitude: f64,
    pub k: f64,
    pub omega: f64,
    pub damping: f64,
    /// Surface width the damping envelope is normalised against.
    pub width: f64,
    pub node_count: u32,
}

impl Standing {
    pub fn new(w: &WaveParameters, cfg: &StandingWaveConfig, width: f64) -> Self {
        let k = if cfg.length > 0.0 {
            PI * cfg.node_count as f64 / cfg.length
        } else {
            0.0
        };
        Self {
            amplitude: w.amplitude,
            k,
            omega: angular_frequency(w.frequency),
            damping: cfg.damping,
            width,
            node_count: cfg.node_count,
        }
    }

    /// exp(−damping · x / width)
    #[inline]
    pub fn envelope(&self, x: f64) -> f64 {
        if self.width > 0.0 {
            (-self.damping * (x / self.width)).exp()
        } else {
            1.0
        }
    }

    /// y = 2A·cos(kx)·sin(ωt)·envelope(x)
    #[inline]
    pub fn displacement(&self, x: f64, t: f64) -> f64 {
        2.0 * self.amplitude * (self.k * x).cos() * (self.omega * t).sin() * self.envelope(x)
    }

    /// Nodes at x = (n + ½)·π / k for n in 0..2·nodeCount, clipped to [0, width].
    pub fn node_positions(&self) -> Vec<f64> {
        if self.k == 0.0 {
            return Vec::new();
        }
        (0..self.node_count * 2)
            .map(|n| (n as f64 + 0.5) * PI / self.k)
            .filter(|&x| x >= 0.0 && x <= self.width)
            .collect()
    }
}

/// Sample a displacement function at every integer column in [0, width].
pub fn sample_columns(width: u32, f: impl Fn(f64) -> f64) -> Vec<f64> {
    (0..=width).map(|x| f(x as f64)).collect()
}

/// Pointwise sum of two equally long sample runs.
pub fn superpose(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(y1, y2)| y1 + y2).collect()
}

/// Marker x positions every wavelength along the equilibrium line, or none
/// when the wavelength is infinite or too short to read.
pub fn wavelength_markers(w: &WaveParameters, width: f64) -> Vec<f64> {
    let lambda = wavelength(w);
    if !lambda.is_finite() || lambda <= MIN_MARKER_WAVELENGTH {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut x = 0.0;
    while x <= width {
        out.push(x);
        x += lambda;
    }
    out
}
