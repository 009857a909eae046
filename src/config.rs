use std::f64::consts::PI;
use std::net::SocketAddr;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Grid cell size in CSS pixels.
pub const GRID_CELL: f64 = 50.0;
/// Observed surface height in CSS pixels.
pub const SURFACE_HEIGHT: u32 = 320;
/// Fallback surface width when the host does not report one.
pub const DEFAULT_WIDTH: u32 = 800;
/// Device-pixel-ratio ceiling.
pub const MAX_DPR: f64 = 2.0;
/// Wavelengths at or below this many pixels get no markers.
pub const MIN_MARKER_WAVELENGTH: f64 = 20.0;

// Slider ranges exposed by the front-end.
pub const AMPLITUDE_RANGE: RangeInclusive<f64> = 10.0..=120.0;
pub const AMPLITUDE2_RANGE: RangeInclusive<f64> = 0.0..=120.0;
pub const FREQUENCY_RANGE: RangeInclusive<f64> = 0.1..=4.0;
pub const PHASE_RANGE: RangeInclusive<f64> = -PI..=PI;
pub const SPEED_RANGE: RangeInclusive<f64> = 40.0..=240.0;
pub const LENGTH_RANGE: RangeInclusive<f64> = 400.0..=1200.0;
pub const NODE_RANGE: RangeInclusive<u32> = 2..=12;
pub const DAMPING_RANGE: RangeInclusive<f64> = 0.0..=0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveMode {
    #[default]
    Single,
    Interference,
    Standing,
}

/// One wave source. Amplitude and speed are in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveParameters {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
    pub speed: f64,
}

impl Default for WaveParameters {
    fn default() -> Self {
        Self {
            amplitude: 50.0,
            frequency: 1.0,
            phase: 0.0,
            speed: 120.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub mode: WaveMode,
    pub show_grid: bool,
    pub show_markers: bool,
    pub paused: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: WaveMode::Single,
            show_grid: true,
            show_markers: false,
            paused: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingWaveConfig {
    pub length: f64,
    pub node_count: u32,
    pub damping: f64,
}

impl Default for StandingWaveConfig {
    fn default() -> Self {
        Self {
            length: 800.0,
            node_count: 5,
            damping: 0.0,
        }
    }
}

/// Everything the render loop reads each frame. User input assigns into it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub render: RenderConfig,
    pub wave: WaveParameters,
    /// Second source for interference mode. Its speed tracks `wave.speed`.
    pub wave2: WaveParameters,
    pub standing: StandingWaveConfig,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            wave: WaveParameters::default(),
            wave2: WaveParameters {
                amplitude: 40.0,
                frequency: 1.0,
                phase: PI / 2.0,
                speed: 120.0,
            },
            standing: StandingWaveConfig::default(),
        }
    }
}

fn clamp_range(v: f64, r: &RangeInclusive<f64>) -> f64 {
    if v.is_nan() { *r.start() } else { v.clamp(*r.start(), *r.end()) }
}

impl SimParams {
    /// Second wave as actually simulated: shares the first wave's speed.
    pub fn effective_wave2(&self) -> WaveParameters {
        WaveParameters {
            speed: self.wave.speed,
            ..self.wave2
        }
    }

    /// Pull every value into its slider range. Applied at input boundaries
    /// only; the kernel itself accepts any finite value.
    pub fn clamped(mut self) -> Self {
        self.wave.amplitude = clamp_range(self.wave.amplitude, &AMPLITUDE_RANGE);
        self.wave.frequency = clamp_range(self.wave.frequency, &FREQUENCY_RANGE);
        self.wave.phase = clamp_range(self.wave.phase, &PHASE_RANGE);
        self.wave.speed = clamp_range(self.wave.speed, &SPEED_RANGE);
        self.wave2.amplitude = clamp_range(self.wave2.amplitude, &AMPLITUDE2_RANGE);
        self.wave2.frequency = clamp_range(self.wave2.frequency, &FREQUENCY_RANGE);
        self.wave2.phase = clamp_range(self.wave2.phase, &PHASE_RANGE);
        self.wave2.speed = self.wave.speed;
        self.standing.length = clamp_range(self.standing.length, &LENGTH_RANGE);
        self.standing.node_count = self
            .standing
            .node_count
            .clamp(*NODE_RANGE.start(), *NODE_RANGE.end());
        self.standing.damping = clamp_range(self.standing.damping, &DAMPING_RANGE);
        self
    }
}

/// Server settings, filled from command-line flags.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub frontend_dir: PathBuf,
    /// `None` keeps the session in memory only.
    pub store_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            frontend_dir: PathBuf::from("frontend"),
            store_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_lab_configuration() {
        let p = SimParams::default();
        assert_eq!(p.render.mode, WaveMode::Single);
        assert!(p.render.show_grid);
        assert!(!p.render.show_markers);
        assert_eq!(p.wave.amplitude, 50.0);
        assert_eq!(p.wave.speed, 120.0);
        assert_eq!(p.wave2.amplitude, 40.0);
        assert!((p.wave2.phase - PI / 2.0).abs() < 1e-12);
        assert_eq!(p.standing.node_count, 5);
    }

    #[test]
    fn clamped_pulls_values_into_slider_ranges() {
        let mut p = SimParams::default();
        p.wave.amplitude = 500.0;
        p.wave.frequency = 0.0;
        p.wave.phase = 10.0;
        p.standing.node_count = 40;
        p.standing.damping = f64::NAN;
        let c = p.clamped();
        assert_eq!(c.wave.amplitude, 120.0);
        assert_eq!(c.wave.frequency, 0.1);
        assert!((c.wave.phase - PI).abs() < 1e-12);
        assert_eq!(c.standing.node_count, 12);
        assert_eq!(c.standing.damping, 0.0);
    }

    #[test]
    fn second_wave_follows_first_speed() {
        let mut p = SimParams::default();
        p.wave.speed = 200.0;
        p.wave2.speed = 10.0;
        assert_eq!(p.effective_wave2().speed, 200.0);
        assert_eq!(p.clamped().wave2.speed, 200.0);
    }

    #[test]
    fn params_deserialize_with_missing_fields() {
        let p: SimParams =
            serde_json::from_str(r#"{"render":{"mode":"standing","show_grid":false,"show_markers":true,"paused":false}}"#)
                .unwrap();
        assert_eq!(p.render.mode, WaveMode::Standing);
        assert_eq!(p.wave, WaveParameters::default());
    }
}
