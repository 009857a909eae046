use serde::Serialize;

use crate::config::{GRID_CELL, SimParams, WaveMode};
use crate::surface::Surface;
use crate::wave::{self, Standing, Traveling};

// Palette (matches the course stylesheet)
const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const GRID: [u8; 4] = [226, 232, 240, 255]; // #e2e8f0
const EQUILIBRIUM: [u8; 4] = [203, 213, 225, 255]; // #cbd5e1
const WAVE_PRIMARY: [u8; 4] = [30, 64, 175, 255]; // #1e40af
const WAVE_SECONDARY: [u8; 4] = [14, 165, 233, 255]; // #0ea5e9
const RESULTANT: [u8; 4] = [16, 185, 129, 255]; // #10b981
const MARKER: [u8; 4] = [14, 165, 233, 255]; // #0ea5e9
const NODE: [u8; 4] = [220, 38, 38, 255]; // #dc2626

const WAVE_LINE_WIDTH: f64 = 2.0;
const MARKER_RADIUS: f64 = 3.0;
const DASH_ON: f64 = 4.0;
const DASH_OFF: f64 = 6.0;

/// What a frame drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub mode: WaveMode,
    /// Time fed to the oscillation term (0 while paused).
    pub t: f64,
    /// Number of paths stroked.
    pub paths: usize,
    /// Samples per path.
    pub samples: usize,
    pub markers: usize,
    /// Largest |displacement| among the drawn paths, in CSS pixels.
    pub peak: f64,
}

fn peak(ys: &[f64]) -> f64 {
    ys.iter().fold(0.0f64, |m, y| m.max(y.abs()))
}

fn path(ys: &[f64], mid_y: f64) -> Vec<(f64, f64)> {
    ys.iter()
        .enumerate()
        .map(|(x, y)| (x as f64, mid_y + y))
        .collect()
}

/// Reference grid: one-pixel lines every `GRID_CELL` CSS pixels.
pub fn draw_grid(surface: &mut Surface) {
    let w = surface.css_width() as f64;
    let h = surface.css_height() as f64;
    let steps = |limit: f64| -> Vec<f64> {
        (0..)
            .map(|i| i as f64 * GRID_CELL)
            .take_while(|&v| v <= limit)
            .collect()
    };
    surface.hairlines(&steps(w), &steps(h), GRID);
}

pub fn draw_equilibrium(surface: &mut Surface) {
    let mid_y = surface.css_height() as f64 / 2.0;
    surface.dashed_hline(mid_y, DASH_ON, DASH_OFF, 1.0, EQUILIBRIUM);
}

/// Render one full frame. `elapsed` is seconds since the session clock
/// started; the oscillation term ignores it while paused.
pub fn draw_frame(surface: &mut Surface, params: &SimParams, elapsed: f64) -> FrameStats {
    let t = if params.render.paused { 0.0 } else { elapsed };
    let mut stats = FrameStats {
        mode: params.render.mode,
        t,
        ..Default::default()
    };
    if surface.is_empty() {
        return stats;
    }

    surface.clear(BACKGROUND);
    if params.render.show_grid {
        draw_grid(surface);
    }
    draw_equilibrium(surface);

    let width = surface.css_width();
    let mid_y = surface.css_height() as f64 / 2.0;
    stats.samples = width as usize + 1;

    match params.render.mode {
        WaveMode::Single => {
            let w = Traveling::new(&params.wave);
            let ys = wave::sample_columns(width, |x| w.displacement(x, t));
            surface.polyline(&path(&ys, mid_y), WAVE_LINE_WIDTH, WAVE_PRIMARY);
            stats.paths = 1;
            stats.peak = peak(&ys);

            if params.render.show_markers {
                let xs = wave::wavelength_markers(&params.wave, width as f64);
                for &x in &xs {
                    surface.fill_circle(x, mid_y, MARKER_RADIUS, MARKER);
                }
                stats.markers = xs.len();
            }
        }
        WaveMode::Interference => {
            let w1 = Traveling::new(&params.wave);
            let w2 = Traveling::new(&params.effective_wave2());
            let y1 = wave::sample_columns(width, |x| w1.displacement(x, t));
            let y2 = wave::sample_columns(width, |x| w2.displacement(x, t));
            let sum = wave::superpose(&y1, &y2);
            surface.polyline(&path(&y1, mid_y), WAVE_LINE_WIDTH, WAVE_PRIMARY);
            surface.polyline(&path(&y2, mid_y), WAVE_LINE_WIDTH, WAVE_SECONDARY);
            surface.polyline(&path(&sum, mid_y), WAVE_LINE_WIDTH, RESULTANT);
            stats.paths = 3;
            stats.peak = peak(&y1).max(peak(&y2)).max(peak(&sum));
        }
        WaveMode::Standing => {
            let s = Standing::new(&params.wave, &params.standing, width as f64);
            let ys = wave::sample_columns(width, |x| s.displacement(x, t));
            surface.polyline(&path(&ys, mid_y), WAVE_LINE_WIDTH, WAVE_PRIMARY);
            stats.paths = 1;
            stats.peak = peak(&ys);

            if params.render.show_markers {
                let xs = s.node_positions();
                for &x in &xs {
                    surface.fill_circle(x, mid_y, MARKER_RADIUS, NODE);
                }
                stats.markers = xs.len();
            }
        }
    }

    stats
}
