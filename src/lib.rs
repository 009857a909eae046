pub mod animation;
pub mod config;
pub mod content;
pub mod error;
pub mod quiz;
pub mod render;
pub mod shell;
pub mod store;
pub mod surface;
pub mod validate;
pub mod wave;

use std::time::Instant;

use config::{SURFACE_HEIGHT, SimParams};
use render::FrameStats;
use surface::Surface;

pub use error::Error;

pub struct Frame {
    pub surface: Surface,
    pub stats: FrameStats,
}

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Render a single still frame at `elapsed` seconds on a fresh surface,
/// optionally PNG-encoding it, with per-stage timings.
pub fn render_frame(
    params: &SimParams,
    css_width: u32,
    dpr: f64,
    elapsed: f64,
    encode: bool,
) -> Result<(Frame, Option<Vec<u8>>, Vec<Timing>), Error> {
    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Acquire surface
    let t = Instant::now();
    let mut surface = Surface::new(css_width, SURFACE_HEIGHT, dpr);
    timings.push(Timing {
        name: "surface",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Draw
    let t = Instant::now();
    let stats = render::draw_frame(&mut surface, params, elapsed);
    timings.push(Timing {
        name: "draw",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 3. Encode
    let png = if encode && !surface.is_empty() {
        let t = Instant::now();
        let png = surface.encode_png()?;
        timings.push(Timing {
            name: "encode",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });
        Some(png)
    } else {
        None
    };

    timings.push(Timing {
        name: "TOTAL",
        ms: total_start.elapsed().as_secs_f64() * 1000.0,
    });

    Ok((Frame { surface, stats }, png, timings))
}
