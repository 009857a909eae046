use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use log::{error, info};

use wavecourse::animation::{FixedRateScheduler, RenderSession};
use wavecourse::config::{SimParams, WaveMode};
use wavecourse::quiz::QUESTIONS;

#[derive(Parser)]
#[command(name = "wavecourse")]
#[command(about = "Waves course toolkit: render the wave lab offline, inspect the quiz")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the wave lab at a fixed frame rate and save frames as PNG
    Render {
        #[arg(long, default_value = "single", value_parser = ["single", "interference", "standing"])]
        mode: String,
        /// Number of frames to simulate
        #[arg(long, default_value_t = 60)]
        frames: u32,
        /// Save every Nth frame
        #[arg(long, default_value_t = 15)]
        every: u32,
        #[arg(long, default_value_t = 60.0)]
        fps: f64,
        /// Surface width in CSS pixels
        #[arg(long, default_value_t = 800)]
        width: u32,
        /// Device pixel ratio (capped at 2)
        #[arg(long, default_value_t = 1.0)]
        dpr: f64,
        #[arg(long)]
        amplitude: Option<f64>,
        #[arg(long)]
        frequency: Option<f64>,
        #[arg(long)]
        phase: Option<f64>,
        #[arg(long)]
        speed: Option<f64>,
        #[arg(long)]
        nodes: Option<u32>,
        #[arg(long)]
        damping: Option<f64>,
        #[arg(long)]
        markers: bool,
        #[arg(long)]
        no_grid: bool,
        #[arg(long)]
        paused: bool,
        /// Output directory
        #[arg(long, default_value = "artifacts")]
        out: PathBuf,
    },

    /// Print the quiz bank with answers
    Quiz,
}

fn parse_mode(s: &str) -> WaveMode {
    match s {
        "interference" => WaveMode::Interference,
        "standing" => WaveMode::Standing,
        _ => WaveMode::Single,
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Render {
            mode,
            frames,
            every,
            fps,
            width,
            dpr,
            amplitude,
            frequency,
            phase,
            speed,
            nodes,
            damping,
            markers,
            no_grid,
            paused,
            out,
        } => {
            let mut params = SimParams::default();
            params.render.mode = parse_mode(&mode);
            params.render.show_markers = markers;
            params.render.show_grid = !no_grid;
            params.render.paused = paused;
            if let Some(v) = amplitude {
                params.wave.amplitude = v;
            }
            if let Some(v) = frequency {
                params.wave.frequency = v;
            }
            if let Some(v) = phase {
                params.wave.phase = v;
            }
            if let Some(v) = speed {
                params.wave.speed = v;
            }
            if let Some(v) = nodes {
                params.standing.node_count = v;
            }
            if let Some(v) = damping {
                params.standing.damping = v;
            }
            render(params.clamped(), frames, every.max(1), fps, width, dpr, out)
        }
        Commands::Quiz => {
            for q in &QUESTIONS {
                println!("Q{} {}", q.id, q.prompt);
                for (i, opt) in q.options.iter().enumerate() {
                    let mark = if i == q.correct_option { '*' } else { ' ' };
                    println!("  {} {}. {}", mark, i + 1, opt);
                }
            }
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn render(
    params: SimParams,
    frames: u32,
    every: u32,
    fps: f64,
    width: u32,
    dpr: f64,
    out_dir: PathBuf,
) -> Result<(), wavecourse::Error> {
    std::fs::create_dir_all(&out_dir)?;

    info!(
        "Rendering {} frames of {:?} at {} fps, {}px wide",
        frames, params.render.mode, fps, width
    );

    let mut session = RenderSession::new(FixedRateScheduler::new(fps, 0.0), params);
    session.start(width, dpr);

    let started = Instant::now();
    let mut saved = 0;
    for i in 0..frames {
        let Some((handle, ts)) = session.scheduler_mut().tick() else {
            break;
        };
        let Some(stats) = session.on_frame(handle, ts) else {
            break;
        };
        if i % every == 0 {
            if let Some(surface) = session.surface() {
                let path = out_dir.join(format!("frame_{:04}.png", i));
                std::fs::write(&path, surface.encode_png()?)?;
                eprintln!(
                    "  {:20} t={:6.3}s peak={:6.1}px markers={}",
                    path.display(),
                    stats.t,
                    stats.peak,
                    stats.markers
                );
                saved += 1;
            }
        }
    }
    session.stop();

    let ms = started.elapsed().as_secs_f64() * 1000.0;
    info!(
        "{} frames in {:.1} ms ({:.2} ms/frame), {} saved to {}",
        session.frames(),
        ms,
        ms / session.frames().max(1) as f64,
        saved,
        out_dir.display()
    );
    Ok(())
}
