//! Exclusion Demo: pushes still images through the exclusion element.
//!
//! Each input becomes one frame of a stream. The element is renegotiated
//! whenever the frame size changes, and every output frame is written next
//! to the others in the output directory.

mod config;
mod image_loader;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use exclusion_core::{Dimensions, PixelLayout};
use exclusion_element::properties::PROP_SILENT;
use exclusion_element::{
    Buffer, Caps, CapsValue, CollectSink, ElementSettings, Exclusion, Registry, plugin_init,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::{AppConfig, DEFAULT_FPS};

#[derive(Parser)]
#[command(name = "exclusion-demo")]
#[command(version, about = "Apply the exclusion video effect to still images")]
#[command(long_about = "
Runs each input image through the exclusion element as one frame of a
stream and writes the results as <stem>-exclusion.png.

Examples:
  exclusion-demo photo.jpg                     # writes ./photo-exclusion.png
  exclusion-demo a.png b.png -o out/           # two frames, renegotiating if sizes differ
  exclusion-demo a.png --format RGBx --silent
")]
struct Cli {
    /// Input images, processed in order as a stream of frames
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for the processed frames
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Packed pixel layout to negotiate (defaults to the native preferred one)
    #[arg(short, long)]
    format: Option<PixelLayout>,

    /// Suppress per-frame diagnostics
    #[arg(short, long)]
    silent: bool,

    /// JSON file with element settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Frame rate stamped on output buffers
    #[arg(long, default_value_t = DEFAULT_FPS, value_parser = clap::value_parser!(u32).range(1..))]
    fps: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig {
        fps: cli.fps,
        ..AppConfig::default()
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(&cli, &config)
}

fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    let mut registry = Registry::new();
    plugin_init(&mut registry)?;
    let element = registry.make(Exclusion::NAME)?;

    if let Some(path) = &cli.settings {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let settings = ElementSettings::from_json(&json)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        element.set_property(PROP_SILENT, settings.silent.into())?;
    }
    if cli.silent {
        element.set_property(PROP_SILENT, true.into())?;
    }

    let sink = CollectSink::new();
    element.link(Box::new(sink.clone()))?;

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;

    let layout = cli.format.unwrap_or(PixelLayout::native()[0]);
    let frame_duration = config.frame_duration();
    let mut current: Option<Dimensions> = None;

    for (index, input) in cli.inputs.iter().enumerate() {
        let (dims, data) = image_loader::load_frame(input, layout)
            .with_context(|| format!("loading {}", input.display()))?;

        if current != Some(dims) {
            let fps = i32::try_from(config.fps).unwrap_or(i32::MAX);
            let caps = Caps::video(layout, dims).field("framerate", CapsValue::Fraction(fps, 1));
            element
                .set_caps(&caps)
                .with_context(|| format!("negotiating {caps}"))?;
            current = Some(dims);
        }

        let buffer = Buffer::from_vec(data)
            .with_pts(frame_pts(frame_duration, index)?)
            .with_duration(frame_duration)
            .with_offset(index as u64);
        element
            .chain(buffer)
            .with_context(|| format!("processing {}", input.display()))?;

        for out in sink.take_buffers() {
            let path = output_path(&cli.out_dir, input);
            image_loader::save_frame(&path, dims, layout, &out.data)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("{} -> {}", input.display(), path.display());
        }
    }

    element.stop();
    Ok(())
}

/// Presentation time of the `index`th frame.
fn frame_pts(frame_duration: Duration, index: usize) -> Result<Duration> {
    let index = u32::try_from(index).context("too many input frames")?;
    frame_duration
        .checked_mul(index)
        .context("frame timestamp overflows")
}

fn output_path(out_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    out_dir.join(format!("{stem}-exclusion.png"))
}
