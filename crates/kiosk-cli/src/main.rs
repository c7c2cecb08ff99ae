use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image::ImageFormat;
use kiosk_core::text::capitalize_words;
use kiosk_core::{ImageCodec, JpegCodec, PixelBuffer, PngCodec, Rectangle};
use serde::Deserialize;
use std::path::{Path, PathBuf};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "kiosk", about = "Kiosk face-region and image geometry tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop a face region out of an image (writes nothing if the crop fails)
    Crop {
        /// Source image
        input: PathBuf,
        /// Region as "left,top,width,height"
        #[arg(short, long, allow_hyphen_values = true)]
        rect: Rectangle,
        /// Output file; .jpg/.jpeg writes JPEG, anything else PNG
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Downscale an image to a maximum height and report the scale factors
    Resize {
        /// Source image
        input: PathBuf,
        /// Target height in pixels (default: KIOSK_RESIZE_HEIGHT)
        #[arg(long)]
        height: Option<i32>,
        /// Output JPEG file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Find the tracked region a detected face most likely continues
    Match {
        /// Detected face as "left,top,width,height"
        #[arg(short, long, allow_hyphen_values = true)]
        candidate: Rectangle,
        /// JSON file: [{"id": "...", "rect": {"left":..,"top":..,"width":..,"height":..}}]
        #[arg(short, long)]
        known: PathBuf,
    },
    /// Save an image into the faces folder under a timestamp name
    Snapshot {
        /// Source image
        input: PathBuf,
    },
    /// List available cameras
    Cameras,
}

/// A previously tracked face region.
#[derive(Debug, Deserialize)]
struct KnownRegion {
    id: String,
    rect: Rectangle,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Crop {
            input,
            rect,
            output,
        } => {
            let source = read_input(&input)?;
            match crop_or_nothing(config.jpeg_codec(), source, rect).await {
                Some(pixels) => {
                    let codec = output_codec(&config, &output);
                    let bytes = encode_blocking(codec, pixels).await?;
                    write_output(&output, &bytes)?;
                    println!("Cropped {rect} -> {}", output.display());
                }
                None => println!("No image available for {rect}"),
            }
        }
        Commands::Resize {
            input,
            height,
            output,
        } => {
            let source = read_input(&input)?;
            let target = height.unwrap_or(config.resize_height);
            let codec = config.jpeg_codec();
            let resized =
                tokio::task::spawn_blocking(move || kiosk_core::resize(&codec, &source, target))
                    .await?
                    .with_context(|| format!("resizing {}", input.display()))?;
            write_output(&output, &resized.bytes)?;
            println!(
                "{}",
                serde_json::json!({
                    "output": output.display().to_string(),
                    "width": resized.width,
                    "height": resized.height,
                    "scale": resized.scale,
                })
            );
        }
        Commands::Match { candidate, known } => {
            let raw = std::fs::read_to_string(&known)
                .with_context(|| format!("reading {}", known.display()))?;
            let regions: Vec<KnownRegion> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", known.display()))?;
            tracing::debug!(count = regions.len(), %candidate, "matching against tracked regions");

            let found = kiosk_core::find_closest_match(
                &candidate,
                regions.iter().map(|r| (r.id.as_str(), r.rect)),
            );
            match found {
                Some(id) => println!("Matched: {}", capitalize_words(id)),
                None => println!("No match"),
            }
        }
        Commands::Snapshot { input } => {
            let source = read_input(&input)?;
            let codec = config.jpeg_codec();
            let dir = config.faces_dir.clone();
            let path = tokio::task::spawn_blocking(move || -> Result<PathBuf> {
                let pixels = codec.decode(&source)?;
                Ok(kiosk_core::snapshot::save_snapshot(&codec, &pixels, &dir)?)
            })
            .await??;
            println!("Saved {}", path.display());
        }
        Commands::Cameras => {
            let names = kiosk_hw::list_camera_names();
            if names.is_empty() {
                println!("No cameras found");
            }
            for name in names {
                println!("{name}");
            }
        }
    }

    Ok(())
}

/// Crop on a blocking thread, turning any failure into "no image".
async fn crop_or_nothing(codec: JpegCodec, source: Vec<u8>, rect: Rectangle) -> Option<PixelBuffer> {
    let result = tokio::task::spawn_blocking(move || kiosk_core::crop(&codec, &source, rect)).await;
    match result {
        Ok(Ok(pixels)) => Some(pixels),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, decode = e.is_decode(), %rect, "crop failed, no image");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, %rect, "crop task failed, no image");
            None
        }
    }
}

fn output_codec(config: &Config, path: &Path) -> Box<dyn ImageCodec + Send> {
    match ImageFormat::from_path(path) {
        Ok(ImageFormat::Jpeg) => Box::new(config.jpeg_codec()),
        _ => Box::new(PngCodec),
    }
}

async fn encode_blocking(codec: Box<dyn ImageCodec + Send>, pixels: PixelBuffer) -> Result<Vec<u8>> {
    let bytes = tokio::task::spawn_blocking(move || codec.encode(&pixels)).await??;
    Ok(bytes)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}
