use kiosk_core::codec::{DEFAULT_DPI, DEFAULT_JPEG_QUALITY};
use kiosk_core::snapshot::FACES_DIR;
use kiosk_core::JpegCodec;
use std::path::PathBuf;

/// CLI configuration, loaded from environment variables.
pub struct Config {
    /// Folder that receives snapshots.
    pub faces_dir: PathBuf,
    /// JPEG quality for every encoded output (1–100).
    pub jpeg_quality: u8,
    /// Density written into JPEG headers.
    pub dpi: u16,
    /// Target height for `resize` when none is given on the command line.
    pub resize_height: i32,
}

impl Config {
    /// Load configuration from `KIOSK_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let faces_dir = std::env::var("KIOSK_FACES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::var("XDG_DATA_HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                        PathBuf::from(home).join(".local/share")
                    })
                    .join("kiosk")
                    .join(FACES_DIR)
            });

        Self {
            faces_dir,
            jpeg_quality: env_parse("KIOSK_JPEG_QUALITY", DEFAULT_JPEG_QUALITY).clamp(1, 100),
            dpi: env_parse("KIOSK_DPI", DEFAULT_DPI),
            resize_height: env_parse("KIOSK_RESIZE_HEIGHT", 720),
        }
    }

    /// JPEG codec carrying the configured quality and density.
    pub fn jpeg_codec(&self) -> JpegCodec {
        JpegCodec {
            quality: self.jpeg_quality,
            dpi: self.dpi,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
