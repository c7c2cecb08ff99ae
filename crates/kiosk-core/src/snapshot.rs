//! Saving captured frames into the kiosk's faces folder.

use crate::codec::{CodecError, ImageCodec, PixelBuffer};
use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Folder name for snapshots under the kiosk data directory.
pub const FACES_DIR: &str = "Faces";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// `D-M-YYYY-H_M_S.jpg`, fields not zero-padded.
pub fn snapshot_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    format!(
        "{}-{}-{}-{}_{}_{}.jpg",
        at.day(),
        at.month(),
        at.year(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Encode `image` with `codec` and write it into `dir`, named after `at`.
///
/// Creates `dir` if needed; an existing file with the same name is replaced.
pub fn save_snapshot_at<C, Tz>(
    codec: &C,
    image: &PixelBuffer,
    dir: &Path,
    at: &DateTime<Tz>,
) -> Result<PathBuf, SnapshotError>
where
    C: ImageCodec + ?Sized,
    Tz: TimeZone,
{
    std::fs::create_dir_all(dir).map_err(|source| SnapshotError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let bytes = codec.encode(image)?;
    let path = dir.join(snapshot_file_name(at));
    std::fs::write(&path, &bytes).map_err(|source| SnapshotError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "snapshot saved");
    Ok(path)
}

/// [`save_snapshot_at`] using the current local time.
pub fn save_snapshot<C: ImageCodec + ?Sized>(
    codec: &C,
    image: &PixelBuffer,
    dir: &Path,
) -> Result<PathBuf, SnapshotError> {
    save_snapshot_at(codec, image, dir, &Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::gradient;
    use crate::codec::JpegCodec;
    use chrono::Utc;

    #[test]
    fn test_file_name_not_padded() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(snapshot_file_name(&at), "5-3-2024-7_8_9.jpg");

        let at = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 58).unwrap();
        assert_eq!(snapshot_file_name(&at), "31-12-2023-23_59_58.jpg");
    }

    #[test]
    fn test_save_creates_dir_and_writes_jpeg() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(FACES_DIR);

        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let path = save_snapshot_at(&JpegCodec::default(), &gradient(16, 16), &dir, &at).unwrap();

        assert_eq!(path, dir.join("2-1-2024-3_4_5.jpg"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_save_replaces_existing() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path();

        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        std::fs::write(dir.join(snapshot_file_name(&at)), b"stale").unwrap();

        let path = save_snapshot_at(&JpegCodec::default(), &gradient(8, 8), dir, &at).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_ne!(bytes.as_slice(), b"stale");
        assert_eq!(std::fs::read_dir(dir).unwrap().count(), 1);
    }
}
