use std::path::{Path, PathBuf};

use image::{ColorType, ImageFormat};
use tracing::info;

use crate::error::{GanttError, Result};

/// Append `.png` when the chosen path has no extension.
pub fn ensure_png_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("png")
    }
}

/// Encode tightly packed RGBA8 pixels as a PNG file at `path`.
///
/// The buffer must hold exactly `width * height * 4` bytes and neither side may
/// be zero. Nothing is written when the size check fails.
pub fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 || rgba.len() != expected {
        return Err(GanttError::ImageSize {
            width,
            height,
            len: rgba.len(),
        });
    }

    image::save_buffer_with_format(path, rgba, width, height, ColorType::Rgba8, ImageFormat::Png)?;
    info!(path = %path.display(), width, height, "exported chart image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    #[test]
    fn test_write_png_encodes_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let pixels = [255, 0, 0, 255, 0, 0, 255, 255, 0, 255, 0, 255];

        write_png(&path, 3, 1, &pixels).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE[..]);
        assert_eq!(&bytes[12..16], b"IHDR");
        assert_eq!(u32::from_be_bytes(bytes[16..20].try_into().unwrap()), 3);
        assert_eq!(u32::from_be_bytes(bytes[20..24].try_into().unwrap()), 1);
    }

    #[test]
    fn test_write_png_rejects_mismatched_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");

        let err = write_png(&path, 2, 2, &[0; 12]).unwrap_err();
        assert!(matches!(err, GanttError::ImageSize { width: 2, height: 2, len: 12 }));
        assert!(!path.exists());

        let err = write_png(&path, 0, 0, &[]).unwrap_err();
        assert!(matches!(err, GanttError::ImageSize { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_png_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.png");

        let err = write_png(&path, 1, 1, &[0, 0, 0, 255]).unwrap_err();
        assert!(matches!(err, GanttError::Image(_)));
    }

    #[test]
    fn test_ensure_png_extension() {
        assert_eq!(
            ensure_png_extension(PathBuf::from("out/chart")),
            PathBuf::from("out/chart.png")
        );
        assert_eq!(
            ensure_png_extension(PathBuf::from("out/chart.PNG")),
            PathBuf::from("out/chart.PNG")
        );
    }
}
