use image::RgbaImage;
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode exported frame: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write exported frame: {0}")]
    Io(#[from] std::io::Error),
}

/// File name for an exported frame: `{prefix}-YYMMDDHHMMSS.png`, two-digit
/// year.
pub fn export_file_name(prefix: &str, at: OffsetDateTime) -> String {
    let stamp = format_description!(
        "[year repr:last_two][month][day][hour][minute][second]"
    );
    // The description has no fallible components.
    let stamp = at.format(&stamp).unwrap_or_default();
    format!("{prefix}-{stamp}.png")
}

/// Writes `frame` as a PNG into `dir`, named from the local time at the
/// moment of export (UTC when the local offset cannot be determined).
/// Returns the written path.
#[cfg(not(target_arch = "wasm32"))]
pub fn export_png(
    frame: &RgbaImage,
    prefix: &str,
    dir: &std::path::Path,
) -> Result<std::path::PathBuf, ExportError> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let path = dir.join(export_file_name(prefix, now));
    std::fs::create_dir_all(dir)?;
    frame.save_with_format(&path, image::ImageFormat::Png)?;
    log::info!("exported frame to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn file_name_uses_two_digit_year_and_zero_padding() {
        let at = datetime!(2025-03-07 09:05:02 UTC);
        assert_eq!(export_file_name("cd", at), "cd-250307090502.png");
        assert_eq!(export_file_name("cd-v2", at), "cd-v2-250307090502.png");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn export_writes_a_decodable_png() {
        let frame = RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]));
        let dir = std::env::temp_dir().join("eframe_stickers_export_test");
        let path = export_png(&frame, "cd", &dir).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("cd-"));
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 4));
        std::fs::remove_file(path).ok();
    }
}
