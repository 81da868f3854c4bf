//! Decoding favicons and resampling them to sprite-sized thumbnails.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, ICO) | `image::load` with the format implied by the extension |
//! | Resample to 16×16 | `image::imageops::resize` with `Triangle` (bilinear) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Placeholder glyph | embedded base64 PNG, decoded with `base64` |

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder, ImageFormat, ImageReader, RgbaImage};
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Edge length of a normalized icon.
pub const ICON_SIZE: u32 = 16;

/// 16×16 PNG shown for sites without a usable favicon.
pub const PLACEHOLDER_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAABAAAAAQCAYAAAAf8/9hAAABs0lEQVR4AWL4//8/RRjO8Iucx+noO0O2qmlbUEnt5r3Juas+hsQD6KaG7dqCKPgx72Pe9GIY27btZBrbtm3btm0nO12D7tVXe63jqtqqU/iDw9K58sEruKkngH0DBljOE+T/qqx/Ln718RZOFasxyd3XRbWzlFMxRbgOTx9QWFzHtZlD+aqLb108sOAIAai6+NbHW7lUHaZkDFJt+wp1DG7R1d0b7Z88EOL08oXwjokcOvvUxYMjBFCamWP5KjKBjKOpZx2HEPj+Ieod26U+dpg6lK2CIwTQH0oECGT5eHj+IgSueJ5fPaPg6PZrz6DGHiGAISE7QPrIvIKVrSvCe2DNHSsehIDatOBna/+OEOgTQE6WAy1AAFiVcf6PhgCGxEvlA9QngLlAQCkLsNWhBZIDz/zg4ggmjHfYxoPGEMPZECW+zjwmFk6Ih194y7VHYGOPvEYlTAJlQwI4MEhgTOzZGiNalRpGgsOYFw5lEfTKybgfBtmuTNdI3MrOTAQmYf/DNcAwDeycVjROgZFt18gMso6V5Z8JpcEk2LPKpOAH0/4bKMCAYnuqm7cHOGHJTBRhAEJN9d/t5zCxAAAAAElFTkSuQmCC";

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to encode PNG: {0}")]
    Encode(image::ImageError),
    #[error("invalid placeholder icon: {0}")]
    Placeholder(String),
}

/// Input format for an icon file, from its extension.
///
/// `.ico` files decode as ICO; everything else is treated as PNG because the
/// fetcher always stores provider responses under `.png`.
pub fn icon_format(path: &Path) -> ImageFormat {
    let is_ico = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ico"));
    if is_ico {
        ImageFormat::Ico
    } else {
        ImageFormat::Png
    }
}

/// Load and decode an icon file.
///
/// Providers often answer with ICO data that the fetcher stored under `.png`,
/// so when the extension's format fails the content is sniffed instead.
pub fn decode_icon(path: &Path) -> Result<DynamicImage, ImagingError> {
    let file = std::fs::File::open(path)?;
    let source = match image::load(BufReader::new(file), icon_format(path)) {
        Ok(img) => return Ok(img),
        Err(e) => e,
    };
    let sniffed = ImageReader::open(path)?
        .with_guessed_format()?
        .decode();
    sniffed.map_err(|_| ImagingError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Resample any image to exactly 16×16 RGBA.
pub fn thumbnail(img: &DynamicImage) -> RgbaImage {
    image::imageops::resize(img, ICON_SIZE, ICON_SIZE, FilterType::Triangle)
}

/// Decode an icon file straight to its 16×16 thumbnail.
pub fn normalize(path: &Path) -> Result<RgbaImage, ImagingError> {
    Ok(thumbnail(&decode_icon(path)?))
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, ImagingError> {
    let mut buf = Vec::new();
    PngEncoder::new(Cursor::new(&mut buf))
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(ImagingError::Encode)?;
    Ok(buf)
}

/// The placeholder glyph, decoded and normalized.
pub fn placeholder() -> Result<RgbaImage, ImagingError> {
    let bytes = STANDARD
        .decode(PLACEHOLDER_PNG_BASE64)
        .map_err(|e| ImagingError::Placeholder(e.to_string()))?;
    let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .map_err(|e| ImagingError::Placeholder(e.to_string()))?;
    Ok(thumbnail(&img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{write_ico, write_png};
    use image::Rgba;
    use tempfile::TempDir;

    #[test]
    fn format_follows_extension() {
        assert_eq!(icon_format(Path::new("img/a.com.ico")), ImageFormat::Ico);
        assert_eq!(icon_format(Path::new("img/a.com.ICO")), ImageFormat::Ico);
        assert_eq!(icon_format(Path::new("img/a.com.png")), ImageFormat::Png);
        assert_eq!(icon_format(Path::new("img/a.com")), ImageFormat::Png);
    }

    #[test]
    fn normalize_png_to_16px() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("big.png");
        write_png(&path, 64, 48);

        let icon = normalize(&path).unwrap();
        assert_eq!(icon.dimensions(), (16, 16));
    }

    #[test]
    fn normalize_upscales_small_icons() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("small.png");
        write_png(&path, 8, 8);

        assert_eq!(normalize(&path).unwrap().dimensions(), (16, 16));
    }

    #[test]
    fn normalize_ico() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.ico");
        write_ico(&path, 32);

        assert_eq!(normalize(&path).unwrap().dimensions(), (16, 16));
    }

    #[test]
    fn ico_data_under_png_name_is_sniffed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("duck.example.com.png");
        write_ico(&path, 32);

        assert_eq!(normalize(&path).unwrap().dimensions(), (16, 16));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("html.png");
        std::fs::write(&path, "<html><body>not an icon</body></html>".repeat(5)).unwrap();

        assert!(matches!(
            normalize(&path),
            Err(ImagingError::Decode { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            normalize(&tmp.path().join("gone.png")),
            Err(ImagingError::Io(_))
        ));
    }

    #[test]
    fn placeholder_decodes_to_16px() {
        let icon = placeholder().unwrap();
        assert_eq!(icon.dimensions(), (16, 16));
        assert!(icon.pixels().any(|p| p[3] > 0), "placeholder is blank");
    }

    #[test]
    fn encoded_png_decodes_back() {
        let mut img = RgbaImage::new(16, 16);
        img.put_pixel(3, 4, Rgba([255, 0, 0, 255]));

        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(3, 4), &Rgba([255, 0, 0, 255]));
    }
}
