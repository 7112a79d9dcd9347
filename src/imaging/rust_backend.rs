//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, ICO) | `image::ImageReader` with content sniffing |
//! | Encode → PNG / JPEG / WebP | `DynamicImage::write_to` |
//! | Encode → ICO | `image::codecs::ico::IcoEncoder` |

use super::backend::{BackendError, ImageBackend, OutputFormat};
use image::codecs::ico::IcoEncoder;
use image::{DynamicImage, ImageEncoder, ImageFormat, ImageReader, RgbaImage};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Largest edge the ICO container can describe.
const MAX_ICO_EDGE: u32 = 256;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, message: impl ToString) -> BackendError {
    BackendError::Decode {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

fn encode_error(format: OutputFormat, message: impl ToString) -> BackendError {
    BackendError::Encode {
        format,
        message: message.to_string(),
    }
}

fn save_ico(image: &RgbaImage, path: &Path) -> Result<(), BackendError> {
    if image.width() > MAX_ICO_EDGE || image.height() > MAX_ICO_EDGE {
        return Err(encode_error(
            OutputFormat::Ico,
            format!(
                "{}x{} exceeds the {MAX_ICO_EDGE}px ICO limit",
                image.width(),
                image.height()
            ),
        ));
    }
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    IcoEncoder::new(&mut writer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| encode_error(OutputFormat::Ico, e))?;
    // Small icons sit entirely in the buffer; drop would swallow the write error
    writer.flush()?;
    Ok(())
}

fn save_with_format(
    image: &RgbaImage,
    path: &Path,
    format: OutputFormat,
    image_format: ImageFormat,
) -> Result<(), BackendError> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    // JPEG has no alpha channel
    let dynamic = match format {
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::from(image.clone()).to_rgb8()),
        _ => DynamicImage::ImageRgba8(image.clone()),
    };
    dynamic
        .write_to(&mut writer, image_format)
        .map_err(|e| encode_error(format, e))?;
    writer.flush()?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<RgbaImage, BackendError> {
        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| decode_error(path, e))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(decode_error(path, "image has no pixels"));
        }
        Ok(image.to_rgba8())
    }

    fn save(
        &self,
        image: &RgbaImage,
        path: &Path,
        format: OutputFormat,
    ) -> Result<(), BackendError> {
        match format {
            OutputFormat::Ico => save_ico(image, path),
            OutputFormat::Png => save_with_format(image, path, format, ImageFormat::Png),
            OutputFormat::Jpeg => save_with_format(image, path, format, ImageFormat::Jpeg),
            OutputFormat::WebP => save_with_format(image, path, format, ImageFormat::WebP),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_image, write_test_jpeg};

    #[test]
    fn load_synthetic_jpeg_as_rgba() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("source.jpg");
        write_test_jpeg(&path, 120, 80);

        let image = RustBackend::new().load(&path).unwrap();
        assert_eq!(image.dimensions(), (120, 80));
        assert!(image.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn load_nonexistent_file_errors() {
        let result = RustBackend::new().load(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn load_garbage_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let result = RustBackend::new().load(&path);
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }

    #[test]
    fn png_roundtrip_keeps_dimensions_and_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("icon.png");
        let mut image = gradient_image(48, 48);
        image.put_pixel(0, 0, image::Rgba([10, 20, 30, 40]));

        let backend = RustBackend::new();
        backend.save(&image, &path, OutputFormat::Png).unwrap();
        let decoded = backend.load(&path).unwrap();
        assert_eq!(decoded.dimensions(), (48, 48));
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30, 40]);
    }

    #[test]
    fn ico_writes_decodable_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("favicon.ico");
        let backend = RustBackend::new();
        backend
            .save(&gradient_image(32, 32), &path, OutputFormat::Ico)
            .unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[test]
    fn ico_rejects_oversized_image() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("huge.ico");
        let result = RustBackend::new().save(&gradient_image(300, 300), &path, OutputFormat::Ico);
        assert!(matches!(
            result,
            Err(BackendError::Encode {
                format: OutputFormat::Ico,
                ..
            })
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn png_write_to_full_device_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("icon16.png");
        std::os::unix::fs::symlink("/dev/full", &path).unwrap();

        let result = RustBackend::new().save(&gradient_image(16, 16), &path, OutputFormat::Png);
        assert!(result.is_err(), "{result:?}");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn ico_write_to_full_device_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("favicon.ico");
        std::os::unix::fs::symlink("/dev/full", &path).unwrap();

        let result = RustBackend::new().save(&gradient_image(32, 32), &path, OutputFormat::Ico);
        assert!(result.is_err());
    }

    #[test]
    fn jpeg_drops_alpha() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("logo.jpg");
        RustBackend::new()
            .save(&gradient_image(20, 20), &path, OutputFormat::Jpeg)
            .unwrap();
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 20));
    }
}
