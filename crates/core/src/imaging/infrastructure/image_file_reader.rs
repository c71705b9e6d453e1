use std::path::Path;

use image::{DynamicImage, ImageDecoder};

use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;

/// Reads image files with the `image` crate.
///
/// The format is sniffed from the file content, so a PNG saved as `.jpg`
/// still decodes. An EXIF orientation tag is applied, so a rotated photo
/// comes out upright. Every decoded image is converted to 8-bit RGB.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let mut decoder = image::ImageReader::open(path)?
            .with_guessed_format()?
            .into_decoder()?;
        let orientation = decoder.orientation()?;
        let mut decoded = DynamicImage::from_decoder(decoder)?;
        decoded.apply_orientation(orientation);
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(format!("{} decoded to an empty image", path.display()).into());
        }
        log::debug!("Decoded {} ({width}x{height})", path.display());
        Ok(Frame::new(rgb.into_raw(), width, height, 3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let mut img = image::RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([50, 100, 200]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_reads_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "test.png", 100, 80);
        let frame = ImageFileReader::new().read(&path).unwrap();
        assert_eq!(frame.width(), 100);
        assert_eq!(frame.height(), 80);
    }

    #[test]
    fn test_frame_is_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "test.png", 10, 8);
        let frame = ImageFileReader::new().read(&path).unwrap();
        assert_eq!(frame.channels(), 3);
        assert_eq!(&frame.data()[..3], &[50, 100, 200]);
    }

    #[test]
    fn test_gray_input_is_expanded_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::from_pixel(4, 3, image::Luma([77])).save(&path).unwrap();

        let frame = ImageFileReader::new().read(&path).unwrap();
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.data().len(), 4 * 3 * 3);
        assert!(frame.data().iter().all(|&v| v == 77));
    }

    #[test]
    fn test_format_is_sniffed_from_content() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_test_image(dir.path(), "real.png", 6, 5);
        let disguised = dir.path().join("disguised.jpg");
        std::fs::copy(&png, &disguised).unwrap();

        let frame = ImageFileReader::new().read(&disguised).unwrap();
        assert_eq!((frame.width(), frame.height()), (6, 5));
    }

    /// JPEG with an APP1 Exif block carrying only the given orientation.
    fn write_oriented_jpeg(dir: &Path, width: u32, height: u32, orientation: u8) -> PathBuf {
        let mut jpeg = Vec::new();
        image::RgbImage::from_pixel(width, height, image::Rgb([50, 100, 200]))
            .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        let mut exif = b"Exif\0\0MM\0\x2a\0\0\0\x08\0\x01".to_vec();
        exif.extend_from_slice(&[0x01, 0x12, 0, 3, 0, 0, 0, 1, 0, orientation, 0, 0]);
        exif.extend_from_slice(&[0, 0, 0, 0]);
        let len = (exif.len() + 2) as u16;

        let mut bytes = jpeg[..2].to_vec();
        bytes.extend_from_slice(&[0xff, 0xe1]);
        bytes.extend_from_slice(&len.to_be_bytes());
        bytes.extend_from_slice(&exif);
        bytes.extend_from_slice(&jpeg[2..]);

        let path = dir.join("oriented.jpg");
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_exif_rotation_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        // 6: stored sideways, displayed rotated 90 degrees clockwise
        let path = write_oriented_jpeg(dir.path(), 40, 20, 6);
        let frame = ImageFileReader::new().read(&path).unwrap();
        assert_eq!((frame.width(), frame.height()), (20, 40));
    }

    #[test]
    fn test_upright_exif_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_oriented_jpeg(dir.path(), 40, 20, 1);
        let frame = ImageFileReader::new().read(&path).unwrap();
        assert_eq!((frame.width(), frame.height()), (40, 20));
    }

    #[test]
    fn test_nonexistent_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ImageFileReader::new()
            .read(&dir.path().join("missing.png"))
            .is_err());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(ImageFileReader::new().read(&path).is_err());
    }

    #[test]
    fn test_truncated_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "full.png", 64, 64);
        let bytes = std::fs::read(&path).unwrap();
        let truncated = dir.path().join("truncated.png");
        std::fs::write(&truncated, &bytes[..bytes.len() / 2]).unwrap();
        assert!(ImageFileReader::new().read(&truncated).is_err());
    }
}
