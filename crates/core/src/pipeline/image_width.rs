use std::path::Path;

use crate::imaging::domain::image_reader::ImageReader;

/// Decodes the image at `path` and returns its width in pixels.
pub fn image_width(
    reader: &dyn ImageReader,
    path: &Path,
) -> Result<u32, Box<dyn std::error::Error>> {
    let frame = reader.read(path)?;
    Ok(frame.width())
}
