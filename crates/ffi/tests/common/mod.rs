#![allow(dead_code)]

use std::ffi::CString;
use std::path::{Path, PathBuf};

/// One-stage 8x8 cascade that fires on a bright-over-dark horizontal edge.
pub const EDGE_CASCADE: &str = r#"<?xml version="1.0"?>
<opencv_storage>
<cascade type_id="opencv-cascade-classifier"><stageType>BOOST</stageType>
  <featureType>HAAR</featureType>
  <height>8</height>
  <width>8</width>
  <stageParams>
    <maxWeakCount>1</maxWeakCount></stageParams>
  <featureParams>
    <maxCatCount>0</maxCatCount></featureParams>
  <stageNum>1</stageNum>
  <stages>
    <_>
      <maxWeakCount>1</maxWeakCount>
      <stageThreshold>0</stageThreshold>
      <weakClassifiers>
        <_>
          <internalNodes>
            0 -1 0 0.5</internalNodes>
          <leafValues>
            -1. 1.</leafValues></_></weakClassifiers></_></stages>
  <features>
    <_>
      <rects>
        <_>
          0 0 8 4 1.</_>
        <_>
          0 4 8 4 -1.</_></rects>
      <tilted>0</tilted></_></features></cascade>
</opencv_storage>
"#;

pub fn c_path(path: &Path) -> CString {
    CString::new(path.to_str().unwrap()).unwrap()
}

pub fn write_cascade(dir: &Path) -> PathBuf {
    let path = dir.join("edge.xml");
    std::fs::write(&path, EDGE_CASCADE).unwrap();
    path
}

/// White band over black, split halfway down.
pub fn write_edge_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_fn(width, height, |_, y| {
        if y < height / 2 {
            image::Rgb([255, 255, 255])
        } else {
            image::Rgb([0, 0, 0])
        }
    })
    .save(&path)
    .unwrap();
    path
}

/// Smooth gradient with no horizontal edge for the cascade to fire on.
pub fn write_faceless_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_fn(width, height, |x, _| {
        let v = (x * 255 / width.max(1)) as u8;
        image::Rgb([v, 128, 255 - v])
    })
    .save(&path)
    .unwrap();
    path
}

/// Plain JPEG with an APP1 Exif block holding only an orientation tag.
pub fn write_oriented_jpeg(
    dir: &Path,
    name: &str,
    width: u32,
    height: u32,
    orientation: u8,
) -> PathBuf {
    let mut jpeg = Vec::new();
    image::RgbImage::from_pixel(width, height, image::Rgb([90, 90, 90]))
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

    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
