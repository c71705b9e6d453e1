//! Shared fixtures: a one-stage cascade that fires on a bright-over-dark
//! horizontal edge, and images that do or do not contain one.

use crate::detection::infrastructure::gray_image::GrayImage;
use crate::detection::infrastructure::haar_cascade::HaarCascade;
use crate::shared::frame::Frame;

/// XML for a `w x h` cascade with one stump comparing the top half of the
/// window against the bottom half.
pub(crate) fn edge_cascade_xml(w: u32, h: u32) -> String {
    let half = h / 2;
    format!(
        r#"<?xml version="1.0"?>
<opencv_storage>
<cascade type_id="opencv-cascade-classifier"><stageType>BOOST</stageType>
  <featureType>HAAR</featureType>
  <height>{h}</height>
  <width>{w}</width>
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
          0 0 {w} {half} 1.</_>
        <_>
          0 {half} {w} {half} -1.</_></rects>
      <tilted>0</tilted></_></features></cascade>
</opencv_storage>
"#
    )
}

pub(crate) fn edge_cascade(w: u32, h: u32) -> HaarCascade {
    HaarCascade::from_xml_str(&edge_cascade_xml(w, h)).expect("fixture cascade must parse")
}

/// Gray image whose top half is `top` and bottom half is `bottom`.
pub(crate) fn half_split_image(w: u32, h: u32, top: u8, bottom: u8) -> GrayImage {
    let data = (0..h)
        .flat_map(|y| {
            let v = if y < h / 2 { top } else { bottom };
            std::iter::repeat(v).take(w as usize)
        })
        .collect();
    GrayImage::new(data, w, h)
}

pub(crate) fn uniform_frame(w: u32, h: u32, rgb: [u8; 3]) -> Frame {
    let data = rgb.iter().copied().cycle().take((w * h * 3) as usize).collect();
    Frame::new(data, w, h, 3)
}

/// RGB frame with a white band over a black band, split at row `split`.
pub(crate) fn edge_frame(w: u32, h: u32, split: u32) -> Frame {
    let mut frame = uniform_frame(w, h, [0, 0, 0]);
    let row = (w * 3) as usize;
    frame.data_mut()[..split as usize * row].fill(255);
    frame
}
