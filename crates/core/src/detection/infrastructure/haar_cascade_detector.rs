use crate::detection::domain::detection_params::{DetectionParams, InvalidParams, GROUP_EPS};
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::region_grouper::group_regions;
use crate::shared::frame::Frame;
use crate::shared::region::{round_half_even, Region};

use super::gray_image::GrayImage;
use super::haar_cascade::HaarCascade;
use super::integral_image::IntegralImage;

/// Multi-scale sliding-window detector driven by a [`HaarCascade`].
///
/// Instead of growing the window, each scale shrinks the image by the
/// current factor and runs the cascade at its native window size. Accepted
/// windows are mapped back to image coordinates and grouped.
pub struct HaarCascadeDetector {
    cascade: HaarCascade,
    params: DetectionParams,
}

impl HaarCascadeDetector {
    pub fn new(cascade: HaarCascade, params: DetectionParams) -> Result<Self, InvalidParams> {
        params.validate()?;
        Ok(Self { cascade, params })
    }

    pub fn params(&self) -> &DetectionParams {
        &self.params
    }

    /// Scale factors at which the image is scanned, smallest window first.
    pub fn scales(&self, image_width: u32, image_height: u32) -> Vec<f64> {
        let (ow, oh) = self.cascade.window_size();
        let (max_w, max_h) = self.params.max_size.unwrap_or((image_width, image_height));
        let (min_w, min_h) = self.params.min_size.unwrap_or((0, 0));

        let mut scales = Vec::new();
        let mut factor = 1.0f64;
        loop {
            let win_w = round_half_even(ow as f64 * factor);
            let win_h = round_half_even(oh as f64 * factor);
            if i64::from(win_w) > i64::from(max_w) || i64::from(win_h) > i64::from(max_h) {
                break;
            }
            let scaled_w = round_half_even(image_width as f64 / factor);
            let scaled_h = round_half_even(image_height as f64 / factor);
            if scaled_w < ow as i32 || scaled_h < oh as i32 {
                break;
            }
            if i64::from(win_w) >= i64::from(min_w) && i64::from(win_h) >= i64::from(min_h) {
                scales.push(factor);
            }
            factor *= self.params.scale_factor;
        }
        scales
    }

    /// Every accepted window across all scales, before grouping.
    pub fn candidates(&self, gray: &GrayImage) -> Vec<Region> {
        let (ow, oh) = self.cascade.window_size();
        let mut found = Vec::new();

        for factor in self.scales(gray.width(), gray.height()) {
            let scaled_w = round_half_even(gray.width() as f64 / factor) as u32;
            let scaled_h = round_half_even(gray.height() as f64 / factor) as u32;
            let scaled = gray.resize(scaled_w, scaled_h);
            let integral = IntegralImage::new(&scaled);

            let win_w = round_half_even(ow as f64 * factor);
            let win_h = round_half_even(oh as f64 * factor);
            let step = if factor > 2.0 { 1 } else { 2 };
            let before = found.len();

            let x_end = (scaled_w - ow) as usize;
            let y_end = (scaled_h - oh) as usize;
            for y in (0..=y_end).step_by(step) {
                let mut x = 0;
                while x <= x_end {
                    let verdict = self.cascade.classify(&integral, x, y);
                    if verdict > 0 {
                        found.push(Region::new(
                            round_half_even(x as f64 * factor),
                            round_half_even(y as f64 * factor),
                            win_w,
                            win_h,
                        ));
                    } else if verdict == 0 {
                        // rejected by the first stage: neighbour is unlikely too
                        x += step;
                    }
                    x += step;
                }
            }

            log::trace!(
                "scale {factor:.3} ({scaled_w}x{scaled_h}): {} candidates",
                found.len() - before
            );
        }
        found
    }
}

impl FaceDetector for HaarCascadeDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Err("cannot run detection on an empty frame".into());
        }
        let gray = GrayImage::from_frame(frame);
        let candidates = self.candidates(&gray);
        let faces = group_regions(&candidates, self.params.min_neighbors, GROUP_EPS);
        log::debug!(
            "{} candidate windows grouped into {} faces",
            candidates.len(),
            faces.len()
        );
        Ok(faces)
    }
}
