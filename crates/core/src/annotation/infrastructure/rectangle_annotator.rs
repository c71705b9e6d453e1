use ndarray::s;

use crate::annotation::domain::annotation_style::AnnotationStyle;
use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Draws an axis-aligned rectangle around each region.
///
/// The outline runs through `(x, y)` and `(x + width, y + height)`, both
/// inclusive, and is widened to `thickness` pixels centered on that path.
/// Corners are painted square, not rounded. Anything falling outside the
/// frame is clipped.
pub struct RectangleAnnotator {
    style: AnnotationStyle,
}

impl RectangleAnnotator {
    pub fn new(style: AnnotationStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    fn draw(&self, frame: &mut Frame, r: &Region) {
        let (left, top, right, bottom) = (r.x, r.y, r.right(), r.bottom());
        if self.style.is_filled() {
            fill(frame, left, top, right, bottom, self.style.color);
            return;
        }

        let lo = (self.style.thickness - 1) / 2;
        let hi = self.style.thickness - 1 - lo;
        let color = self.style.color;
        fill(frame, left - lo, top - lo, right + hi, top + hi, color);
        fill(frame, left - lo, bottom - lo, right + hi, bottom + hi, color);
        fill(frame, left - lo, top - lo, left + hi, bottom + hi, color);
        fill(frame, right - lo, top - lo, right + hi, bottom + hi, color);
    }
}

impl Default for RectangleAnnotator {
    fn default() -> Self {
        Self::new(AnnotationStyle::default())
    }
}

impl FrameAnnotator for RectangleAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        regions: &[Region],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(());
        }
        for r in regions {
            self.draw(frame, r);
        }
        Ok(())
    }
}

/// Paints the inclusive box `[x0, x1] x [y0, y1]`, clipped to the frame.
fn fill(frame: &mut Frame, x0: i32, y0: i32, x1: i32, y1: i32, color: [u8; 3]) {
    let w = frame.width() as i64;
    let h = frame.height() as i64;
    let xa = (x0 as i64).max(0);
    let ya = (y0 as i64).max(0);
    let xb = (x1 as i64 + 1).min(w);
    let yb = (y1 as i64 + 1).min(h);
    if xa >= xb || ya >= yb {
        return;
    }

    let channels = (frame.channels() as usize).min(color.len());
    let mut pixels = frame.as_ndarray_mut();
    let mut roi = pixels.slice_mut(s![ya as usize..yb as usize, xa as usize..xb as usize, ..]);
    for (c, &value) in color.iter().enumerate().take(channels) {
        roi.slice_mut(s![.., .., c]).fill(value);
    }
}
