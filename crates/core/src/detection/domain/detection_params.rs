use thiserror::Error;

/// Default pyramid step between consecutive detection scales.
pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;

/// Default number of overlapping candidates a face needs to be kept.
pub const DEFAULT_MIN_NEIGHBORS: u32 = 3;

/// Relative tolerance used when clustering candidate rectangles.
pub const GROUP_EPS: f64 = 0.2;

/// Multi-scale scan parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectionParams {
    pub scale_factor: f64,
    /// Candidates per group required to report a face. 0 disables grouping.
    pub min_neighbors: u32,
    /// Smallest window (width, height) to consider.
    pub min_size: Option<(u32, u32)>,
    /// Largest window (width, height) to consider; defaults to the image size.
    pub max_size: Option<(u32, u32)>,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_size: None,
            max_size: None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid detection parameters: {0}")]
pub struct InvalidParams(String);

impl DetectionParams {
    pub fn validate(&self) -> Result<(), InvalidParams> {
        if !(self.scale_factor > 1.0) || !self.scale_factor.is_finite() {
            return Err(InvalidParams(format!(
                "scale factor must be a finite value greater than 1.0, got {}",
                self.scale_factor
            )));
        }
        if let (Some((min_w, min_h)), Some((max_w, max_h))) = (self.min_size, self.max_size) {
            if min_w > max_w || min_h > max_h {
                return Err(InvalidParams(format!(
                    "min size {min_w}x{min_h} exceeds max size {max_w}x{max_h}"
                )));
            }
        }
        Ok(())
    }
}
