/// Outline color used for detected faces (RGB).
pub const DEFAULT_COLOR: [u8; 3] = [255, 0, 0];

/// Outline thickness in pixels.
pub const DEFAULT_THICKNESS: i32 = 5;

/// How detected regions are drawn. A thickness of zero or less fills the
/// rectangle instead of outlining it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnnotationStyle {
    pub color: [u8; 3],
    pub thickness: i32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            thickness: DEFAULT_THICKNESS,
        }
    }
}

impl AnnotationStyle {
    pub fn is_filled(&self) -> bool {
        self.thickness <= 0
    }
}
