//! Boosted Haar cascade model and per-window evaluation.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::cascade_parser;
use super::integral_image::IntegralImage;

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("failed to read cascade {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed cascade XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("cascade is missing <{0}>")]
    Missing(&'static str),
    #[error("invalid value in <{field}>: {value:?}")]
    InvalidValue { field: &'static str, value: String },
    #[error("unsupported cascade: {0}")]
    Unsupported(String),
    #[error("inconsistent cascade: {0}")]
    Inconsistent(String),
}

/// One weighted rectangle of a Haar feature, relative to the window origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub weight: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HaarFeature {
    pub rects: Vec<WeightedRect>,
}

/// Internal node of a weak-classifier tree.
///
/// Child indices greater than zero point at another node of the same tree;
/// zero or negative values `-k` select leaf `k`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeNode {
    pub left: i32,
    pub right: i32,
    pub feature: usize,
    pub threshold: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeakClassifier {
    pub nodes: Vec<TreeNode>,
    pub leaves: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub threshold: f32,
    pub classifiers: Vec<WeakClassifier>,
}

/// A pre-trained boosted cascade of Haar-feature trees.
#[derive(Clone, Debug, PartialEq)]
pub struct HaarCascade {
    window: (u32, u32),
    stages: Vec<Stage>,
    features: Vec<HaarFeature>,
}

impl HaarCascade {
    /// Builds a cascade, checking that every index and rectangle is in range.
    pub fn new(
        window: (u32, u32),
        stages: Vec<Stage>,
        features: Vec<HaarFeature>,
    ) -> Result<Self, CascadeError> {
        let cascade = Self {
            window,
            stages,
            features,
        };
        cascade.check()?;
        Ok(cascade)
    }

    pub fn from_file(path: &Path) -> Result<Self, CascadeError> {
        let text = std::fs::read_to_string(path).map_err(|e| CascadeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let cascade = Self::from_xml_str(&text)?;
        log::debug!(
            "Loaded cascade {} ({}x{} window, {} stages, {} features)",
            path.display(),
            cascade.window.0,
            cascade.window.1,
            cascade.stages.len(),
            cascade.features.len()
        );
        Ok(cascade)
    }

    pub fn from_xml_str(text: &str) -> Result<Self, CascadeError> {
        cascade_parser::parse(text)
    }

    /// Base detection window (width, height).
    pub fn window_size(&self) -> (u32, u32) {
        self.window
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn features(&self) -> &[HaarFeature] {
        &self.features
    }

    /// Runs the cascade on the window whose top-left corner is `(x, y)`.
    ///
    /// Returns 1 when every stage accepts, otherwise `-k` where `k` is the
    /// index of the rejecting stage (0 for a first-stage rejection).
    pub fn classify(&self, integral: &IntegralImage, x: usize, y: usize) -> i32 {
        let inv_norm = self.inverse_norm(integral, x, y);

        for (si, stage) in self.stages.iter().enumerate() {
            let mut total = 0.0f64;
            for wc in &stage.classifiers {
                let mut idx = 0i32;
                loop {
                    let node = &wc.nodes[idx as usize];
                    let value = self.feature_value(node.feature, integral, x, y) * inv_norm;
                    idx = if value < node.threshold as f64 {
                        node.left
                    } else {
                        node.right
                    };
                    if idx <= 0 {
                        break;
                    }
                }
                total += wc.leaves[(-idx) as usize] as f64;
            }
            if total < stage.threshold as f64 {
                return -(si as i32);
            }
        }
        1
    }

    /// Reciprocal of the window's contrast, measured over its interior
    /// (a one-pixel border is excluded).
    fn inverse_norm(&self, integral: &IntegralImage, x: usize, y: usize) -> f64 {
        let (ww, wh) = (self.window.0 as usize, self.window.1 as usize);
        let (nw, nh) = (ww - 2, wh - 2);
        let area = (nw * nh) as f64;
        let sum = integral.rect_sum(x + 1, y + 1, nw, nh) as f64;
        let sqsum = integral.rect_sqsum(x + 1, y + 1, nw, nh);
        let nf = area * sqsum - sum * sum;
        let nf = if nf > 0.0 { nf.sqrt() } else { 1.0 };
        1.0 / nf
    }

    fn feature_value(&self, feature: usize, integral: &IntegralImage, x: usize, y: usize) -> f64 {
        let mut value = 0.0f32;
        for r in &self.features[feature].rects {
            let s = integral.rect_sum(
                x + r.x as usize,
                y + r.y as usize,
                r.width as usize,
                r.height as usize,
            );
            value += r.weight * s as f32;
        }
        value as f64
    }

    fn check(&self) -> Result<(), CascadeError> {
        let (ww, wh) = self.window;
        if ww < 3 || wh < 3 {
            return Err(CascadeError::Inconsistent(format!(
                "window {ww}x{wh} is too small"
            )));
        }
        if self.stages.is_empty() {
            return Err(CascadeError::Inconsistent("cascade has no stages".into()));
        }

        for (fi, f) in self.features.iter().enumerate() {
            if f.rects.is_empty() {
                return Err(CascadeError::Inconsistent(format!(
                    "feature {fi} has no rectangles"
                )));
            }
            for r in &f.rects {
                if r.x + r.width > ww || r.y + r.height > wh {
                    return Err(CascadeError::Inconsistent(format!(
                        "feature {fi} rectangle {r:?} exceeds the {ww}x{wh} window"
                    )));
                }
            }
        }

        for (si, stage) in self.stages.iter().enumerate() {
            for (ci, wc) in stage.classifiers.iter().enumerate() {
                check_tree(wc, self.features.len())
                    .map_err(|msg| CascadeError::Inconsistent(format!("stage {si} tree {ci}: {msg}")))?;
            }
        }
        Ok(())
    }
}

/// Trees must be non-empty, reference existing features and leaves, and
/// only point forward so evaluation always terminates.
fn check_tree(wc: &WeakClassifier, feature_count: usize) -> Result<(), String> {
    if wc.nodes.is_empty() {
        return Err("no nodes".into());
    }
    for (ni, node) in wc.nodes.iter().enumerate() {
        if node.feature >= feature_count {
            return Err(format!("node {ni} uses missing feature {}", node.feature));
        }
        for child in [node.left, node.right] {
            if child > 0 {
                if child as usize <= ni || child as usize >= wc.nodes.len() {
                    return Err(format!("node {ni} has invalid child {child}"));
                }
            } else if (-child) as usize >= wc.leaves.len() {
                return Err(format!("node {ni} points at missing leaf {}", -child));
            }
        }
    }
    Ok(())
}
