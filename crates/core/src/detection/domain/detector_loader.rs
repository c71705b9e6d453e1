use std::path::Path;

use super::face_detector::FaceDetector;

/// Builds a ready-to-run detector from a serialized classifier file.
pub trait DetectorLoader: Send {
    fn load(&self, classifier_path: &Path)
        -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>>;
}
