use std::path::Path;

use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::detector_loader::DetectorLoader;
use crate::detection::domain::face_detector::FaceDetector;

use super::haar_cascade::HaarCascade;
use super::haar_cascade_detector::HaarCascadeDetector;

/// Loads OpenCV-format Haar cascade files into [`HaarCascadeDetector`]s.
#[derive(Clone, Debug, Default)]
pub struct HaarCascadeLoader {
    params: DetectionParams,
}

impl HaarCascadeLoader {
    pub fn new(params: DetectionParams) -> Self {
        Self { params }
    }
}

impl DetectorLoader for HaarCascadeLoader {
    fn load(
        &self,
        classifier_path: &Path,
    ) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
        let cascade = HaarCascade::from_file(classifier_path)?;
        Ok(Box::new(HaarCascadeDetector::new(cascade, self.params)?))
    }
}
