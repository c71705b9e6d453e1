use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::annotation::domain::annotation_style::AnnotationStyle;
use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::annotation::infrastructure::rectangle_annotator::RectangleAnnotator;
use crate::detection::domain::detection_params::DetectionParams;
use crate::detection::domain::detector_loader::DetectorLoader;
use crate::detection::infrastructure::haar_cascade_loader::HaarCascadeLoader;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::imaging::infrastructure::image_file_reader::ImageFileReader;
use crate::imaging::infrastructure::image_file_writer::ImageFileWriter;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("could not decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: Box<dyn StdError>,
    },
    #[error("could not load classifier {path}: {source}")]
    LoadCascade {
        path: PathBuf,
        #[source]
        source: Box<dyn StdError>,
    },
    #[error("face detection failed: {0}")]
    Detect(#[source] Box<dyn StdError>),
    #[error("could not draw detections: {0}")]
    Annotate(#[source] Box<dyn StdError>),
    #[error("could not write output {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: Box<dyn StdError>,
    },
}

/// Single-image pipeline: decode → load classifier → detect → draw → write.
///
/// Each step short-circuits on failure; nothing is written unless every
/// earlier step succeeded.
pub struct AnnotateFacesUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    loader: Box<dyn DetectorLoader>,
    annotator: Box<dyn FrameAnnotator>,
}

impl AnnotateFacesUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        loader: Box<dyn DetectorLoader>,
        annotator: Box<dyn FrameAnnotator>,
    ) -> Self {
        Self {
            reader,
            writer,
            loader,
            annotator,
        }
    }

    /// File-backed pipeline with a Haar cascade detector and rectangle outlines.
    pub fn with_defaults(params: DetectionParams, style: AnnotationStyle) -> Self {
        Self::new(
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            Box::new(HaarCascadeLoader::new(params)),
            Box::new(RectangleAnnotator::new(style)),
        )
    }

    /// Returns the number of faces drawn on the output image.
    pub fn execute(
        &self,
        input_path: &Path,
        classifier_path: &Path,
        output_path: &Path,
    ) -> Result<usize, AnnotateError> {
        let mut frame = self
            .reader
            .read(input_path)
            .map_err(|source| AnnotateError::Decode {
                path: input_path.to_path_buf(),
                source,
            })?;

        let mut detector =
            self.loader
                .load(classifier_path)
                .map_err(|source| AnnotateError::LoadCascade {
                    path: classifier_path.to_path_buf(),
                    source,
                })?;

        let faces = detector.detect(&frame).map_err(AnnotateError::Detect)?;
        self.annotator
            .annotate(&mut frame, &faces)
            .map_err(AnnotateError::Annotate)?;

        self.writer
            .write(output_path, &frame)
            .map_err(|source| AnnotateError::Write {
                path: output_path.to_path_buf(),
                source,
            })?;

        log::info!(
            "Annotated {} face(s) in {} -> {}",
            faces.len(),
            input_path.display(),
            output_path.display()
        );
        Ok(faces.len())
    }
}
