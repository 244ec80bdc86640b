use std::path::PathBuf;

use crate::detection::domain::region_detector::{RegionDetector, SensitiveRegionDetector};
use crate::shared::constants::{
    FACE_MODEL_NAME, FACE_MODEL_URL, TEXT_DETECTION_MODEL_NAME, TEXT_DETECTION_MODEL_URL,
    TEXT_DICTIONARY_NAME, TEXT_DICTIONARY_URL, TEXT_RECOGNITION_MODEL_NAME,
    TEXT_RECOGNITION_MODEL_URL,
};
use crate::shared::model_resolver::{ModelResolveError, ModelResolver};

use super::detector_pool::DetectorPool;
use super::onnx_blazeface_detector::OnnxBlazefaceDetector;
use super::onnx_text_reader::OnnxTextReader;

/// On-disk locations of every model file the detectors need.
#[derive(Clone, Debug)]
pub struct ModelPaths {
    pub face: PathBuf,
    pub text_detection: PathBuf,
    pub text_recognition: PathBuf,
    pub dictionary: PathBuf,
}

impl ModelPaths {
    pub fn resolve(resolver: &ModelResolver) -> Result<Self, ModelResolveError> {
        Ok(Self {
            face: resolver.resolve(FACE_MODEL_NAME, FACE_MODEL_URL)?,
            text_detection: resolver.resolve(TEXT_DETECTION_MODEL_NAME, TEXT_DETECTION_MODEL_URL)?,
            text_recognition: resolver
                .resolve(TEXT_RECOGNITION_MODEL_NAME, TEXT_RECOGNITION_MODEL_URL)?,
            dictionary: resolver.resolve(TEXT_DICTIONARY_NAME, TEXT_DICTIONARY_URL)?,
        })
    }

    /// Loads one face + OCR detector stack.
    pub fn load_detector(
        &self,
        pool_size: usize,
    ) -> Result<SensitiveRegionDetector, Box<dyn std::error::Error>> {
        let faces = OnnxBlazefaceDetector::new(&self.face, pool_size)?;
        let text = OnnxTextReader::new(
            &self.text_detection,
            &self.text_recognition,
            &self.dictionary,
            pool_size,
        )?;
        Ok(SensitiveRegionDetector::new(Box::new(faces), Box::new(text)))
    }
}

/// Process-wide model initialization.
///
/// Must run before any masking request; loads `pool_size` independent
/// detector stacks. The pool needs no explicit teardown.
pub fn load_detector_pool(
    paths: &ModelPaths,
    pool_size: usize,
) -> Result<DetectorPool, Box<dyn std::error::Error>> {
    let pool_size = pool_size.max(1);
    log::info!("Loading {pool_size} detector instance(s)");
    DetectorPool::build(pool_size, |slot| {
        log::debug!("Loading detector slot {slot}");
        paths
            .load_detector(pool_size)
            .map(|d| Box::new(d) as Box<dyn RegionDetector>)
    })
}
