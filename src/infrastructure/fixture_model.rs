use crate::domain::detection::RawDetection;
use crate::domain::input::ImageInput;
use crate::domain::ports::{DetectionModel, DetectionModelBox, ModelLoader};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// A model that reports the same detections for every image.
#[derive(Debug, Clone)]
pub struct StaticModel {
    detections: Vec<RawDetection>,
}

#[async_trait]
impl DetectionModel for StaticModel {
    async fn detect(
        &self,
        image: &ImageInput,
        _cancel: CancellationToken,
    ) -> Result<Vec<RawDetection>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }
        Ok(self.detections.clone())
    }
}

/// Loads a `StaticModel` from memory and counts how often it was loaded.
#[derive(Debug, Clone)]
pub struct StaticModelLoader {
    detections: Vec<RawDetection>,
    loads: Arc<AtomicUsize>,
}

impl StaticModelLoader {
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self {
            detections,
            loads: Arc::default(),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for StaticModelLoader {
    async fn load(&self) -> Result<DetectionModelBox> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StaticModel {
            detections: self.detections.clone(),
        }))
    }
}

/// Reads canned detections (`[{"class": "dog", "score": 0.92}]`) from a JSON file
/// on every load.
#[derive(Debug, Clone)]
pub struct FixtureModelLoader {
    path: PathBuf,
}

impl FixtureModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ModelLoader for FixtureModelLoader {
    async fn load(&self) -> Result<DetectionModelBox> {
        log::info!("Loading detection model from {}", self.path.display());
        let json = tokio::fs::read_to_string(&self.path).await?;
        let detections: Vec<RawDetection> = serde_json::from_str(&json)?;
        Ok(Box::new(StaticModel { detections }))
    }
}

/// Used when no model is configured; every load fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableModelLoader;

#[async_trait]
impl ModelLoader for UnavailableModelLoader {
    async fn load(&self) -> Result<DetectionModelBox> {
        Err(AppError::InferenceFailure(
            "no detection model configured".to_string(),
        ))
    }
}
