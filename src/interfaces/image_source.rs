use crate::domain::input::{ImageInput, ImageOrigin};
use crate::domain::ports::{Camera, ImageProducer};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use image::{DynamicImage, RgbaImage, imageops};
use std::path::PathBuf;

/// Extensions the file picker offers for `image/*`.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// A file the user picked for upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    path: PathBuf,
}

impl FileUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn check_extension(&self) -> Result<()> {
        let accepted = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            });
        if accepted {
            Ok(())
        } else {
            Err(AppError::ValidationError(format!(
                "{} is not an image file",
                self.path.display()
            )))
        }
    }
}

#[async_trait]
impl ImageProducer for FileUpload {
    async fn produce(&self) -> Result<ImageInput> {
        self.check_extension()?;
        let bytes = tokio::fs::read(&self.path).await?;
        let image = image::load_from_memory(&bytes)?;
        Ok(ImageInput::new(
            ImageOrigin::Upload {
                path: self.path.clone(),
            },
            image,
        ))
    }
}

/// Grabs the camera's current frame through an offscreen surface.
pub struct CameraCapture<C: Camera> {
    camera: C,
}

impl<C: Camera> CameraCapture<C> {
    pub fn new(camera: C) -> Self {
        Self { camera }
    }
}

#[async_trait]
impl<C: Camera> ImageProducer for CameraCapture<C> {
    async fn produce(&self) -> Result<ImageInput> {
        let frame = self.camera.current_frame()?;
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(AppError::ValidationError(
                "camera has not delivered a frame yet".to_string(),
            ));
        }

        // Surface is sized to the frame, like a canvas matched to the video element.
        let mut surface = RgbaImage::new(width, height);
        imageops::overlay(&mut surface, &frame, 0, 0);
        Ok(ImageInput::new(
            ImageOrigin::Capture,
            DynamicImage::ImageRgba8(surface),
        ))
    }
}
