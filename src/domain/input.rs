use image::DynamicImage;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageOrigin {
    Upload { path: PathBuf },
    Capture,
}

/// A displayable image handle produced by an upload or a camera capture.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub origin: ImageOrigin,
    pub image: DynamicImage,
}

impl ImageInput {
    pub fn new(origin: ImageOrigin, image: DynamicImage) -> Self {
        Self { origin, image }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Short description used in log lines.
    pub fn describe(&self) -> String {
        let (w, h) = self.dimensions();
        match &self.origin {
            ImageOrigin::Upload { path } => format!("upload {} ({w}x{h})", path.display()),
            ImageOrigin::Capture => format!("camera capture ({w}x{h})"),
        }
    }
}
