use crate::domain::ports::Camera;
use crate::error::Result;
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// A camera whose live feed is a single still frame.
#[derive(Debug, Clone)]
pub struct StillCamera {
    frame: RgbaImage,
}

impl StillCamera {
    pub fn new(frame: RgbaImage) -> Self {
        Self { frame }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let frame = image::open(path)?.to_rgba8();
        Ok(Self::new(frame))
    }
}

impl Camera for StillCamera {
    fn current_frame(&self) -> Result<RgbaImage> {
        Ok(self.frame.clone())
    }
}

/// A camera whose feed is an image file, decoded each time a frame is taken.
///
/// An unreadable file surfaces as a capture failure rather than at startup.
#[derive(Debug, Clone)]
pub struct FileCamera {
    path: PathBuf,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Camera for FileCamera {
    fn current_frame(&self) -> Result<RgbaImage> {
        Ok(StillCamera::from_file(&self.path)?.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_file_camera_decodes_frame_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let camera = FileCamera::new(&path);

        // Nothing is read until a frame is requested
        assert!(matches!(camera.current_frame(), Err(AppError::Image(_))));

        RgbImage::from_pixel(3, 2, Rgb([9, 9, 9])).save(&path).unwrap();
        assert_eq!(camera.current_frame().unwrap().dimensions(), (3, 2));
    }
}
