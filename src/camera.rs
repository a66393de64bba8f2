// Image sources: the live webcam and the still fallback portrait.
// Both produce a FrameBuffer of 0x00RRGGBB pixels at their native size;
// the cover transform takes care of fitting them onto the canvas.

use std::path::Path;

use crate::error::Error;
use crate::types::FrameBuffer;

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

use image::RgbImage;
use tracing::info;

/// Pack tightly-packed RGB8 bytes into a FrameBuffer.
/// Takes raw bytes so camera frames decoded by nokhwa's own `image` version fit too.
pub fn frame_from_rgb_bytes(width: u32, height: u32, raw: &[u8]) -> FrameBuffer {
    let mut out = Vec::with_capacity((width as usize) * (height as usize));
    for px in raw.chunks_exact(3) {
        let r = px[0] as u32;
        let g = px[1] as u32;
        let b = px[2] as u32;
        out.push((r << 16) | (g << 8) | b);
    }
    FrameBuffer { width: width as usize, height: height as usize, pixels: out }
}

fn frame_from_rgb(img: &RgbImage) -> FrameBuffer {
    frame_from_rgb_bytes(img.width(), img.height(), img.as_raw())
}

/// Decode the fallback still image (any format `image` understands).
pub fn load_still_image(path: &Path) -> Result<FrameBuffer, Error> {
    let img = image::open(path)
        .map_err(|e| Error::FallbackImage(format!("Open {}: {e}", path.display())))?
        .to_rgb8();
    info!(path = %path.display(), width = img.width(), height = img.height(), "Fallback image loaded");
    Ok(frame_from_rgb(&img))
}

// A small wrapper around nokhwa::Camera so the main loop stays clean.
pub struct CameraCapture {
    cam: Camera,
}

impl CameraCapture {
    /// Open camera `index` near the requested resolution (the driver may pick another).
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, Error> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        let actual = cam.resolution();
        info!(index, width = actual.width(), height = actual.height(), "Camera streaming");

        Ok(Self { cam })
    }

    /// Grab one frame (blocks until the camera has one).
    pub fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let (w, h) = rgb_img.dimensions();
        Ok(frame_from_rgb_bytes(w, h, rgb_img.as_raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_image_packs_row_major() {
        let img = RgbImage::from_fn(2, 2, |x, y| image::Rgb([x as u8 * 10, y as u8 * 20, 5]));
        let fb = frame_from_rgb(&img);
        assert_eq!((fb.width, fb.height), (2, 2));
        assert_eq!(fb.pixels, vec![0x0000_0005, 0x000A_0005, 0x0000_1405, 0x000A_1405]);
    }

    #[test]
    fn missing_still_image_is_reported() {
        let err = load_still_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, Error::FallbackImage(_)));
    }
}
