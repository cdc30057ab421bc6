//! Captured frame handed to detector backends

use crate::DetectorError;

/// Decoded RGB frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (milliseconds since session start)
    pub timestamp_ms: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl Frame {
    /// Create a frame from raw RGB data, checking the buffer length
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        timestamp_ms: u64,
        sequence: u32,
    ) -> Result<Self, DetectorError> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(DetectorError::InvalidFrame(format!(
                "expected {} bytes for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp_ms,
            sequence,
        })
    }

    /// Black frame of the given size. Used by simulated sources.
    pub fn blank(width: u32, height: u32, timestamp_ms: u64, sequence: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * 3],
            width,
            height,
            timestamp_ms,
            sequence,
        }
    }

    /// Wrap a decoded `image` buffer
    pub fn from_rgb_image(img: image::RgbImage, timestamp_ms: u64, sequence: u32) -> Self {
        let (width, height) = img.dimensions();
        Self {
            data: img.into_raw(),
            width,
            height,
            timestamp_ms,
            sequence,
        }
    }

    /// View as an `image` buffer for backends that preprocess with it
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize * self.width as usize) + x as usize) * 3;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_buffer() {
        let err = Frame::new(vec![0; 10], 4, 4, 0, 0).unwrap_err();
        assert!(matches!(err, DetectorError::InvalidFrame(_)));
    }

    #[test]
    fn test_image_roundtrip_keeps_pixels() {
        let mut img = image::RgbImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgb([10, 20, 30]));

        let frame = Frame::from_rgb_image(img, 5, 1);
        assert_eq!(frame.get_pixel(2, 1), Some([10, 20, 30]));
        assert_eq!(frame.get_pixel(3, 0), None);

        let back = frame.to_rgb_image().unwrap();
        assert_eq!(back.get_pixel(2, 1), &image::Rgb([10, 20, 30]));
    }
}
