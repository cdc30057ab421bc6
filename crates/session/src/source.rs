//! Frame sources

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use detector_backend::Frame;
use tokio::time::Instant;

/// Supplies the frame for each tick.
///
/// `None` means no frame is available yet (camera warming up, stream
/// paused) and the tick is skipped.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn capture(&self) -> Option<Frame>;
}

/// Blank frames of a fixed size with increasing sequence numbers
pub struct SyntheticFrameSource {
    width: u32,
    height: u32,
    started: Instant,
    sequence: AtomicU32,
}

impl SyntheticFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            started: Instant::now(),
            sequence: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl FrameSource for SyntheticFrameSource {
    async fn capture(&self) -> Option<Frame> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let timestamp_ms = self.started.elapsed().as_millis() as u64;
        Some(Frame::blank(self.width, self.height, timestamp_ms, sequence))
    }
}
