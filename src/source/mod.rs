mod directory;
mod synthetic;

pub use directory::ImageDirectorySource;
pub use synthetic::SyntheticSource;

use crate::config::{SourceConfig, SourceKind};
use crate::error::Result;
use crate::frame::FrameData;
use std::time::{Duration, Instant};
use tracing::info;

/// Supplier of RGB frames at a fixed resolution.
///
/// `next_frame` may block for up to one frame period. Returning
/// `SourceError::EndOfStream` ends the frame loop.
pub trait FrameSource: Send {
    fn resolution(&self) -> (u32, u32);

    fn next_frame(&mut self) -> Result<FrameData>;

    fn name(&self) -> &str;
}

/// Build the frame source selected in the configuration
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn FrameSource>> {
    let source: Box<dyn FrameSource> = match config.kind {
        SourceKind::Directory => Box::new(ImageDirectorySource::open(config)?),
        SourceKind::Synthetic => Box::new(SyntheticSource::falling_boxes(
            config.resolution.0,
            config.resolution.1,
            config.fps,
        )),
    };

    info!(
        "Frame source '{}' ready at {}x{}",
        source.name(),
        source.resolution().0,
        source.resolution().1
    );
    Ok(source)
}

/// Sleeps out the remainder of each frame period
#[derive(Debug)]
pub(crate) struct FramePacer {
    interval: Duration,
    last: Option<Instant>,
}

impl FramePacer {
    pub(crate) fn new(fps: u32) -> Self {
        Self {
            interval: if fps == 0 {
                Duration::ZERO
            } else {
                Duration::from_secs_f64(1.0 / fps as f64)
            },
            last: None,
        }
    }

    pub(crate) fn unpaced() -> Self {
        Self {
            interval: Duration::ZERO,
            last: None,
        }
    }

    pub(crate) fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}
