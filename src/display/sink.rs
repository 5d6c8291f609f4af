use super::converter::DisplayConverter;
use crate::error::{DisplayError, Result};
use image::{ImageFormat, RgbImage};
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Destination for rendered previews
pub trait DisplaySink: Send {
    /// Whether the next frame should be rendered at all
    fn wants_frame(&mut self) -> bool {
        true
    }

    fn present(&mut self, preview: &RgbImage) -> Result<()>;

    fn name(&self) -> &str;
}

/// Writes RGB565 previews straight into a Linux framebuffer device
pub struct FramebufferSink {
    device: String,
    file: Option<File>,
}

impl FramebufferSink {
    pub fn new<S: Into<String>>(device: S) -> Self {
        let device = device.into();
        let file = match open_framebuffer(&device) {
            Ok(file) => {
                info!("Framebuffer device opened: {}", device);
                Some(file)
            }
            Err(e) => {
                warn!("Failed to open framebuffer {}: {}", device, e);
                None
            }
        };
        Self { device, file }
    }

    fn write_frame(file: &mut File, data: &[u8]) -> Result<()> {
        file.seek(SeekFrom::Start(0))
            .map_err(|e| DisplayError::Write {
                details: format!("Failed to seek framebuffer: {}", e),
            })?;
        file.write_all(data).map_err(|e| DisplayError::Write {
            details: format!("Failed to write framebuffer: {}", e),
        })?;
        file.flush().map_err(|e| DisplayError::Write {
            details: format!("Failed to flush framebuffer: {}", e),
        })?;
        Ok(())
    }
}

impl DisplaySink for FramebufferSink {
    fn present(&mut self, preview: &RgbImage) -> Result<()> {
        let data = DisplayConverter::image_to_rgb565(preview)?;

        if self.file.is_none() {
            let file = open_framebuffer(&self.device)?;
            debug!("Framebuffer device reconnected");
            self.file = Some(file);
        }

        let result = match self.file.as_mut() {
            Some(file) => Self::write_frame(file, &data),
            None => Ok(()),
        };

        if result.is_err() {
            // Reopen on the next frame
            self.file = None;
        }
        result
    }

    fn name(&self) -> &str {
        "framebuffer"
    }
}

fn open_framebuffer(device: &str) -> Result<File> {
    OpenOptions::new().write(true).open(device).map_err(|e| {
        DisplayError::Device {
            device: device.to_string(),
            details: e.to_string(),
        }
        .into()
    })
}

/// Periodically saves the latest preview to an image file
pub struct SnapshotSink {
    path: PathBuf,
    every: u64,
    frames_seen: u64,
}

impl SnapshotSink {
    pub fn new<P: Into<PathBuf>>(path: P, every: u64) -> Self {
        Self {
            path: path.into(),
            every: every.max(1),
            frames_seen: 0,
        }
    }
}

impl DisplaySink for SnapshotSink {
    fn wants_frame(&mut self) -> bool {
        let due = self.frames_seen % self.every == 0;
        self.frames_seen += 1;
        due
    }

    fn present(&mut self, preview: &RgbImage) -> Result<()> {
        let format = ImageFormat::from_path(&self.path).map_err(|e| DisplayError::Write {
            details: format!("Unsupported snapshot path {}: {}", self.path.display(), e),
        })?;

        // Write then rename so viewers never see a partial file
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        preview
            .save_with_format(&tmp, format)
            .map_err(|e| DisplayError::Write {
                details: format!("Failed to write snapshot {}: {}", tmp.display(), e),
            })?;
        fs::rename(&tmp, &self.path)?;

        debug!("Snapshot written to {}", self.path.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "snapshot"
    }
}

/// Headless operation
#[derive(Debug, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn wants_frame(&mut self) -> bool {
        false
    }

    fn present(&mut self, _preview: &RgbImage) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "none"
    }
}
