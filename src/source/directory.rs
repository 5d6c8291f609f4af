use super::{FramePacer, FrameSource};
use crate::config::SourceConfig;
use crate::error::{Result, SourceError};
use crate::frame::FrameData;
use image::imageops::{self, FilterType};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "ppm"];

/// Replays recorded frames from a directory, sorted by file name.
///
/// The first decodable image fixes the resolution; later images of another
/// size are resized to it.
pub struct ImageDirectorySource {
    files: Vec<PathBuf>,
    position: usize,
    loop_playback: bool,
    resolution: (u32, u32),
    next_id: u64,
    pacer: FramePacer,
}

impl ImageDirectorySource {
    pub fn open(config: &SourceConfig) -> Result<Self> {
        let mut source = Self::from_dir(&config.path, config.loop_playback)?;
        source.pacer = FramePacer::new(config.fps);
        Ok(source)
    }

    /// Open a directory without frame pacing
    pub fn from_dir<P: AsRef<Path>>(dir: P, loop_playback: bool) -> Result<Self> {
        let dir = dir.as_ref();
        let path_str = dir.display().to_string();

        let entries = fs::read_dir(dir).map_err(|e| SourceError::Open {
            path: path_str.clone(),
            details: e.to_string(),
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_image_file(path))
            .collect();
        files.sort();

        let first = files.first().ok_or_else(|| SourceError::Open {
            path: path_str.clone(),
            details: "no image files found".to_string(),
        })?;

        let resolution = image::image_dimensions(first).map_err(|e| SourceError::Decode {
            path: first.display().to_string(),
            details: e.to_string(),
        })?;

        info!(
            "Replaying {} frames from {} at {}x{}",
            files.len(),
            path_str,
            resolution.0,
            resolution.1
        );

        Ok(Self {
            files,
            position: 0,
            loop_playback,
            resolution,
            next_id: 0,
            pacer: FramePacer::unpaced(),
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn decode(&self, path: &Path) -> Result<image::RgbImage> {
        let image = image::open(path)
            .map_err(|e| SourceError::Decode {
                path: path.display().to_string(),
                details: e.to_string(),
            })?
            .to_rgb8();

        let (width, height) = self.resolution;
        if image.dimensions() == self.resolution {
            Ok(image)
        } else {
            debug!(
                "Resizing {} from {:?} to {}x{}",
                path.display(),
                image.dimensions(),
                width,
                height
            );
            Ok(imageops::resize(&image, width, height, FilterType::Triangle))
        }
    }
}

impl FrameSource for ImageDirectorySource {
    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn next_frame(&mut self) -> Result<FrameData> {
        self.pacer.wait();

        let mut failures = 0;
        loop {
            if self.position >= self.files.len() {
                if self.loop_playback {
                    debug!("Frame directory exhausted, restarting playback");
                    self.position = 0;
                } else {
                    return Err(SourceError::EndOfStream.into());
                }
            }

            let path = self.files[self.position].clone();
            self.position += 1;

            match self.decode(&path) {
                Ok(image) => {
                    let id = self.next_id;
                    self.next_id += 1;
                    return Ok(FrameData::from_rgb_image(id, SystemTime::now(), image));
                }
                Err(e) => {
                    // One bad file should not end a long replay
                    warn!("Skipping unreadable frame: {}", e);
                    failures += 1;
                    if failures >= self.files.len() {
                        return Err(e);
                    }
                }
            }
        }
    }

    fn name(&self) -> &str {
        "directory"
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
