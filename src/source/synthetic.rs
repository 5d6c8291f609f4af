use super::{FramePacer, FrameSource};
use crate::error::{Result, SourceError};
use crate::frame::FrameData;
use image::{Rgb, RgbImage};
use std::collections::VecDeque;
use std::time::SystemTime;

const BACKGROUND: Rgb<u8> = Rgb([24, 24, 24]);
const OBJECT: Rgb<u8> = Rgb([230, 230, 230]);

enum Scene {
    /// Pre-built frames played once in order
    Scripted(VecDeque<RgbImage>),
    /// Bright boxes falling through the frame, one lane at a time
    FallingBoxes { frame_index: u64 },
}

/// Generated frames for bench runs and tests
pub struct SyntheticSource {
    width: u32,
    height: u32,
    scene: Scene,
    next_id: u64,
    pacer: FramePacer,
}

impl SyntheticSource {
    /// Play the given frames once, then report end of stream
    pub fn scripted(width: u32, height: u32, frames: Vec<RgbImage>) -> Self {
        Self {
            width,
            height,
            scene: Scene::Scripted(frames.into()),
            next_id: 0,
            pacer: FramePacer::unpaced(),
        }
    }

    /// Endless scene of boxes falling down through the frame
    pub fn falling_boxes(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            scene: Scene::FallingBoxes { frame_index: 0 },
            next_id: 0,
            pacer: FramePacer::new(fps),
        }
    }

    /// Uniform background frame
    pub fn blank_frame(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, BACKGROUND)
    }

    /// Background frame with one bright box at `(x, y)` of size `w`x`h`
    pub fn frame_with_boxes(width: u32, height: u32, boxes: &[(u32, u32, u32, u32)]) -> RgbImage {
        let mut image = Self::blank_frame(width, height);
        for &(x, y, w, h) in boxes {
            for py in y..(y + h).min(height) {
                for px in x..(x + w).min(width) {
                    image.put_pixel(px, py, OBJECT);
                }
            }
        }
        image
    }

    fn falling_box_frame(&self, frame_index: u64) -> RgbImage {
        let box_w = (self.width / 8).max(1);
        let box_h = (self.height / 6).max(1);
        let speed = (self.height / 30).max(1) as u64;

        // One box per pass; each pass uses the next of four lanes
        let travel = (self.height + box_h) as u64;
        let frames_per_pass = travel.div_ceil(speed);
        let pass = frame_index / frames_per_pass;
        let offset = (frame_index % frames_per_pass) * speed;

        let lane = (pass % 4) as u32;
        let x = self.width / 8 + lane * (self.width / 4);
        let top = offset as i64 - box_h as i64;

        let y = top.max(0) as u32;
        let visible_h = (top + box_h as i64 - y as i64).max(0) as u32;

        Self::frame_with_boxes(self.width, self.height, &[(x, y, box_w, visible_h)])
    }
}

impl FrameSource for SyntheticSource {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<FrameData> {
        self.pacer.wait();

        let image = match &mut self.scene {
            Scene::Scripted(frames) => frames.pop_front().ok_or(SourceError::EndOfStream)?,
            Scene::FallingBoxes { frame_index } => {
                let index = *frame_index;
                *frame_index += 1;
                self.falling_box_frame(index)
            }
        };

        if image.dimensions() != (self.width, self.height) {
            return Err(SourceError::SizeMismatch {
                expected: (self.width, self.height),
                actual: image.dimensions(),
            }
            .into());
        }

        let id = self.next_id;
        self.next_id += 1;
        Ok(FrameData::from_rgb_image(id, SystemTime::now(), image))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
