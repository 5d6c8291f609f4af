use super::session::Session;
use super::types::{LoopControl, ShutdownReason};
use crate::analyzer::{preprocess, MotionDetector, MotionResult};
use crate::display::{Display, RenderFrame};
use crate::error::{LinecountError, Result, SourceError};
use crate::input::{InputQueue, InputSender};
use crate::source::FrameSource;

use image::GrayImage;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Sequential acquire, detect, count, render, input cycle
pub struct FrameLoop {
    source: Box<dyn FrameSource>,
    detector: MotionDetector,
    display: Display,
    queue: InputQueue,
    session: Session,
    previous_gray: Option<GrayImage>,
    frames_processed: u64,
}

impl FrameLoop {
    pub fn new(
        source: Box<dyn FrameSource>,
        display: Display,
        queue: InputQueue,
        session: Session,
    ) -> Self {
        Self {
            source,
            detector: MotionDetector::new(),
            display,
            queue,
            session,
            previous_gray: None,
            frames_processed: 0,
        }
    }

    /// Grab the frame every later frame is first compared against
    pub fn prime(&mut self) -> Result<()> {
        let thresholds = self.session.thresholds()?;
        let frame = self.source.next_frame()?;
        self.previous_gray = Some(preprocess(
            &frame,
            thresholds.multiplier,
            thresholds.scalar,
        )?);
        debug!("Primed frame loop with frame {}", frame.id);
        Ok(())
    }

    /// One full iteration
    pub fn iterate(&mut self) -> Result<LoopControl> {
        let started = Instant::now();

        // Edits made while draining input apply from the next iteration
        let thresholds = self.session.thresholds()?;

        let frame = self.source.next_frame()?;
        let gray = preprocess(&frame, thresholds.multiplier, thresholds.scalar)?;

        let motion = match &self.previous_gray {
            Some(previous) => match self.detector.analyze(&gray, previous, &thresholds) {
                Ok(motion) => motion,
                Err(e) => {
                    warn!("Skipping detection for frame {}: {}", frame.id, e);
                    MotionResult::default()
                }
            },
            None => MotionResult::default(),
        };
        let regions = motion.regions;

        let count_before = self.session.count();
        let annotated = self.session.count_regions(&regions, &thresholds);
        let counted = self.session.count() - count_before;
        if counted > 0 {
            info!("Count: {}", self.session.count());
        }

        let now = Instant::now();
        let render = RenderFrame {
            outlines: motion.outlines,
            regions: annotated,
            counting_line: thresholds.counting_line,
            count: self.session.count(),
            panel: self.session.panel_state(),
            status: self.session.status(now).cloned(),
            frame,
        };
        if let Err(e) = self.display.present(&render, now) {
            warn!("Display error: {}", e);
        }

        self.previous_gray = Some(gray);
        self.session.end_frame();

        let control = self
            .session
            .handle_events(self.queue.drain(), Instant::now());

        self.frames_processed += 1;
        debug!(
            "Frame {} took {:?}: {} regions, {} counted",
            render.frame.id,
            started.elapsed(),
            regions.len(),
            counted
        );
        Ok(control)
    }

    /// Iterate until QUIT, end of stream, a fatal error or cancellation
    pub fn run(&mut self, cancel: &CancellationToken) -> ShutdownReason {
        let reason = self.run_until_stopped(cancel);
        let stats = self.display.stats();
        info!(
            "Frame loop stopped after {} frames; display '{}' rendered {}, skipped {}, failed {}",
            self.frames_processed,
            self.display.sink_name(),
            stats.frames_rendered,
            stats.frames_skipped,
            stats.render_errors
        );
        reason
    }

    fn run_until_stopped(&mut self, cancel: &CancellationToken) -> ShutdownReason {
        if let Err(e) = self.prime() {
            return Self::reason_for(e);
        }
        info!("Frame loop running from source '{}'", self.source.name());

        loop {
            if cancel.is_cancelled() {
                return ShutdownReason::Cancelled;
            }

            match self.iterate() {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Quit) => return ShutdownReason::UserRequest,
                Err(e) => return Self::reason_for(e),
            }
        }
    }

    fn reason_for(e: LinecountError) -> ShutdownReason {
        match e {
            LinecountError::Source(SourceError::EndOfStream) => {
                info!("Frame source reached end of stream");
                ShutdownReason::EndOfStream
            }
            other => {
                error!("Frame loop stopped: {}", other);
                ShutdownReason::Error(other.to_string())
            }
        }
    }

    pub fn input_sender(&self) -> InputSender {
        self.queue.sender()
    }

    pub fn queue(&self) -> &InputQueue {
        &self.queue
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}
