mod contract;
mod converter;
mod overlay;
mod sink;
mod stats;

pub use contract::{AnnotatedRegion, PanelRow, PanelState, RenderFrame, StatusToast};
pub use converter::DisplayConverter;
pub use overlay::OverlayRenderer;
pub use sink::{DisplaySink, FramebufferSink, NullSink, SnapshotSink};
pub use stats::DisplayStats;

use crate::config::{DisplayConfig, SinkKind};
use crate::error::Result;
use std::time::Instant;
use tracing::{debug, info};

/// Overlay renderer paired with the configured sink
pub struct Display {
    renderer: OverlayRenderer,
    sink: Box<dyn DisplaySink>,
    stats: DisplayStats,
}

impl Display {
    pub fn new(renderer: OverlayRenderer, sink: Box<dyn DisplaySink>) -> Self {
        Self {
            renderer,
            sink,
            stats: DisplayStats::default(),
        }
    }

    pub fn from_config(config: &DisplayConfig) -> Self {
        let sink: Box<dyn DisplaySink> = match config.sink {
            SinkKind::Framebuffer => Box::new(FramebufferSink::new(&config.framebuffer_device)),
            SinkKind::Snapshot => Box::new(SnapshotSink::new(
                &config.snapshot_path,
                config.snapshot_every,
            )),
            SinkKind::None => Box::new(NullSink),
        };

        // Headless runs never draw, so skip loading the font
        let renderer = if config.sink == SinkKind::None {
            OverlayRenderer::without_font(config.preview_resolution)
        } else {
            OverlayRenderer::new(config.preview_resolution, &config.font_path)
        };

        info!(
            "Display sink '{}' at {}x{}",
            sink.name(),
            config.preview_resolution.0,
            config.preview_resolution.1
        );
        Self::new(renderer, sink)
    }

    /// Render and hand the preview to the sink
    pub fn present(&mut self, frame: &RenderFrame, now: Instant) -> Result<()> {
        if !self.sink.wants_frame() {
            self.stats.record_skip();
            return Ok(());
        }

        let result = self
            .renderer
            .render(frame, now)
            .and_then(|preview| self.sink.present(&preview));

        match &result {
            Ok(()) => self.stats.record_frame_render(),
            Err(_) => self.stats.record_render_error(),
        }
        debug!("Presented frame {} to {}", frame.frame.id, self.sink.name());
        result
    }

    pub fn stats(&self) -> &DisplayStats {
        &self.stats
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }
}
