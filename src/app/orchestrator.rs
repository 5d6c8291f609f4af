use super::frame_loop::FrameLoop;
use super::session::Session;
use super::types::ComponentState;
use crate::config::LinecountConfig;
use crate::display::Display;
use crate::error::Result;
use crate::input::{InputQueue, InputSources};
use crate::source;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Owns the frame loop and the input sources around it
pub struct LinecountOrchestrator {
    pub(super) config: LinecountConfig,
    pub(super) frame_loop: Option<FrameLoop>,
    pub(super) inputs: InputSources,
    pub(super) final_count: Option<u64>,

    // Lifecycle management
    pub(super) component_states: Arc<Mutex<HashMap<&'static str, ComponentState>>>,
    pub(super) cancellation_token: CancellationToken,
}

impl LinecountOrchestrator {
    /// Open the frame source and display, and load the startup parameters
    pub fn new(config: LinecountConfig) -> Result<Self> {
        let source = source::from_config(&config.source)?;
        let display = Display::from_config(&config.display);
        let session = Session::from_config(&config);
        let frame_loop = FrameLoop::new(source, display, InputQueue::new(), session);

        Ok(Self {
            config,
            frame_loop: Some(frame_loop),
            inputs: InputSources::none(),
            final_count: None,
            component_states: Arc::new(Mutex::new(HashMap::new())),
            cancellation_token: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &LinecountConfig {
        &self.config
    }

    /// Token that stops the frame loop when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Count at the moment the frame loop ended
    pub fn final_count(&self) -> Option<u64> {
        self.final_count
    }
}
