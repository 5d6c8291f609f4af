use super::state::{FRAME_LOOP, INPUT};
use super::{ComponentState, LinecountOrchestrator};
use crate::error::{LinecountError, Result};
use crate::input::InputSources;
use tracing::info;

impl LinecountOrchestrator {
    /// Register the components that have a lifecycle
    pub async fn initialize(&mut self) -> Result<()> {
        info!("Initializing line counter components");

        self.transition(FRAME_LOOP, ComponentState::Stopped).await;
        if self.input_enabled() {
            self.transition(INPUT, ComponentState::Stopped).await;
        }

        info!("All components initialized successfully");
        Ok(())
    }

    /// Start the input sources feeding the frame loop's queue
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting line counter");

        let frame_loop = self
            .frame_loop
            .as_ref()
            .ok_or_else(|| LinecountError::system("Frame loop already consumed"))?;

        if self.input_enabled() {
            self.transition(INPUT, ComponentState::Starting).await;
            self.inputs = InputSources::start(&self.config.input, frame_loop.queue());
            self.transition(INPUT, ComponentState::Running).await;
        }

        info!("Line counter started successfully");
        Ok(())
    }
}
