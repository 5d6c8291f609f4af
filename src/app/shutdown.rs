use super::state::{FRAME_LOOP, INPUT};
use super::{ComponentState, LinecountOrchestrator, ShutdownReason};
use crate::error::Result;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

const INPUT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

impl LinecountOrchestrator {
    /// Release every component; input failures are logged and ignored
    pub async fn shutdown(&mut self, reason: &ShutdownReason) -> Result<i32> {
        info!("Beginning graceful shutdown");

        self.cancellation_token.cancel();
        let loop_state = match reason {
            ShutdownReason::Error(_) => ComponentState::Failed,
            _ => ComponentState::Stopped,
        };
        self.transition(FRAME_LOOP, loop_state).await;

        if self.component_state(INPUT).await.is_some() {
            self.transition(INPUT, ComponentState::Stopping).await;
            match timeout(INPUT_STOP_TIMEOUT, self.inputs.stop()).await {
                Ok(()) => self.transition(INPUT, ComponentState::Stopped).await,
                Err(_) => {
                    error!("input component stop timeout");
                    self.transition(INPUT, ComponentState::Failed).await;
                }
            }
        }

        if let Some(count) = self.final_count {
            info!("Final count: {}", count);
        }

        let exit_code = reason.exit_code();
        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }
}
