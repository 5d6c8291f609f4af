use super::state::FRAME_LOOP;
use super::{ComponentState, LinecountOrchestrator, ShutdownReason};
use crate::error::{LinecountError, Result};
use tokio::signal;
use tracing::{error, info, warn};

impl LinecountOrchestrator {
    /// Run the frame loop until it ends or a signal arrives, then shut down
    pub async fn run(&mut self) -> Result<i32> {
        info!("Line counter is running");

        let mut frame_loop = self
            .frame_loop
            .take()
            .ok_or_else(|| LinecountError::system("Frame loop already consumed"))?;

        self.setup_signal_handlers();
        self.transition(FRAME_LOOP, ComponentState::Running).await;

        // The loop blocks on frame pacing, so keep it off the async workers
        let token = self.cancellation_token.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let reason = frame_loop.run(&token);
            (reason, frame_loop.session().count())
        })
        .await;

        // A panicked loop still has input sources to release
        let reason = match joined {
            Ok((reason, count)) => {
                self.final_count = Some(count);
                reason
            }
            Err(e) => {
                error!("Frame loop task failed: {}", e);
                ShutdownReason::Error(format!("Frame loop task failed: {}", e))
            }
        };
        info!("Shutdown initiated: {:?}", reason);

        let exit_code = self.shutdown(&reason).await?;

        info!("Line counter shutdown complete");
        Ok(exit_code)
    }

    /// SIGINT and SIGTERM cancel the frame loop
    fn setup_signal_handlers(&self) {
        #[cfg(unix)]
        {
            let token = self.cancellation_token.clone();
            tokio::spawn(async move {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        tokio::select! {
                            _ = sigterm.recv() => {
                                info!("Received SIGTERM signal");
                                token.cancel();
                            }
                            _ = token.cancelled() => {}
                        }
                    }
                    Err(e) => warn!("Failed to register SIGTERM handler: {}", e),
                }
            });
        }

        let token = self.cancellation_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = signal::ctrl_c() => match result {
                    Ok(()) => {
                        info!("Received SIGINT signal (Ctrl+C)");
                        token.cancel();
                    }
                    Err(e) => warn!("Failed to listen for SIGINT: {}", e),
                },
                _ = token.cancelled() => {}
            }
        });
    }
}
