mod frame_loop;
mod orchestrator;
mod runtime;
mod session;
mod shutdown;
mod startup;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use frame_loop::FrameLoop;
pub use orchestrator::LinecountOrchestrator;
pub use session::Session;
pub use types::{ComponentState, LoopControl, ShutdownReason};
