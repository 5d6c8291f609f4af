use super::{ComponentState, LinecountOrchestrator};
use std::collections::HashMap;
use tracing::debug;

/// The frame loop, from `run` until shutdown
pub const FRAME_LOOP: &str = "frame_loop";
/// Keyboard and button sources, when any are enabled
pub const INPUT: &str = "input";

impl LinecountOrchestrator {
    pub(super) async fn transition(&self, component: &'static str, state: ComponentState) {
        let previous = self
            .component_states
            .lock()
            .await
            .insert(component, state.clone());
        debug!("{}: {:?} -> {:?}", component, previous, state);
    }

    pub async fn component_state(&self, component: &str) -> Option<ComponentState> {
        self.component_states.lock().await.get(component).cloned()
    }

    pub async fn component_states(&self) -> HashMap<&'static str, ComponentState> {
        self.component_states.lock().await.clone()
    }

    pub(super) fn input_enabled(&self) -> bool {
        self.config.input.keyboard || self.config.input.buttons
    }
}
