use super::queue::InputSender;
use super::types::{Button, VirtualEvent};
use crate::config::InputConfig;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Minimum spacing between accepted presses of one button
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    /// Accept a press at `now` unless it falls inside the window of the last accepted one
    pub fn accept(&mut self, now: Instant) -> bool {
        let accepted = match self.last_accepted {
            Some(last) => now.saturating_duration_since(last) >= self.window,
            None => true,
        };

        if accepted {
            self.last_accepted = Some(now);
        }
        accepted
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Turns raw key codes from the button device into debounced virtual events
pub struct ButtonDispatcher {
    keymap: HashMap<u16, Button>,
    debouncers: [Debouncer; 6],
    sender: InputSender,
}

impl ButtonDispatcher {
    pub fn new(config: &InputConfig, sender: InputSender) -> Self {
        let keymap = config
            .button_keys
            .keymap()
            .into_iter()
            .map(|(button, code)| (code, button))
            .collect();

        let nav = Duration::from_millis(config.debounce_nav_ms);
        let action = Duration::from_millis(config.debounce_action_ms);
        let debouncers = Button::ALL.map(|button| {
            Debouncer::new(if button.is_navigation() { nav } else { action })
        });

        Self {
            keymap,
            debouncers,
            sender,
        }
    }

    pub fn button_for(&self, code: u16) -> Option<Button> {
        self.keymap.get(&code).copied()
    }

    /// Handle a key press from the device. Returns the event if one was queued.
    pub fn press(&mut self, code: u16, now: Instant) -> Option<VirtualEvent> {
        let Some(button) = self.button_for(code) else {
            trace!("Ignoring unmapped button key code {}", code);
            return None;
        };

        if !self.debouncers[button.index()].accept(now) {
            debug!("Button {:?} press debounced", button);
            return None;
        }

        let event = button.event();
        self.sender.push(event).then_some(event)
    }
}
