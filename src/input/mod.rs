mod button;
#[cfg(all(target_os = "linux", feature = "buttons"))]
mod evdev_buttons;
mod keyboard;
mod queue;
mod types;

pub use button::{ButtonDispatcher, Debouncer};
#[cfg(all(target_os = "linux", feature = "buttons"))]
pub use evdev_buttons::ButtonInputHandler;
pub use keyboard::{map_key, KeyboardInputHandler};
pub use queue::{InputQueue, InputSender};
pub use types::{Button, VirtualEvent};

use crate::config::InputConfig;
use tracing::{info, warn};

/// Every asynchronous input source feeding the shared queue
pub struct InputSources {
    keyboard: Option<KeyboardInputHandler>,
    #[cfg(all(target_os = "linux", feature = "buttons"))]
    buttons: Option<ButtonInputHandler>,
}

impl InputSources {
    /// Start the sources enabled in the configuration.
    ///
    /// A source that fails to start is logged and left out; the loop still
    /// runs with whatever input remains.
    pub fn start(config: &InputConfig, queue: &InputQueue) -> Self {
        let keyboard = if config.keyboard {
            let mut handler = KeyboardInputHandler::new(queue.sender());
            match handler.start() {
                Ok(()) => Some(handler),
                Err(e) => {
                    warn!("Keyboard input unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        #[cfg(all(target_os = "linux", feature = "buttons"))]
        let buttons = if config.buttons {
            let mut handler = ButtonInputHandler::new(config, queue.sender());
            match handler.start() {
                Ok(()) => Some(handler),
                Err(e) => {
                    warn!("Button input unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        #[cfg(not(all(target_os = "linux", feature = "buttons")))]
        if config.buttons {
            warn!("{}", crate::error::InputError::NotAvailable);
        }

        Self {
            keyboard,
            #[cfg(all(target_os = "linux", feature = "buttons"))]
            buttons,
        }
    }

    /// No sources at all; used by tests and headless runs
    pub fn none() -> Self {
        Self {
            keyboard: None,
            #[cfg(all(target_os = "linux", feature = "buttons"))]
            buttons: None,
        }
    }

    /// Release every source. Individual failures are logged and ignored.
    pub async fn stop(&mut self) {
        if let Some(mut keyboard) = self.keyboard.take() {
            if let Err(e) = keyboard.stop().await {
                warn!("Error stopping keyboard input: {}", e);
            }
        }

        #[cfg(all(target_os = "linux", feature = "buttons"))]
        if let Some(mut buttons) = self.buttons.take() {
            if let Err(e) = buttons.stop().await {
                warn!("Error stopping button input: {}", e);
            }
        }

        info!("Input sources released");
    }
}
