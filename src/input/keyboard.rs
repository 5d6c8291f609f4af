use super::queue::InputSender;
use super::types::VirtualEvent;
use crate::error::{InputError, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::IsTerminal;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Map a terminal key to a virtual event
pub fn map_key(code: KeyCode) -> Option<VirtualEvent> {
    match code {
        KeyCode::Up => Some(VirtualEvent::NavUp),
        KeyCode::Down => Some(VirtualEvent::NavDown),
        KeyCode::Right | KeyCode::Enter => Some(VirtualEvent::ToggleEdit),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(VirtualEvent::Save),
        KeyCode::Char('l') | KeyCode::Char('L') => Some(VirtualEvent::Load),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(VirtualEvent::Reset),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(VirtualEvent::Quit),
        _ => None,
    }
}

/// Keyboard input source reading the controlling terminal in raw mode
pub struct KeyboardInputHandler {
    sender: InputSender,
    cancellation_token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl KeyboardInputHandler {
    pub fn new(sender: InputSender) -> Self {
        Self {
            sender,
            cancellation_token: CancellationToken::new(),
            task: None,
        }
    }

    /// Start listening for key presses
    pub fn start(&mut self) -> Result<()> {
        if !std::io::stdin().is_terminal() {
            return Err(InputError::Terminal {
                details: "stdin is not a terminal".to_string(),
            }
            .into());
        }

        info!("Starting keyboard input: arrows navigate/edit, right toggles edit, s/l save/load, r resets, q quits");

        let sender = self.sender.clone();
        let cancellation_token = self.cancellation_token.clone();

        self.task = Some(task::spawn_blocking(move || {
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }

            debug!("Raw mode enabled - keyboard handler active");

            loop {
                if cancellation_token.is_cancelled() {
                    debug!("Keyboard input handler stopping");
                    break;
                }

                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let Ok(Event::Key(key_event)) = event::read() else {
                            continue;
                        };

                        // Only presses; terminals that report releases would double up
                        if key_event.kind != KeyEventKind::Press {
                            continue;
                        }

                        // Raw mode swallows SIGINT, so Ctrl+C arrives as a key
                        let mapped = if key_event.modifiers.contains(KeyModifiers::CONTROL)
                            && key_event.code == KeyCode::Char('c')
                        {
                            Some(VirtualEvent::Quit)
                        } else {
                            map_key(key_event.code)
                        };

                        match mapped {
                            Some(virtual_event) => {
                                if !sender.push(virtual_event) {
                                    break;
                                }
                            }
                            None => debug!("Unmapped key pressed: {:?}", key_event.code),
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Error polling for keyboard events: {}", e);
                    }
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            } else {
                debug!("Raw mode disabled");
            }

            debug!("Keyboard input handler task exited");
        }));

        Ok(())
    }

    /// Stop the keyboard handler and restore the terminal
    pub async fn stop(&mut self) -> Result<()> {
        info!("Stopping keyboard input handler");
        self.cancellation_token.cancel();

        if let Some(task) = self.task.take() {
            if tokio::time::timeout(Duration::from_millis(500), task)
                .await
                .is_err()
            {
                warn!("Keyboard input task did not exit in time");
            }
        }

        // The task may have bailed out before restoring the terminal
        let _ = disable_raw_mode();

        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}
