use super::button::ButtonDispatcher;
use super::queue::InputSender;
use crate::config::InputConfig;
use crate::error::{InputError, LinecountError, Result};
use evdev::{Device, EventType, InputEventKind};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Physical button source reading a `gpio-keys` style evdev device
pub struct ButtonInputHandler {
    pub(crate) device_path: String,
    config: InputConfig,
    sender: InputSender,
    cancellation_token: CancellationToken,
    task: Option<JoinHandle<()>>,
    max_retries: u32,
    retry_delay: Duration,
}

impl ButtonInputHandler {
    pub fn new(config: &InputConfig, sender: InputSender) -> Self {
        Self {
            device_path: config.button_device.clone(),
            config: config.clone(),
            sender,
            cancellation_token: CancellationToken::new(),
            task: None,
            max_retries: 5,
            retry_delay: Duration::from_secs(2),
        }
    }

    /// Start monitoring the button device
    pub fn start(&mut self) -> Result<()> {
        info!("Starting button input handler for device: {}", self.device_path);

        let device_path = self.device_path.clone();
        let mut dispatcher = ButtonDispatcher::new(&self.config, self.sender.clone());
        let cancellation_token = self.cancellation_token.clone();
        let max_retries = self.max_retries;
        let retry_delay = self.retry_delay;

        self.task = Some(tokio::spawn(async move {
            let mut retry_count = 0;

            loop {
                let outcome = tokio::select! {
                    _ = cancellation_token.cancelled() => break,
                    outcome = Self::monitor_button_device(&device_path, &mut dispatcher) => outcome,
                };

                match outcome {
                    Ok(()) => {
                        info!("Button device monitoring ended normally");
                        break;
                    }
                    Err(e) => {
                        error!("Button device error: {}", e);
                        retry_count += 1;

                        if retry_count >= max_retries {
                            error!(
                                "Button input handler failed after {} attempts, giving up",
                                max_retries
                            );
                            break;
                        }

                        let delay = retry_delay * 2_u32.pow(retry_count.min(5));
                        warn!(
                            "Retrying button device in {:?} (attempt {}/{})",
                            delay, retry_count, max_retries
                        );
                        tokio::select! {
                            _ = cancellation_token.cancelled() => break,
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                }
            }

            debug!("Button input task exited");
        }));

        Ok(())
    }

    /// Stop monitoring and release the device
    pub async fn stop(&mut self) -> Result<()> {
        info!("Stopping button input handler");
        self.cancellation_token.cancel();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                return Err(LinecountError::component(
                    "button_input".to_string(),
                    format!("Button task failed: {}", e),
                ));
            }
        }

        Ok(())
    }

    async fn monitor_button_device(
        device_path: &str,
        dispatcher: &mut ButtonDispatcher,
    ) -> Result<()> {
        let device = Device::open(device_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => InputError::DeviceNotFound(device_path.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                InputError::PermissionDenied(device_path.to_string())
            }
            _ => InputError::DeviceOpen {
                device: device_path.to_string(),
                details: e.to_string(),
            },
        })?;

        info!(
            "Button device opened: {} ({})",
            device_path,
            device.name().unwrap_or("Unknown")
        );

        if !device.supported_events().contains(EventType::KEY) {
            return Err(InputError::DeviceOpen {
                device: device_path.to_string(),
                details: "device does not report key events".to_string(),
            }
            .into());
        }

        let mut events = device.into_event_stream().map_err(|e| InputError::DeviceOpen {
            device: device_path.to_string(),
            details: e.to_string(),
        })?;

        loop {
            let event = events.next_event().await?;

            if let InputEventKind::Key(key) = event.kind() {
                // 1 = press, 0 = release, 2 = autorepeat
                if event.value() == 1 {
                    dispatcher.press(key.code(), Instant::now());
                }
            }
        }
    }
}
