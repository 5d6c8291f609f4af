use crate::input::Button;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LinecountConfig {
    pub source: SourceConfig,
    pub display: DisplayConfig,
    pub input: InputConfig,
    pub params: ParamsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Replay image files from a directory in name order
    Directory,
    /// Generated falling-box scene, for bench checks without a camera
    Synthetic,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceConfig {
    /// Which frame source to use
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,

    /// Directory of frames for the directory source
    #[serde(default = "default_source_path")]
    pub path: String,

    /// Frames per second the source is paced at
    #[serde(default = "default_source_fps")]
    pub fps: u32,

    /// Restart from the first frame when the directory is exhausted
    #[serde(default = "default_loop_playback")]
    pub loop_playback: bool,

    /// Frame resolution (width, height) for generated frames
    #[serde(default = "default_source_resolution")]
    pub resolution: (u32, u32),
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Framebuffer,
    Snapshot,
    None,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Where rendered previews go
    #[serde(default = "default_sink_kind")]
    pub sink: SinkKind,

    /// Preview resolution (width, height) the overlay is drawn at
    #[serde(default = "default_preview_resolution")]
    pub preview_resolution: (u32, u32),

    /// Framebuffer device path
    #[serde(default = "default_framebuffer_device")]
    pub framebuffer_device: String,

    /// Path the snapshot sink writes the latest preview to
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Write a snapshot every N frames
    #[serde(default = "default_snapshot_every")]
    pub snapshot_every: u64,

    /// TrueType font for overlay text
    #[serde(default = "default_font_path")]
    pub font_path: String,

    /// How long save/load status messages stay on screen
    #[serde(default = "default_status_seconds")]
    pub status_seconds: f64,
}

/// Linux key codes reported by the button device for each panel button
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ButtonKeys {
    pub up: u16,
    pub down: u16,
    pub edit: u16,
    pub save: u16,
    pub load: u16,
    pub reset: u16,
}

impl ButtonKeys {
    pub fn code_for(&self, button: Button) -> u16 {
        match button {
            Button::Up => self.up,
            Button::Down => self.down,
            Button::Edit => self.edit,
            Button::Save => self.save,
            Button::Load => self.load,
            Button::Reset => self.reset,
        }
    }

    pub fn keymap(&self) -> Vec<(Button, u16)> {
        Button::ALL
            .iter()
            .map(|&button| (button, self.code_for(button)))
            .collect()
    }
}

impl Default for ButtonKeys {
    fn default() -> Self {
        // KEY_UP, KEY_DOWN, KEY_ENTER, KEY_S, KEY_L, KEY_R
        Self {
            up: 103,
            down: 108,
            edit: 28,
            save: 31,
            load: 38,
            reset: 19,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InputConfig {
    /// Read key presses from the controlling terminal
    #[serde(default = "default_keyboard")]
    pub keyboard: bool,

    /// Read physical buttons from an evdev device
    #[serde(default = "default_buttons")]
    pub buttons: bool,

    /// Button input device path
    #[serde(default = "default_button_device")]
    pub button_device: String,

    /// Key codes of the six buttons
    #[serde(default)]
    pub button_keys: ButtonKeys,

    /// Debounce window for the up/down buttons in milliseconds
    #[serde(default = "default_debounce_nav_ms")]
    pub debounce_nav_ms: u64,

    /// Debounce window for the other buttons in milliseconds
    #[serde(default = "default_debounce_action_ms")]
    pub debounce_action_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ParamsConfig {
    /// Persisted parameter document
    #[serde(default = "default_params_path")]
    pub path: String,

    /// Load the document at startup
    #[serde(default = "default_autoload")]
    pub autoload: bool,
}

impl LinecountConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("linecount.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let keys = ButtonKeys::default();
        let settings = Config::builder()
            .set_default("source.kind", "synthetic")?
            .set_default("source.path", default_source_path())?
            .set_default("source.fps", default_source_fps())?
            .set_default("source.loop_playback", default_loop_playback())?
            .set_default(
                "source.resolution",
                vec![default_source_resolution().0, default_source_resolution().1],
            )?
            .set_default("display.sink", "none")?
            .set_default(
                "display.preview_resolution",
                vec![
                    default_preview_resolution().0,
                    default_preview_resolution().1,
                ],
            )?
            .set_default("display.framebuffer_device", default_framebuffer_device())?
            .set_default("display.snapshot_path", default_snapshot_path())?
            .set_default("display.snapshot_every", default_snapshot_every())?
            .set_default("display.font_path", default_font_path())?
            .set_default("display.status_seconds", default_status_seconds())?
            .set_default("input.keyboard", default_keyboard())?
            .set_default("input.buttons", default_buttons())?
            .set_default("input.button_device", default_button_device())?
            .set_default("input.button_keys.up", keys.up as i64)?
            .set_default("input.button_keys.down", keys.down as i64)?
            .set_default("input.button_keys.edit", keys.edit as i64)?
            .set_default("input.button_keys.save", keys.save as i64)?
            .set_default("input.button_keys.load", keys.load as i64)?
            .set_default("input.button_keys.reset", keys.reset as i64)?
            .set_default("input.debounce_nav_ms", default_debounce_nav_ms())?
            .set_default("input.debounce_action_ms", default_debounce_action_ms())?
            .set_default("params.path", default_params_path())?
            .set_default("params.autoload", default_autoload())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Environment overrides, e.g. LINECOUNT_SOURCE__FPS=10
            .add_source(
                Environment::with_prefix("LINECOUNT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: LinecountConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.fps == 0 {
            return Err(ConfigError::Message(
                "Source fps must be greater than 0".to_string(),
            ));
        }

        if self.source.resolution.0 == 0 || self.source.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Source resolution must be greater than 0".to_string(),
            ));
        }

        if self.source.kind == SourceKind::Directory && self.source.path.is_empty() {
            return Err(ConfigError::Message(
                "Directory source requires source.path".to_string(),
            ));
        }

        if self.display.preview_resolution.0 == 0 || self.display.preview_resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Preview resolution must be greater than 0".to_string(),
            ));
        }

        if self.display.snapshot_every == 0 {
            return Err(ConfigError::Message(
                "Snapshot interval must be greater than 0".to_string(),
            ));
        }

        if !(self.display.status_seconds >= 0.0 && self.display.status_seconds.is_finite()) {
            return Err(ConfigError::Message(
                "Status duration must be a non-negative number of seconds".to_string(),
            ));
        }

        let keymap = self.input.button_keys.keymap();
        for (i, (button, code)) in keymap.iter().enumerate() {
            if keymap[..i].iter().any(|(_, other)| other == code) {
                return Err(ConfigError::Message(format!(
                    "Button key code {} assigned to {:?} is already used",
                    code, button
                )));
            }
        }

        if self.params.path.is_empty() {
            return Err(ConfigError::Message(
                "Parameter document path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for LinecountConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                kind: default_source_kind(),
                path: default_source_path(),
                fps: default_source_fps(),
                loop_playback: default_loop_playback(),
                resolution: default_source_resolution(),
            },
            display: DisplayConfig {
                sink: default_sink_kind(),
                preview_resolution: default_preview_resolution(),
                framebuffer_device: default_framebuffer_device(),
                snapshot_path: default_snapshot_path(),
                snapshot_every: default_snapshot_every(),
                font_path: default_font_path(),
                status_seconds: default_status_seconds(),
            },
            input: InputConfig {
                keyboard: default_keyboard(),
                buttons: default_buttons(),
                button_device: default_button_device(),
                button_keys: ButtonKeys::default(),
                debounce_nav_ms: default_debounce_nav_ms(),
                debounce_action_ms: default_debounce_action_ms(),
            },
            params: ParamsConfig {
                path: default_params_path(),
                autoload: default_autoload(),
            },
        }
    }
}

// Default value functions
fn default_source_kind() -> SourceKind {
    SourceKind::Synthetic
}
fn default_source_path() -> String {
    "./frames".to_string()
}
fn default_source_fps() -> u32 {
    15
}
fn default_loop_playback() -> bool {
    false
}
fn default_source_resolution() -> (u32, u32) {
    (1280, 720)
}

fn default_sink_kind() -> SinkKind {
    SinkKind::None
}
fn default_preview_resolution() -> (u32, u32) {
    (960, 540)
}
fn default_framebuffer_device() -> String {
    "/dev/fb0".to_string()
}
fn default_snapshot_path() -> String {
    "./preview.jpg".to_string()
}
fn default_snapshot_every() -> u64 {
    15
}
fn default_font_path() -> String {
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string()
}
fn default_status_seconds() -> f64 {
    1.2
}

fn default_keyboard() -> bool {
    true
}
fn default_buttons() -> bool {
    false
}
fn default_button_device() -> String {
    "/dev/input/by-path/platform-gpio-keys-event".to_string()
}
fn default_debounce_nav_ms() -> u64 {
    30
}
fn default_debounce_action_ms() -> u64 {
    50
}

fn default_params_path() -> String {
    "params.json".to_string()
}
fn default_autoload() -> bool {
    true
}
