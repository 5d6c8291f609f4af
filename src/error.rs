use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinecountError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Frame source error: {0}")]
    Source(#[from] SourceError),

    #[error("Analyzer error: {0}")]
    Analyzer(#[from] AnalyzerError),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl LinecountError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Failures around the tunable parameter set and its persisted document.
///
/// None of these stop the frame loop; they end up as an operator status toast.
#[derive(Error, Debug)]
pub enum ParameterError {
    #[error("Parameter file I/O failed for {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed parameter document {path}: {details}")]
    ConfigParse { path: String, details: String },

    #[error("Parameter document {path} contained no matching parameters")]
    NoMatchingParameters { path: String },

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to open frame source {path}: {details}")]
    Open { path: String, details: String },

    #[error("Failed to decode frame {path}: {details}")]
    Decode { path: String, details: String },

    #[error("Frame size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Frame source exhausted")]
    EndOfStream,
}

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Frame processing failed: {details}")]
    FrameProcessing { details: String },

    #[error("Frame dimensions differ: current {current:?}, previous {previous:?}")]
    DimensionMismatch {
        current: (u32, u32),
        previous: (u32, u32),
    },
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Display device {device} unavailable: {details}")]
    Device { device: String, details: String },

    #[error("Display format conversion failed: {details}")]
    FormatConversion { details: String },

    #[error("Font loading failed for {path}: {details}")]
    Font { path: String, details: String },

    #[error("Failed to write display output: {details}")]
    Write { details: String },
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Terminal raw mode unavailable: {details}")]
    Terminal { details: String },

    #[error("Failed to open input device {device}: {details}")]
    DeviceOpen { device: String, details: String },

    #[error("Input device {0} not found")]
    DeviceNotFound(String),

    #[error("Permission denied for input device {0}")]
    PermissionDenied(String),

    #[error("Button input not available on this system")]
    NotAvailable,
}

pub type Result<T> = std::result::Result<T, LinecountError>;
