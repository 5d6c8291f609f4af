pub mod analyzer;
pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod frame;
pub mod input;
pub mod params;
pub mod source;

pub use analyzer::{BoundingBox, DetectedRegion, LineCounter, MotionDetector, RegionVerdict};
pub use app::{FrameLoop, LinecountOrchestrator, LoopControl, Session, ShutdownReason};
pub use config::LinecountConfig;
pub use display::{Display, DisplaySink, OverlayRenderer, RenderFrame};
pub use error::{LinecountError, Result};
pub use frame::FrameData;
pub use input::{InputQueue, InputSender, VirtualEvent};
pub use params::{ParameterEditor, ParameterStore, Thresholds};
pub use source::FrameSource;
