mod counter;
mod motion;
mod region;

pub use counter::{LineCounter, PositionMemory, RegionVerdict};
pub use motion::{preprocess, MotionDetector};
pub use region::{BoundingBox, DetectedRegion, MotionOutline, MotionResult};
