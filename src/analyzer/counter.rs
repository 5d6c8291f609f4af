use super::region::DetectedRegion;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Outcome of offering one region to the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionVerdict {
    /// Crossed the line and was counted this frame
    Counted,
    /// Near a position counted in this or the previous frame
    Duplicate,
    /// Bottom edge has not reached the counting line
    AboveLine,
}

/// Horizontal positions counted in the current and previous frame
#[derive(Debug, Clone, Default)]
pub struct PositionMemory {
    current_gen: Vec<i64>,
    past_gen: Vec<i64>,
}

impl PositionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `centroid_x` is within `delta` of any remembered position
    pub fn is_duplicate(&self, centroid_x: i64, delta: i64) -> bool {
        self.current_gen
            .iter()
            .chain(self.past_gen.iter())
            .any(|&v| (centroid_x - v).abs() <= delta)
    }

    pub fn record(&mut self, centroid_x: i64) {
        self.current_gen.push(centroid_x);
    }

    /// Current generation becomes the past one; older positions are forgotten
    pub fn rollover(&mut self) {
        self.past_gen = std::mem::take(&mut self.current_gen);
    }

    pub fn current(&self) -> &[i64] {
        &self.current_gen
    }

    pub fn past(&self) -> &[i64] {
        &self.past_gen
    }
}

/// Counts regions whose bottom edge passes the counting line
#[derive(Debug, Clone, Default)]
pub struct LineCounter {
    count: u64,
    memory: PositionMemory,
}

impl LineCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn memory(&self) -> &PositionMemory {
        &self.memory
    }

    /// Offer one frame's regions, in order, and return a verdict for each.
    ///
    /// A region counted earlier in the same frame suppresses later regions
    /// near the same position.
    pub fn process(
        &mut self,
        regions: &[DetectedRegion],
        counting_line: i64,
        delta: i64,
    ) -> Vec<RegionVerdict> {
        regions
            .iter()
            .map(|region| self.offer(region, counting_line, delta))
            .collect()
    }

    fn offer(&mut self, region: &DetectedRegion, counting_line: i64, delta: i64) -> RegionVerdict {
        if self.memory.is_duplicate(region.centroid_x, delta) {
            return RegionVerdict::Duplicate;
        }
        if region.bounding_box.bottom() <= counting_line {
            return RegionVerdict::AboveLine;
        }

        self.count += 1;
        self.memory.record(region.centroid_x);
        debug!(
            "Counted region at x={} (bottom {}), total {}",
            region.centroid_x,
            region.bounding_box.bottom(),
            self.count
        );
        RegionVerdict::Counted
    }

    /// Close the frame; must be called once per frame after `process`
    pub fn end_frame(&mut self) {
        self.memory.rollover();
    }

    /// Zero the count. Remembered positions are kept.
    pub fn reset(&mut self) {
        info!("Counter reset from {}", self.count);
        self.count = 0;
    }
}
