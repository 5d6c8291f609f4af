use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Row just below the box (`y + h`)
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Integer horizontal midpoint (`x + w/2`)
    pub fn center_x(&self) -> i64 {
        self.x as i64 + (self.width / 2) as i64
    }
}

/// A moving region found in one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedRegion {
    pub bounding_box: BoundingBox,
    pub centroid_x: i64,
}

impl DetectedRegion {
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box,
            centroid_x: bounding_box.center_x(),
        }
    }
}

/// Border of one foreground blob, before the area filter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MotionOutline {
    pub points: Vec<(u32, u32)>,
}

impl MotionOutline {
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let (&(x0, y0), rest) = self.points.split_first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for &(x, y) in rest {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(BoundingBox::new(
            min_x,
            min_y,
            max_x - min_x + 1,
            max_y - min_y + 1,
        ))
    }
}

/// Everything one detection pass found
#[derive(Debug, Clone, Default)]
pub struct MotionResult {
    /// Every outer blob border, including those too small to count
    pub outlines: Vec<MotionOutline>,
    /// Bounding boxes that passed the area filter
    pub regions: Vec<DetectedRegion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_geometry() {
        let region = DetectedRegion::new(BoundingBox::new(10, 20, 7, 5));
        assert_eq!(region.centroid_x, 13);
        assert_eq!(region.bounding_box.area(), 35);
        assert_eq!(region.bounding_box.bottom(), 25);
    }

    #[test]
    fn test_outline_bounding_box() {
        let outline = MotionOutline {
            points: vec![(4, 9), (10, 3), (7, 12)],
        };
        assert_eq!(outline.bounding_box(), Some(BoundingBox::new(4, 3, 7, 10)));
        assert_eq!(MotionOutline::default().bounding_box(), None);
    }
}
