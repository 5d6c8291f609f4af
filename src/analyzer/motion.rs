use super::region::{DetectedRegion, MotionOutline, MotionResult};
use crate::error::{AnalyzerError, Result};
use crate::frame::FrameData;
use crate::params::Thresholds;

use image::{GrayImage, Luma};
use imageproc::{
    contours::{find_contours, BorderType},
    distance_transform::Norm,
    map::map_colors,
    morphology::dilate,
};
use tracing::debug;

/// Number of 3x3 dilation passes applied to the foreground mask
const DILATE_ITERATIONS: u32 = 2;

/// Apply the contrast/brightness adjustment and convert to grayscale.
///
/// Each channel becomes `clamp(round(v * multiplier + scalar), 0, 255)`; the
/// adjusted channels are then weighted 0.299/0.587/0.114.
pub fn preprocess(frame: &FrameData, multiplier: f64, scalar: i64) -> Result<GrayImage> {
    if !frame.validate_size() {
        return Err(AnalyzerError::FrameProcessing {
            details: format!(
                "frame {} has {} bytes, expected {} for {}x{} RGB",
                frame.id,
                frame.data.len(),
                frame.expected_size(),
                frame.width,
                frame.height
            ),
        }
        .into());
    }

    let mut lut = [0u8; 256];
    for (v, out) in lut.iter_mut().enumerate() {
        *out = (v as f64 * multiplier + scalar as f64).round().clamp(0.0, 255.0) as u8;
    }

    let gray: Vec<u8> = frame
        .data
        .chunks_exact(3)
        .map(|rgb| {
            let r = lut[rgb[0] as usize] as f32;
            let g = lut[rgb[1] as usize] as f32;
            let b = lut[rgb[2] as usize] as f32;
            (0.299 * r + 0.587 * g + 0.114 * b).round().min(255.0) as u8
        })
        .collect();

    GrayImage::from_raw(frame.width, frame.height, gray).ok_or_else(|| {
        AnalyzerError::FrameProcessing {
            details: "Failed to create grayscale image from frame data".to_string(),
        }
        .into()
    })
}

/// Frame-differencing motion detector
#[derive(Debug, Clone)]
pub struct MotionDetector {
    dilate_iterations: u32,
}

impl MotionDetector {
    pub fn new() -> Self {
        Self {
            dilate_iterations: DILATE_ITERATIONS,
        }
    }

    /// Find moving regions between the previous and current grayscale frames.
    ///
    /// Only pixels that got brighter count as motion. Regions are returned in
    /// contour discovery order, which callers must not rely on.
    pub fn detect(
        &self,
        current: &GrayImage,
        previous: &GrayImage,
        thresholds: &Thresholds,
    ) -> Result<Vec<DetectedRegion>> {
        Ok(self.analyze(current, previous, thresholds)?.regions)
    }

    /// Like `detect`, but also keeps the raw blob outlines for the preview
    pub fn analyze(
        &self,
        current: &GrayImage,
        previous: &GrayImage,
        thresholds: &Thresholds,
    ) -> Result<MotionResult> {
        if current.dimensions() != previous.dimensions() {
            return Err(AnalyzerError::DimensionMismatch {
                current: current.dimensions(),
                previous: previous.dimensions(),
            }
            .into());
        }

        let diff = frame_difference(current, previous);
        let mask = binarize(&diff, thresholds.min_brightness);
        let mask = self.dilate_mask(mask);
        let outlines = outer_outlines(&mask);
        let regions = filter_regions(&outlines, thresholds.min_box_size);

        debug!(
            "Motion detection found {} blobs, {} above {} px",
            outlines.len(),
            regions.len(),
            thresholds.min_box_size
        );
        Ok(MotionResult { outlines, regions })
    }

    fn dilate_mask(&self, mut mask: GrayImage) -> GrayImage {
        for _ in 0..self.dilate_iterations {
            mask = dilate(&mask, Norm::LInf, 1);
        }
        mask
    }
}

impl Default for MotionDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-pixel `current - previous`, saturating at zero
pub(crate) fn frame_difference(current: &GrayImage, previous: &GrayImage) -> GrayImage {
    GrayImage::from_fn(current.width(), current.height(), |x, y| {
        let c = current.get_pixel(x, y)[0];
        let p = previous.get_pixel(x, y)[0];
        Luma([c.saturating_sub(p)])
    })
}

/// Foreground where the difference is at least `min_brightness`
pub(crate) fn binarize(diff: &GrayImage, min_brightness: u8) -> GrayImage {
    map_colors(diff, |p| {
        if p[0] >= min_brightness {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Borders of the outermost foreground contours
pub(crate) fn outer_outlines(mask: &GrayImage) -> Vec<MotionOutline> {
    find_contours::<u32>(mask)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .map(|contour| MotionOutline {
            points: contour.points.iter().map(|p| (p.x, p.y)).collect(),
        })
        .collect()
}

/// Bounding boxes of outlines whose area exceeds `min_box_size`
pub(crate) fn filter_regions(outlines: &[MotionOutline], min_box_size: u64) -> Vec<DetectedRegion> {
    outlines
        .iter()
        .filter_map(MotionOutline::bounding_box)
        .filter(|bbox| bbox.area() > min_box_size)
        .map(DetectedRegion::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::BoundingBox;
    use image::{Rgb, RgbImage};
    use std::time::SystemTime;

    fn thresholds(min_brightness: u8, min_box_size: u64) -> Thresholds {
        Thresholds {
            min_brightness,
            min_box_size,
            ..Thresholds::default()
        }
    }

    fn gray_with_rects(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> GrayImage {
        let mut image = GrayImage::from_pixel(width, height, Luma([20]));
        for &(x, y, w, h) in rects {
            for py in y..y + h {
                for px in x..x + w {
                    image.put_pixel(px, py, Luma([220]));
                }
            }
        }
        image
    }

    #[test]
    fn test_preprocess_clamps_instead_of_wrapping() {
        let mut image = RgbImage::new(3, 1);
        image.put_pixel(0, 0, Rgb([10, 10, 10]));
        image.put_pixel(1, 0, Rgb([200, 200, 200]));
        image.put_pixel(2, 0, Rgb([100, 100, 100]));
        let frame = FrameData::from_rgb_image(0, SystemTime::now(), image);

        let gray = preprocess(&frame, 1.5, -30).unwrap();
        // 10*1.5-30 < 0 clamps to 0, 200*1.5-30 > 255 clamps to 255
        assert_eq!(gray.get_pixel(0, 0)[0], 0);
        assert_eq!(gray.get_pixel(1, 0)[0], 255);
        assert_eq!(gray.get_pixel(2, 0)[0], 120);
    }

    #[test]
    fn test_preprocess_grayscale_weights() {
        let image = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        let frame = FrameData::from_rgb_image(0, SystemTime::now(), image);
        let gray = preprocess(&frame, 1.0, 0).unwrap();
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
    }

    #[test]
    fn test_preprocess_rejects_short_buffer() {
        let frame = FrameData::new(3, SystemTime::now(), vec![0; 5], 2, 2);
        assert!(preprocess(&frame, 1.0, 0).is_err());
    }

    #[test]
    fn test_difference_only_counts_brightening() {
        let previous = GrayImage::from_pixel(2, 1, Luma([100]));
        let mut current = GrayImage::from_pixel(2, 1, Luma([100]));
        current.put_pixel(0, 0, Luma([160]));
        current.put_pixel(1, 0, Luma([40]));

        let diff = frame_difference(&current, &previous);
        assert_eq!(diff.get_pixel(0, 0)[0], 60);
        assert_eq!(diff.get_pixel(1, 0)[0], 0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut diff = GrayImage::new(3, 1);
        diff.put_pixel(0, 0, Luma([29]));
        diff.put_pixel(1, 0, Luma([30]));
        diff.put_pixel(2, 0, Luma([31]));

        let mask = binarize(&diff, 30);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(1, 0)[0], 255);
        assert_eq!(mask.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_identical_frames_have_no_motion() {
        let detector = MotionDetector::new();
        let frame = gray_with_rects(64, 48, &[(10, 10, 8, 8)]);
        let regions = detector.detect(&frame, &frame, &thresholds(30, 0)).unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn test_single_region_box_includes_dilation() {
        let detector = MotionDetector::new();
        let previous = gray_with_rects(64, 48, &[]);
        let current = gray_with_rects(64, 48, &[(20, 10, 10, 6)]);

        let regions = detector
            .detect(&current, &previous, &thresholds(30, 0))
            .unwrap();

        assert_eq!(regions.len(), 1);
        // Two 3x3 dilations grow the box by two pixels on every side
        assert_eq!(regions[0].bounding_box, BoundingBox::new(18, 8, 14, 10));
        assert_eq!(regions[0].centroid_x, 25);
    }

    #[test]
    fn test_nearby_fragments_merge() {
        let detector = MotionDetector::new();
        let previous = gray_with_rects(64, 48, &[]);
        // Gap of three pixels closes under two dilation passes
        let current = gray_with_rects(64, 48, &[(10, 10, 5, 5), (18, 10, 5, 5)]);

        let regions = detector
            .detect(&current, &previous, &thresholds(30, 0))
            .unwrap();
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn test_small_regions_filtered_by_area() {
        let detector = MotionDetector::new();
        let previous = gray_with_rects(64, 48, &[]);
        let current = gray_with_rects(64, 48, &[(5, 5, 2, 2), (30, 20, 12, 12)]);

        // 2x2 grows to 6x6 = 36 px, 12x12 grows to 16x16 = 256 px
        let regions = detector
            .detect(&current, &previous, &thresholds(30, 36))
            .unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounding_box.area(), 256);
    }

    #[test]
    fn test_region_with_hole_reported_once() {
        let detector = MotionDetector::new();
        let previous = gray_with_rects(80, 80, &[]);
        // A ring with a wide interior; the hole survives dilation
        let current = gray_with_rects(
            80,
            80,
            &[(10, 10, 40, 3), (10, 47, 40, 3), (10, 10, 3, 40), (47, 10, 3, 40)],
        );

        let regions = detector
            .detect(&current, &previous, &thresholds(30, 0))
            .unwrap();
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn test_outlines_keep_blobs_below_area_filter() {
        let detector = MotionDetector::new();
        let previous = gray_with_rects(64, 48, &[]);
        let current = gray_with_rects(64, 48, &[(5, 5, 2, 2), (30, 20, 12, 12)]);

        let result = detector
            .analyze(&current, &previous, &thresholds(30, 36))
            .unwrap();
        assert_eq!(result.outlines.len(), 2);
        assert_eq!(result.regions.len(), 1);

        let mut boxes: Vec<BoundingBox> = result
            .outlines
            .iter()
            .filter_map(MotionOutline::bounding_box)
            .collect();
        boxes.sort_by_key(|b| b.x);
        assert_eq!(boxes[0], BoundingBox::new(3, 3, 6, 6));
    }

    #[test]
    fn test_dimension_mismatch() {
        let detector = MotionDetector::new();
        let a = GrayImage::new(10, 10);
        let b = GrayImage::new(12, 10);
        assert!(detector.detect(&a, &b, &Thresholds::default()).is_err());
    }
}
