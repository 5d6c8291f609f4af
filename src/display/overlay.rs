use super::contract::{PanelState, RenderFrame};
use crate::analyzer::RegionVerdict;
use crate::error::{DisplayError, Result};

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const HELP_GRAY: Rgb<u8> = Rgb([200, 200, 200]);
const LINE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const HIGHLIGHT: Rgb<u8> = Rgb([50, 125, 255]);
const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 255]);
/// Outline stroke width in full-resolution pixels
const OUTLINE_WIDTH: u32 = 3;

const PANEL_X: i32 = 20;
const PANEL_Y: i32 = 80;
const PANEL_WIDTH: u32 = 420;
const PANEL_PAD: i32 = 12;
const LINE_HEIGHT: i32 = 28;
/// Fraction of black blended over the panel background
const PANEL_SHADE: f32 = 0.35;

pub(crate) fn verdict_color(verdict: RegionVerdict) -> Rgb<u8> {
    match verdict {
        RegionVerdict::Counted => Rgb([0, 255, 0]),
        RegionVerdict::Duplicate => Rgb([255, 255, 0]),
        RegionVerdict::AboveLine => Rgb([0, 0, 255]),
    }
}

/// Draws the operator preview for a `RenderFrame`.
///
/// Text is skipped when no font could be loaded; boxes, the counting line and
/// the panel background are always drawn.
pub struct OverlayRenderer {
    preview: (u32, u32),
    font: Option<Font<'static>>,
}

impl OverlayRenderer {
    pub fn new<P: AsRef<Path>>(preview: (u32, u32), font_path: P) -> Self {
        let font = match load_font(font_path.as_ref()) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!("Overlay text disabled: {}", e);
                None
            }
        };
        Self { preview, font }
    }

    pub fn without_font(preview: (u32, u32)) -> Self {
        Self {
            preview,
            font: None,
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Preview row for a full-resolution counting line
    pub fn preview_line_row(&self, counting_line: i64, frame_height: u32) -> i64 {
        if frame_height == 0 {
            return 0;
        }
        counting_line * self.preview.1 as i64 / frame_height as i64
    }

    pub fn render(&self, render: &RenderFrame, now: Instant) -> Result<RgbImage> {
        let mut full = render
            .frame
            .to_rgb_image()
            .ok_or_else(|| DisplayError::FormatConversion {
                details: format!(
                    "frame {} is not a {}x{} RGB buffer",
                    render.frame.id, render.frame.width, render.frame.height
                ),
            })?;

        // Outlines and boxes go on the full frame so they scale with it
        for outline in &render.outlines {
            for &(x, y) in &outline.points {
                let half = (OUTLINE_WIDTH / 2) as i32;
                draw_filled_rect_mut(
                    &mut full,
                    Rect::at(x as i32 - half, y as i32 - half).of_size(OUTLINE_WIDTH, OUTLINE_WIDTH),
                    OUTLINE_COLOR,
                );
            }
        }

        for annotated in &render.regions {
            let bbox = annotated.region.bounding_box;
            let color = verdict_color(annotated.verdict);
            let outer = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
            draw_hollow_rect_mut(&mut full, outer, color);
            if bbox.width > 2 && bbox.height > 2 {
                let inner = Rect::at(bbox.x as i32 + 1, bbox.y as i32 + 1)
                    .of_size(bbox.width - 2, bbox.height - 2);
                draw_hollow_rect_mut(&mut full, inner, color);
            }
        }

        let (preview_w, preview_h) = self.preview;
        let mut preview = if full.dimensions() == self.preview {
            full
        } else {
            imageops::resize(&full, preview_w, preview_h, FilterType::Triangle)
        };

        let row = self.preview_line_row(render.counting_line, render.frame.height);
        if row >= 0 && row < preview_h as i64 {
            draw_filled_rect_mut(
                &mut preview,
                Rect::at(0, row as i32).of_size(preview_w, 2),
                LINE_COLOR,
            );
        }

        self.draw_text(&mut preview, &format!("Count: {}", render.count), 30, 20, 36.0, WHITE);
        let panel_bottom = self.draw_panel(&mut preview, &render.panel);

        if let Some(status) = render.status.as_ref().filter(|s| s.is_visible(now)) {
            self.draw_status(&mut preview, &status.text, panel_bottom + 16);
        }

        debug!(
            "Rendered frame {} with {} outlines and {} regions, line at preview row {}",
            render.frame.id,
            render.outlines.len(),
            render.regions.len(),
            row
        );
        Ok(preview)
    }

    /// Draw the parameter panel and return its bottom edge
    fn draw_panel(&self, image: &mut RgbImage, panel: &PanelState) -> i32 {
        let line_count = panel.rows.len() as i32 + PanelState::HELP_LINES.len() as i32;
        let panel_h = PANEL_PAD * 2 + LINE_HEIGHT * line_count;
        shade_rect(image, PANEL_X, PANEL_Y, PANEL_WIDTH, panel_h as u32);

        let mut y = PANEL_Y + PANEL_PAD;
        for (i, help) in PanelState::HELP_LINES.iter().enumerate() {
            let color = if i == 0 { WHITE } else { HELP_GRAY };
            self.draw_text(image, help, PANEL_X + 10, y, 17.0, color);
            y += LINE_HEIGHT;
        }

        for row in &panel.rows {
            let color = if row.selected {
                draw_filled_rect_mut(
                    image,
                    Rect::at(PANEL_X + 6, y - 4).of_size(PANEL_WIDTH - 12, LINE_HEIGHT as u32 - 2),
                    HIGHLIGHT,
                );
                BLACK
            } else {
                WHITE
            };
            self.draw_text(image, &panel.row_label(row), PANEL_X + 12, y, 20.0, color);
            y += LINE_HEIGHT;
        }

        PANEL_Y + panel_h
    }

    fn draw_status(&self, image: &mut RgbImage, text: &str, y: i32) {
        let x = PANEL_X + 10;
        let scale = Scale::uniform(22.0);
        let (text_w, text_h) = match &self.font {
            Some(font) => text_size(scale, font, text),
            None => (text.len() as i32 * 11, 22),
        };
        draw_filled_rect_mut(
            image,
            Rect::at(x - 10, y - 8).of_size((text_w + 20).max(1) as u32, (text_h + 16).max(1) as u32),
            BLACK,
        );
        self.draw_text(image, text, x, y, 22.0, WHITE);
    }

    fn draw_text(&self, image: &mut RgbImage, text: &str, x: i32, y: i32, size: f32, color: Rgb<u8>) {
        if let Some(font) = &self.font {
            draw_text_mut(image, color, x, y, Scale::uniform(size), font, text);
        }
    }
}

pub(crate) fn load_font(path: &Path) -> Result<Font<'static>> {
    let font_data = fs::read(path).map_err(|e| DisplayError::Font {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;

    Font::try_from_vec(font_data).ok_or_else(|| {
        DisplayError::Font {
            path: path.display().to_string(),
            details: "not a usable TrueType font".to_string(),
        }
        .into()
    })
}

/// Darken a rectangle, clipped to the image
fn shade_rect(image: &mut RgbImage, x: i32, y: i32, width: u32, height: u32) {
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = ((x + width as i32).max(0) as u32).min(image.width());
    let y1 = ((y + height as i32).max(0) as u32).min(image.height());

    for py in y0..y1 {
        for px in x0..x1 {
            let pixel = image.get_pixel_mut(px, py);
            for channel in pixel.0.iter_mut() {
                *channel = (*channel as f32 * (1.0 - PANEL_SHADE)).round() as u8;
            }
        }
    }
}
