use crate::analyzer::{DetectedRegion, MotionOutline, RegionVerdict};
use crate::frame::FrameData;
use std::time::{Duration, Instant};

/// Everything the display needs to draw one iteration
#[derive(Debug, Clone)]
pub struct RenderFrame {
    /// Full-resolution source frame
    pub frame: FrameData,
    /// Raw blob borders, drawn so thresholds can be tuned by eye
    pub outlines: Vec<MotionOutline>,
    pub regions: Vec<AnnotatedRegion>,
    /// Counting line row in full-resolution coordinates
    pub counting_line: i64,
    pub count: u64,
    pub panel: PanelState,
    pub status: Option<StatusToast>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotatedRegion {
    pub region: DetectedRegion,
    pub verdict: RegionVerdict,
}

/// One parameter line in the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub name: String,
    /// Value already formatted for display
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelState {
    pub rows: Vec<PanelRow>,
    pub editing: bool,
}

impl PanelState {
    pub const HELP_LINES: [&'static str; 2] = [
        "Params (up/down: select, right: edit/apply)",
        "Edit: up/+  down/-   S:Save  L:Load  R:Reset  Q:Quit",
    ];

    /// Text for a row, with the editing marker on the selected row
    pub fn row_label(&self, row: &PanelRow) -> String {
        if row.selected && self.editing {
            format!("{}: {}  [EDITING]", row.name, row.value)
        } else {
            format!("{}: {}", row.name, row.value)
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.rows.iter().position(|row| row.selected)
    }
}

/// Transient operator message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusToast {
    pub text: String,
    pub expires_at: Instant,
}

impl StatusToast {
    pub fn new<S: Into<String>>(text: S, now: Instant, duration: Duration) -> Self {
        Self {
            text: text.into(),
            expires_at: now + duration,
        }
    }

    /// Shown up to and including the expiry instant
    pub fn is_visible(&self, now: Instant) -> bool {
        !self.text.is_empty() && now <= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(editing: bool) -> PanelState {
        PanelState {
            rows: vec![
                PanelRow {
                    name: "countingline".to_string(),
                    value: "620".to_string(),
                    selected: false,
                },
                PanelRow {
                    name: "multiplier".to_string(),
                    value: "1.50".to_string(),
                    selected: true,
                },
            ],
            editing,
        }
    }

    #[test]
    fn test_editing_marker_only_on_selected_row() {
        let panel = panel(true);
        assert_eq!(panel.row_label(&panel.rows[0]), "countingline: 620");
        assert_eq!(panel.row_label(&panel.rows[1]), "multiplier: 1.50  [EDITING]");
        assert_eq!(panel.selected_index(), Some(1));
    }

    #[test]
    fn test_browsing_has_no_marker() {
        let panel = panel(false);
        assert_eq!(panel.row_label(&panel.rows[1]), "multiplier: 1.50");
    }

    #[test]
    fn test_toast_expiry() {
        let now = Instant::now();
        let toast = StatusToast::new("Saved", now, Duration::from_millis(1200));
        assert!(toast.is_visible(now));
        assert!(toast.is_visible(now + Duration::from_millis(1200)));
        assert!(!toast.is_visible(now + Duration::from_millis(1201)));
    }
}
