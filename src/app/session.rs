use super::types::LoopControl;
use crate::analyzer::{DetectedRegion, LineCounter};
use crate::config::LinecountConfig;
use crate::display::{AnnotatedRegion, PanelRow, PanelState, StatusToast};
use crate::error::ParameterError;
use crate::input::VirtualEvent;
use crate::params::{EditorMode, ParameterEditor, ParameterStore, Thresholds};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Mutable state owned by the frame loop
pub struct Session {
    store: ParameterStore,
    editor: ParameterEditor,
    counter: LineCounter,
    status: Option<StatusToast>,
    status_duration: Duration,
}

impl Session {
    pub fn new<P: AsRef<Path>>(
        store: ParameterStore,
        params_path: P,
        status_duration: Duration,
    ) -> Self {
        Self {
            store,
            editor: ParameterEditor::new(params_path),
            counter: LineCounter::new(),
            status: None,
            status_duration,
        }
    }

    pub fn from_config(config: &LinecountConfig) -> Self {
        let mut session = Self::new(
            ParameterStore::with_defaults(),
            &config.params.path,
            Duration::from_secs_f64(config.display.status_seconds),
        );
        if config.params.autoload {
            session.autoload();
        }
        session
    }

    /// Load the persisted document; defaults stay in place on any failure
    pub fn autoload(&mut self) -> bool {
        let path = self.editor.params_path().to_path_buf();
        match self.store.load_from(&path) {
            Ok(applied) => {
                info!("Startup params: {} values from {}", applied, path.display());
                true
            }
            Err(e) => {
                warn!("Using default params: {}", e);
                false
            }
        }
    }

    pub fn thresholds(&self) -> Result<Thresholds, ParameterError> {
        self.store.thresholds()
    }

    /// Apply drained events in arrival order. Stops at the first QUIT.
    pub fn handle_events<I>(&mut self, events: I, now: Instant) -> LoopControl
    where
        I: IntoIterator<Item = VirtualEvent>,
    {
        for event in events {
            if self.handle_event(event, now) == LoopControl::Quit {
                return LoopControl::Quit;
            }
        }
        LoopControl::Continue
    }

    pub fn handle_event(&mut self, event: VirtualEvent, now: Instant) -> LoopControl {
        match event {
            VirtualEvent::Reset => {
                self.counter.reset();
                LoopControl::Continue
            }
            VirtualEvent::Quit => {
                info!("Quit requested");
                LoopControl::Quit
            }
            other => {
                if let Some(text) = self.editor.apply(other, &mut self.store) {
                    self.status = Some(StatusToast::new(text, now, self.status_duration));
                }
                LoopControl::Continue
            }
        }
    }

    /// Run this frame's regions through the counter
    pub fn count_regions(
        &mut self,
        regions: &[DetectedRegion],
        thresholds: &Thresholds,
    ) -> Vec<AnnotatedRegion> {
        let verdicts = self
            .counter
            .process(regions, thresholds.counting_line, thresholds.delta);

        regions
            .iter()
            .zip(verdicts)
            .map(|(region, verdict)| AnnotatedRegion {
                region: *region,
                verdict,
            })
            .collect()
    }

    pub fn end_frame(&mut self) {
        self.counter.end_frame();
    }

    pub fn panel_state(&self) -> PanelState {
        let selected = self.editor.state().selected_index;
        PanelState {
            rows: self
                .store
                .iter()
                .enumerate()
                .map(|(i, param)| PanelRow {
                    name: param.name().to_string(),
                    value: param.value().to_string(),
                    selected: i == selected,
                })
                .collect(),
            editing: self.editor.mode() == EditorMode::Editing,
        }
    }

    /// Status message still on screen at `now`
    pub fn status(&self, now: Instant) -> Option<&StatusToast> {
        self.status.as_ref().filter(|status| status.is_visible(now))
    }

    pub fn count(&self) -> u64 {
        self.counter.count()
    }

    pub fn counter(&self) -> &LineCounter {
        &self.counter
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn editor(&self) -> &ParameterEditor {
        &self.editor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::BoundingBox;
    use crate::params::{COUNTING_LINE, MULTIPLIER};
    use tempfile::TempDir;

    fn session_in(dir: &TempDir) -> Session {
        Session::new(
            ParameterStore::with_defaults(),
            dir.path().join("params.json"),
            Duration::from_millis(1200),
        )
    }

    fn crossing_region() -> DetectedRegion {
        DetectedRegion::new(BoundingBox::new(90, 600, 20, 40))
    }

    #[test]
    fn test_autoload_missing_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        assert!(!session.autoload());
        assert_eq!(session.thresholds().unwrap(), Thresholds::default());
    }

    #[test]
    fn test_autoload_applies_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("params.json"), r#"{"countingline": 300}"#).unwrap();

        let mut session = session_in(&dir);
        assert!(session.autoload());
        assert_eq!(session.thresholds().unwrap().counting_line, 300);
    }

    #[test]
    fn test_reset_zeroes_counter_while_editing() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let thresholds = session.thresholds().unwrap();
        session.count_regions(&[crossing_region()], &thresholds);
        assert_eq!(session.count(), 1);

        let now = Instant::now();
        session.handle_event(VirtualEvent::ToggleEdit, now);
        assert_eq!(session.handle_event(VirtualEvent::Reset, now), LoopControl::Continue);

        assert_eq!(session.count(), 0);
        assert_eq!(session.editor().mode(), EditorMode::Editing);
    }

    #[test]
    fn test_quit_stops_event_processing() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let control = session.handle_events(
            [VirtualEvent::Quit, VirtualEvent::NavDown],
            Instant::now(),
        );
        assert_eq!(control, LoopControl::Quit);
        assert_eq!(session.editor().state().selected_index, 0);
    }

    #[test]
    fn test_events_applied_in_order() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        session.handle_events(
            [
                VirtualEvent::NavDown,
                VirtualEvent::ToggleEdit,
                VirtualEvent::NavUp,
                VirtualEvent::NavUp,
            ],
            Instant::now(),
        );

        let multiplier = session.store().get_f64(MULTIPLIER).unwrap();
        assert!((multiplier - 1.7).abs() < 1e-9);

        let panel = session.panel_state();
        assert!(panel.editing);
        assert_eq!(panel.selected_index(), Some(1));
        assert_eq!(panel.rows[1].value, "1.70");
        assert_eq!(panel.rows[0].name, COUNTING_LINE);
    }

    #[test]
    fn test_save_sets_expiring_status() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let now = Instant::now();

        session.handle_event(VirtualEvent::Save, now);
        assert_eq!(session.status(now).map(|s| s.text.as_str()), Some("Saved"));
        assert!(session.status(now + Duration::from_secs(2)).is_none());
        assert!(dir.path().join("params.json").exists());
    }

    #[test]
    fn test_load_missing_file_status() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let now = Instant::now();

        session.handle_event(VirtualEvent::Load, now);
        let text = session.status(now).map(|s| s.text.clone()).unwrap();
        assert!(text.starts_with("No file"));
    }

    #[test]
    fn test_count_regions_pairs_verdicts() {
        let dir = TempDir::new().unwrap();
        let mut session = session_in(&dir);
        let thresholds = session.thresholds().unwrap();
        let above = DetectedRegion::new(BoundingBox::new(400, 10, 20, 20));

        let annotated = session.count_regions(&[crossing_region(), above], &thresholds);
        assert_eq!(annotated.len(), 2);
        assert_eq!(annotated[0].verdict, crate::analyzer::RegionVerdict::Counted);
        assert_eq!(annotated[1].verdict, crate::analyzer::RegionVerdict::AboveLine);
        assert_eq!(annotated[1].region, above);
    }
}
