use super::document::{load_status, save_status};
use super::store::{ParameterStore, StepDirection};
use crate::input::VirtualEvent;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Browsing,
    Editing,
}

/// Selection and edit flag of the parameter panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorState {
    pub selected_index: usize,
    pub editing: bool,
}

impl EditorState {
    pub fn mode(&self) -> EditorMode {
        if self.editing {
            EditorMode::Editing
        } else {
            EditorMode::Browsing
        }
    }
}

/// State machine driving parameter selection and editing from virtual events
pub struct ParameterEditor {
    state: EditorState,
    params_path: PathBuf,
}

impl ParameterEditor {
    pub fn new<P: AsRef<Path>>(params_path: P) -> Self {
        Self {
            state: EditorState::default(),
            params_path: params_path.as_ref().to_path_buf(),
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn mode(&self) -> EditorMode {
        self.state.mode()
    }

    pub fn params_path(&self) -> &Path {
        &self.params_path
    }

    /// Apply one event. Returns status text when the event produced an
    /// operator-visible outcome (save/load).
    pub fn apply(&mut self, event: VirtualEvent, store: &mut ParameterStore) -> Option<String> {
        let count = store.len();
        if count == 0 {
            return None;
        }

        match (event, self.state.mode()) {
            (VirtualEvent::NavUp, EditorMode::Browsing) => {
                self.state.selected_index = (self.state.selected_index + count - 1) % count;
                None
            }
            (VirtualEvent::NavDown, EditorMode::Browsing) => {
                self.state.selected_index = (self.state.selected_index + 1) % count;
                None
            }
            (VirtualEvent::NavUp, EditorMode::Editing) => {
                self.step_selected(store, StepDirection::Increase);
                None
            }
            (VirtualEvent::NavDown, EditorMode::Editing) => {
                self.step_selected(store, StepDirection::Decrease);
                None
            }
            (VirtualEvent::ToggleEdit, _) => {
                self.state.editing = !self.state.editing;
                debug!("Editor mode now {:?}", self.state.mode());
                None
            }
            (VirtualEvent::Save, _) => {
                let result = store.save_to(&self.params_path);
                if let Err(e) = &result {
                    warn!("{}", e);
                }
                Some(save_status(&result))
            }
            (VirtualEvent::Load, _) => {
                let result = store.load_from(&self.params_path);
                if let Err(e) = &result {
                    warn!("{}", e);
                }
                Some(load_status(&result))
            }
            (VirtualEvent::Reset | VirtualEvent::Quit, _) => {
                debug!("Editor ignoring {}", event);
                None
            }
        }
    }

    fn step_selected(&self, store: &mut ParameterStore, direction: StepDirection) {
        let Some(name) = store
            .get_at(self.state.selected_index)
            .map(|p| p.name().to_string())
        else {
            return;
        };

        match store.step(&name, direction) {
            Ok(value) => info!("{} = {}", name, value),
            Err(e) => warn!("Failed to step parameter: {}", e),
        }
    }
}
