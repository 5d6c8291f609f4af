use serde::{Deserialize, Serialize};
use std::fmt;

/// Input-source-agnostic command consumed by the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VirtualEvent {
    NavUp,
    NavDown,
    ToggleEdit,
    Save,
    Load,
    Reset,
    Quit,
}

impl fmt::Display for VirtualEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VirtualEvent::NavUp => "NAV_UP",
            VirtualEvent::NavDown => "NAV_DOWN",
            VirtualEvent::ToggleEdit => "TOGGLE_EDIT",
            VirtualEvent::Save => "SAVE",
            VirtualEvent::Load => "LOAD",
            VirtualEvent::Reset => "RESET",
            VirtualEvent::Quit => "QUIT",
        };
        f.write_str(name)
    }
}

/// The six physical buttons on the operator panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Up,
    Down,
    Edit,
    Save,
    Load,
    Reset,
}

impl Button {
    pub const ALL: [Button; 6] = [
        Button::Up,
        Button::Down,
        Button::Edit,
        Button::Save,
        Button::Load,
        Button::Reset,
    ];

    /// Virtual event emitted by a press of this button
    pub fn event(self) -> VirtualEvent {
        match self {
            Button::Up => VirtualEvent::NavUp,
            Button::Down => VirtualEvent::NavDown,
            Button::Edit => VirtualEvent::ToggleEdit,
            Button::Save => VirtualEvent::Save,
            Button::Load => VirtualEvent::Load,
            Button::Reset => VirtualEvent::Reset,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Button::Up => 0,
            Button::Down => 1,
            Button::Edit => 2,
            Button::Save => 3,
            Button::Load => 4,
            Button::Reset => 5,
        }
    }

    /// Navigation buttons get the shorter debounce window
    pub fn is_navigation(self) -> bool {
        matches!(self, Button::Up | Button::Down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_cover_all_but_quit() {
        let events: Vec<VirtualEvent> = Button::ALL.iter().map(|b| b.event()).collect();
        assert!(!events.contains(&VirtualEvent::Quit));
        assert_eq!(events.len(), 6);
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
    }
}
