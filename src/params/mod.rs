mod document;
mod editor;
mod store;

pub use document::{load_status, save_status, ParameterDocument};
pub use editor::{EditorMode, EditorState, ParameterEditor};
pub use store::{
    ParamKind, ParamRange, ParamValue, Parameter, ParameterStore, StepDirection, Thresholds,
    COUNTING_LINE, DELTA, MIN_BOX_SIZE, MIN_BRIGHTNESS, MULTIPLIER, SCALAR,
};
