use crate::error::ParameterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const COUNTING_LINE: &str = "countingline";
pub const MULTIPLIER: &str = "multiplier";
pub const SCALAR: &str = "scalar";
pub const MIN_BRIGHTNESS: &str = "min_brightness";
pub const MIN_BOX_SIZE: &str = "min_box_size";
pub const DELTA: &str = "delta";

/// Numeric kind of a parameter, fixed when the parameter is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    Integer,
    Real,
}

/// Current value of a parameter, tagged with its kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Integer(i64),
    Real(f64),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Integer(_) => ParamKind::Integer,
            ParamValue::Real(_) => ParamKind::Real,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Integer(v) => v as f64,
            ParamValue::Real(v) => v,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match *self {
            ParamValue::Integer(v) => v,
            ParamValue::Real(v) => v.round() as i64,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "{}", v),
            ParamValue::Real(v) => write!(f, "{:.2}", v),
        }
    }
}

/// Direction of a single step edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Increase,
    Decrease,
}

impl StepDirection {
    fn sign(self) -> i64 {
        match self {
            StepDirection::Increase => 1,
            StepDirection::Decrease => -1,
        }
    }
}

/// Value, step and bounds of a parameter. Integer parameters never hold a fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamRange {
    Integer {
        value: i64,
        step: i64,
        min: i64,
        max: i64,
    },
    Real {
        value: f64,
        step: f64,
        min: f64,
        max: f64,
    },
}

/// A single live-tunable parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    range: ParamRange,
}

impl Parameter {
    /// Create an integer parameter; the initial value is clamped into bounds
    pub fn integer(name: &str, value: i64, step: i64, min: i64, max: i64) -> Self {
        Self {
            name: name.to_string(),
            range: ParamRange::Integer {
                value: value.clamp(min, max),
                step,
                min,
                max,
            },
        }
    }

    /// Create a real parameter; the initial value is clamped into bounds
    pub fn real(name: &str, value: f64, step: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            range: ParamRange::Real {
                value: value.clamp(min, max),
                step,
                min,
                max,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        match self.range {
            ParamRange::Integer { .. } => ParamKind::Integer,
            ParamRange::Real { .. } => ParamKind::Real,
        }
    }

    pub fn value(&self) -> ParamValue {
        match self.range {
            ParamRange::Integer { value, .. } => ParamValue::Integer(value),
            ParamRange::Real { value, .. } => ParamValue::Real(value),
        }
    }

    pub fn range(&self) -> &ParamRange {
        &self.range
    }

    /// Move the value one step, saturating at the bounds
    pub fn step(&mut self, direction: StepDirection) -> ParamValue {
        match &mut self.range {
            ParamRange::Integer {
                value,
                step,
                min,
                max,
            } => {
                *value = value
                    .saturating_add(direction.sign().saturating_mul(*step))
                    .clamp(*min, *max);
            }
            ParamRange::Real {
                value,
                step,
                min,
                max,
            } => {
                *value = (*value + direction.sign() as f64 * *step).clamp(*min, *max);
            }
        }
        self.value()
    }

    /// Assign a raw number converted to this parameter's kind.
    ///
    /// Integers round to the nearest whole number with halves to even.
    /// Returns `None` when the number cannot represent a value (NaN or infinite).
    pub fn set_from_f64(&mut self, raw: f64) -> Option<ParamValue> {
        if !raw.is_finite() {
            return None;
        }

        match &mut self.range {
            ParamRange::Integer {
                value, min, max, ..
            } => {
                *value = (raw.round_ties_even() as i64).clamp(*min, *max);
            }
            ParamRange::Real {
                value, min, max, ..
            } => {
                *value = raw.clamp(*min, *max);
            }
        }
        Some(self.value())
    }
}

/// Per-iteration snapshot of the values read by detection and counting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub counting_line: i64,
    pub multiplier: f64,
    pub scalar: i64,
    pub min_brightness: u8,
    pub min_box_size: u64,
    pub delta: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            counting_line: 620,
            multiplier: 1.5,
            scalar: -30,
            min_brightness: 30,
            min_box_size: 80,
            delta: 25,
        }
    }
}

/// Ordered, uniquely named set of tunable parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    params: Vec<Parameter>,
}

impl ParameterStore {
    /// Build a store from parameters, rejecting duplicate names
    pub fn new(params: Vec<Parameter>) -> std::result::Result<Self, ParameterError> {
        for (i, param) in params.iter().enumerate() {
            if params[..i].iter().any(|p| p.name == param.name) {
                return Err(ParameterError::ConfigParse {
                    path: "<builtin>".to_string(),
                    details: format!("duplicate parameter name '{}'", param.name),
                });
            }
        }
        Ok(Self { params })
    }

    /// The six counting parameters with their factory defaults
    pub fn with_defaults() -> Self {
        Self {
            params: vec![
                Parameter::integer(COUNTING_LINE, 620, 10, 0, 4000),
                Parameter::real(MULTIPLIER, 1.5, 0.1, 0.1, 5.0),
                Parameter::integer(SCALAR, -30, 5, -255, 255),
                Parameter::integer(MIN_BRIGHTNESS, 30, 5, 0, 255),
                Parameter::integer(MIN_BOX_SIZE, 80, 10, 1, 50000),
                Parameter::integer(DELTA, 25, 1, 0, 500),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Parameter at a navigation index
    pub fn get_at(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    pub fn get(&self, name: &str) -> std::result::Result<ParamValue, ParameterError> {
        self.find(name).map(Parameter::value)
    }

    pub fn get_i64(&self, name: &str) -> std::result::Result<i64, ParameterError> {
        self.get(name).map(|v| v.as_i64())
    }

    pub fn get_f64(&self, name: &str) -> std::result::Result<f64, ParameterError> {
        self.get(name).map(|v| v.as_f64())
    }

    /// Step a parameter by one increment. Saturation is silent.
    pub fn step(
        &mut self,
        name: &str,
        direction: StepDirection,
    ) -> std::result::Result<ParamValue, ParameterError> {
        let param = self.find_mut(name)?;
        let value = param.step(direction);
        debug!("Parameter {} stepped {:?} to {}", name, direction, value);
        Ok(value)
    }

    /// Set a parameter from a raw number, rounding and clamping for its kind
    pub fn set(
        &mut self,
        name: &str,
        raw: f64,
    ) -> std::result::Result<Option<ParamValue>, ParameterError> {
        Ok(self.find_mut(name)?.set_from_f64(raw))
    }

    /// Read all values used by one loop iteration
    pub fn thresholds(&self) -> std::result::Result<Thresholds, ParameterError> {
        Ok(Thresholds {
            counting_line: self.get_i64(COUNTING_LINE)?,
            multiplier: self.get_f64(MULTIPLIER)?,
            scalar: self.get_i64(SCALAR)?,
            min_brightness: self.get_i64(MIN_BRIGHTNESS)?.clamp(0, 255) as u8,
            min_box_size: self.get_i64(MIN_BOX_SIZE)?.max(0) as u64,
            delta: self.get_i64(DELTA)?,
        })
    }

    pub(crate) fn find_mut(
        &mut self,
        name: &str,
    ) -> std::result::Result<&mut Parameter, ParameterError> {
        self.params
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| ParameterError::UnknownParameter(name.to_string()))
    }

    fn find(&self, name: &str) -> std::result::Result<&Parameter, ParameterError> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ParameterError::UnknownParameter(name.to_string()))
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_thresholds() {
        let store = ParameterStore::with_defaults();
        assert_eq!(store.len(), 6);
        assert_eq!(store.thresholds().unwrap(), Thresholds::default());
        assert_eq!(store.get(MULTIPLIER).unwrap(), ParamValue::Real(1.5));
        assert_eq!(store.get(SCALAR).unwrap(), ParamValue::Integer(-30));
    }

    #[test]
    fn test_unknown_parameter() {
        let mut store = ParameterStore::with_defaults();
        assert!(matches!(
            store.get("gain"),
            Err(ParameterError::UnknownParameter(name)) if name == "gain"
        ));
        assert!(store.step("gain", StepDirection::Increase).is_err());
    }

    #[test]
    fn test_step_saturates_at_max_for_every_parameter() {
        let mut store = ParameterStore::with_defaults();
        let names: Vec<String> = store.iter().map(|p| p.name().to_string()).collect();

        for name in names {
            for _ in 0..10_000 {
                store.step(&name, StepDirection::Increase).unwrap();
            }
            let param = store.find_mut(&name).unwrap().clone();
            match *param.range() {
                ParamRange::Integer { value, max, .. } => assert_eq!(value, max),
                ParamRange::Real { value, max, .. } => assert_eq!(value, max),
            }
        }
    }

    #[test]
    fn test_step_saturates_at_min_for_every_parameter() {
        let mut store = ParameterStore::with_defaults();
        let names: Vec<String> = store.iter().map(|p| p.name().to_string()).collect();

        for name in names {
            for _ in 0..10_000 {
                store.step(&name, StepDirection::Decrease).unwrap();
            }
            let param = store.find_mut(&name).unwrap().clone();
            match *param.range() {
                ParamRange::Integer { value, min, .. } => assert_eq!(value, min),
                ParamRange::Real { value, min, .. } => assert_eq!(value, min),
            }
        }
    }

    #[test]
    fn test_real_step_keeps_fraction() {
        let mut store = ParameterStore::with_defaults();
        let value = store.step(MULTIPLIER, StepDirection::Increase).unwrap();
        assert!((value.as_f64() - 1.6).abs() < 1e-9);
        assert_eq!(value.kind(), ParamKind::Real);
    }

    #[test]
    fn test_set_rounds_integers_and_clamps() {
        let mut store = ParameterStore::with_defaults();
        assert_eq!(
            store.set(DELTA, 12.6).unwrap(),
            Some(ParamValue::Integer(13))
        );
        assert_eq!(
            store.set(MIN_BRIGHTNESS, 1000.0).unwrap(),
            Some(ParamValue::Integer(255))
        );
        assert_eq!(store.set(MULTIPLIER, f64::NAN).unwrap(), None);
        assert_eq!(store.get(MULTIPLIER).unwrap(), ParamValue::Real(1.5));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let params = vec![
            Parameter::integer("a", 1, 1, 0, 10),
            Parameter::integer("a", 2, 1, 0, 10),
        ];
        assert!(ParameterStore::new(params).is_err());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(ParamValue::Integer(620).to_string(), "620");
        assert_eq!(ParamValue::Real(1.5).to_string(), "1.50");
    }
}
