use super::store::ParameterStore;
use crate::error::ParameterError;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Flat name → number mapping persisted to disk
pub type ParameterDocument = Map<String, Value>;

impl ParameterStore {
    /// Serialize every parameter value into a flat document
    pub fn serialize(&self) -> ParameterDocument {
        self.iter()
            .map(|param| {
                let value = match param.value() {
                    super::ParamValue::Integer(v) => Value::from(v),
                    super::ParamValue::Real(v) => Value::from(v),
                };
                (param.name().to_string(), value)
            })
            .collect()
    }

    /// Apply the entries of a document that name a known parameter.
    ///
    /// Entries whose value cannot be converted are skipped; unknown names are
    /// ignored. Returns the number of parameters actually applied.
    pub fn apply_document(&mut self, document: &ParameterDocument) -> usize {
        let mut applied = 0;

        for (name, raw) in document {
            let Ok(param) = self.find_mut(name) else {
                debug!("Ignoring unknown parameter '{}' in document", name);
                continue;
            };

            let Some(number) = document_number(raw) else {
                warn!("Skipping parameter '{}': unusable value {}", name, raw);
                continue;
            };

            match param.set_from_f64(number) {
                Some(value) => {
                    debug!("Loaded parameter {} = {}", name, value);
                    applied += 1;
                }
                None => warn!("Skipping parameter '{}': non-finite value", name),
            }
        }

        applied
    }

    /// Load parameter values from a JSON document on disk
    pub fn load_from<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> std::result::Result<usize, ParameterError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let contents = fs::read_to_string(path).map_err(|source| ParameterError::ConfigIo {
            path: path_str.clone(),
            source,
        })?;

        let document: Value =
            serde_json::from_str(&contents).map_err(|e| ParameterError::ConfigParse {
                path: path_str.clone(),
                details: e.to_string(),
            })?;

        let Value::Object(document) = document else {
            return Err(ParameterError::ConfigParse {
                path: path_str,
                details: "expected a JSON object at the top level".to_string(),
            });
        };

        match self.apply_document(&document) {
            0 => Err(ParameterError::NoMatchingParameters { path: path_str }),
            applied => {
                info!("Loaded {} params from {}", applied, path_str);
                Ok(applied)
            }
        }
    }

    /// Write all parameter values to a JSON document on disk
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), ParameterError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let contents = serde_json::to_string_pretty(&Value::Object(self.serialize())).map_err(
            |e| ParameterError::ConfigParse {
                path: path_str.clone(),
                details: e.to_string(),
            },
        )?;

        fs::write(path, contents).map_err(|source| ParameterError::ConfigIo {
            path: path_str.clone(),
            source,
        })?;

        info!("Saved params to {}", path_str);
        Ok(())
    }
}

/// Numbers and numeric strings are accepted; anything else is unconvertible
fn document_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Operator status text for a save attempt
pub fn save_status(result: &std::result::Result<(), ParameterError>) -> String {
    match result {
        Ok(()) => "Saved".to_string(),
        Err(e) => format!("Save error: {}", e),
    }
}

/// Operator status text for a load attempt
pub fn load_status(result: &std::result::Result<usize, ParameterError>) -> String {
    match result {
        Ok(_) => "Loaded".to_string(),
        Err(ParameterError::ConfigIo { path, source })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            format!("No file {}", path)
        }
        Err(ParameterError::NoMatchingParameters { .. }) => {
            "Loaded file contained no matching params".to_string()
        }
        Err(e) => format!("Load error: {}", e),
    }
}
