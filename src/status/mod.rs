//! Bulk configuration through a fixed set of named keys.
//!
//! Every key is optional, so a [`Status`] can describe a full snapshot (as returned
//! when reading a neuron) or a sparse set of overrides (when writing). Unknown keys
//! are ignored when parsing and absent keys are skipped when serializing.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::error::StatusError;


/// Named parameter and state values of a contextual modulation neuron
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    /// Weight of the modulatory term in the activation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k1: Option<f64>,
    /// Gain of the exponential modulation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k2: Option<f64>,
    /// Linear contextual field coefficient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k3: Option<f64>,
    /// Re-evaluation interval (ms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
    /// Firing probability, read only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta: Option<f64>,
    /// Receptive field offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w0: Option<f64>,
    /// Contextual field offset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v0: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receptive_field: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contextual_field: Option<f64>,
    /// Receptor type codes of the input channels, read only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receptor_types: Option<BTreeMap<String, i64>>,
    /// Names of the recordable variables, read only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recordables: Option<Vec<String>>,
}

impl Status {
    /// Parses a status from a JSON object, unknown keys are ignored
    pub fn from_json(json: &str) -> Result<Self, StatusError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Converts a JSON value into a status, unknown keys are ignored
    pub fn from_value(value: serde_json::Value) -> Result<Self, StatusError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serializes the keys that are present as a JSON object
    pub fn to_json(&self) -> Result<String, StatusError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Numeric keys paired with their values, absent keys are skipped
    pub fn numeric_values(&self) -> Vec<(&'static str, f64)> {
        [
            ("k1", self.k1),
            ("k2", self.k2),
            ("k3", self.k3),
            ("interval", self.interval),
            ("theta", self.theta),
            ("w0", self.w0),
            ("v0", self.v0),
            ("receptive_field", self.receptive_field),
            ("contextual_field", self.contextual_field),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect()
    }

    /// Checks that every numeric value present is finite
    pub fn check_finite(&self) -> Result<(), StatusError> {
        match self.numeric_values().into_iter().find(|(_, value)| !value.is_finite()) {
            Some((key, value)) => Err(StatusError::NonFiniteValue { key, value }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Status;
    use crate::error::StatusError;


    #[test]
    fn test_unknown_keys_are_ignored() -> Result<(), StatusError> {
        let status = Status::from_json(r#"{"k1": 0.25, "tau_m": 10.0, "V_m": -70.0}"#)?;

        assert_eq!(status.k1, Some(0.25));
        assert_eq!(status.k2, None);

        Ok(())
    }

    #[test]
    fn test_absent_keys_are_not_emitted() -> Result<(), StatusError> {
        let status = Status { k3: Some(1.5), ..Status::default() };

        assert_eq!(status.to_json()?, r#"{"k3":1.5}"#);

        Ok(())
    }

    #[test]
    fn test_non_finite_values() {
        let status = Status { w0: Some(f64::NAN), ..Status::default() };

        assert!(matches!(
            status.check_finite(),
            Err(StatusError::NonFiniteValue { key: "w0", .. }),
        ));
    }
}
