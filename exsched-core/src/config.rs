//! Flat key/value solver configuration.
//!
//! All tunables of the solver live in one flat bag of string-valued keys
//! (`Termination.MaxIters`, `Exams.DirectConflictWeight`, ...). The bag can be
//! loaded from a properties-style text file (`key = value` lines, `#` and `!`
//! comments) or from a flat JSON object, and is queried through typed getters
//! that fail with a [`ConfigError`] on malformed values.

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading or interpreting the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A key holds a value that cannot be parsed as the requested type.
    #[error("invalid value for {key}: {value:?} ({expected} expected)")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
    /// A key is not in the recognized-key table.
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),
    /// The configuration file could not be read or parsed at all.
    #[error("cannot read configuration: {0}")]
    Unreadable(String),
}

/// Recognized configuration keys with their documented meaning.
///
/// `validate_keys` rejects anything not listed here; an unknown key is a
/// fatal configuration error rather than a silent no-op.
pub const KNOWN_KEYS: &[&str] = &[
    // general
    "General.Input",
    "General.Output",
    "General.OutputFile",
    "General.Seed",
    "General.SaveBestUnassigned",
    "General.Reports",
    "General.LogFrequency",
    "General.ValidateInvariants",
    // termination
    "Termination.StopWhenComplete",
    "Termination.MaxIters",
    "Termination.TimeOut",
    // parallel execution
    "Parallel.NrSolvers",
    // neighbourhood search
    "Neighbour.Class",
    "Exam.ColoringConstruction",
    "Exam.GreatDeluge",
    "Construction.MaxAttempts",
    "Tabu.Length",
    "Tabu.MaxIdle",
    "Tabu.CbsWeight",
    "HillClimber.Neighbours",
    "HillClimber.MaxIdle",
    "SimulatedAnnealing.Neighbours",
    "SimulatedAnnealing.InitialTemperature",
    "SimulatedAnnealing.CoolingRate",
    "SimulatedAnnealing.TemperatureLength",
    "SimulatedAnnealing.ReheatLengthCoef",
    "GreatDeluge.Neighbours",
    "GreatDeluge.UpperBoundRate",
    "GreatDeluge.LowerBoundRate",
    "GreatDeluge.CoolRate",
    "Final.MaxIdle",
    // problem semantics
    "Exams.MaxRooms",
    "Exams.IsDayBreakBackToBack",
    "Exams.BackToBackDistance",
    "Exams.LargeSize",
    "Exams.LargePeriod",
    "Exams.SoftPeriods",
    "Exams.SoftRooms",
    "Exams.SoftDistributions",
    // criterion weights
    "Exams.DirectConflictWeight",
    "Exams.BackToBackConflictWeight",
    "Exams.DistanceBackToBackConflictWeight",
    "Exams.MoreThan2ADayWeight",
    "Exams.NotAvailableWeight",
    "Exams.InstructorDirectConflictWeight",
    "Exams.InstructorBackToBackConflictWeight",
    "Exams.InstructorMoreThan2ADayWeight",
    "Exams.InstructorNotAvailableWeight",
    "Exams.PeriodWeight",
    "Exams.PeriodIndexWeight",
    "Exams.PeriodSizeWeight",
    "Exams.RoomWeight",
    "Exams.RoomSizeWeight",
    "Exams.RoomSplitWeight",
    "Exams.RoomSplitDistanceWeight",
    "Exams.LargeWeight",
    "Exams.RotationWeight",
    "Exams.DistributionWeight",
    "Exams.PerturbationWeight",
    "Exams.RoomPerturbationWeight",
    "Exams.PeriodViolationWeight",
    "Exams.RoomViolationWeight",
    "Exams.DistributionViolationWeight",
];

/// The flat configuration bag.
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    entries: HashMap<String, String>,
}

impl SolverConfig {
    /// Creates an empty configuration (every getter falls back to its default).
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration file. Files ending in `.json` are parsed as a
    /// flat JSON object; everything else as properties-style `key = value`
    /// lines.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigError::Unreadable(format!("{}: {}", path.display(), e)))?;
        if path.extension().is_some_and(|e| e == "json") {
            Self::from_json(&text)
        } else {
            Ok(Self::from_properties(&text))
        }
    }

    /// Parses properties-style text. Lines starting with `#` or `!` and blank
    /// lines are skipped; everything after the first `=` is the value.
    pub fn from_properties(text: &str) -> Self {
        let mut cfg = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                cfg.set(key.trim(), value.trim());
            }
        }
        cfg
    }

    /// Parses a flat JSON object; values may be strings, numbers or booleans.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ConfigError::Unreadable(format!("JSON parse error: {}", e)))?;
        let object = value
            .as_object()
            .ok_or_else(|| ConfigError::Unreadable("top-level JSON object expected".into()))?;
        let mut cfg = Self::new();
        for (key, val) in object {
            let text = match val {
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: key.clone(),
                        value: other.to_string(),
                        expected: "scalar",
                    })
                }
            };
            cfg.set(key, &text);
        }
        Ok(cfg)
    }

    /// Rejects any key outside [`KNOWN_KEYS`].
    pub fn validate_keys(&self) -> Result<(), ConfigError> {
        for key in self.entries.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                return Err(ConfigError::UnknownKey(key.clone()));
            }
        }
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_str_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    pub fn get_u64(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.parse_with(key, default, "unsigned integer", |v| v.parse().ok())
    }

    pub fn get_i64(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        self.parse_with(key, default, "integer", |v| v.parse().ok())
    }

    pub fn get_usize(&self, key: &str, default: usize) -> Result<usize, ConfigError> {
        self.parse_with(key, default, "unsigned integer", |v| v.parse().ok())
    }

    pub fn get_f64(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        self.parse_with(key, default, "number", |v| v.parse().ok())
    }

    /// Booleans accept `true`/`false`/`on`/`off`/`1`/`0`, case-insensitive.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        self.parse_with(key, default, "boolean", |v| {
            match v.to_ascii_lowercase().as_str() {
                "true" | "on" | "1" | "yes" => Some(true),
                "false" | "off" | "0" | "no" => Some(false),
                _ => None,
            }
        })
    }

    fn parse_with<T>(
        &self,
        key: &str,
        default: T,
        expected: &'static str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => parse(raw).ok_or_else(|| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                expected,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_properties_text() {
        let cfg = SolverConfig::from_properties(
            "# comment\nTermination.MaxIters = 5000\n\nGeneral.Seed=42\n! other comment\n",
        );
        assert_eq!(cfg.get_u64("Termination.MaxIters", 0).unwrap(), 5000);
        assert_eq!(cfg.get_u64("General.Seed", 0).unwrap(), 42);
        assert!(cfg.validate_keys().is_ok());
    }

    #[test]
    fn parses_flat_json() {
        let cfg = SolverConfig::from_json(
            r#"{"Termination.TimeOut": 30, "Exam.GreatDeluge": true, "General.Input": "x.xml"}"#,
        )
        .unwrap();
        assert_eq!(cfg.get_u64("Termination.TimeOut", 0).unwrap(), 30);
        assert!(cfg.get_bool("Exam.GreatDeluge", false).unwrap());
        assert_eq!(cfg.get("General.Input"), Some("x.xml"));
    }

    #[test]
    fn rejects_unknown_key() {
        let mut cfg = SolverConfig::new();
        cfg.set("General.Sed", "42");
        assert!(matches!(
            cfg.validate_keys(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn rejects_malformed_value() {
        let mut cfg = SolverConfig::new();
        cfg.set("Termination.MaxIters", "plenty");
        assert!(matches!(
            cfg.get_u64("Termination.MaxIters", 0),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn defaults_apply_when_key_absent() {
        let cfg = SolverConfig::new();
        assert_eq!(cfg.get_i64("General.SaveBestUnassigned", -1).unwrap(), -1);
        assert!(!cfg.get_bool("Exam.ColoringConstruction", false).unwrap());
    }
}
