//! Loadcases and their solved results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::tables::SpanTable;
use crate::error::{BladeError, BladeResult};

/// Key of the maximum rotational speed in the single values
pub const RPM_KEY: &str = "rpm";
/// Key of the air density (kg/m³) in the single values
pub const RHO_KEY: &str = "rho(kg/m3)";

/// Quantity held fixed while a thrust, torque or power target is met
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Fix {
    /// Fixed pitch, rpm floats
    Pitch,
    /// Fixed rpm
    Rpm(f64),
}

/// Prescribed quantity that needs a [`Fix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Thrust,
    Torque,
    Power,
}

impl Target {
    pub fn keyword(self) -> &'static str {
        match self {
            Target::Thrust => "thru",
            Target::Torque => "torq",
            Target::Power => "powe",
        }
    }
}

/// Operating point specification of a loadcase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OperatingPoint {
    AdvanceRatio(f64),
    Rpm(f64),
    Prescribed { target: Target, value: f64, fix: Fix },
}

impl OperatingPoint {
    /// Solver input tokens, e.g. `["thru", "100", "r", "3000"]`
    pub fn tokens(&self) -> Vec<String> {
        match *self {
            OperatingPoint::AdvanceRatio(v) => vec!["adva".to_string(), v.to_string()],
            OperatingPoint::Rpm(v) => vec!["rpm".to_string(), v.to_string()],
            OperatingPoint::Prescribed { target, value, fix } => {
                let mut tokens = vec![target.keyword().to_string(), value.to_string()];
                match fix {
                    Fix::Pitch => tokens.push("p".to_string()),
                    Fix::Rpm(rpm) => {
                        tokens.push("r".to_string());
                        tokens.push(rpm.to_string());
                    }
                }
                tokens
            }
        }
    }
}

/// A named flight condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loadcase {
    pub name: String,
    /// Flight speed in m/s
    pub flight_speed: f64,
    operating_point: Option<OperatingPoint>,
}

impl Loadcase {
    pub fn new(name: &str, flight_speed: f64) -> Self {
        Self {
            name: name.to_string(),
            flight_speed,
            operating_point: None,
        }
    }

    /// Set the operating point from solver keywords.
    ///
    /// `prescribe_type` is one of `adva`, `rpm`, `thru`, `torq`, `powe`
    /// (case-insensitive). The last three need `fix` (`p` or `r`), and
    /// `r` needs `value2` (the rpm). Invalid combinations are rejected here,
    /// not at solve time.
    pub fn set_data(
        &mut self,
        prescribe_type: &str,
        value: f64,
        fix: Option<&str>,
        value2: Option<f64>,
    ) -> BladeResult<()> {
        let kind = prescribe_type.to_lowercase();
        let point = match kind.as_str() {
            "adva" | "rpm" => {
                if fix.is_some() {
                    return Err(BladeError::InvalidLoadcaseSpec(format!(
                        "'{}' takes no fix mode",
                        kind
                    )));
                }
                if kind == "adva" {
                    OperatingPoint::AdvanceRatio(value)
                } else {
                    OperatingPoint::Rpm(value)
                }
            }
            "thru" | "torq" | "powe" => {
                let target = match kind.as_str() {
                    "thru" => Target::Thrust,
                    "torq" => Target::Torque,
                    _ => Target::Power,
                };
                let fix = match fix.map(str::to_lowercase).as_deref() {
                    Some("p") => {
                        if value2.is_some() {
                            log::warn!("{}: value2 is ignored with a fixed pitch", self.name);
                        }
                        Fix::Pitch
                    }
                    Some("r") => match value2 {
                        Some(rpm) => Fix::Rpm(rpm),
                        None => {
                            return Err(BladeError::InvalidLoadcaseSpec(format!(
                                "'{}' with fix 'r' needs the rpm as value2",
                                kind
                            )))
                        }
                    },
                    Some(other) => {
                        return Err(BladeError::InvalidLoadcaseSpec(format!(
                            "invalid fix '{}', expected 'p' or 'r'",
                            other
                        )))
                    }
                    None => {
                        return Err(BladeError::InvalidLoadcaseSpec(format!(
                            "'{}' needs a fix mode ('p' or 'r')",
                            kind
                        )))
                    }
                };
                OperatingPoint::Prescribed { target, value, fix }
            }
            other => {
                return Err(BladeError::InvalidLoadcaseSpec(format!(
                    "unknown prescribe type '{}'",
                    other
                )))
            }
        };

        self.operating_point = Some(point);
        Ok(())
    }

    pub fn with_operating_point(mut self, point: OperatingPoint) -> Self {
        self.operating_point = Some(point);
        self
    }

    pub fn operating_point(&self) -> Option<&OperatingPoint> {
        self.operating_point.as_ref()
    }

    /// Solver input tokens, empty until an operating point is set
    pub fn data(&self) -> Vec<String> {
        self.operating_point
            .map(|p| p.tokens())
            .unwrap_or_default()
    }
}

/// Results of one vortex-solver run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadcaseResults {
    /// Aggregate values keyed by lower-case solver label
    pub single_values: BTreeMap<String, f64>,
    /// Spanwise operating table (r/R, CL, Cd, Reynolds, ...)
    pub oper: SpanTable,
    /// Spanwise bending/torsion table
    pub bend: SpanTable,
}

impl LoadcaseResults {
    pub fn value(&self, key: &str) -> BladeResult<f64> {
        self.single_values
            .get(key)
            .copied()
            .ok_or_else(|| BladeError::Solver(format!("missing single value '{}'", key)))
    }

    pub fn rpm(&self) -> BladeResult<f64> {
        self.value(RPM_KEY)
    }

    /// Air density in kg/m³
    pub fn rho(&self) -> BladeResult<f64> {
        self.value(RHO_KEY)
    }
}
