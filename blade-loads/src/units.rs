//! Unit conversion boundary between the aerodynamic and the structural model
//!
//! Aerodynamic data (propeller radii, air density, rpm) arrives in SI units
//! (m, kg/m³, 1/min). The structural model is usually built in a
//! tonne-mm-s-N system. Every scale factor between the two lives here.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mass-length-time system of the structural model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSystem {
    /// Model length units per metre
    pub length_per_meter: f64,
    /// Model density units per kg/m³
    pub density_per_kg_m3: f64,
}

impl UnitSystem {
    /// Plain SI: m, kg, s, N
    pub fn si() -> Self {
        Self {
            length_per_meter: 1.0,
            density_per_kg_m3: 1.0,
        }
    }

    /// tonne, mm, s, N (pressure in MPa)
    pub fn tonne_mm_s() -> Self {
        Self {
            length_per_meter: 1.0e3,
            density_per_kg_m3: 1.0e-12,
        }
    }

    /// Convert a length in metres to model length
    pub fn length(&self, meters: f64) -> f64 {
        meters * self.length_per_meter
    }

    /// Convert a density in kg/m³ to model density
    pub fn density(&self, kg_per_m3: f64) -> f64 {
        kg_per_m3 * self.density_per_kg_m3
    }

    /// Rotation frequency in 1/s
    pub fn rotation_frequency(rpm: f64) -> f64 {
        rpm / 60.0
    }

    /// Angular velocity in rad/s
    pub fn angular_velocity(rpm: f64) -> f64 {
        rpm * (2.0 * PI / 60.0)
    }

    /// Circumferential velocity at a radial coordinate given in model length
    pub fn circular_velocity(radius: f64, rpm: f64) -> f64 {
        2.0 * PI * radius * Self::rotation_frequency(rpm)
    }

    /// Check that the spanwise extent of a mesh matches the tip radius.
    ///
    /// Emits a unit consistency warning and returns `false` when the largest
    /// spanwise coordinate of the mesh does not fit the tip radius converted
    /// to model units (typical symptom: mesh in mm, radius in m or vice versa).
    pub fn check_span_extent(&self, max_span_coordinate: f64, tip_radius_m: f64) -> bool {
        let tip = self.length(tip_radius_m);
        if tip <= 0.0 {
            log::warn!("Unit consistency: non-positive tip radius {}", tip_radius_m);
            return false;
        }
        let ratio = max_span_coordinate / tip;
        if !(0.5..=1.05).contains(&ratio) {
            log::warn!(
                "Unit consistency: mesh reaches span coordinate {:.4} but tip radius is {:.4} model units (ratio {:.3e})",
                max_span_coordinate,
                tip,
                ratio
            );
            return false;
        }
        true
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::tonne_mm_s()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tonne_mm_density() {
        let units = UnitSystem::tonne_mm_s();
        assert_relative_eq!(units.density(1.225), 1.225e-12);
        assert_relative_eq!(units.length(0.412), 412.0);
    }

    #[test]
    fn test_angular_velocity() {
        assert_relative_eq!(UnitSystem::angular_velocity(60.0), 2.0 * PI);
        assert_relative_eq!(UnitSystem::circular_velocity(100.0, 60.0), 200.0 * PI);
    }

    #[test]
    fn test_span_extent_mismatch() {
        let units = UnitSystem::tonne_mm_s();
        assert!(units.check_span_extent(410.0, 0.412));
        // mesh written in metres while the model expects mm
        assert!(!units.check_span_extent(0.41, 0.412));
    }
}
