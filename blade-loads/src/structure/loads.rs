//! Application of the element loads to the FE model

use serde::{Deserialize, Serialize};

use super::element_data::ElementData;
use super::fe::{ForceComponent, LoadSink, MeshQuery};
use crate::error::BladeResult;
use crate::units::UnitSystem;

/// Sign applied to the lift pressure when it is written to the FE model.
///
/// The single-part blade model negates the pressure, the three-part model
/// applies it as computed. Which one matches the solver's face orientation
/// is still open, so both are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PressureSign {
    AsComputed,
    #[default]
    Negated,
}

impl PressureSign {
    pub fn apply(self, pressure: f64) -> f64 {
        match self {
            PressureSign::AsComputed => pressure,
            PressureSign::Negated => -pressure,
        }
    }
}

/// Options for [`LoadApplicator`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOptions {
    pub pressure_sign: PressureSign,
    /// Unit rotation axis of the blade
    pub rotation_axis: [f64; 3],
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            pressure_sign: PressureSign::default(),
            rotation_axis: [0.0, 0.0, 1.0],
        }
    }
}

/// Writes pressure, drag and rotation loads for an element table
#[derive(Debug, Clone, Default)]
pub struct LoadApplicator {
    pub options: LoadOptions,
}

impl LoadApplicator {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Apply all element loads plus the angular velocity at `rpm`.
    ///
    /// The viscous drag of an element is split evenly over its nodes and
    /// resolved into global X and Z with the stored drag direction.
    pub fn apply(
        &self,
        data: &ElementData,
        mesh: &impl MeshQuery,
        sink: &mut impl LoadSink,
        rpm: f64,
    ) -> BladeResult<()> {
        sink.accumulate_add()?;

        for (record, aoa) in data.records.iter().zip(data.aoa_vectors()) {
            sink.surface_pressure(record.element, self.options.pressure_sign.apply(record.pressure))?;

            let nodes = mesh.element_nodes(record.element)?;
            let share = record.viscous_drag / nodes.len() as f64;
            for node in nodes {
                sink.nodal_force(node, ForceComponent::Fx, aoa.x * share)?;
                sink.nodal_force(node, ForceComponent::Fz, aoa.z * share)?;
            }
        }

        let omega = UnitSystem::angular_velocity(rpm);
        let [ax, ay, az] = self.options.rotation_axis;
        sink.angular_velocity([ax * omega, ay * omega, az * omega])?;

        log::debug!("loads applied to {} elements at {} rpm", data.len(), rpm);
        Ok(())
    }
}
