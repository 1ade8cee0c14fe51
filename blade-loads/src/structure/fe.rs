//! Capabilities of the finite element solver used by the load mapping

use serde::{Deserialize, Serialize};

use crate::error::BladeResult;
use crate::math::Vec3;

/// Nodal force direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForceComponent {
    Fx,
    Fy,
    Fz,
}

impl ForceComponent {
    pub fn label(self) -> &'static str {
        match self {
            ForceComponent::Fx => "FX",
            ForceComponent::Fy => "FY",
            ForceComponent::Fz => "FZ",
        }
    }
}

/// Read access to a meshed shell model
pub trait MeshQuery {
    /// Element numbers in ascending order
    fn element_ids(&self) -> Vec<usize>;

    fn centroid(&self, element: usize) -> BladeResult<Vec3>;

    fn area(&self, element: usize) -> BladeResult<f64>;

    /// Node numbers of an element (corner and mid-side nodes)
    fn element_nodes(&self, element: usize) -> BladeResult<Vec<usize>>;

    fn node_location(&self, node: usize) -> BladeResult<Vec3>;
}

/// Solid-modelling operations needed to cut the blade surface
pub trait GeometryKernel {
    /// Define (or redefine) a keypoint
    fn keypoint(&mut self, id: usize, location: Vec3) -> BladeResult<()>;

    /// Area through keypoints, returns the new area number
    fn area_from_keypoints(&mut self, keypoints: &[usize]) -> BladeResult<usize>;

    /// Intersect a line with an area.
    ///
    /// Returns the keypoint created at the intersection, `None` if the line
    /// misses the area.
    fn intersect_line_area(&mut self, line: usize, area: usize) -> BladeResult<Option<usize>>;

    fn keypoint_location(&self, id: usize) -> BladeResult<Vec3>;

    fn delete_keypoint(&mut self, id: usize) -> BladeResult<()>;

    fn delete_area(&mut self, area: usize) -> BladeResult<()>;
}

/// Receiver of structural load commands
pub trait LoadSink {
    /// Switch force application to accumulate mode
    fn accumulate_add(&mut self) -> BladeResult<()>;

    /// Uniform pressure on an element face
    fn surface_pressure(&mut self, element: usize, pressure: f64) -> BladeResult<()>;

    fn nodal_force(&mut self, node: usize, component: ForceComponent, value: f64) -> BladeResult<()>;

    /// Global angular velocity in rad/s about the model axes
    fn angular_velocity(&mut self, omega: [f64; 3]) -> BladeResult<()>;
}
