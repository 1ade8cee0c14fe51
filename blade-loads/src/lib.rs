//! Blade Loads - aerodynamic load mapping for composite propeller blades
//!
//! This library turns spanwise propeller aerodynamics into finite element
//! loads and layups:
//! - Airfoil polars with a piecewise CL-alpha fit and derived
//!   characteristics for the vortex solver
//! - Loadcases, vortex-solver result tables and the load envelope
//! - Spanwise interpolation of polars and pressure distributions
//! - Leading/trailing edge lookup and per-element load tables on a shell mesh
//! - Pressure, viscous drag and rotation loads for the FE model
//! - Design-variable layups and optimizer-facing evaluation
//!
//! External solvers are reached through capability traits
//! ([`airfoil::PanelMethod`], [`propeller::VortexMethod`],
//! [`structure::MeshQuery`], [`structure::GeometryKernel`],
//! [`structure::LoadSink`], [`design::SectionSink`],
//! [`design::StructuralSession`]).
//!
//! ## Example
//! ```rust
//! use blade_loads::prelude::*;
//!
//! let mut cruise = Loadcase::new("cruise", 20.0);
//! cruise.set_data("thru", 100.0, Some("r"), Some(3000.0)).unwrap();
//! assert_eq!(cruise.data(), vec!["thru", "100", "r", "3000"]);
//!
//! let units = UnitSystem::default();
//! assert_eq!(units.length(0.5), 500.0);
//! ```

pub mod airfoil;
pub mod design;
pub mod error;
pub mod math;
pub mod propeller;
pub mod structure;
pub mod units;

// Re-export common types
pub mod prelude {
    pub use crate::airfoil::{
        Airfoil, AirfoilShape, Characteristics, OperatingMode, PanelMethod, Polar, PolarRow,
        PressureDistribution, ShapeComponent, SurfaceDistribution,
    };
    pub use crate::design::{
        BladeVariant, DesignLayout, Evaluation, Evaluator, MaterialRole, MaterialTable, Ply,
        SandwichLayup, SectionSink, StructuralSession, ThreePartLayup,
    };
    pub use crate::error::{BladeError, BladeResult};
    pub use crate::propeller::{
        LoadEnvelope, LoadSelector, Loadcase, LoadcaseResults, PlanformStation, Propeller,
        Section, SpanTable, SpanwiseSectionInterpolator, VortexMethod,
    };
    pub use crate::structure::{
        BuilderOptions, EdgeLocator, ElementData, ElementDataBuilder, ForceComponent,
        GeometryKernel, LoadApplicator, LoadOptions, LoadSink, MeshQuery, ShellMesh,
    };
    pub use crate::units::UnitSystem;
}
