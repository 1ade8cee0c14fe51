//! Structural design: materials, design variables, layups and the
//! evaluation loop driven by an optimizer

pub mod evaluation;
pub mod layup;
pub mod material;
pub mod variables;

pub use evaluation::{Evaluation, Evaluator, StructuralSession, MASS_SCALE};
pub use layup::{apply_design, BladeVariant, Ply, SandwichLayup, SectionSink, ThreePartLayup};
pub use material::{Material, MaterialRole, MaterialTable};
pub use variables::{DesignLayout, DesignVector};
