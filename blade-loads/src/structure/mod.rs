//! Structural side of the load mapping: mesh access, edge lookup,
//! element data and load application

pub mod edges;
pub mod element_data;
pub mod fe;
pub mod loads;
pub mod mesh;

pub use edges::{EdgeLocator, EdgeSegment, Edges};
pub use element_data::{
    aoa_direction, chord_fraction, lift_pressure, viscous_drag, BuilderOptions, DragWidthAxis, ElementData,
    ElementDataBuilder, ElementRecord, SectionBucketer,
};
pub use fe::{ForceComponent, GeometryKernel, LoadSink, MeshQuery};
pub use loads::{LoadApplicator, LoadOptions, PressureSign};
pub use mesh::{ChordStation, Node, ShellElement, ShellMesh};
