//! Per-element aerodynamic and geometric data of the structural mesh
//!
//! [`ElementDataBuilder`] maps the spanwise aerodynamic results onto every
//! shell element: centroid, chord projection, section bucket, airfoil height
//! and camber offset, local pressure and viscous drag with their force
//! directions. The resulting [`ElementData`] is built once per mesh and can be
//! persisted as CSV.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;

use super::edges::EdgeLocator;
use super::fe::{GeometryKernel, MeshQuery};
use crate::airfoil::PanelMethod;
use crate::error::{BladeError, BladeResult};
use crate::math::{round_significant, round_to, Vec3};
use crate::propeller::{Propeller, SpanwiseSectionInterpolator};
use crate::units::UnitSystem;

/// Direction used for the element width in the viscous drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DragWidthAxis {
    /// Area divided by the spanwise (y) extent of the element nodes
    #[default]
    Span,
    /// Area divided by the chordwise (x) extent of the element nodes
    Chord,
}

/// Options for [`ElementDataBuilder`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderOptions {
    pub units: UnitSystem,
    /// Number of structural span sections
    pub sections: usize,
    pub drag_width: DragWidthAxis,
    /// Accepted overshoot of the relative chord beyond [0, 1]
    pub chord_tolerance: f64,
    /// Significant digits kept for loads and coefficients
    pub significant_digits: i32,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            units: UnitSystem::default(),
            sections: 20,
            drag_width: DragWidthAxis::Span,
            chord_tolerance: 0.05,
            significant_digits: 6,
        }
    }
}

/// Assigns span coordinates to structural sections between hub and tip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionBucketer {
    /// Hub radius in model length
    pub hub: f64,
    /// Tip radius in model length
    pub tip: f64,
    pub sections: usize,
}

impl SectionBucketer {
    pub fn new(propeller: &Propeller, units: &UnitSystem, sections: usize) -> BladeResult<Self> {
        let (hub, tip) = (units.length(propeller.hub_radius), units.length(propeller.tip_radius));
        if sections == 0 || !(tip > hub) {
            return Err(BladeError::InvalidInput(format!(
                "section bucketing needs tip > hub and at least one section (hub {}, tip {}, sections {})",
                hub, tip, sections
            )));
        }
        Ok(Self { hub, tip, sections })
    }

    /// Section index of a span coordinate, clamped to the valid range
    pub fn bucket(&self, span: f64) -> usize {
        let raw = ((span - self.hub) / (self.tip - self.hub) * self.sections as f64).floor();
        raw.clamp(0.0, (self.sections - 1) as f64) as usize
    }
}

/// One row of the element table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub element: usize,
    pub section: usize,
    pub midpoint_x: f64,
    pub midpoint_y: f64,
    pub midpoint_z: f64,
    pub rel_chord: f64,
    pub chord_length: f64,
    pub rel_span: f64,
    /// Airfoil thickness at the element, model length
    pub height: f64,
    /// Shell offset from the camber line, model length
    pub offset: f64,
    pub area: f64,
    pub cp_suc: f64,
    pub cp_pres: f64,
    pub circular_velocity: f64,
    /// Surface pressure from lift
    pub pressure: f64,
    pub cl: f64,
    pub cd: f64,
    pub cf: f64,
    pub cf_dx: f64,
    /// Viscous drag force on the element
    pub viscous_drag: f64,
    /// Angle of attack in degrees
    pub alpha: f64,
    pub chord_x: f64,
    pub chord_y: f64,
    pub chord_z: f64,
    pub aoa_x: f64,
    pub aoa_y: f64,
    pub aoa_z: f64,
}

impl ElementRecord {
    /// Unit chord direction (leading to trailing edge)
    pub fn chord_vector(&self) -> Vec3 {
        Vec3::new(self.chord_x, self.chord_y, self.chord_z)
    }

    /// Unit direction of the viscous drag
    pub fn aoa_vector(&self) -> Vec3 {
        Vec3::new(self.aoa_x, self.aoa_y, self.aoa_z)
    }
}

/// Element table in element number order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementData {
    pub records: Vec<ElementRecord>,
}

impl ElementData {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, element: usize) -> Option<&ElementRecord> {
        self.records
            .binary_search_by_key(&element, |r| r.element)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Viscous drag directions in element order
    pub fn aoa_vectors(&self) -> Vec<Vec3> {
        self.records.iter().map(ElementRecord::aoa_vector).collect()
    }

    /// Element numbers of one structural section
    pub fn section_elements(&self, section: usize) -> Vec<usize> {
        self.records
            .iter()
            .filter(|r| r.section == section)
            .map(|r| r.element)
            .collect()
    }

    pub fn write_csv(&self, path: &Path) -> BladeResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> BladeResult<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = reader
            .deserialize()
            .collect::<Result<Vec<ElementRecord>, csv::Error>>()?;
        records.sort_by_key(|r| r.element);
        log::debug!("read {} element records from {}", records.len(), path.display());
        Ok(Self { records })
    }
}

/// Lift-derived surface pressure `-(Cp_suc - Cp_pres) · ρ/2 · v²`
pub fn lift_pressure(cp_suc: f64, cp_pres: f64, rho: f64, velocity: f64) -> f64 {
    -((cp_suc - cp_pres) * (rho / 2.0) * velocity.powi(2))
}

/// Viscous drag force `Cf · dx · A · ρ/2 · v²`
pub fn viscous_drag(cf: f64, dx: f64, area: f64, rho: f64, velocity: f64) -> f64 {
    cf * dx * area * (rho / 2.0) * velocity.powi(2)
}

/// Signed position of the centroid projection along the chord line,
/// as a fraction of the chord length.
pub fn chord_fraction(centroid: &Vec3, leading: &Vec3, trailing: &Vec3) -> f64 {
    let chord = trailing - leading;
    let u = chord.normalize();
    let lambda = (centroid - leading).dot(&u) / u.dot(&u);
    lambda / chord.norm()
}

/// Unit direction of the viscous drag for an angle of attack (degrees)
/// and chord direction `u`.
///
/// `[1, 0, (cos α − u_x) / u_z]` normalized; a chord without z component
/// uses `[cos α, 0, sin α]`.
pub fn aoa_direction(alpha_deg: f64, u: &Vec3) -> Vec3 {
    let alpha = alpha_deg * PI / 180.0;
    let v = if u.z.abs() < 1e-9 {
        Vec3::new(alpha.cos(), 0.0, alpha.sin())
    } else {
        Vec3::new(1.0, 0.0, (alpha.cos() - u.x) / u.z)
    };
    v.normalize()
}

/// Builds [`ElementData`] from a mesh and the spanwise aerodynamics
#[derive(Debug, Clone)]
pub struct ElementDataBuilder {
    pub locator: EdgeLocator,
    pub options: BuilderOptions,
}

impl ElementDataBuilder {
    pub fn new(locator: EdgeLocator, options: BuilderOptions) -> Self {
        Self { locator, options }
    }

    /// Compute the element table for every mesh element
    pub fn build<M, P>(&self, mesh: &mut M, interp: &SpanwiseSectionInterpolator<'_, P>) -> BladeResult<ElementData>
    where
        M: MeshQuery + GeometryKernel,
        P: PanelMethod,
    {
        let propeller = interp.propeller();
        let units = &self.options.units;
        let bucketer = SectionBucketer::new(propeller, units, self.options.sections)?;
        let tip = units.length(propeller.tip_radius);

        let rpm = propeller.max_rpm()?;
        let rho = units.density(propeller.air_density()?);

        let ids = mesh.element_ids();
        let mut records = Vec::with_capacity(ids.len());
        let mut max_span = f64::NEG_INFINITY;

        for element in ids {
            let c = mesh.centroid(element)?;
            max_span = max_span.max(c.y);

            let edges = self.locator.locate(mesh, c.y)?;
            let u = (edges.trailing - edges.leading).normalize();

            let fraction = chord_fraction(&c, &edges.leading, &edges.trailing);
            let tol = self.options.chord_tolerance;
            if !(fraction >= -tol && fraction <= 1.0 + tol) {
                return Err(BladeError::ChordOutOfRange { element, value: fraction });
            }
            let rel_chord = fraction.clamp(0.0, 1.0);
            let rel_span = c.y / tip;

            let shapes = interp.get_airfoil(rel_span)?;
            let height = 2.0 * shapes.thickness.upper_ordinate(rel_chord)?;
            let offset = -shapes.camber.upper_ordinate(rel_chord)?;

            let area = mesh.area(element)?;
            let state = interp.state(rel_chord, rel_span)?;

            let v = UnitSystem::circular_velocity(c.y, rpm);
            let pressure = lift_pressure(state.cp_suc, state.cp_pres, rho, v);

            let dx = self.element_width(mesh, element, area)? / edges.chord;
            let drag = viscous_drag(state.cf, dx, area, rho, v);
            let aoa = aoa_direction(state.alpha, &u);

            let sig = |value: f64| round_significant(value, self.options.significant_digits);
            records.push(ElementRecord {
                element,
                section: bucketer.bucket(c.y),
                midpoint_x: round_to(c.x, 3),
                midpoint_y: round_to(c.y, 3),
                midpoint_z: round_to(c.z, 3),
                rel_chord: round_to(rel_chord, 3),
                chord_length: round_to(edges.chord, 3),
                rel_span: round_to(rel_span, 4),
                height: round_to(height * edges.chord, 3),
                offset: round_to(offset * edges.chord, 3),
                area: round_to(area, 3),
                cp_suc: round_to(state.cp_suc, 3),
                cp_pres: round_to(state.cp_pres, 3),
                circular_velocity: round_to(v, 3),
                pressure: sig(pressure),
                cl: sig(state.cl),
                cd: sig(state.cd),
                cf: sig(state.cf),
                cf_dx: sig(state.cf * dx),
                viscous_drag: sig(drag),
                alpha: sig(state.alpha),
                chord_x: u.x,
                chord_y: u.y,
                chord_z: u.z,
                aoa_x: aoa.x,
                aoa_y: aoa.y,
                aoa_z: aoa.z,
            });
        }

        units.check_span_extent(max_span, propeller.tip_radius);
        log::info!("element data built for {} elements", records.len());
        Ok(ElementData { records })
    }

    /// Element extent across the drag width axis, as area over nodal extent
    fn element_width<M: MeshQuery>(&self, mesh: &M, element: usize, area: f64) -> BladeResult<f64> {
        let coords = mesh
            .element_nodes(element)?
            .into_iter()
            .map(|n| {
                mesh.node_location(n).map(|p| match self.options.drag_width {
                    DragWidthAxis::Span => p.y,
                    DragWidthAxis::Chord => p.x,
                })
            })
            .collect::<BladeResult<Vec<f64>>>()?;

        let lo = coords.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = coords.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let extent = (hi - lo).abs();
        if !(extent > 1e-12) {
            return Err(BladeError::InvalidInput(format!(
                "element {} has no extent along {:?}",
                element, self.options.drag_width
            )));
        }
        Ok(area / extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{Node, ShellMesh};
    use approx::assert_relative_eq;

    #[test]
    fn test_lift_pressure_literal() {
        let p = lift_pressure(-1.2, 0.3, 1.225e-12, 50.0);
        assert_eq!(p, -((-1.2f64 - 0.3) * (1.225e-12 / 2.0) * 50.0f64.powi(2)));
        assert_relative_eq!(p, 2.296875e-9, max_relative = 1e-12);
    }

    #[test]
    fn test_chord_fraction_recovers_position() {
        let le = Vec3::new(-13.2, 120.0, 2.0);
        let te = Vec3::new(49.48, 120.0, -18.35);
        for t in [0.0, 0.1, 0.37, 0.5, 0.99, 1.0] {
            let c = le + (te - le) * t;
            assert_relative_eq!(chord_fraction(&c, &le, &te), t, epsilon = 1e-3);
        }
        // off-chord points project onto the line
        let c = le + (te - le) * 0.25 + Vec3::new(0.0, 5.0, 0.0);
        assert_relative_eq!(chord_fraction(&c, &le, &te), 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_aoa_direction() {
        let u = Vec3::new(0.95, 0.0, -0.3).normalize();
        let v = aoa_direction(3.0, &u);
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
        assert_eq!(v.y, 0.0);

        let flat = aoa_direction(0.0, &Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(flat, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_section_bucketing() {
        let b = SectionBucketer { hub: 40.0, tip: 412.0, sections: 20 };
        assert_eq!(b.bucket(40.0), 0);
        assert_eq!(b.bucket(30.0), 0);
        assert_eq!(b.bucket(412.0), 19);
        assert_eq!(b.bucket(40.0 + 372.0 * 0.5), 10);
    }

    fn strip_element() -> ShellMesh {
        // 10 long in x (chordwise), 40 long in y (spanwise)
        let mut mesh = ShellMesh::new();
        for (id, (x, y)) in [(0.0, 100.0), (10.0, 100.0), (10.0, 140.0), (0.0, 140.0)].into_iter().enumerate() {
            mesh.add_node(id + 1, Node::new(x, y, 0.0)).unwrap();
        }
        mesh.add_element(1, vec![1, 2, 3, 4]).unwrap();
        mesh
    }

    #[test]
    fn test_drag_width_axis() {
        let mesh = strip_element();
        let area = mesh.area(1).unwrap();
        assert_relative_eq!(area, 400.0, epsilon = 1e-9);

        let width = |axis| {
            let options = BuilderOptions {
                drag_width: axis,
                ..BuilderOptions::default()
            };
            ElementDataBuilder::new(EdgeLocator::new(Vec::new()), options)
                .element_width(&mesh, 1, area)
                .unwrap()
        };
        let span = width(DragWidthAxis::Span);
        let chord = width(DragWidthAxis::Chord);
        assert_relative_eq!(span, 10.0, epsilon = 1e-9);
        assert_relative_eq!(chord, 40.0, epsilon = 1e-9);

        let drag = |dx: f64| viscous_drag(0.008, dx / 80.0, area, 1.225e-12, 2.0e5);
        assert_relative_eq!(drag(chord), 4.0 * drag(span), max_relative = 1e-12);
    }
}
