//! Per-element laminate layups for the blade variants

use serde::{Deserialize, Serialize};

use super::material::{MaterialRole, MaterialTable};
use super::variables::{DesignLayout, DesignVector};
use crate::error::{BladeError, BladeResult};
use crate::structure::ElementData;

/// Integration points through the thickness of every ply
pub const PLY_INTEGRATION_POINTS: u32 = 3;

/// One ply of a shell section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ply {
    /// Thickness in model length
    pub thickness: f64,
    /// Material number in the FE model
    pub material: u32,
    /// Fibre angle in degrees
    pub angle: f64,
    pub integration_points: u32,
}

impl Ply {
    pub fn new(thickness: f64, material: u32, angle: f64) -> Self {
        Self {
            thickness,
            material,
            angle,
            integration_points: PLY_INTEGRATION_POINTS,
        }
    }
}

/// Receiver of shell section definitions.
///
/// A section is opened with `begin_section`, optionally offset, filled
/// with plies from bottom to top and finally assigned to an element.
pub trait SectionSink {
    fn begin_section(&mut self, section: usize) -> BladeResult<()>;
    fn section_offset(&mut self, offset: f64) -> BladeResult<()>;
    fn ply(&mut self, ply: &Ply) -> BladeResult<()>;
    fn assign_section(&mut self, element: usize, section: usize) -> BladeResult<()>;
}

/// Structural concept of a blade: variable layout, layup rule and
/// constraint definition
pub trait BladeVariant {
    fn name(&self) -> &str;

    /// Optimizer vector layout for `sections` structural sections
    fn layout(&self, sections: usize) -> DesignLayout;

    /// Plies of one element of thickness `height`
    fn layup(&self, height: f64, globals: &[f64], locals: &[f64], materials: &MaterialTable) -> Vec<Ply>;

    /// Whether the element offset is applied to the section
    fn uses_offset(&self) -> bool;

    /// Constraint values from the per-section failure indices
    fn constraints(&self, fibre: &[f64], matrix: &[f64]) -> Vec<f64>;
}

/// Flax skins around a balsa core with flax spar plies.
///
/// Globals are seven ply angles, each section has skin thickness `t`,
/// core fibre ratio `r` and fibre split `s`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SandwichLayup;

impl BladeVariant for SandwichLayup {
    fn name(&self) -> &str {
        "sandwich"
    }

    fn layout(&self, sections: usize) -> DesignLayout {
        DesignLayout {
            leading: 0,
            globals: 7,
            per_section: 3,
            sections,
        }
    }

    fn layup(&self, height: f64, g: &[f64], locals: &[f64], materials: &MaterialTable) -> Vec<Ply> {
        let (t, r, s) = (locals[0], locals[1], locals[2]);
        let flax = materials.number(MaterialRole::Flaxpreg);
        let balsa = materials.number(MaterialRole::Balsa);
        let skin = t / 4.0;

        if t > height {
            return [0, 1, 5, 6].iter().map(|&i| Ply::new(skin, flax, g[i])).collect();
        }

        let core = height - t;
        vec![
            Ply::new(skin, flax, g[0]),
            Ply::new(skin, flax, g[1]),
            Ply::new(core * r * s, flax, g[2]),
            Ply::new(core * (1.0 - r), balsa, g[3]),
            Ply::new(core * r * (1.0 - s), flax, g[4]),
            Ply::new(skin, flax, g[5]),
            Ply::new(skin, flax, g[6]),
        ]
    }

    fn uses_offset(&self) -> bool {
        true
    }

    fn constraints(&self, fibre: &[f64], matrix: &[f64]) -> Vec<f64> {
        fibre.iter().chain(matrix).map(|i| i - 1.0).collect()
    }
}

/// Three-part blade with fixed flax cover layers and a balsa core.
///
/// The first optimizer entry is unused. Globals are the flax and balsa
/// angles, each section has fibre ratio `a0` and split `a1`.
#[derive(Debug, Clone, Copy)]
pub struct ThreePartLayup {
    /// Thickness of one cover layer
    pub layer_thickness: f64,
    /// Core thickness below which no balsa is placed
    pub min_balsa: f64,
}

impl Default for ThreePartLayup {
    fn default() -> Self {
        Self {
            layer_thickness: 0.185,
            min_balsa: 1.0,
        }
    }
}

impl BladeVariant for ThreePartLayup {
    fn name(&self) -> &str {
        "three-part"
    }

    fn layout(&self, sections: usize) -> DesignLayout {
        DesignLayout {
            leading: 1,
            globals: 2,
            per_section: 2,
            sections,
        }
    }

    fn layup(&self, height: f64, g: &[f64], locals: &[f64], materials: &MaterialTable) -> Vec<Ply> {
        let (a0, a1) = (locals[0], locals[1]);
        let flax = materials.number(MaterialRole::Flaxpreg);
        let balsa = materials.number(MaterialRole::Balsa);
        let cover = Ply::new(self.layer_thickness, flax, g[0]);
        let core = height - 2.0 * self.layer_thickness;

        let mut plies = vec![cover];
        if core > 0.0 {
            if core * (1.0 - a0) < self.min_balsa {
                plies.push(Ply::new(core / 2.0, flax, g[0]));
                plies.push(Ply::new(core / 2.0, flax, g[0]));
            } else {
                plies.push(Ply::new(core * a0 * a1, flax, g[0]));
                plies.push(Ply::new(core * (1.0 - a0), balsa, g[1]));
                plies.push(Ply::new(core * a0 * (1.0 - a1), flax, g[0]));
            }
        }
        plies.push(cover);
        plies
    }

    fn uses_offset(&self) -> bool {
        false
    }

    fn constraints(&self, fibre: &[f64], matrix: &[f64]) -> Vec<f64> {
        fibre.iter().chain(matrix).copied().collect()
    }
}

/// Write one section per element, numbered like the element
pub fn apply_design(
    data: &ElementData,
    variant: &impl BladeVariant,
    design: &DesignVector,
    materials: &MaterialTable,
    sink: &mut impl SectionSink,
) -> BladeResult<()> {
    let layout = variant.layout(design.sections.len());
    if design.globals.len() != layout.globals || design.sections.iter().any(|s| s.len() != layout.per_section) {
        return Err(BladeError::InvalidInput(format!(
            "design vector does not match the {} layout",
            variant.name()
        )));
    }

    for record in &data.records {
        let locals = design.section(record.section)?;
        sink.begin_section(record.element)?;
        if variant.uses_offset() {
            sink.section_offset(record.offset)?;
        }
        for ply in variant.layup(record.height, &design.globals, locals, materials) {
            sink.ply(&ply)?;
        }
        sink.assign_section(record.element, record.element)?;
    }
    log::debug!("{} layup applied to {} elements", variant.name(), data.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::material::Material;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn materials() -> MaterialTable {
        let mut m = HashMap::new();
        m.insert(MaterialRole::Flaxpreg, Material::new(1));
        m.insert(MaterialRole::Balsa, Material::new(2));
        MaterialTable::new(m).unwrap()
    }

    fn total(plies: &[Ply]) -> f64 {
        plies.iter().map(|p| p.thickness).sum()
    }

    const ANGLES: [f64; 7] = [0.0, 45.0, 90.0, 0.0, -90.0, -45.0, 10.0];

    #[test]
    fn test_sandwich_fills_element_height() {
        let plies = SandwichLayup.layup(10.0, &ANGLES, &[2.0, 0.4, 0.25], &materials());
        assert_eq!(plies.len(), 7);
        assert_relative_eq!(total(&plies), 10.0, epsilon = 1e-12);
        assert_eq!(plies[3].material, 2);
        assert_relative_eq!(plies[3].thickness, 8.0 * 0.6);
        assert_relative_eq!(plies[2].thickness, 8.0 * 0.4 * 0.25);
        assert_eq!(plies[4].angle, -90.0);
        assert!(plies.iter().all(|p| p.integration_points == 3));
    }

    #[test]
    fn test_sandwich_thin_element_skins_only() {
        let plies = SandwichLayup.layup(1.0, &ANGLES, &[2.0, 0.4, 0.25], &materials());
        let angles: Vec<f64> = plies.iter().map(|p| p.angle).collect();
        assert_eq!(angles, vec![0.0, 45.0, -45.0, 10.0]);
        assert_relative_eq!(total(&plies), 2.0);
    }

    #[test]
    fn test_three_part_layups() {
        let v = ThreePartLayup::default();
        let m = materials();

        // core 10 - 0.37, balsa 9.63 * 0.5 >= 1
        let plies = v.layup(10.0, &[30.0, 0.0], &[0.5, 0.5], &m);
        assert_eq!(plies.len(), 5);
        assert_eq!(plies[2].material, 2);
        assert_relative_eq!(total(&plies), 10.0, epsilon = 1e-12);

        // balsa would be thinner than 1
        let plies = v.layup(1.0, &[30.0, 0.0], &[0.5, 0.5], &m);
        assert_eq!(plies.len(), 4);
        assert!(plies.iter().all(|p| p.material == 1));
        assert_relative_eq!(total(&plies), 1.0, epsilon = 1e-12);

        // no core
        let plies = v.layup(0.3, &[30.0, 0.0], &[0.5, 0.5], &m);
        assert_eq!(plies.len(), 2);
    }

    #[test]
    fn test_constraints() {
        assert_eq!(SandwichLayup.constraints(&[0.5, 1.5], &[2.0, 0.0]), vec![-0.5, 0.5, 1.0, -1.0]);
        assert_eq!(ThreePartLayup::default().constraints(&[0.5], &[2.0]), vec![0.5, 2.0]);
    }
}
