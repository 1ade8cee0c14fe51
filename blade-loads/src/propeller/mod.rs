//! Propeller geometry, loadcases and spanwise aerodynamic results

pub mod envelope;
pub mod interpolator;
pub mod loadcase;
pub mod tables;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::airfoil::{Airfoil, OperatingMode, PanelMethod, PressureDistribution};
use crate::error::{BladeError, BladeResult};
use crate::math::chord_grid;

pub use envelope::LoadEnvelope;
pub use interpolator::{AeroState, SpanwiseSectionInterpolator};
pub use loadcase::{Fix, Loadcase, LoadcaseResults, OperatingPoint, Target, RHO_KEY, RPM_KEY};
pub use tables::{SpanTable, CD_COLUMN, CL_COLUMN, REYNOLDS_COLUMN, SPAN_COLUMN};

/// External vortex-method solver
pub trait VortexMethod {
    /// Solve one loadcase of the propeller
    fn solve(&self, propeller: &Propeller, loadcase: &Loadcase) -> BladeResult<LoadcaseResults>;
}

/// Which spanwise results to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadSelector {
    /// A single loadcase by index
    Loadcase(usize),
    /// The load envelope
    Envelope,
}

/// One planform station
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanformStation {
    /// Relative span r/R
    pub rel_span: f64,
    /// Chord over tip radius c/R
    pub chord_ratio: f64,
    /// Twist in degrees
    pub twist: f64,
}

/// Airfoil defined at a relative span
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub rel_span: f64,
    pub airfoil: Arc<Airfoil>,
}

/// Position of a span between the defined sections
#[derive(Debug, Clone, Copy)]
pub(crate) enum Bracket {
    /// Outside (or on the boundary of) the defined range
    Clamped(usize),
    /// Between two sections, `fraction` of the second one
    Between(usize, usize, f64),
}

/// Locate `rel_span` in span-sorted sections
pub(crate) fn bracket(sections: &[Section], rel_span: f64) -> BladeResult<Bracket> {
    let last = sections
        .len()
        .checked_sub(1)
        .ok_or_else(|| BladeError::InvalidInput("propeller has no airfoil sections".to_string()))?;

    if rel_span <= sections[0].rel_span {
        return Ok(Bracket::Clamped(0));
    }
    if rel_span >= sections[last].rel_span {
        return Ok(Bracket::Clamped(last));
    }
    // first section strictly beyond rel_span
    let right = sections.partition_point(|s| s.rel_span <= rel_span);
    let left = right - 1;
    let fraction = (rel_span - sections[left].rel_span) / (sections[right].rel_span - sections[left].rel_span);
    Ok(Bracket::Between(left, right, fraction))
}

/// Cp on the chord grid for every station of an oper table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationPressures {
    /// Relative span of each station
    pub stations: Vec<f64>,
    /// Chord grid
    pub x: Vec<f64>,
    /// `cp_suc[station][grid point]`
    pub cp_suc: Vec<Vec<f64>>,
    pub cp_pres: Vec<Vec<f64>>,
}

/// A propeller with its airfoil sections and loadcases
#[derive(Debug, Clone)]
pub struct Propeller {
    pub number_of_blades: u32,
    /// Tip radius in metres
    pub tip_radius: f64,
    /// Hub radius in metres
    pub hub_radius: f64,
    pub geometry: Vec<PlanformStation>,
    sections: Vec<Section>,
    geometric_sections: Option<Vec<Section>>,
    loadcases: Vec<(Loadcase, Option<LoadcaseResults>)>,
    envelope: Option<LoadEnvelope>,
}

impl Propeller {
    pub fn new(number_of_blades: u32, tip_radius: f64, hub_radius: f64) -> Self {
        Self {
            number_of_blades,
            tip_radius,
            hub_radius,
            geometry: Vec::new(),
            sections: Vec::new(),
            geometric_sections: None,
            loadcases: Vec::new(),
            envelope: None,
        }
    }

    /// Add an aerodynamic section, keeping the list sorted by span
    pub fn add_section(&mut self, rel_span: f64, airfoil: Arc<Airfoil>) {
        insert_sorted(&mut self.sections, Section { rel_span, airfoil });
    }

    /// Add a shape-only section used for element height and offset
    pub fn add_geometric_section(&mut self, rel_span: f64, airfoil: Arc<Airfoil>) {
        let sections = self.geometric_sections.get_or_insert_with(Vec::new);
        insert_sorted(sections, Section { rel_span, airfoil });
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Shape sections, falling back to the aerodynamic ones
    pub fn geometric_sections(&self) -> &[Section] {
        match &self.geometric_sections {
            Some(sections) if !sections.is_empty() => sections,
            _ => &self.sections,
        }
    }

    /// Add a loadcase and return its index
    pub fn add_loadcase(&mut self, loadcase: Loadcase) -> usize {
        self.loadcases.push((loadcase, None));
        self.envelope = None;
        self.loadcases.len() - 1
    }

    pub fn loadcases(&self) -> &[(Loadcase, Option<LoadcaseResults>)] {
        &self.loadcases
    }

    /// Store results for a loadcase solved elsewhere
    pub fn set_results(&mut self, index: usize, results: LoadcaseResults) -> BladeResult<()> {
        let slot = self
            .loadcases
            .get_mut(index)
            .ok_or_else(|| BladeError::InvalidInput(format!("no loadcase with index {}", index)))?;
        slot.1 = Some(results);
        self.envelope = None;
        Ok(())
    }

    /// Run the vortex solver for every loadcase
    pub fn calc_loads(&mut self, vortex: &impl VortexMethod) -> BladeResult<()> {
        for (lc, _) in &self.loadcases {
            if lc.operating_point().is_none() {
                return Err(BladeError::InvalidLoadcaseSpec(format!(
                    "loadcase '{}' has no operating point",
                    lc.name
                )));
            }
        }

        let results = self
            .loadcases
            .iter()
            .map(|(lc, _)| {
                log::info!("solving loadcase '{}' ({})", lc.name, lc.data().join(" "));
                vortex.solve(self, lc)
            })
            .collect::<BladeResult<Vec<_>>>()?;

        for (slot, res) in self.loadcases.iter_mut().zip(results) {
            slot.1 = Some(res);
        }
        self.envelope = None;
        Ok(())
    }

    /// Aggregate all solved loadcases into the load envelope
    pub fn set_load_envelope(&mut self) -> BladeResult<&LoadEnvelope> {
        let envelope = LoadEnvelope::from_loadcases(&self.loadcases)?;
        Ok(self.envelope.insert(envelope))
    }

    pub fn load_envelope(&self) -> BladeResult<&LoadEnvelope> {
        self.envelope.as_ref().ok_or(BladeError::EnvelopeNotReady)
    }

    fn results(&self, index: usize) -> BladeResult<&LoadcaseResults> {
        let (lc, res) = self
            .loadcases
            .get(index)
            .ok_or_else(|| BladeError::InvalidInput(format!("no loadcase with index {}", index)))?;
        res.as_ref()
            .ok_or_else(|| BladeError::LoadcaseNotSolved(lc.name.clone()))
    }

    pub fn oper_table(&self, selector: LoadSelector) -> BladeResult<&SpanTable> {
        match selector {
            LoadSelector::Loadcase(i) => Ok(&self.results(i)?.oper),
            LoadSelector::Envelope => Ok(&self.load_envelope()?.oper),
        }
    }

    pub fn bend_table(&self, selector: LoadSelector) -> BladeResult<&SpanTable> {
        match selector {
            LoadSelector::Loadcase(i) => Ok(&self.results(i)?.bend),
            LoadSelector::Envelope => Ok(&self.load_envelope()?.bend),
        }
    }

    /// Highest rpm reached over all loadcases
    pub fn max_rpm(&self) -> BladeResult<f64> {
        if self.loadcases.is_empty() {
            return Err(BladeError::InvalidInput("propeller has no loadcases".to_string()));
        }
        (0..self.loadcases.len()).try_fold(f64::NEG_INFINITY, |max, i| Ok(max.max(self.results(i)?.rpm()?)))
    }

    /// Air density of the first loadcase in kg/m³
    pub fn air_density(&self) -> BladeResult<f64> {
        if self.loadcases.is_empty() {
            return Err(BladeError::InvalidInput("propeller has no loadcases".to_string()));
        }
        self.results(0)?.rho()
    }

    /// Pressure distribution at every station of the selected oper table.
    ///
    /// Each station runs the panel method at its CL on the bracketing
    /// sections and blends the results by span position.
    pub fn pressure_distribution(
        &self,
        selector: LoadSelector,
        panel: &impl PanelMethod,
    ) -> BladeResult<StationPressures> {
        let table = self.oper_table(selector)?;
        let stations = table.column(SPAN_COLUMN)?;
        let cls = table.column(CL_COLUMN)?;

        let mut out = StationPressures {
            stations: stations.clone(),
            x: chord_grid(),
            cp_suc: Vec::with_capacity(stations.len()),
            cp_pres: Vec::with_capacity(stations.len()),
        };

        for (&rel_span, &cl) in stations.iter().zip(cls.iter()) {
            let dist = self.blended_pressure(rel_span, cl, panel)?;
            out.cp_suc.push(dist.cp_suc);
            out.cp_pres.push(dist.cp_pres);
        }
        Ok(out)
    }

    fn blended_pressure(
        &self,
        rel_span: f64,
        cl: f64,
        panel: &impl PanelMethod,
    ) -> BladeResult<PressureDistribution> {
        let at = |i: usize| self.sections[i].airfoil.cp_vs_x(panel, OperatingMode::Cl(cl));
        match bracket(&self.sections, rel_span)? {
            Bracket::Clamped(i) => at(i),
            Bracket::Between(l, r, fraction) => Ok(at(l)?.blend(&at(r)?, fraction)),
        }
    }
}

fn insert_sorted(sections: &mut Vec<Section>, section: Section) {
    let at = sections.partition_point(|s| s.rel_span <= section.rel_span);
    sections.insert(at, section);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airfoil::AirfoilShape;

    fn airfoil(name: &str) -> Arc<Airfoil> {
        let shape = AirfoilShape::new(vec![[1.0, 0.0], [0.0, 0.0], [1.0, -0.01]]).unwrap();
        Arc::new(Airfoil::new(name, 1e5, shape))
    }

    #[test]
    fn test_sections_sorted() {
        let mut prop = Propeller::new(2, 0.412, 0.04);
        prop.add_section(0.8, airfoil("tip"));
        prop.add_section(0.2, airfoil("root"));
        prop.add_section(0.5, airfoil("mid"));
        let spans: Vec<f64> = prop.sections().iter().map(|s| s.rel_span).collect();
        assert_eq!(spans, vec![0.2, 0.5, 0.8]);
        assert_eq!(prop.geometric_sections().len(), 3);
    }

    #[test]
    fn test_bracket() {
        let mut prop = Propeller::new(2, 0.412, 0.04);
        prop.add_section(0.2, airfoil("a"));
        prop.add_section(0.6, airfoil("b"));
        prop.add_section(1.0, airfoil("c"));

        assert!(matches!(bracket(prop.sections(), 0.1).unwrap(), Bracket::Clamped(0)));
        assert!(matches!(bracket(prop.sections(), 1.2).unwrap(), Bracket::Clamped(2)));
        match bracket(prop.sections(), 0.3).unwrap() {
            Bracket::Between(0, 1, f) => assert!((f - 0.25).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
        match bracket(prop.sections(), 0.6).unwrap() {
            Bracket::Between(1, 2, f) => assert_eq!(f, 0.0),
            other => panic!("unexpected {:?}", other),
        }
        assert!(bracket(&[], 0.5).is_err());
    }

    #[test]
    fn test_unsolved_propeller_errors() {
        let mut prop = Propeller::new(2, 0.412, 0.04);
        assert!(prop.max_rpm().is_err());
        prop.add_loadcase(Loadcase::new("hover", 0.0));
        assert!(matches!(prop.max_rpm(), Err(BladeError::LoadcaseNotSolved(_))));
        assert!(matches!(prop.load_envelope(), Err(BladeError::EnvelopeNotReady)));
        assert!(matches!(
            prop.oper_table(LoadSelector::Loadcase(0)),
            Err(BladeError::LoadcaseNotSolved(_))
        ));
    }
}
