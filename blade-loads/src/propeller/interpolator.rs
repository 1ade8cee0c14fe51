//! Aerodynamic state and airfoil shape at arbitrary span positions

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::tables::{CD_COLUMN, CL_COLUMN, REYNOLDS_COLUMN, SPAN_COLUMN};
use super::{bracket, Bracket, LoadSelector, Propeller, Section};
use crate::airfoil::{Airfoil, BlendedShapes, OperatingMode, PanelMethod, PressureDistribution};
use crate::error::{BladeError, BladeResult};
use crate::math::round_to;

/// Local aerodynamic state of a blade element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AeroState {
    pub cl: f64,
    pub cd: f64,
    /// Reynolds number
    pub re: f64,
    /// Angle of attack in degrees
    pub alpha: f64,
    pub cp_suc: f64,
    pub cp_pres: f64,
    /// Skin friction of both surfaces
    pub cf: f64,
}

/// Spanwise operating point read from an oper table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanOperatingPoint {
    pub cl: f64,
    pub cd: f64,
    pub re: f64,
}

/// Interpolates aerodynamic data along the span.
///
/// Panel-method results are cached, so repeated queries for elements on the
/// same station do not rerun the solver.
pub struct SpanwiseSectionInterpolator<'a, P: PanelMethod> {
    propeller: &'a Propeller,
    panel: &'a P,
    selector: LoadSelector,
    pressures: RefCell<HashMap<(usize, u64), Rc<PressureDistribution>>>,
    shapes: RefCell<HashMap<u64, Rc<BlendedShapes>>>,
}

impl<'a, P: PanelMethod> SpanwiseSectionInterpolator<'a, P> {
    pub fn new(propeller: &'a Propeller, panel: &'a P, selector: LoadSelector) -> Self {
        Self {
            propeller,
            panel,
            selector,
            pressures: RefCell::new(HashMap::new()),
            shapes: RefCell::new(HashMap::new()),
        }
    }

    pub fn propeller(&self) -> &Propeller {
        self.propeller
    }

    pub fn selector(&self) -> LoadSelector {
        self.selector
    }

    /// CL, CD and Reynolds number at `rel_span`.
    ///
    /// Linear in span between the tabulated stations, clamped at the ends.
    /// Non-finite table entries are skipped; a column without any finite
    /// entry is an error.
    pub fn operating_point(&self, rel_span: f64) -> BladeResult<SpanOperatingPoint> {
        let table = self.propeller.oper_table(self.selector)?;
        let row = table.interpolate_at(SPAN_COLUMN, rel_span)?;
        let value = |name: &str| -> BladeResult<f64> {
            let v = row[table.column_index(name)?];
            if !v.is_finite() {
                return Err(BladeError::InvalidInput(format!(
                    "oper table has no finite {} at r/R = {:.4}",
                    name, rel_span
                )));
            }
            Ok(v)
        };

        Ok(SpanOperatingPoint {
            cl: value(CL_COLUMN)?,
            cd: value(CD_COLUMN)?,
            re: value(REYNOLDS_COLUMN)? * 1000.0,
        })
    }

    /// Aerodynamic state at a chord and span position.
    ///
    /// Outside the section range the boundary airfoil supplies the pressure
    /// distribution, inside it the two bracketing airfoils are blended.
    pub fn state(&self, rel_chord: f64, rel_span: f64) -> BladeResult<AeroState> {
        let op = self.operating_point(rel_span)?;
        let sections = self.propeller.sections();

        let dist = match bracket(sections, rel_span)? {
            Bracket::Clamped(i) => self.pressure(sections, i, op.cl)?,
            Bracket::Between(l, r, fraction) => {
                let left = self.pressure(sections, l, op.cl)?;
                let right = self.pressure(sections, r, op.cl)?;
                Rc::new(left.blend(&right, fraction))
            }
        };

        let sample = dist.at(rel_chord);
        Ok(AeroState {
            cl: op.cl,
            cd: op.cd,
            re: op.re,
            alpha: dist.alpha,
            cp_suc: sample.cp_suc,
            cp_pres: sample.cp_pres,
            cf: sample.cf,
        })
    }

    /// Blended shape, thickness and camber line at `rel_span`, rounded to
    /// four digits
    pub fn get_airfoil(&self, rel_span: f64) -> BladeResult<Rc<BlendedShapes>> {
        let rel_span = round_to(rel_span, 4);
        let key = rel_span.to_bits();
        if let Some(hit) = self.shapes.borrow().get(&key) {
            return Ok(Rc::clone(hit));
        }

        let sections = self.propeller.geometric_sections();
        let shapes = match bracket(sections, rel_span)? {
            Bracket::Clamped(i) => {
                let airfoil = &sections[i].airfoil;
                Airfoil::interpolate(airfoil, airfoil, 0.0, self.panel)?
            }
            Bracket::Between(l, r, fraction) => {
                Airfoil::interpolate(&sections[l].airfoil, &sections[r].airfoil, fraction, self.panel)?
            }
        };

        let shapes = Rc::new(shapes);
        self.shapes.borrow_mut().insert(key, Rc::clone(&shapes));
        Ok(shapes)
    }

    fn pressure(&self, sections: &[Section], index: usize, cl: f64) -> BladeResult<Rc<PressureDistribution>> {
        let key = (index, cl.to_bits());
        if let Some(hit) = self.pressures.borrow().get(&key) {
            return Ok(Rc::clone(hit));
        }
        let dist = Rc::new(sections[index].airfoil.cp_vs_x(self.panel, OperatingMode::Cl(cl))?);
        self.pressures.borrow_mut().insert(key, Rc::clone(&dist));
        Ok(dist)
    }
}
