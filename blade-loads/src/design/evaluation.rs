//! Optimizer-facing evaluation of a design vector

use serde::{Deserialize, Serialize};

use super::layup::{apply_design, BladeVariant, SectionSink};
use super::material::MaterialTable;
use super::variables::{DesignLayout, DesignVector};
use crate::error::{BladeError, BladeResult};
use crate::structure::ElementData;

/// Objective scale: blade mass in tonne to grams
pub const MASS_SCALE: f64 = 1e6;

/// FE session able to take a layup, solve and report failure results
pub trait StructuralSession: SectionSink {
    /// Load the preprocessed model with mesh, loads and materials
    fn read_base_model(&mut self) -> BladeResult<()>;
    fn solve(&mut self) -> BladeResult<()>;
    /// Maximum Puck fibre and inter-fibre failure index over all layers
    /// of the given elements
    fn failure_indices(&mut self, elements: &[usize]) -> BladeResult<(f64, f64)>;
    /// Total mass of the model in tonne
    fn total_mass(&mut self) -> BladeResult<f64>;
    /// Clear the model for the next evaluation
    fn reset(&mut self) -> BladeResult<()>;
    /// Replace a session that stopped responding
    fn restart(&mut self) -> BladeResult<()>;
}

/// Result of one design evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub objective: f64,
    pub constraints: Vec<f64>,
    pub failed: bool,
}

impl Evaluation {
    fn failed(constraints: usize) -> Self {
        Self {
            objective: f64::INFINITY,
            constraints: vec![f64::INFINITY; constraints],
            failed: true,
        }
    }
}

/// Evaluates design vectors of one blade variant on an element table
pub struct Evaluator<'a, V: BladeVariant> {
    data: &'a ElementData,
    variant: V,
    materials: MaterialTable,
    sections: usize,
}

impl<'a, V: BladeVariant> Evaluator<'a, V> {
    pub fn new(data: &'a ElementData, variant: V, materials: MaterialTable, sections: usize) -> Self {
        Self {
            data,
            variant,
            materials,
            sections,
        }
    }

    pub fn layout(&self) -> DesignLayout {
        self.variant.layout(self.sections)
    }

    pub fn variant(&self) -> &V {
        &self.variant
    }

    /// Fibre and inter-fibre constraint per section
    pub fn constraint_count(&self) -> usize {
        2 * self.sections
    }

    /// Evaluate `x` and return (objective, constraints, failed).
    ///
    /// A solver timeout is retried once in a restarted session; a second
    /// timeout or a solver run that fails yields a failed evaluation
    /// instead of an error. Invalid design vectors and geometry errors
    /// are returned as errors.
    pub fn evaluate(&self, session: &mut impl StructuralSession, x: &[f64]) -> BladeResult<Evaluation> {
        let design = self.layout().unpack(x)?;

        let mut outcome = self.run(session, &design);
        if let Err(e) = &outcome {
            if e.is_retryable() {
                log::warn!("evaluation interrupted ({}), restarting session", e);
                session.restart()?;
                outcome = self.run(session, &design);
            }
        }

        match outcome {
            Err(e) if e.is_retryable() => {
                log::error!("evaluation failed after restart: {}", e);
                session.restart()?;
                Ok(Evaluation::failed(self.constraint_count()))
            }
            Err(BladeError::Solver(detail)) => {
                log::error!("evaluation failed: {}", detail);
                Ok(Evaluation::failed(self.constraint_count()))
            }
            result => result,
        }
    }

    /// One read, apply, solve, post-process pass. The model is reset
    /// afterwards unless the session has to be restarted.
    fn run(&self, session: &mut impl StructuralSession, design: &DesignVector) -> BladeResult<Evaluation> {
        let result = self.solve_design(session, design);
        match &result {
            Ok(_) => session.reset()?,
            Err(e) if !e.is_retryable() => {
                if let Err(reset) = session.reset() {
                    log::warn!("could not reset model after failed evaluation: {}", reset);
                }
            }
            Err(_) => {}
        }
        result
    }

    fn solve_design(&self, session: &mut impl StructuralSession, design: &DesignVector) -> BladeResult<Evaluation> {
        session.read_base_model()?;
        apply_design(self.data, &self.variant, design, &self.materials, &mut *session)?;
        session.solve()?;

        let mut fibre = Vec::with_capacity(self.sections);
        let mut matrix = Vec::with_capacity(self.sections);
        for section in 0..self.sections {
            let elements = self.data.section_elements(section);
            let (f, m) = if elements.is_empty() {
                log::debug!("section {} has no elements", section);
                (0.0, 0.0)
            } else {
                session.failure_indices(&elements)?
            };
            fibre.push(f);
            matrix.push(m);
        }
        let mass = session.total_mass()?;

        Ok(Evaluation {
            objective: mass * MASS_SCALE,
            constraints: self.variant.constraints(&fibre, &matrix),
            failed: false,
        })
    }
}
