//! Design-variable vector layout

use serde::{Deserialize, Serialize};

use crate::error::{BladeError, BladeResult};

/// Layout of the flat optimizer vector:
/// `leading` unused entries, `globals` shared entries, then
/// `per_section` entries for each of `sections` structural sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignLayout {
    pub leading: usize,
    pub globals: usize,
    pub per_section: usize,
    pub sections: usize,
}

/// Design variables split into global and per-section parts
#[derive(Debug, Clone, PartialEq)]
pub struct DesignVector {
    pub globals: Vec<f64>,
    pub sections: Vec<Vec<f64>>,
}

impl DesignLayout {
    /// Total length of the optimizer vector
    pub fn len(&self) -> usize {
        self.leading + self.globals + self.per_section * self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn unpack(&self, x: &[f64]) -> BladeResult<DesignVector> {
        if x.len() != self.len() {
            return Err(BladeError::InvalidInput(format!(
                "design vector has {} entries, layout expects {}",
                x.len(),
                self.len()
            )));
        }
        let start = self.leading + self.globals;
        let globals = x[self.leading..start].to_vec();
        let sections = x[start..]
            .chunks(self.per_section.max(1))
            .take(self.sections)
            .map(<[f64]>::to_vec)
            .collect();
        Ok(DesignVector { globals, sections })
    }
}

impl DesignVector {
    pub fn section(&self, section: usize) -> BladeResult<&[f64]> {
        self.sections
            .get(section)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                BladeError::InvalidInput(format!(
                    "no design variables for section {} ({} sections)",
                    section,
                    self.sections.len()
                ))
            })
    }
}
