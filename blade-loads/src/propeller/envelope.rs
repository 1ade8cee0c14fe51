//! Worst-case load distribution over all loadcases

use serde::{Deserialize, Serialize};

use super::loadcase::{Loadcase, LoadcaseResults};
use super::tables::SpanTable;
use crate::error::{BladeError, BladeResult};

/// Station-wise maximum of the `oper` and `bend` tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadEnvelope {
    pub oper: SpanTable,
    pub bend: SpanTable,
}

impl LoadEnvelope {
    /// Build the envelope. Every loadcase must have been solved.
    pub fn from_loadcases(loadcases: &[(Loadcase, Option<LoadcaseResults>)]) -> BladeResult<Self> {
        if loadcases.is_empty() {
            return Err(BladeError::InvalidInput(
                "load envelope needs at least one loadcase".to_string(),
            ));
        }

        let results = loadcases
            .iter()
            .map(|(lc, res)| {
                res.as_ref()
                    .ok_or_else(|| BladeError::LoadcaseNotSolved(lc.name.clone()))
            })
            .collect::<BladeResult<Vec<_>>>()?;

        let envelope = Self {
            oper: SpanTable::envelope(results.iter().map(|r| &r.oper))?,
            bend: SpanTable::envelope(results.iter().map(|r| &r.bend))?,
        };
        log::debug!(
            "load envelope over {} loadcases: {} oper / {} bend stations",
            results.len(),
            envelope.oper.len(),
            envelope.bend.len()
        );
        Ok(envelope)
    }
}
