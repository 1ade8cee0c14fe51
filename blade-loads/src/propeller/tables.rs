//! Spanwise result tables

use serde::{Deserialize, Serialize};

use crate::error::{BladeError, BladeResult};
use crate::math::Samples;

/// Relative span column of the solver tables
pub const SPAN_COLUMN: &str = "r/R";
pub const CL_COLUMN: &str = "CL";
pub const CD_COLUMN: &str = "Cd";
/// Reynolds number in thousands
pub const REYNOLDS_COLUMN: &str = "REx10^3";

/// Numeric table with named columns, one row per spanwise station
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpanTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl SpanTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<f64>) -> BladeResult<()> {
        if row.len() != self.columns.len() {
            return Err(BladeError::InvalidInput(format!(
                "row has {} values, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> BladeResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| BladeError::InvalidInput(format!("table has no column '{}'", name)))
    }

    pub fn column(&self, name: &str) -> BladeResult<Vec<f64>> {
        let i = self.column_index(name)?;
        self.column_at(i)
    }

    fn column_at(&self, i: usize) -> BladeResult<Vec<f64>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(k, r)| {
                r.get(i).copied().ok_or_else(|| {
                    BladeError::InvalidInput(format!(
                        "row {} has {} values, table has {} columns",
                        k,
                        r.len(),
                        self.columns.len()
                    ))
                })
            })
            .collect()
    }

    /// Every row holds one value per column.
    ///
    /// `push_row` keeps this by construction; deserialized tables are
    /// checked here.
    pub fn validate(&self) -> BladeResult<()> {
        match self.rows.iter().position(|r| r.len() != self.columns.len()) {
            Some(k) => Err(BladeError::InvalidInput(format!(
                "row {} has {} values, table has {} columns",
                k,
                self.rows[k].len(),
                self.columns.len()
            ))),
            None => Ok(()),
        }
    }

    /// Every column linearly interpolated at `key_value` of the key column.
    ///
    /// The result is exact when `key_value` is a tabulated station and
    /// clamped to the first/last station outside the table. A column with no
    /// finite data yields NaN.
    pub fn interpolate_at(&self, key_column: &str, key_value: f64) -> BladeResult<Vec<f64>> {
        self.validate()?;
        let key = self.column(key_column)?;
        (0..self.columns.len())
            .map(|c| {
                let values = self.column_at(c)?;
                Ok(Samples::from_columns(&key, &values)
                    .map(|s| s.at(key_value))
                    .unwrap_or(f64::NAN))
            })
            .collect()
    }

    /// Row-wise maximum over several tables with identical columns.
    ///
    /// Rows are matched by position; a station missing from some tables
    /// takes the maximum of the tables that have it.
    pub fn envelope<'a, I>(tables: I) -> BladeResult<Self>
    where
        I: IntoIterator<Item = &'a SpanTable>,
    {
        let mut iter = tables.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| BladeError::InvalidInput("envelope of no tables".to_string()))?;
        first.validate()?;
        let mut out = first.clone();

        for table in iter {
            table.validate()?;
            if table.columns != out.columns {
                return Err(BladeError::InvalidInput(format!(
                    "envelope tables differ in columns: {:?} vs {:?}",
                    out.columns, table.columns
                )));
            }
            for (i, row) in table.rows.iter().enumerate() {
                match out.rows.get_mut(i) {
                    Some(current) => {
                        for (a, b) in current.iter_mut().zip(row.iter()) {
                            *a = a.max(*b);
                        }
                    }
                    None => out.rows.push(row.clone()),
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[[f64; 3]]) -> SpanTable {
        let mut t = SpanTable::new(vec![SPAN_COLUMN.into(), CL_COLUMN.into(), CD_COLUMN.into()]);
        for r in rows {
            t.push_row(r.to_vec()).unwrap();
        }
        t
    }

    #[test]
    fn test_interpolate_exact_at_station() {
        let t = table(&[[0.2, 0.5, 0.01], [0.5, 0.7, 0.012], [0.9, 0.4, 0.02]]);
        assert_eq!(t.interpolate_at(SPAN_COLUMN, 0.5).unwrap(), vec![0.5, 0.7, 0.012]);
        assert_eq!(t.interpolate_at(SPAN_COLUMN, 0.05).unwrap(), vec![0.2, 0.5, 0.01]);
        let mid = t.interpolate_at(SPAN_COLUMN, 0.7).unwrap();
        assert!((mid[1] - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_envelope_takes_max() {
        let a = table(&[[0.2, 0.5, 0.03], [0.5, 0.9, 0.01]]);
        let b = table(&[[0.2, 0.6, 0.02], [0.5, 0.7, 0.02], [0.9, 0.1, 0.1]]);
        let env = SpanTable::envelope([&a, &b]).unwrap();
        assert_eq!(env.rows, vec![vec![0.2, 0.6, 0.03], vec![0.5, 0.9, 0.02], vec![0.9, 0.1, 0.1]]);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let t: SpanTable = serde_json::from_str(
            r#"{"columns": ["r/R", "CL", "Cd"], "rows": [[0.2, 0.5, 0.01], [0.5, 0.7]]}"#,
        )
        .unwrap();
        assert!(matches!(t.validate(), Err(BladeError::InvalidInput(_))));
        assert!(t.column(CL_COLUMN).is_ok());
        assert!(matches!(t.column(CD_COLUMN), Err(BladeError::InvalidInput(_))));
        assert!(matches!(
            t.interpolate_at(SPAN_COLUMN, 0.3),
            Err(BladeError::InvalidInput(_))
        ));

        let full = table(&[[0.2, 0.5, 0.01], [0.5, 0.7, 0.012]]);
        assert!(full.validate().is_ok());
        assert!(SpanTable::envelope([&full, &t]).is_err());
    }

    #[test]
    fn test_envelope_rejects_mismatched_columns() {
        let a = table(&[[0.2, 0.5, 0.03]]);
        let b = SpanTable::new(vec![SPAN_COLUMN.into()]);
        assert!(SpanTable::envelope([&a, &b]).is_err());
    }
}
