//! Laminate materials by role

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{BladeError, BladeResult};

/// Role of a material in the blade layup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialRole {
    /// Flax fibre prepreg for skins and spar caps
    Flaxpreg,
    /// Balsa core
    Balsa,
}

impl MaterialRole {
    pub const ALL: [MaterialRole; 2] = [MaterialRole::Flaxpreg, MaterialRole::Balsa];
}

/// Material properties and failure criterion values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material number in the FE model
    pub number: u32,
    /// Elastic properties keyed by solver label (EX, EY, PRXY, DENS, ...)
    pub properties: BTreeMap<String, f64>,
    /// Failure criterion strengths keyed by solver label (XTEN, YCMP, ...)
    pub failure: BTreeMap<String, f64>,
}

impl Material {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            properties: BTreeMap::new(),
            failure: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, label: &str, value: f64) -> Self {
        self.properties.insert(label.to_string(), value);
        self
    }

    pub fn with_failure(mut self, label: &str, value: f64) -> Self {
        self.failure.insert(label.to_string(), value);
        self
    }

    /// Read `MP,<label>,<value>` and `FC,<label>,<value>` rows
    pub fn read_csv(number: u32, path: &Path) -> BladeResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut material = Self::new(number);
        for row in reader.records() {
            let row = row?;
            let (kind, label, value) = match (row.get(0), row.get(1), row.get(2)) {
                (Some(k), Some(l), Some(v)) => (k, l, v),
                _ => continue,
            };
            let value: f64 = value.parse().map_err(|_| {
                BladeError::InvalidInput(format!("material {}: invalid value '{}' for {}", number, value, label))
            })?;
            match kind.to_uppercase().as_str() {
                "MP" => {
                    material.properties.insert(label.to_string(), value);
                }
                "FC" => {
                    material.failure.insert(label.to_string(), value);
                }
                other => log::warn!("material {}: unknown row type '{}'", number, other),
            }
        }
        Ok(material)
    }
}

/// Materials for every [`MaterialRole`], validated on construction
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "HashMap<MaterialRole, Material>")]
pub struct MaterialTable {
    materials: HashMap<MaterialRole, Material>,
}

impl TryFrom<HashMap<MaterialRole, Material>> for MaterialTable {
    type Error = BladeError;

    fn try_from(materials: HashMap<MaterialRole, Material>) -> BladeResult<Self> {
        Self::new(materials)
    }
}

impl MaterialTable {
    /// Check that every role has a material
    pub fn new(materials: HashMap<MaterialRole, Material>) -> BladeResult<Self> {
        if let Some(missing) = MaterialRole::ALL.iter().find(|r| !materials.contains_key(*r)) {
            return Err(BladeError::InvalidInput(format!("no material for role {:?}", missing)));
        }
        Ok(Self { materials })
    }

    pub fn from_json(text: &str) -> BladeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn get(&self, role: MaterialRole) -> &Material {
        // presence checked in new()
        &self.materials[&role]
    }

    pub fn number(&self, role: MaterialRole) -> u32 {
        self.get(role).number
    }

    /// Materials ordered by role
    pub fn iter(&self) -> impl Iterator<Item = (MaterialRole, &Material)> {
        MaterialRole::ALL.iter().map(move |r| (*r, self.get(*r)))
    }
}
