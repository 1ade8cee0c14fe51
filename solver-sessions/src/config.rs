//! Solver locations from the environment and the propeller description file

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use blade_loads::airfoil::{Airfoil, Characteristics, PanelMethod};
use blade_loads::error::BladeResult;
use blade_loads::propeller::{Loadcase, PlanformStation, Propeller};

use crate::error::{SessionError, SessionResult};

pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Where the external solvers live and how long they may run
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub xfoil: PathBuf,
    pub xrotor: PathBuf,
    pub timeout: Duration,
    /// Directory the airfoil coordinate files are read from
    pub airfoil_database: PathBuf,
    /// Parent of the session directories, system temp dir if unset
    pub work_dir: Option<PathBuf>,
    /// Copy every session's files here before cleanup
    pub debug_export: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            xfoil: PathBuf::from("xfoil"),
            xrotor: PathBuf::from("xrotor"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            airfoil_database: PathBuf::from("./airfoil-database"),
            work_dir: None,
            debug_export: None,
        }
    }
}

impl SolverConfig {
    pub fn from_env() -> SessionResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SessionResult<Self> {
        let timeout = match lookup("SOLVER_TIMEOUT_SECS") {
            Some(v) => v.trim().parse::<u64>().map_err(|_| {
                SessionError::Config(format!("SOLVER_TIMEOUT_SECS must be whole seconds, got '{}'", v))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            xfoil: resolve_executable(lookup("XFOIL_PATH"), "xfoil"),
            xrotor: resolve_executable(lookup("XROTOR_PATH"), "xrotor"),
            timeout: Duration::from_secs(timeout),
            airfoil_database: lookup("AIRFOIL_DATABASE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./airfoil-database")),
            work_dir: lookup("SESSION_WORK_DIR").map(PathBuf::from),
            debug_export: lookup("SESSION_DEBUG_EXPORT").map(PathBuf::from),
        })
    }
}

/// Explicit path, else a repo-local `./bin/<name>`, else `name` on PATH.
///
/// Sessions run inside their own temp directory, so relative paths are made
/// absolute when the file exists.
pub fn resolve_executable(explicit: Option<String>, name: &str) -> PathBuf {
    let path = explicit.unwrap_or_else(|| {
        let local = Path::new("./bin").join(name);
        if local.exists() {
            local.to_string_lossy().into_owned()
        } else {
            name.to_string()
        }
    });
    std::fs::canonicalize(&path).unwrap_or_else(|_| PathBuf::from(path))
}

/// Alpha sweep used for every airfoil polar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarSweep {
    pub alpha_start: f64,
    pub alpha_stop: f64,
    pub alpha_inc: f64,
}

impl Default for PolarSweep {
    fn default() -> Self {
        Self {
            alpha_start: -20.0,
            alpha_stop: 20.0,
            alpha_inc: 0.25,
        }
    }
}

/// Hand-tuned replacements for fitted characteristics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacteristicOverrides {
    pub zero_lift_alpha: Option<f64>,
    pub lift_slope: Option<f64>,
    pub cl_max: Option<f64>,
    pub cl_min: Option<f64>,
    pub cd_min: Option<f64>,
    pub cl_at_cd_min: Option<f64>,
    pub dcd_dcl2: Option<f64>,
    pub cm: Option<f64>,
}

impl CharacteristicOverrides {
    pub fn apply(&self, c: Characteristics) -> Characteristics {
        Characteristics {
            zero_lift_alpha: self.zero_lift_alpha.unwrap_or(c.zero_lift_alpha),
            lift_slope: self.lift_slope.unwrap_or(c.lift_slope),
            cl_max: self.cl_max.unwrap_or(c.cl_max),
            cl_min: self.cl_min.unwrap_or(c.cl_min),
            cd_min: self.cd_min.unwrap_or(c.cd_min),
            cl_at_cd_min: self.cl_at_cd_min.unwrap_or(c.cl_at_cd_min),
            dcd_dcl2: self.dcd_dcl2.unwrap_or(c.dcd_dcl2),
            cm: self.cm.unwrap_or(c.cm),
        }
    }
}

fn default_ncrit() -> f64 {
    9.0
}

fn default_iter_limit() -> u32 {
    200
}

/// Airfoil placed at a relative span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub rel_span: f64,
    /// Coordinate file name inside the airfoil database
    pub airfoil: String,
    pub reynolds: f64,
    #[serde(default = "default_ncrit")]
    pub ncrit: f64,
    #[serde(default = "default_iter_limit")]
    pub iter_limit: u32,
    #[serde(default)]
    pub overrides: Option<CharacteristicOverrides>,
}

impl SectionConfig {
    fn load(&self, database: &Path) -> BladeResult<Airfoil> {
        let airfoil = Airfoil::from_file(&database.join(&self.airfoil), self.reynolds)?;
        Ok(airfoil.with_ncrit(self.ncrit).with_iter_limit(self.iter_limit))
    }
}

/// Loadcase in solver keywords, see [`Loadcase::set_data`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadcaseConfig {
    pub name: String,
    pub flight_speed: f64,
    pub prescribe: String,
    pub value: f64,
    #[serde(default)]
    pub fix: Option<String>,
    #[serde(default)]
    pub value2: Option<f64>,
}

impl LoadcaseConfig {
    pub fn to_loadcase(&self) -> BladeResult<Loadcase> {
        let mut loadcase = Loadcase::new(&self.name, self.flight_speed);
        loadcase.set_data(&self.prescribe, self.value, self.fix.as_deref(), self.value2)?;
        Ok(loadcase)
    }
}

/// Propeller description read by `prop-loads`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropellerConfig {
    pub number_of_blades: u32,
    /// Metres
    pub tip_radius: f64,
    /// Metres
    pub hub_radius: f64,
    pub geometry: Vec<PlanformStation>,
    pub sections: Vec<SectionConfig>,
    /// Shape-only sections for element height and offset
    #[serde(default)]
    pub geometric_sections: Vec<SectionConfig>,
    #[serde(default)]
    pub polar: PolarSweep,
    pub loadcases: Vec<LoadcaseConfig>,
}

impl PropellerConfig {
    pub fn from_json(text: &str) -> SessionResult<Self> {
        serde_json::from_str(text).map_err(|e| SessionError::Config(format!("invalid propeller file: {}", e)))
    }

    pub fn read(path: &Path) -> SessionResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Load the airfoils, compute their polars and set up the loadcases.
    ///
    /// Loadcases are validated before any solver runs.
    pub fn build(&self, database: &Path, panel: &impl PanelMethod) -> BladeResult<Propeller> {
        let loadcases = self
            .loadcases
            .iter()
            .map(LoadcaseConfig::to_loadcase)
            .collect::<BladeResult<Vec<_>>>()?;

        let mut propeller = Propeller::new(self.number_of_blades, self.tip_radius, self.hub_radius);
        propeller.geometry = self.geometry.clone();

        for section in &self.sections {
            let mut airfoil = section.load(database)?;
            tracing::info!("computing polar of {} at r/R = {}", airfoil.name, section.rel_span);
            airfoil.compute_polar(panel, self.polar.alpha_start, self.polar.alpha_stop, self.polar.alpha_inc)?;
            if let Some(overrides) = &section.overrides {
                let tuned = overrides.apply(*airfoil.characteristics()?);
                airfoil.set_characteristics(tuned);
            }
            propeller.add_section(section.rel_span, Arc::new(airfoil));
        }
        for section in &self.geometric_sections {
            propeller.add_geometric_section(section.rel_span, Arc::new(section.load(database)?));
        }
        for loadcase in loadcases {
            propeller.add_loadcase(loadcase);
        }
        Ok(propeller)
    }
}
