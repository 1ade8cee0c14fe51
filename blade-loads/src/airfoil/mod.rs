//! Airfoils, polars and pressure distributions
//!
//! An [`Airfoil`] is built from a coordinate contour, gets its polar once via
//! [`Airfoil::compute_polar`] and is shared read-only afterwards. All solver
//! work goes through the [`PanelMethod`] capability.

pub mod polar;
pub mod pressure;
pub mod shape;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{BladeError, BladeResult};

pub use polar::{piecewise_cl, Characteristics, Polar, PolarRow};
pub use pressure::{ChordSample, PressureDistribution, SurfaceDistribution};
pub use shape::AirfoilShape;

/// How the panel method fixes the operating point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OperatingMode {
    /// Prescribed lift coefficient
    Cl(f64),
    /// Prescribed angle of attack (degrees)
    Alpha(f64),
}

/// Part of a blended contour to keep, as thickness/camber scale factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeComponent {
    /// Full blended airfoil
    Blended,
    /// Symmetric thickness distribution (camber scaled to zero)
    Thickness,
    /// Camber line (thickness scaled to zero)
    Camber,
}

impl ShapeComponent {
    /// `(thickness factor, camber factor)`
    pub fn factors(self) -> (f64, f64) {
        match self {
            ShapeComponent::Blended => (1.0, 1.0),
            ShapeComponent::Thickness => (1.0, 0.0),
            ShapeComponent::Camber => (0.0, 1.0),
        }
    }
}

/// External 2-D panel-method solver
pub trait PanelMethod {
    /// Viscous alpha sweep from 0° to `alpha_end`.
    ///
    /// Points that fail to converge are simply absent.
    fn alpha_sweep(&self, airfoil: &Airfoil, alpha_end: f64, increment: f64) -> BladeResult<Vec<PolarRow>>;

    /// Surface pressure and skin friction at one operating point
    fn pressure(&self, airfoil: &Airfoil, mode: OperatingMode) -> BladeResult<SurfaceDistribution>;

    /// Geometric blend of two contours, `fraction` of the second one kept
    fn blend(
        &self,
        first: &AirfoilShape,
        second: &AirfoilShape,
        fraction: f64,
        component: ShapeComponent,
    ) -> BladeResult<AirfoilShape>;
}

/// Output of [`Airfoil::interpolate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendedShapes {
    pub blended: AirfoilShape,
    /// Symmetric airfoil of the blended thickness
    pub thickness: AirfoilShape,
    pub camber: AirfoilShape,
}

/// A 2-D airfoil at a fixed Reynolds number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airfoil {
    pub name: String,
    pub reynolds: f64,
    /// Transition amplification exponent
    pub ncrit: f64,
    /// Viscous iteration limit
    pub iter_limit: u32,
    pub shape: AirfoilShape,
    polar: Option<Polar>,
    characteristics: Option<Characteristics>,
}

impl Airfoil {
    pub fn new(name: &str, reynolds: f64, shape: AirfoilShape) -> Self {
        Self {
            name: name.to_string(),
            reynolds,
            ncrit: 9.0,
            iter_limit: 200,
            shape,
            polar: None,
            characteristics: None,
        }
    }

    /// Load a coordinate file, named after the file stem
    pub fn from_file(path: &Path, reynolds: f64) -> BladeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "airfoil".to_string());
        Ok(Self::new(&name, reynolds, AirfoilShape::parse(&text)?))
    }

    pub fn with_ncrit(mut self, ncrit: f64) -> Self {
        self.ncrit = ncrit;
        self
    }

    pub fn with_iter_limit(mut self, iter_limit: u32) -> Self {
        self.iter_limit = iter_limit;
        self
    }

    /// Compute the polar and derive the vortex-solver characteristics.
    ///
    /// Runs two sweeps outward from 0°, one down to `alpha_start` and one up
    /// to `alpha_stop`, and merges them into a strictly increasing table.
    pub fn compute_polar(
        &mut self,
        panel: &impl PanelMethod,
        alpha_start: f64,
        alpha_stop: f64,
        alpha_inc: f64,
    ) -> BladeResult<&Polar> {
        if !(alpha_inc > 0.0) {
            return Err(BladeError::InvalidInput(format!(
                "alpha increment must be positive, got {}",
                alpha_inc
            )));
        }

        let sweeps = vec![
            panel.alpha_sweep(self, alpha_start, alpha_inc)?,
            panel.alpha_sweep(self, alpha_stop, alpha_inc)?,
        ];
        let rows = Polar::merge(sweeps);
        log::debug!(
            "{}: {} converged polar points between {}° and {}°",
            self.name,
            rows.len(),
            alpha_start,
            alpha_stop
        );

        let polar = Polar::from_rows(rows)?;
        let characteristics = polar.characteristics()?;
        log::debug!("{}: {:?}", self.name, characteristics);

        self.characteristics = Some(characteristics);
        Ok(self.polar.insert(polar))
    }

    pub fn polar(&self) -> Option<&Polar> {
        self.polar.as_ref()
    }

    /// Characteristics for the vortex-method solver
    pub fn characteristics(&self) -> BladeResult<&Characteristics> {
        self.characteristics
            .as_ref()
            .ok_or_else(|| BladeError::MissingPolar(self.name.clone()))
    }

    /// Replace fitted characteristics with hand-tuned values
    pub fn set_characteristics(&mut self, characteristics: Characteristics) {
        self.characteristics = Some(characteristics);
    }

    /// Pressure distribution normalized onto the 99-point chord grid
    pub fn cp_vs_x(&self, panel: &impl PanelMethod, mode: OperatingMode) -> BladeResult<PressureDistribution> {
        PressureDistribution::from_surface(&panel.pressure(self, mode)?)
    }

    /// Blend two airfoils and decompose the result into thickness and camber
    pub fn interpolate(
        first: &Airfoil,
        second: &Airfoil,
        fraction: f64,
        panel: &impl PanelMethod,
    ) -> BladeResult<BlendedShapes> {
        let run = |component| panel.blend(&first.shape, &second.shape, fraction, component);
        Ok(BlendedShapes {
            blended: run(ShapeComponent::Blended)?,
            thickness: run(ShapeComponent::Thickness)?,
            camber: run(ShapeComponent::Camber)?,
        })
    }
}
