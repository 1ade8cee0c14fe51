//! Mock solvers and a small test propeller shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use blade_loads::airfoil::{piecewise_cl, AirfoilShape, ShapeComponent};
use blade_loads::prelude::*;
use blade_loads::propeller::{OperatingPoint, SPAN_COLUMN};
use blade_loads::structure::ChordStation;
use blade_loads::units::UnitSystem;

/// CL(alpha) parameters of every mock airfoil: zero lift at -3°, slope 0.1/°
pub const CL_PARAMS: [f64; 6] = [-4.0, 8.0, -0.01, 0.06, 0.26, 0.3];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Contour with thickness `t` and camber `m` (both at half chord),
/// ordered trailing edge, upper surface, leading edge, lower surface
pub fn contour(t: f64, m: f64) -> AirfoilShape {
    let half = |x: f64| 2.0 * t * x * (1.0 - x);
    let camber = |x: f64| 4.0 * m * x * (1.0 - x);
    let upper = (0..=20).rev().map(|i| i as f64 / 20.0).map(|x| [x, camber(x) + half(x)]);
    let lower = (1..=20).map(|i| i as f64 / 20.0).map(|x| [x, camber(x) - half(x)]);
    AirfoilShape::new(upper.chain(lower).collect()).unwrap()
}

/// Thickness and camber of a [`contour`] at half chord
pub fn thickness_camber_at_half(shape: &AirfoilShape) -> (f64, f64) {
    let at_half: Vec<f64> = shape
        .points
        .iter()
        .filter(|p| (p[0] - 0.5).abs() < 1e-12)
        .map(|p| p[1])
        .collect();
    let (upper, lower) = (at_half[0], at_half[1]);
    (upper - lower, 0.5 * (upper + lower))
}

/// Panel method answering from closed-form distributions
#[derive(Debug, Default)]
pub struct MockPanel;

impl MockPanel {
    pub fn alpha_at(cl: f64) -> f64 {
        (cl - CL_PARAMS[5]) / 0.1
    }
}

impl PanelMethod for MockPanel {
    fn alpha_sweep(&self, _airfoil: &Airfoil, alpha_end: f64, increment: f64) -> BladeResult<Vec<PolarRow>> {
        let steps = (alpha_end.abs() / increment).round() as i32;
        Ok((0..=steps)
            .map(|i| alpha_end.signum() * increment * i as f64)
            .map(|a| {
                let cl = piecewise_cl(a, &CL_PARAMS);
                PolarRow {
                    alpha: a,
                    cl,
                    cd: 0.01 + 0.008 * (cl - 0.4).powi(2),
                    cdp: 0.004,
                    cm: -0.08 - 0.001 * a,
                    top_xtr: 0.6,
                    bot_xtr: 0.9,
                }
            })
            .collect())
    }

    fn pressure(&self, airfoil: &Airfoil, mode: OperatingMode) -> BladeResult<SurfaceDistribution> {
        let (alpha, cl) = match mode {
            OperatingMode::Cl(cl) => (Self::alpha_at(cl), cl),
            OperatingMode::Alpha(a) => (a, piecewise_cl(a, &CL_PARAMS)),
        };
        let (t, _) = thickness_camber_at_half(&airfoil.shape);
        let upper = (0..=20).rev().map(|i| i as f64 / 20.0);
        let lower = (1..=20).map(|i| i as f64 / 20.0);

        let mut dist = SurfaceDistribution {
            alpha,
            x: Vec::new(),
            cp: Vec::new(),
            cf: Vec::new(),
        };
        for x in upper {
            dist.x.push(x);
            dist.cp.push(-(0.5 + cl + 2.0 * t) * (1.0 - x));
            dist.cf.push(0.005);
        }
        for x in lower {
            dist.x.push(x);
            dist.cp.push(0.3 * (1.0 - x));
            dist.cf.push(0.003);
        }
        Ok(dist)
    }

    fn blend(
        &self,
        first: &AirfoilShape,
        second: &AirfoilShape,
        fraction: f64,
        component: ShapeComponent,
    ) -> BladeResult<AirfoilShape> {
        let (t1, m1) = thickness_camber_at_half(first);
        let (t2, m2) = thickness_camber_at_half(second);
        let (tf, cf) = component.factors();
        let t = t1 * (1.0 - fraction) + t2 * fraction;
        let m = m1 * (1.0 - fraction) + m2 * fraction;
        Ok(contour(t * tf, m * cf))
    }
}

/// Vortex method producing a synthetic oper table scaled with rpm
#[derive(Debug, Default)]
pub struct MockVortex;

pub const OPER_COLUMNS: [&str; 11] = [
    "i", "r/R", "c/R", "beta(deg)", "CL", "Cd", "REx10^3", "Mach", "effi", "effp", "na.u/U",
];

impl VortexMethod for MockVortex {
    fn solve(&self, _propeller: &Propeller, loadcase: &Loadcase) -> BladeResult<LoadcaseResults> {
        let rpm = match loadcase.operating_point() {
            Some(OperatingPoint::Rpm(rpm)) => *rpm,
            _ => 3000.0,
        };
        let k = rpm / 3000.0;

        let mut oper = SpanTable::new(OPER_COLUMNS.iter().map(|c| c.to_string()).collect());
        let mut bend = SpanTable::new(vec![SPAN_COLUMN.to_string(), "Mz".to_string(), "T".to_string()]);
        for i in 0..12 {
            let r = 0.12 + 0.08 * i as f64;
            oper.push_row(vec![
                (i + 1) as f64,
                r,
                0.1,
                30.0 - 15.0 * r,
                (0.2 + 0.5 * r) * k,
                0.012 + 0.002 * r,
                120.0 * r * k,
                0.3 * r * k,
                0.8,
                0.85,
                0.0,
            ])?;
            bend.push_row(vec![r, 2.0 * (1.0 - r) * k, 150.0 * (1.0 - r * r) * k * k])?;
        }

        let mut results = LoadcaseResults {
            oper,
            bend,
            ..Default::default()
        };
        results.single_values.insert("rpm".to_string(), rpm);
        results.single_values.insert("rho(kg/m3)".to_string(), 1.225);
        results.single_values.insert("thrust(n)".to_string(), 80.0 * k * k);
        Ok(results)
    }
}

/// Root, mid and tip airfoil: (relative span, thickness, camber)
pub const SECTIONS: [(f64, f64, f64); 3] = [(0.25, 0.16, 0.02), (0.6, 0.12, 0.03), (0.95, 0.09, 0.025)];

/// Two-bladed propeller, R = 0.4 m, with polars, two solved loadcases and
/// the load envelope
pub fn solved_propeller() -> Propeller {
    let panel = MockPanel;
    let mut prop = Propeller::new(2, 0.4, 0.04);
    prop.geometry = vec![
        PlanformStation { rel_span: 0.1, chord_ratio: 0.12, twist: 40.0 },
        PlanformStation { rel_span: 0.4, chord_ratio: 0.15, twist: 25.0 },
        PlanformStation { rel_span: 0.7, chord_ratio: 0.12, twist: 18.0 },
        PlanformStation { rel_span: 1.0, chord_ratio: 0.06, twist: 12.0 },
    ];

    for (i, (span, t, m)) in SECTIONS.iter().enumerate() {
        let mut airfoil = Airfoil::new(&format!("af{}", i), 1.5e5, contour(*t, *m));
        airfoil.compute_polar(&panel, -10.0, 12.0, 0.5).unwrap();
        prop.add_section(*span, Arc::new(airfoil));
    }

    prop.add_loadcase(Loadcase::new("cruise", 20.0).with_operating_point(OperatingPoint::Rpm(3000.0)));
    prop.add_loadcase(Loadcase::new("climb", 12.0).with_operating_point(OperatingPoint::Rpm(4000.0)));
    prop.calc_loads(&MockVortex).unwrap();
    prop.set_load_envelope().unwrap();
    prop
}

/// Leading and trailing edge of each planform station in model units,
/// twisted about the quarter chord
pub fn chord_stations(prop: &Propeller, units: &UnitSystem) -> Vec<ChordStation> {
    let tip = units.length(prop.tip_radius);
    prop.geometry
        .iter()
        .map(|s| {
            let (y, c) = (s.rel_span * tip, s.chord_ratio * tip);
            let (sin, cos) = s.twist.to_radians().sin_cos();
            ChordStation::new([-0.25 * c * cos, y, 0.25 * c * sin], [0.75 * c * cos, y, -0.75 * c * sin])
        })
        .collect()
}
