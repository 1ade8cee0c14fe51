//! XROTOR vortex-method sessions

use regex::Regex;
use std::collections::BTreeMap;

use blade_loads::error::{BladeError, BladeResult};
use blade_loads::propeller::{Loadcase, LoadcaseResults, Propeller, SpanTable, VortexMethod, RPM_KEY};

use crate::config::SolverConfig;
use crate::error::{SessionError, SessionResult};
use crate::fixed_width::{number, parse_table, ColumnSpec};
use crate::session::SolverSession;

const OPER_FILE: &str = "oper.txt";
const BEND_FILE: &str = "bend.txt";
const OPER_ITERATIONS: u32 = 200;

const OPER_COLUMNS: [ColumnSpec; 11] = [
    (1, 4),
    (4, 9),
    (10, 16),
    (16, 25),
    (25, 30),
    (33, 39),
    (40, 47),
    (48, 53),
    (54, 60),
    (61, 66),
    (67, 74),
];

const BEND_COLUMNS: [ColumnSpec; 11] = [
    (1, 3),
    (4, 10),
    (11, 18),
    (19, 26),
    (28, 34),
    (35, 46),
    (48, 59),
    (61, 72),
    (74, 85),
    (87, 98),
    (100, 111),
];

/// `label : value` with Fortran-formatted numbers
const SINGLE_VALUE_PATTERN: &str =
    r"([A-Za-z][A-Za-z0-9 ./()\-]*?)[ \t]*:[ \t]*([-+]?(?:\d+\.?\d*|\.\d+)(?:[EeDd][-+]?\d+)?)";

fn is_table_header(tokens: &[&str]) -> bool {
    tokens.first() == Some(&"i") && tokens.contains(&"r/R")
}

/// Parse an OPER `WRIT` file into its `label : value` pairs and the
/// spanwise table.
///
/// Labels are lower-cased (`rho(kg/m3)`, `thrust(n)`); a `speed(rpm)`
/// label is also stored as `rpm`.
pub fn parse_oper(text: &str) -> SessionResult<(BTreeMap<String, f64>, SpanTable)> {
    let pattern = Regex::new(SINGLE_VALUE_PATTERN).map_err(|e| SessionError::Parse(e.to_string()))?;
    let mut single_values = BTreeMap::new();
    for line in text.lines() {
        if is_table_header(&line.split_whitespace().collect::<Vec<_>>()) {
            break;
        }
        for caps in pattern.captures_iter(line) {
            let label = caps[1].split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
            if let Some(value) = number(&caps[2]) {
                single_values.insert(label, value);
            }
        }
    }
    if let Some(rpm) = single_values.get("speed(rpm)").copied() {
        single_values.entry(RPM_KEY.to_string()).or_insert(rpm);
    }

    let table = parse_table(text, &OPER_COLUMNS, is_table_header)?;
    Ok((single_values, table))
}

/// Parse a BEND `WRIT` file
pub fn parse_bend(text: &str) -> SessionResult<SpanTable> {
    parse_table(text, &BEND_COLUMNS, is_table_header)
}

/// XROTOR driven through command files
#[derive(Debug, Clone)]
pub struct Xrotor {
    config: SolverConfig,
}

impl Xrotor {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Session solving one loadcase and writing the OPER and BEND files
    pub fn loadcase_session(&self, propeller: &Propeller, loadcase: &Loadcase) -> BladeResult<SolverSession> {
        if loadcase.operating_point().is_none() {
            return Err(BladeError::InvalidLoadcaseSpec(format!(
                "loadcase '{}' has no operating point",
                loadcase.name
            )));
        }

        let mut session = SolverSession::new("xrotor", &self.config.xrotor, &self.config)?;
        // standard atmosphere at sea level
        session.run("atmo 0");

        session
            .run("arbi")
            .run(propeller.number_of_blades)
            .run(loadcase.flight_speed)
            .run(propeller.tip_radius)
            .run(propeller.hub_radius)
            .run(propeller.geometry.len());
        for station in &propeller.geometry {
            session.run_all([station.rel_span, station.chord_ratio, station.twist]);
        }
        session.run("n");

        for (index, section) in propeller.sections().iter().enumerate() {
            let c = section.airfoil.characteristics()?;
            session
                .run_all(["aero", "new"])
                .run(section.rel_span)
                .run("edit")
                .run(index + 2);
            for (field, value) in [
                (1, c.zero_lift_alpha),
                (2, c.lift_slope),
                (4, c.cl_max),
                (5, c.cl_min),
                (7, c.cd_min),
                (8, c.cl_at_cd_min),
                (9, c.dcd_dcl2),
                (10, section.airfoil.reynolds),
                (12, c.cm),
            ] {
                session.run(field).run(value);
            }
            session.run_all(["", ""]);
        }

        session.run_all(["oper", "iter"]).run(OPER_ITERATIONS);
        session.run_all(loadcase.data());
        session
            .run(format!("writ {}", OPER_FILE))
            .run_all(["o", "", "bend", "eval"])
            .run(format!("writ {}", BEND_FILE))
            .run_all(["o", "", "quit"]);
        Ok(session)
    }
}

impl VortexMethod for Xrotor {
    fn solve(&self, propeller: &Propeller, loadcase: &Loadcase) -> BladeResult<LoadcaseResults> {
        let session = self.loadcase_session(propeller, loadcase)?;
        session.execute()?;

        let (single_values, oper) = parse_oper(&session.read_file(OPER_FILE)?)?;
        let bend = parse_bend(&session.read_file(BEND_FILE)?)?;
        tracing::info!(
            "loadcase '{}': {} oper / {} bend stations, {} single values",
            loadcase.name,
            oper.len(),
            bend.len(),
            single_values.len()
        );
        Ok(LoadcaseResults {
            single_values,
            oper,
            bend,
        })
    }
}
