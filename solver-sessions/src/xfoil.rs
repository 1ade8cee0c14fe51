//! XFOIL panel-method sessions

use blade_loads::airfoil::{
    Airfoil, AirfoilShape, OperatingMode, PanelMethod, PolarRow, ShapeComponent, SurfaceDistribution,
};
use blade_loads::error::BladeResult;

use crate::config::SolverConfig;
use crate::error::{SessionError, SessionResult};
use crate::fixed_width::{number, parse_table, ColumnSpec};
use crate::session::SolverSession;

const AIRFOIL_FILE: &str = "airfoil.dat";
const POLAR_FILE: &str = "polar.txt";
const CP_FILE: &str = "cp.txt";
const BL_FILE: &str = "bl.txt";
const BLEND_FILE: &str = "blend.dat";

/// alpha, CL, CD, CDp, CM, Top_Xtr, Bot_Xtr, Top_Itr, Bot_Itr
const POLAR_COLUMNS: [ColumnSpec; 9] = [
    (1, 8),
    (10, 17),
    (20, 27),
    (30, 37),
    (39, 46),
    (49, 55),
    (58, 64),
    (66, 73),
    (74, 82),
];

/// Skin friction column of a boundary-layer dump
const DUMP_CF_COLUMN: usize = 6;

/// Parse an accumulated polar file, rows in file order
pub fn parse_polar(text: &str) -> SessionResult<Vec<PolarRow>> {
    let table = parse_table(text, &POLAR_COLUMNS, |t| t.first() == Some(&"alpha"))?;
    let index = |name: &str| table.column_index(name).map_err(|e| SessionError::Parse(e.to_string()));
    let [alpha, cl, cd, cdp, cm, top, bot] =
        [index("alpha")?, index("CL")?, index("CD")?, index("CDp")?, index("CM")?, index("Top_Xtr")?, index("Bot_Xtr")?];

    Ok(table
        .rows
        .iter()
        .map(|r| PolarRow {
            alpha: r[alpha],
            cl: r[cl],
            cd: r[cd],
            cdp: r[cdp],
            cm: r[cm],
            top_xtr: r[top],
            bot_xtr: r[bot],
        })
        .collect())
}

/// Parse a `CPWR` file into `(x, cp)` around the contour.
///
/// Accepts both the `x Cp` and the `x y Cp` layout.
pub fn parse_cp(text: &str) -> SessionResult<(Vec<f64>, Vec<f64>)> {
    let mut x = Vec::new();
    let mut cp = Vec::new();
    for line in text.lines().filter(|l| !l.trim_start().starts_with('#')) {
        let values: Option<Vec<f64>> = line.split_whitespace().map(number).collect();
        match values.as_deref() {
            Some([first, .., last]) => {
                x.push(*first);
                cp.push(*last);
            }
            _ => continue,
        }
    }
    if x.is_empty() {
        return Err(SessionError::Parse("pressure file holds no points".to_string()));
    }
    Ok((x, cp))
}

/// Skin friction of the first `points` rows of a `DUMP` file (the contour;
/// wake rows follow)
pub fn parse_dump_cf(text: &str, points: usize) -> Vec<f64> {
    let cf: Vec<f64> = text
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .filter_map(|line| {
            let values: Option<Vec<f64>> = line.split_whitespace().map(number).collect();
            values.and_then(|v| v.get(DUMP_CF_COLUMN).copied())
        })
        .take(points)
        .collect();
    if cf.len() < points {
        tracing::warn!("boundary-layer dump has {} of {} contour points, skin friction dropped", cf.len(), points);
        return Vec::new();
    }
    cf
}

/// XFOIL driven through command files
#[derive(Debug, Clone)]
pub struct Xfoil {
    config: SolverConfig,
}

impl Xfoil {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    fn session(&self) -> SessionResult<SolverSession> {
        let mut session = SolverSession::new("xfoil", &self.config.xfoil, &self.config)?;
        // graphics off
        session.run_all(["plop", "g", ""]);
        Ok(session)
    }

    /// Load the contour and enter a viscous OPER with polar accumulation
    fn viscous(&self, airfoil: &Airfoil) -> SessionResult<SolverSession> {
        let mut session = self.session()?;
        session.write_file(AIRFOIL_FILE, &airfoil.shape.to_dat(&airfoil.name))?;
        session
            .run(format!("load {}", AIRFOIL_FILE))
            .run("pane")
            .run("oper")
            .run("vpar")
            .run(format!("n {}", airfoil.ncrit))
            .run("")
            .run(format!("visc {}", airfoil.reynolds))
            .run("iter")
            .run(airfoil.iter_limit)
            .run("pacc")
            .run(POLAR_FILE)
            .run("");
        Ok(session)
    }

    /// Session for an alpha sweep from 0° to `alpha_end`
    pub fn sweep_session(&self, airfoil: &Airfoil, alpha_end: f64, increment: f64) -> SessionResult<SolverSession> {
        let mut session = self.viscous(airfoil)?;
        session
            .run("aseq")
            .run_all([0.0, alpha_end, increment])
            .run("")
            .run("quit");
        Ok(session)
    }

    /// Session writing the pressure and boundary-layer files at one point
    pub fn pressure_session(&self, airfoil: &Airfoil, mode: OperatingMode) -> SessionResult<SolverSession> {
        let mut session = self.viscous(airfoil)?;
        match mode {
            OperatingMode::Cl(cl) => session.run(format!("cl {}", cl)),
            OperatingMode::Alpha(alpha) => session.run(format!("alfa {}", alpha)),
        };
        session
            .run(format!("cpwr {}", CP_FILE))
            .run(format!("dump {}", BL_FILE))
            .run("")
            .run("quit");
        Ok(session)
    }

    /// Session running INTE and scaling thickness and camber of the result
    pub fn blend_session(
        &self,
        first: &AirfoilShape,
        second: &AirfoilShape,
        fraction: f64,
        component: ShapeComponent,
    ) -> SessionResult<SolverSession> {
        let mut session = self.session()?;
        session.write_file("first.dat", &first.to_dat("first"))?;
        session.write_file("second.dat", &second.to_dat("second"))?;
        let (thickness, camber) = component.factors();
        session
            .run("inte")
            .run_all(["f", "first.dat", "f", "second.dat"])
            .run(fraction)
            .run("")
            .run_all(["pcop", "pane", "gdes", "tfac"])
            .run(thickness)
            .run(camber)
            .run("")
            .run_all(["pcop", "pane", "save", BLEND_FILE, "quit"]);
        Ok(session)
    }
}

impl PanelMethod for Xfoil {
    fn alpha_sweep(&self, airfoil: &Airfoil, alpha_end: f64, increment: f64) -> BladeResult<Vec<PolarRow>> {
        let session = self.sweep_session(airfoil, alpha_end, increment)?;
        session.execute()?;
        let rows = parse_polar(&session.read_file(POLAR_FILE)?)?;
        tracing::debug!("{}: sweep to {}° converged at {} points", airfoil.name, alpha_end, rows.len());
        Ok(rows)
    }

    fn pressure(&self, airfoil: &Airfoil, mode: OperatingMode) -> BladeResult<SurfaceDistribution> {
        let session = self.pressure_session(airfoil, mode)?;
        session.execute()?;

        // the converged angle is the last accumulated polar point
        let polar = parse_polar(&session.read_file(POLAR_FILE)?)?;
        let alpha = match (polar.last(), mode) {
            (Some(row), _) => row.alpha,
            (None, OperatingMode::Alpha(alpha)) => alpha,
            (None, OperatingMode::Cl(cl)) => {
                return Err(SessionError::Parse(format!("{} did not converge at CL = {}", airfoil.name, cl)).into())
            }
        };

        let (x, cp) = parse_cp(&session.read_file(CP_FILE)?)?;
        let cf = match session.read_file(BL_FILE) {
            Ok(text) => parse_dump_cf(&text, x.len()),
            Err(_) => Vec::new(),
        };
        Ok(SurfaceDistribution { alpha, x, cp, cf })
    }

    fn blend(
        &self,
        first: &AirfoilShape,
        second: &AirfoilShape,
        fraction: f64,
        component: ShapeComponent,
    ) -> BladeResult<AirfoilShape> {
        let session = self.blend_session(first, second, fraction, component)?;
        session.execute()?;
        AirfoilShape::parse(&session.read_file(BLEND_FILE)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const POLAR: &str = "
       XFOIL         Version 6.99

 Calculated polar for: MH 114

 1 1 Reynolds number fixed          Mach number fixed

 xtrf =   1.000 (top)        1.000 (bottom)
 Mach =   0.000     Re =     0.300 e 6     Ncrit =   9.000

  alpha    CL        CD       CDp       CM     Top_Xtr  Bot_Xtr  Top_Itr  Bot_Itr
 ------ -------- --------- --------- -------- -------- -------- -------- --------
  0.000   0.4856   0.00802   0.00265  -0.1082   0.5875   0.9933   0.5875   0.9933
  0.250   0.5127   0.00811   0.00270  -0.1079   0.5750   1.0000   0.5750   1.0000
  0.500   0.5398   0.00820   0.00275  -0.1076   0.5612   1.0000   0.5612   1.0000
";

    #[test]
    fn test_parse_polar() {
        let rows = parse_polar(POLAR).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].alpha, 0.25);
        assert_eq!(rows[1].cl, 0.5127);
        assert_eq!(rows[2].cd, 0.0082);
        assert_eq!(rows[0].cm, -0.1082);
        assert_eq!(rows[0].bot_xtr, 0.9933);
    }

    #[test]
    fn test_parse_empty_polar() {
        let header_only = POLAR.lines().take(12).collect::<Vec<_>>().join("\n");
        assert!(parse_polar(&header_only).unwrap().is_empty());
    }

    #[test]
    fn test_parse_cp_layouts() {
        let two = "#    x        Cp  \n  1.00000   0.2364\n  0.50000  -0.4120\n  0.00000   1.0000\n";
        let (x, cp) = parse_cp(two).unwrap();
        assert_eq!(x, vec![1.0, 0.5, 0.0]);
        assert_eq!(cp, vec![0.2364, -0.412, 1.0]);

        let three = "# MH 114\n# alpha = 2.0\n#    x        y        Cp  \n  1.00000  0.00000  0.2364\n";
        let (x, cp) = parse_cp(three).unwrap();
        assert_eq!((x[0], cp[0]), (1.0, 0.2364));

        assert!(parse_cp("#    x        Cp\n").is_err());
    }

    #[test]
    fn test_dump_cf_stops_at_contour() {
        let dump = "#    s        x        y     Ue/Vinf    Dstar     Theta      Cf       H
  0.00000  1.00000  0.00000  -0.8800  0.005000  0.002500  0.001200  2.0000
  0.50000  0.50000  0.06000   1.2000  0.001000  0.000500  0.004500  2.0000
  1.00000  1.00000  0.00000  -0.8800  0.004000  0.002000  0.001000  2.0000
  1.10000  1.10000  0.00000   0.9000  0.006000  0.003000  0.000000  1.8000
";
        let cf = parse_dump_cf(dump, 3);
        assert_eq!(cf.len(), 3);
        assert_relative_eq!(cf[1], 0.0045);
        assert!(parse_dump_cf(dump, 5).is_empty());
    }

    fn airfoil() -> Airfoil {
        let shape = AirfoilShape::new(vec![[1.0, 0.0], [0.0, 0.0], [1.0, -0.01]]).unwrap();
        Airfoil::new("mh114", 300000.0, shape).with_ncrit(7.0).with_iter_limit(150)
    }

    #[test]
    fn test_sweep_commands() {
        let xfoil = Xfoil::new(SolverConfig::default());
        let session = xfoil.sweep_session(&airfoil(), -20.0, 0.25).unwrap();
        let expected = [
            "plop", "g", "", "load airfoil.dat", "pane", "oper", "vpar", "n 7", "", "visc 300000", "iter", "150",
            "pacc", "polar.txt", "", "aseq", "0", "-20", "0.25", "", "quit",
        ];
        assert_eq!(session.commands(), expected);
        assert!(session.path().join("airfoil.dat").exists());
    }

    #[test]
    fn test_pressure_and_blend_commands() {
        let xfoil = Xfoil::new(SolverConfig::default());
        let session = xfoil.pressure_session(&airfoil(), OperatingMode::Cl(0.45)).unwrap();
        let tail: Vec<&str> = session.commands()[15..].iter().map(String::as_str).collect();
        assert_eq!(tail, ["cl 0.45", "cpwr cp.txt", "dump bl.txt", "", "quit"]);

        let shape = airfoil().shape;
        let session = xfoil.blend_session(&shape, &shape, 0.3, ShapeComponent::Thickness).unwrap();
        let commands: Vec<&str> = session.commands().iter().map(String::as_str).collect();
        assert_eq!(&commands[3..9], ["inte", "f", "first.dat", "f", "second.dat", "0.3"]);
        assert_eq!(&commands[13..16], ["tfac", "1", "0"]);
        assert_eq!(commands.last(), Some(&"quit"));
    }
}
