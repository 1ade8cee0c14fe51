//! APDL command stream for the FE model
//!
//! Collects loads and layups as APDL commands that can be read into a
//! preprocessor session (`/INPUT`) or written next to the base model.

use std::fs;
use std::path::Path;

use blade_loads::design::{Ply, SectionSink};
use blade_loads::error::BladeResult;
use blade_loads::structure::{ForceComponent, LoadSink};

use crate::error::SessionResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApdlScript {
    script: String,
    commands: usize,
}

impl ApdlScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script that starts in the preprocessor
    pub fn prep7() -> Self {
        let mut script = Self::new();
        script.push("/PREP7");
        script
    }

    fn push(&mut self, command: &str) {
        self.script.push_str(command);
        self.script.push('\n');
        self.commands += 1;
    }

    pub fn as_str(&self) -> &str {
        &self.script
    }

    pub fn len(&self) -> usize {
        self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands == 0
    }

    pub fn write(&self, path: &Path) -> SessionResult<()> {
        fs::write(path, &self.script)?;
        tracing::info!("Wrote {} APDL commands to {:?}", self.commands, path);
        Ok(())
    }
}

impl LoadSink for ApdlScript {
    fn accumulate_add(&mut self) -> BladeResult<()> {
        self.push("FCUM,ADD");
        Ok(())
    }

    fn surface_pressure(&mut self, element: usize, pressure: f64) -> BladeResult<()> {
        self.push(&format!("SFE,{},,PRES,1,{}", element, pressure));
        Ok(())
    }

    fn nodal_force(&mut self, node: usize, component: ForceComponent, value: f64) -> BladeResult<()> {
        self.push(&format!("F,{},{},{}", node, component.label(), value));
        Ok(())
    }

    fn angular_velocity(&mut self, omega: [f64; 3]) -> BladeResult<()> {
        self.push(&format!("OMEGA,{},{},{}", omega[0], omega[1], omega[2]));
        Ok(())
    }
}

impl SectionSink for ApdlScript {
    fn begin_section(&mut self, section: usize) -> BladeResult<()> {
        self.push(&format!("SECTYPE,{},SHELL", section));
        Ok(())
    }

    fn section_offset(&mut self, offset: f64) -> BladeResult<()> {
        self.push(&format!("SECOFFSET,USER,{}", offset));
        Ok(())
    }

    fn ply(&mut self, ply: &Ply) -> BladeResult<()> {
        self.push(&format!(
            "SECDATA,{},{},{},{}",
            ply.thickness, ply.material, ply.angle, ply.integration_points
        ));
        Ok(())
    }

    fn assign_section(&mut self, element: usize, section: usize) -> BladeResult<()> {
        self.push(&format!("EMODIF,{},SECNUM,{}", element, section));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_commands() {
        let mut script = ApdlScript::prep7();
        script.accumulate_add().unwrap();
        script.surface_pressure(12, -0.0025).unwrap();
        script.nodal_force(40, ForceComponent::Fz, 0.5).unwrap();
        script.angular_velocity([0.0, 0.0, 418.9]).unwrap();

        assert_eq!(
            script.as_str(),
            "/PREP7\nFCUM,ADD\nSFE,12,,PRES,1,-0.0025\nF,40,FZ,0.5\nOMEGA,0,0,418.9\n"
        );
        assert_eq!(script.len(), 5);
    }

    #[test]
    fn test_section_commands() {
        let mut script = ApdlScript::new();
        script.begin_section(7).unwrap();
        script.section_offset(-1.25).unwrap();
        script.ply(&Ply::new(0.185, 1, 45.0)).unwrap();
        script.assign_section(7, 7).unwrap();

        let lines: Vec<&str> = script.as_str().lines().collect();
        assert_eq!(
            lines,
            ["SECTYPE,7,SHELL", "SECOFFSET,USER,-1.25", "SECDATA,0.185,1,45,3", "EMODIF,7,SECNUM,7"]
        );
    }

    #[test]
    fn test_write_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loads.mac");
        let mut script = ApdlScript::new();
        script.accumulate_add().unwrap();
        script.write(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "FCUM,ADD\n");
    }
}
