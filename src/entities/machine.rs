//! Machine entity type - a team's shop equipment

use serde::{Deserialize, Serialize};

/// CAD format a machine consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CadFormat {
    #[default]
    Step,
    Stl,
    Dxf,
    Parasolid,
}

impl std::fmt::Display for CadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CadFormat::Step => write!(f, "STEP"),
            CadFormat::Stl => write!(f, "STL"),
            CadFormat::Dxf => write!(f, "DXF"),
            CadFormat::Parasolid => write!(f, "PARASOLID"),
        }
    }
}

impl std::str::FromStr for CadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STEP" => Ok(CadFormat::Step),
            "STL" => Ok(CadFormat::Stl),
            "DXF" => Ok(CadFormat::Dxf),
            "PARASOLID" => Ok(CadFormat::Parasolid),
            _ => Err(format!(
                "Invalid CAD format: {}. Use STEP, STL, DXF, or PARASOLID",
                s
            )),
        }
    }
}

/// A machine in the team's shop
///
/// The name is what BOM stage labels refer to, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub name: String,

    /// Format to export parts in for this machine
    #[serde(default)]
    pub output_format: CadFormat,
}

impl Machine {
    pub fn new(name: impl Into<String>, output_format: CadFormat) -> Self {
        Self {
            name: name.into(),
            output_format,
        }
    }

    /// Whether a stage label refers to this machine
    pub fn is_named(&self, label: &str) -> bool {
        self.name.trim().to_lowercase() == label.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_default_format() {
        let m: Machine = serde_yml::from_str("name: Laser").unwrap();
        assert_eq!(m.output_format, CadFormat::Step);
    }

    #[test]
    fn test_machine_format_serialization() {
        let m = Machine::new("Printer", CadFormat::Stl);
        let yaml = serde_yml::to_string(&m).unwrap();
        assert!(yaml.contains("output_format: STL"));
    }

    #[test]
    fn test_machine_is_named() {
        let m = Machine::new("CNC Router", CadFormat::Step);
        assert!(m.is_named("cnc router"));
        assert!(!m.is_named("router"));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("stl".parse::<CadFormat>(), Ok(CadFormat::Stl));
        assert!("obj".parse::<CadFormat>().is_err());
    }
}
