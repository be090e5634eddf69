use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One job reference pulled from a valid input line.
///
/// Both fields are kept as the digit strings they were written as, so
/// `"07"` and `"0042"` survive untouched into the generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramEntry {
    pub machine_code: String,
    pub program_id: String,
}

impl ProgramEntry {
    /// Numeric machine number, `"07"` → `7`.
    pub fn machine_number(&self) -> u32 {
        machine_number(&self.machine_code)
    }
}

/// Parse a two-digit machine code. Codes only ever come out of the line
/// validator, so they are guaranteed to be ASCII digits.
pub fn machine_number(code: &str) -> u32 {
    code.bytes()
        .fold(0, |acc, b| acc * 10 + u32::from(b.wrapping_sub(b'0')))
}

/// Result of classifying a single line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Blank,
    Valid(ProgramEntry),
    Malformed,
}

/// Machine code → program ids in input order (duplicates kept).
pub type MachineGroups = BTreeMap<String, Vec<String>>;

/// ─────────────────────────────────────────────────────
/// Machine profiles (owned by the settings store)
/// ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(try_from = "u8", into = "u8")]
pub enum Diameter {
    D10,
    D14,
}

impl Diameter {
    pub fn label(self) -> &'static str {
        match self {
            Diameter::D10 => "Ø10",
            Diameter::D14 => "Ø14",
        }
    }
}

impl From<Diameter> for u8 {
    fn from(d: Diameter) -> u8 {
        match d {
            Diameter::D10 => 0,
            Diameter::D14 => 1,
        }
    }
}

impl TryFrom<u8> for Diameter {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Diameter::D10),
            1 => Ok(Diameter::D14),
            other => Err(format!("unknown diameter class {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(try_from = "u8", into = "u8")]
pub enum AbutmentType {
    Ds,
    Asc,
    AotAndTloc,
    AotPlus,
}

impl AbutmentType {
    pub fn label(self) -> &'static str {
        match self {
            AbutmentType::Ds => "DS",
            AbutmentType::Asc => "ASC",
            AbutmentType::AotAndTloc => "AOT & TLOC",
            AbutmentType::AotPlus => "AOT+",
        }
    }
}

impl From<AbutmentType> for u8 {
    fn from(a: AbutmentType) -> u8 {
        match a {
            AbutmentType::Ds => 1,
            AbutmentType::Asc => 2,
            AbutmentType::AotAndTloc => 3,
            AbutmentType::AotPlus => 4,
        }
    }
}

impl TryFrom<u8> for AbutmentType {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(AbutmentType::Ds),
            2 => Ok(AbutmentType::Asc),
            3 => Ok(AbutmentType::AotAndTloc),
            4 => Ok(AbutmentType::AotPlus),
            other => Err(format!("unknown abutment type {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineProfile {
    pub machine_number: u32,
    pub supported_diameter: Diameter,
    pub supported_abutment: AbutmentType,
    #[serde(default)]
    pub ending_code: String,
}

impl fmt::Display for MachineProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3}  {:<4} {:<10} {} bytes of ending code",
            self.machine_number,
            self.supported_diameter.label(),
            self.supported_abutment.label(),
            self.ending_code.len()
        )
    }
}

/// A program file written for one machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub machine_number: u32,
    pub folder: PathBuf,
    pub file: PathBuf,
    /// Program ids whose source file was found and copied.
    pub copied: Vec<String>,
}
