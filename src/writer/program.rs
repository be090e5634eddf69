//! Fixed-layout input program for one machine.
//!
//! The controller reads parameters #501‥#599 from this file, so the layout
//! is byte-exact:
//!
//! ```text
//! O{n}(FOR INPUT           )
//! $1
//! #501=            ┐
//! G04 P100         │ four unused slots
//! …                ┘
//! #505={id}        ┐ one slot per program id, input order
//! G04 P100         ┘
//! #{k}=            ┐ empty slots up to #599
//! G04 P100         ┘
//! <trailer>
//! <ending code of the machine profile>
//! ```

use std::fmt::Write;

use crate::error::{Error, Result};
use crate::model::MachineProfile;

pub const FIRST_SLOT: u32 = 501;
pub const FIRST_ID_SLOT: u32 = 505;
/// One past the last slot.
pub const SLOT_END: u32 = 600;
pub const MAX_PROGRAM_IDS: usize = (SLOT_END - FIRST_ID_SLOT) as usize;

pub const DELAY: &str = "G04 P100";
pub const TRAILER: &str = "(END OF INPUT)\nG04 P100\nM01\n";

/// Fail if `program_ids` do not fit the #505‥#599 slot range.
pub fn check_capacity(machine_number: u32, program_ids: &[String]) -> Result<()> {
    if program_ids.len() > MAX_PROGRAM_IDS {
        return Err(Error::SlotOverflow {
            machine: machine_number,
            count: program_ids.len(),
            max: MAX_PROGRAM_IDS,
        });
    }
    Ok(())
}

/// Render the program text for one machine.
pub fn render(
    machine_number: u32,
    program_ids: &[String],
    profile: Option<&MachineProfile>,
) -> Result<String> {
    check_capacity(machine_number, program_ids)?;

    let mut out = String::with_capacity(2048);
    // infallible
    let _ = write_program(&mut out, machine_number, program_ids, profile);
    Ok(out)
}

fn write_program(
    out: &mut String,
    machine_number: u32,
    program_ids: &[String],
    profile: Option<&MachineProfile>,
) -> std::fmt::Result {
    writeln!(out, "O{machine_number}(FOR INPUT           )")?;
    writeln!(out, "$1")?;

    let mut slot = FIRST_SLOT;
    while slot < FIRST_ID_SLOT {
        write_slot(out, slot, "")?;
        slot += 1;
    }
    for id in program_ids {
        write_slot(out, slot, id)?;
        slot += 1;
    }
    while slot < SLOT_END {
        write_slot(out, slot, "")?;
        slot += 1;
    }

    out.push_str(TRAILER);
    if let Some(profile) = profile {
        out.push_str(&profile.ending_code);
    }
    Ok(())
}

fn write_slot(out: &mut String, slot: u32, value: &str) -> std::fmt::Result {
    writeln!(out, "#{slot}={value}")?;
    writeln!(out, "{DELAY}")
}
