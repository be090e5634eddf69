//! Filesystem side of program generation: output root cleanup, machine
//! folders, the program file itself and copies of the source programs.

pub mod program;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{IoContext, Result};
use crate::model::MachineProfile;

/// Extension of generated program files.
pub const EXTENSION: &str = "NC";

/// `Machine 12 - Ø10 - DS`, or just `Machine 12` without a profile.
pub fn folder_name(machine_number: u32, profile: Option<&MachineProfile>) -> String {
    match profile {
        Some(p) => format!(
            "Machine {} - {} - {}",
            machine_number,
            p.supported_diameter.label(),
            p.supported_abutment.label()
        ),
        None => format!("Machine {machine_number}"),
    }
}

/// Remove everything below `root`, creating `root` if it does not exist.
pub fn clear_output_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return fs::create_dir_all(root).io_context("create output root", root);
    }

    for entry in fs::read_dir(root).io_context("list output root", root)? {
        let path = entry.io_context("list output root", root)?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path).io_context("remove", &path)?;
        } else {
            fs::remove_file(&path).io_context("remove", &path)?;
        }
    }
    debug!(root = %root.display(), "output root cleared");
    Ok(())
}

/// Destination folder for a machine, created if absent.
///
/// Without folder labels every program lands directly in `root`.
pub fn prepare_folder(
    root: &Path,
    machine_number: u32,
    profile: Option<&MachineProfile>,
    labels: bool,
) -> Result<PathBuf> {
    let folder = if labels {
        root.join(folder_name(machine_number, profile))
    } else {
        root.to_path_buf()
    };
    fs::create_dir_all(&folder).io_context("create folder", &folder)?;
    Ok(folder)
}

/// Write `{n}.NC` into `folder`.
///
/// Goes through a temporary file so a failed write never leaves a
/// truncated program behind.
pub fn write_program(folder: &Path, machine_number: u32, text: &str) -> Result<PathBuf> {
    let file = folder.join(format!("{machine_number}.{EXTENSION}"));
    let tmp = folder.join(format!("{machine_number}.{EXTENSION}.tmp"));

    fs::write(&tmp, text).io_context("write", &tmp)?;
    fs::rename(&tmp, &file).io_context("rename", &file)?;
    debug!(file = %file.display(), bytes = text.len(), "program written");
    Ok(file)
}

/// Copy `source_dir/{id}` into `dest` for every id that has a source file.
///
/// Ids without a source file are skipped; that is normal for jobs with no
/// physical program. Returns the ids that were copied.
pub fn copy_sources(source_dir: &Path, program_ids: &[String], dest: &Path) -> Result<Vec<String>> {
    let mut copied = Vec::new();

    for id in program_ids {
        if copied.contains(id) {
            continue;
        }
        let src = source_dir.join(id);
        if !src.is_file() {
            trace!(program = %id, "no source program, skipping copy");
            continue;
        }
        let target = dest.join(id);
        fs::copy(&src, &target).io_context("copy", &src)?;
        copied.push(id.clone());
    }
    Ok(copied)
}
