use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::model::{AbutmentType, Diameter};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Machine profile store (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a pasted job list and write one program per machine
    Run(RunArgs),
    /// Manage machine profiles
    #[command(subcommand)]
    Machine(MachineCommand),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Job list text file, `-` for stdin
    pub input: PathBuf,
    /// Output root (cleared before writing)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Folder with the source programs to copy next to each file
    #[arg(long, short)]
    pub source: Option<PathBuf>,
    /// Write programs straight into the output root
    #[arg(long)]
    pub no_labels: bool,
    /// On a format error, save the annotated text back to the input file
    #[arg(long)]
    pub write_back: bool,
}

#[derive(Subcommand, Debug)]
pub enum MachineCommand {
    /// List all machine profiles
    List,
    /// Add a machine profile
    Add(ProfileArgs),
    /// Change an existing machine profile
    Update(ProfileArgs),
    /// Delete a machine profile
    Remove { number: u32 },
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    pub number: u32,
    #[arg(long, value_enum)]
    pub diameter: Diameter,
    #[arg(long, value_enum)]
    pub abutment: AbutmentType,
    /// Code appended after the trailer of every program for this machine
    #[arg(long, conflicts_with = "ending_file")]
    pub ending_code: Option<String>,
    /// Read the ending code from a file
    #[arg(long)]
    pub ending_file: Option<PathBuf>,
}
