pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod store;
pub mod writer;

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Command, MachineCommand, ProfileArgs, RunArgs};
use config::Config;
use document::TextBuffer;
use model::MachineProfile;
use processor::{RunEvent, RunOptions, RunOutcome, Trigger, worker};
use store::{JsonProfileStore, ProfileStore};

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    init_tracing();

    let mut config = match &args.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("Loading config {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(store) = args.store {
        config.store_path = store;
    }

    match args.command {
        Command::Run(run_args) => run_jobs(&config, run_args),
        Command::Machine(cmd) => machines(&config, cmd),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_jobs(config: &Config, args: RunArgs) -> anyhow::Result<()> {
    // 1. ── Load ───────────────────────────────────────────────────────
    let text = read_input(&args.input)?;
    let doc = Arc::new(Mutex::new(TextBuffer::from_text(&text)));

    let source_dir = match args.source {
        Some(dir) => Some(dir),
        None => config
            .default_source_dir(chrono::Local::now().date_naive())
            .with_context(|| "Resolving default source folder")?,
    };
    if let Some(dir) = source_dir.as_ref().filter(|d| !d.is_dir()) {
        eprintln!("warning: source folder {} not found, nothing will be copied", dir.display());
    }
    let options = RunOptions {
        output_root: args.output.unwrap_or_else(|| config.output_root.clone()),
        source_dir,
        folder_labels: config.folder_labels && !args.no_labels,
    };

    let store = JsonProfileStore::open(&config.store_path)
        .with_context(|| format!("Opening machine store {}", config.store_path.display()))?;

    // 2. ── Validate + generate in the background ──────────────────────
    let trigger = Trigger::new();
    let handle = worker::spawn(&trigger, Arc::clone(&doc), store, options)?;
    let outcome = handle.wait_with(report).with_context(|| "Generating programs")?;

    // 3. ── Report ─────────────────────────────────────────────────────
    match outcome {
        RunOutcome::Completed { artifacts, missing_profiles } => {
            for artifact in &artifacts {
                println!(
                    "{} ({} source programs copied)",
                    artifact.file.display(),
                    artifact.copied.len()
                );
            }
            if artifacts.is_empty() {
                println!("No job lines found, nothing generated");
            }
            if !missing_profiles.is_empty() {
                eprintln!("{} machine(s) had no profile", missing_profiles.len());
            }
            Ok(())
        }
        RunOutcome::Aborted { line } => {
            let doc = doc.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(text) = doc.lines().get(line) {
                eprintln!("{:>5} | {}", line + 1, text);
            }
            if args.write_back && args.input != Path::new("-") {
                fs::write(&args.input, doc.text() + "\n")
                    .with_context(|| format!("Writing back {}", args.input.display()))?;
                eprintln!("annotated text saved to {}", args.input.display());
            }
            bail!("line {} has an incorrect format", line + 1)
        }
    }
}

fn report(event: RunEvent) {
    match event {
        RunEvent::Progress { done, total } => println!("[{done}/{total}]"),
        RunEvent::MissingProfile { machine } => {
            eprintln!("warning: no profile for machine {machine}, generated without labels or ending code")
        }
        RunEvent::RevealOutput(root) => println!("Output ready in {}", root.display()),
        RunEvent::Failed(msg) => eprintln!("error: {msg}"),
        RunEvent::State(_) | RunEvent::Aborted { .. } | RunEvent::Finished { .. } => {}
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .with_context(|| "Reading stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))
}

fn machines(config: &Config, cmd: MachineCommand) -> anyhow::Result<()> {
    let mut store = JsonProfileStore::open(&config.store_path)
        .with_context(|| format!("Opening machine store {}", config.store_path.display()))?;

    match cmd {
        MachineCommand::List => {
            let profiles = store.list()?;
            if profiles.is_empty() {
                println!("No machines configured in {}", store.path().display());
            }
            for p in profiles {
                println!("{p}");
            }
        }
        MachineCommand::Add(args) => {
            let profile = build_profile(args, None)?;
            let n = profile.machine_number;
            store.create(profile)?;
            println!("Added machine {n}");
        }
        MachineCommand::Update(args) => {
            let current = store
                .get(args.number)?
                .ok_or_else(|| anyhow!("machine {} does not exist", args.number))?;
            let profile = build_profile(args, Some(current.ending_code))?;
            let n = profile.machine_number;
            store.update(profile)?;
            println!("Updated machine {n}");
        }
        MachineCommand::Remove { number } => {
            store.delete(number)?;
            println!("Removed machine {number}");
        }
    }
    Ok(())
}

/// Without `--ending-code`/`--ending-file` the previous ending code is kept
/// (empty for new machines).
fn build_profile(args: ProfileArgs, previous_ending: Option<String>) -> anyhow::Result<MachineProfile> {
    let ending_code = match (args.ending_code, args.ending_file) {
        (Some(code), _) => code,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("Reading ending code {}", path.display()))?,
        (None, None) => previous_ending.unwrap_or_default(),
    };
    Ok(MachineProfile {
        machine_number: args.number,
        supported_diameter: args.diameter,
        supported_abutment: args.abutment,
        ending_code,
    })
}
