use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use aitl_project::{PRESET_NAMES, Scenario};
use aitl_results::{RunStore, manifest_for, ticks_to_csv};
use aitl_sim::{SimOptions, SimRecord, run_scenario_with_options};

#[derive(Parser)]
#[command(name = "aitl-cli")]
#[command(about = "AITL CLI - supervised PID control loop simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in scenarios
    Presets,
    /// Print a built-in scenario as YAML
    Show {
        /// Preset name
        preset: String,
    },
    /// Run a simulation
    Run {
        /// Path to a scenario YAML or JSON file
        #[arg(conflicts_with = "preset")]
        scenario_path: Option<PathBuf>,
        /// Run a built-in scenario instead of a file
        #[arg(long)]
        preset: Option<String>,
        /// Directory holding saved runs
        #[arg(long, default_value = "runs")]
        out: PathBuf,
        /// Record every N-th tick
        #[arg(long, default_value_t = 1)]
        record_every: usize,
        /// Do not save the run
        #[arg(long)]
        no_save: bool,
    },
    /// List saved runs
    Runs {
        /// Directory holding saved runs
        #[arg(long, default_value = "runs")]
        out: PathBuf,
    },
    /// Export the logged series of a saved run as CSV
    Export {
        /// Run ID
        run_id: String,
        /// Directory holding saved runs
        #[arg(long, default_value = "runs")]
        out: PathBuf,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Unknown preset: {0} (try `aitl-cli presets`)")]
    UnknownPreset(String),

    #[error("No scenario given: pass a file path or --preset")]
    MissingScenario,

    #[error(transparent)]
    Project(#[from] aitl_project::ProjectError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] aitl_sim::SimError),

    #[error(transparent)]
    Results(#[from] aitl_results::ResultsError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    // Initialize tracing; RUST_LOG selects the level (e.g. RUST_LOG=aitl_controls=debug)
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Presets => cmd_presets(),
        Commands::Show { preset } => cmd_show(&preset),
        Commands::Run {
            scenario_path,
            preset,
            out,
            record_every,
            no_save,
        } => {
            let scenario = resolve_scenario(scenario_path.as_deref(), preset.as_deref())?;
            cmd_run(&scenario, &out, record_every, !no_save)
        }
        Commands::Runs { out } => cmd_runs(&out),
        Commands::Export {
            run_id,
            out,
            output,
        } => cmd_export(&run_id, &out, output.as_deref()),
    }
}

fn resolve_scenario(path: Option<&Path>, preset: Option<&str>) -> CliResult<Scenario> {
    match (path, preset) {
        (_, Some(name)) => preset_scenario(name),
        (Some(path), None) => {
            tracing::info!(path = %path.display(), "loading scenario");
            Ok(aitl_project::load_scenario(path)?)
        }
        (None, None) => Err(CliError::MissingScenario),
    }
}

fn preset_scenario(name: &str) -> CliResult<Scenario> {
    aitl_project::builtin(name).ok_or_else(|| CliError::UnknownPreset(name.to_string()))
}

fn cmd_presets() -> CliResult<()> {
    println!("Built-in scenarios:");
    for name in PRESET_NAMES {
        if let Some(s) = aitl_project::builtin(name) {
            println!("  {:<14} {}", name, s.description.unwrap_or_default());
        }
    }
    Ok(())
}

fn cmd_show(name: &str) -> CliResult<()> {
    let scenario = preset_scenario(name)?;
    print!("{}", serde_yaml::to_string(&scenario)?);
    Ok(())
}

fn cmd_run(scenario: &Scenario, out: &Path, record_every: usize, save: bool) -> CliResult<()> {
    println!("Running scenario: {}", scenario.name);
    println!(
        "  dt = {:.3} s, t_end = {:.3} s, steps = {}",
        scenario.timing.dt_s,
        scenario.timing.t_end_s,
        scenario.timing.steps()
    );

    let opts = SimOptions {
        record_every,
        ..SimOptions::default()
    };
    let record = run_scenario_with_options(scenario, &opts)?;
    print_summary(&record);

    if save {
        let store = RunStore::new(out.to_path_buf())?;
        let manifest = store.save_new_run(manifest_for(&record), &record.ticks)?;
        tracing::info!(run_id = %manifest.run_id, dir = %out.display(), "run saved");
        println!("✓ Saved run: {}", manifest.run_id);
    }
    Ok(())
}

fn print_summary(record: &SimRecord) {
    let s = &record.summary;
    println!("\nRun summary:");
    println!("  Ticks:         {}", s.steps);
    println!("  Final output:  {:.4}", s.final_output);
    println!("  Final state:   {}", s.final_state);
    println!(
        "  Final gains:   kp={:.4} ki={:.4} kd={:.4}",
        s.final_kp, s.final_ki, s.final_kd
    );
    println!("  IAE:           {:.4}", s.iae);
    println!("  State changes: {}", s.state_changes);
    for (state, count) in &s.ticks_per_state {
        println!("    {:<8} {} ticks", state, count);
    }
}

fn cmd_runs(out: &Path) -> CliResult<()> {
    let store = RunStore::new(out.to_path_buf())?;
    let runs = store.list_runs()?;

    if runs.is_empty() {
        println!("No saved runs in {}", out.display());
    } else {
        println!("Saved runs in {}:", out.display());
        for manifest in runs {
            println!(
                "  {} ({}, {} records, final state {})",
                manifest.run_id, manifest.timestamp, manifest.record_count, manifest.summary.final_state
            );
        }
    }
    Ok(())
}

fn cmd_export(run_id: &str, out: &Path, output: Option<&Path>) -> CliResult<()> {
    let store = RunStore::new(out.to_path_buf())?;
    let records = store.load_timeseries(run_id)?;
    let csv = ticks_to_csv(&records);

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            records.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }
    Ok(())
}
