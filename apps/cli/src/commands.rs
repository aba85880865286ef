//! CLI command definitions, routing, and tracing setup.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use eadbridge_core::{ConversionStats, import_types, profile, require_instance};
use eadbridge_shared::{
    AppConfig, ConversionConfig, EadBridgeError, init_config, load_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// EAD Bridge: convert EAD finding aids into ArchivesSpace records.
#[derive(Parser)]
#[command(
    name = "eadbridge",
    version,
    about = "Convert EAD finding aids into ArchivesSpace JSONModel records.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Convert one or more EAD files to JSON records.
    Convert {
        /// EAD XML files to convert.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Import format (defaults to the configured format).
        #[arg(short, long)]
        format: Option<String>,

        /// Output directory (defaults to the configured directory).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Write compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },

    /// List supported import formats.
    Formats,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "eadbridge=info",
        1 => "eadbridge=debug",
        _ => "eadbridge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert {
            files,
            format,
            out,
            compact,
        } => cmd_convert(files, format, out, compact).await,
        Command::Formats => cmd_formats(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

/// Settings shared by every file of one `convert` run.
struct ConvertJob {
    format: String,
    out_dir: PathBuf,
    pretty: bool,
    config: ConversionConfig,
}

/// One successfully converted file.
struct Converted {
    input: PathBuf,
    output: PathBuf,
    stats: ConversionStats,
}

async fn cmd_convert(
    files: Vec<PathBuf>,
    format: Option<String>,
    out: Option<PathBuf>,
    compact: bool,
) -> Result<()> {
    let config = load_config()?;
    let job = Arc::new(ConvertJob {
        format: format.unwrap_or_else(|| config.defaults.format.clone()),
        out_dir: out.unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir)),
        pretty: config.defaults.pretty && !compact,
        config: ConversionConfig::from(&config),
    });

    std::fs::create_dir_all(&job.out_dir)
        .map_err(|e| EadBridgeError::io(&job.out_dir, e))?;

    info!(
        files = files.len(),
        format = %job.format,
        out = %job.out_dir.display(),
        "converting"
    );

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let outputs = output_paths(&files, &job.out_dir);

    // One converter per file; each conversion is synchronous CPU work.
    let mut handles = Vec::with_capacity(files.len());
    for (file, output) in files.into_iter().zip(outputs) {
        let job = Arc::clone(&job);
        handles.push(tokio::task::spawn_blocking(move || {
            let result = convert_file(&job, &file, &output);
            (file, result)
        }));
    }

    let mut converted = Vec::new();
    let mut failed = 0usize;
    for handle in handles {
        let (file, result) = handle
            .await
            .map_err(|e| eyre!("conversion task panicked: {e}"))?;
        progress.inc(1);
        match result {
            Ok(done) => {
                progress.set_message(file.display().to_string());
                converted.push(done);
            }
            Err(err) => {
                failed += 1;
                progress.suspend(|| error!(file = %file.display(), %err, "conversion failed"));
            }
        }
    }
    progress.finish_and_clear();

    println!();
    for done in &converted {
        println!(
            "  {} -> {}  ({} records{})",
            done.input.display(),
            done.output.display(),
            done.stats.total(),
            if done.stats.unattached > 0 {
                format!(", {} unattached", done.stats.unattached)
            } else {
                String::new()
            }
        );
    }
    println!();

    if failed > 0 {
        return Err(eyre!(
            "{failed} of {} files failed to convert",
            failed + converted.len()
        ));
    }
    Ok(())
}

/// One output file per input, `<out>/<stem>.json`. Inputs sharing a stem
/// (`a/smith.xml`, `b/smith.xml`) get `-2`, `-3`, … in input order.
fn output_paths(files: &[PathBuf], out_dir: &Path) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    files
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "output".into());
            let mut name = stem.clone();
            let mut n = 1;
            while !taken.insert(name.clone()) {
                n += 1;
                name = format!("{stem}-{n}");
            }
            if n > 1 {
                warn!(input = %input.display(), output = %name, "output name already used, renamed");
            }
            out_dir.join(format!("{name}.json"))
        })
        .collect()
}

/// Convert one file and write its report to `path`.
fn convert_file(job: &ConvertJob, input: &Path, path: &Path) -> eadbridge_shared::Result<Converted> {
    let converter = require_instance(&job.format, input, &job.config)?;
    let output = converter.run()?;
    let report = output.report(&job.format, Some(input))?;

    let json = if job.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    std::fs::write(path, json).map_err(|e| EadBridgeError::io(path, e))?;

    Ok(Converted {
        input: input.to_path_buf(),
        output: path.to_path_buf(),
        stats: output.stats,
    })
}

// ---------------------------------------------------------------------------
// formats / config
// ---------------------------------------------------------------------------

fn cmd_formats() -> Result<()> {
    println!("{}", profile());
    println!();
    for format in import_types() {
        println!("  {:<16} {}", format.name, format.description);
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
