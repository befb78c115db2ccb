mod commands;

use clap::{Parser, Subcommand};
use commands::{EXIT_CANCELLED, EXIT_FAILURE, EXIT_STORE_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "stratum",
    version,
    about = "Content-addressed manifest builder for layered images"
)]
struct Cli {
    /// Path to the Stratum store directory.
    #[arg(long, default_value = "~/.local/share/stratum")]
    store: String,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the store layout.
    Init,
    /// Build a manifest from a configuration file and ordered layers.
    ///
    /// The first build publishes the configuration blob and records it with
    /// the configuration media type. Later builds reuse the stored blob and
    /// record the media type the store reports for it, so their manifest
    /// digest differs from the first build even for identical inputs. The
    /// configuration and layer digests are the same on every run.
    Build {
        /// Path to the image configuration JSON.
        #[arg(long)]
        config: PathBuf,
        /// Layer source, bottom first. Directories are packed as tar.
        #[arg(long = "layer")]
        layers: Vec<PathBuf>,
        /// Write the manifest payload here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Give up after this many seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show the stored descriptor for a digest.
    Stat {
        /// Digest in `blake3:<hex>` form.
        digest: String,
    },
    /// Rehash every stored blob and report mismatches.
    VerifyStore,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("STRATUM_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let store_path = expand_tilde(&cli.store);
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Init => commands::init::run(&store_path, json_output),
        Commands::Build {
            config,
            layers,
            output,
            timeout,
        } => commands::build::run(
            &store_path,
            &config,
            &layers,
            output.as_deref(),
            timeout,
            json_output,
        ),
        Commands::Stat { digest } => commands::stat::run(&store_path, &digest, json_output),
        Commands::VerifyStore => commands::verify_store::run(&store_path, json_output),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("build cancelled") {
                EXIT_CANCELLED
            } else if msg.starts_with("store error:") {
                EXIT_STORE_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
