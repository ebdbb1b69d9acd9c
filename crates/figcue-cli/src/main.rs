mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "figcue",
    version,
    about = "Figure separation and caption cue extraction for scholarly PDFs"
)]
struct Cli {
    /// Pipeline config file (JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log progress at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the clip zones of every raw .vec page file into figureVecs/
    /// (figureVecs/ and figureSVGs/ are emptied first)
    Merge {
        /// Asset directory holding the raw .vec page files
        asset_dir: PathBuf,

        /// Overlap policy: always, intersect, contains
        #[arg(long, value_name = "POLICY")]
        overlap: Option<String>,

        /// Eligibility policy: singletons, group
        #[arg(long, value_name = "POLICY")]
        eligibility: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Render every merged zone file into figureSVGs/
    Rasterize {
        /// Asset directory (with figureVecs/ already populated)
        asset_dir: PathBuf,

        /// Rasterizer program (overrides the config file)
        #[arg(long, value_name = "PROGRAM")]
        program: Option<String>,

        /// Rasterizer argument; repeat for several. Use {input} and {output}
        #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Encode the figure body of a layout document as feature text
    Features {
        /// JSON file with "tokens", "blocks" and "body" ranges
        input_file: PathBuf,

        /// Write feature text to a file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Encode, label and group figure captions
    Label {
        /// JSON file with "tokens", "blocks" and "body" ranges
        input_file: PathBuf,

        /// Model file for the labeler (overrides the config file)
        #[arg(short, long, value_name = "FILE")]
        model: Option<PathBuf>,

        /// Print every segment, not just headings and captions
        #[arg(long)]
        show_all: bool,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inspect and validate pipeline config
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config as JSON
    Show,
    /// Validate a config file
    Validate {
        /// Path to JSON config file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Merge {
            asset_dir,
            overlap,
            eligibility,
            output,
        } => commands::merge::run(
            config,
            asset_dir,
            overlap.as_deref(),
            eligibility.as_deref(),
            &output,
        ),
        Commands::Rasterize {
            asset_dir,
            program,
            args,
        } => commands::rasterize::run(config, asset_dir, program, args),
        Commands::Features { input_file, out } => commands::features::run(input_file, out),
        Commands::Label {
            input_file,
            model,
            show_all,
            output,
        } => commands::label::run(config, input_file, model, show_all, &output),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(config),
            ConfigAction::Validate { file } => commands::config::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}

/// `debug` with `--verbose`, else `RUST_LOG` as given, else `warn`.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}
