mod config;
mod terminal_output;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use bibtag_config::{default_config_path, validate};
use bibtag_core::BackendKind;
use bibtag_detectors::DetectorRegistry;
use bibtag_logging::init_logger;
use bibtag_renamer::{BatchRunner, Comparison};

use config::BatchPlan;
use terminal_output::{batch_line, comparison_table, note_error, note_info, note_warn, print_outcome};

#[derive(Parser)]
#[command(name = "bibtag")]
#[command(about = "Rename race photos after the bib numbers found on them")]
#[command(version)]
struct Cli {
    /// YAML config file (defaults to $BIBTAG_CONFIG or ./bibtag.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backend over the source folder
    Run {
        /// ocr, ocr-gpu, ollama or openai
        #[arg(short, long)]
        backend: BackendKind,
        /// Folder to scan for images
        #[arg(long)]
        source: Option<PathBuf>,
        /// Folder receiving the renamed copies
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Run the backends one after another and compare their timings
    Compare {
        /// Folder to scan for images
        #[arg(long)]
        source: Option<PathBuf>,
        /// Also run OCR with GPU acceleration
        #[arg(long)]
        with_gpu: bool,
        /// Leave out the OpenAI backend
        #[arg(long)]
        skip_openai: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env: HashMap<String, String> = std::env::vars().collect();
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let (source, dest, kinds, comparing) = match cli.command {
        Commands::Run {
            backend,
            source,
            dest,
        } => (source, dest, vec![backend], false),
        Commands::Compare {
            source,
            with_gpu,
            skip_openai,
        } => (source, None, config::compare_backends(with_gpu, skip_openai), true),
    };

    let config = match config::resolve(&config_path, &env, source).await {
        Ok(config) => config,
        Err(e) => {
            note_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    };

    init_logger(config.log_dir.as_deref(), &config.log_level);

    let validation = validate(&config, &kinds);
    for warning in &validation.warnings {
        note_warn(&warning.to_string());
    }
    if !validation.is_valid() {
        for error in &validation.errors {
            note_error(&error.to_string());
        }
        std::process::exit(1);
    }

    let registry = DetectorRegistry::from_config(&config, &kinds)?;
    let plans = config::plan(&config, &kinds, dest.as_deref());

    info!(
        source = %config.source_dir.display(),
        backends = ?registry.kinds(),
        "Starting bibtag"
    );

    let mut comparison = Comparison::new();
    let mut reports = Vec::with_capacity(plans.len());
    for BatchPlan { kind, destination } in &plans {
        let detector = registry
            .get(*kind)
            .with_context(|| format!("no detector registered for {kind}"))?;

        note_info(&format!("Processing images with {}", kind.label()));
        let report = BatchRunner::new(&*detector, &config.source_dir, destination)
            .run(print_outcome)
            .await?;
        note_info(&batch_line(kind.label(), &report));

        comparison.push(kind.label(), report.elapsed);
        reports.push((kind.label().to_string(), report));
    }

    println!();
    for line in comparison.summary_lines() {
        println!("{line}");
    }
    if comparing {
        let rows: Vec<_> = reports.iter().map(|(label, r)| (label.clone(), r)).collect();
        println!();
        print!("{}", comparison_table(&rows));
    }

    Ok(())
}
