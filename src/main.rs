use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, trace};

use gymlog::config::Config;
use gymlog::document::DocumentFormat;
use gymlog::server::AppServer;
use gymlog::service::DocumentService;
use gymlog::workout::WorkoutRecord;

/// Fill workout log templates and render them to PDF
#[derive(Parser)]
#[command(name = "gymlog", version)]
#[command(about = "Workout log template filler", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default command)
    Serve,
    /// Fill a template from a JSON workout record
    Fill {
        /// Workout record in JSON
        record: PathBuf,

        /// Template format to fill
        #[arg(long, value_enum, default_value = "docx")]
        format: FormatArg,

        /// Also convert the result to PDF
        #[arg(long)]
        pdf: bool,
    },
    /// List the placeholders used by a template
    Variables {
        /// Template file name inside the templates directory
        template: String,
    },
    /// Delete generated files older than the configured age
    Cleanup {
        /// Override the configured maximum age
        #[arg(long)]
        max_age_hours: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Docx,
    Html,
}

impl From<FormatArg> for DocumentFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Docx => DocumentFormat::Docx,
            FormatArg::Html => DocumentFormat::Html,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let log_level = match cli.verbose {
        0 => config.log_level.clone().unwrap_or_else(|| "info".to_string()),
        1 => "debug".to_string(),
        2 => "trace".to_string(),
        _ => "trace,hyper=debug,tower=debug".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("gymlog started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_serve(config).await,
        Commands::Fill {
            record,
            format,
            pdf,
        } => run_fill(config, &record, format.into(), pdf).await,
        Commands::Variables { template } => run_variables(config, &template).await,
        Commands::Cleanup { max_age_hours } => run_cleanup(config, max_age_hours).await,
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run_serve(config: Config) -> anyhow::Result<()> {
    let service = DocumentService::production(config).context("Failed to start service")?;
    AppServer::new(Arc::new(service)).start().await
}

async fn run_fill(
    config: Config,
    record_path: &Path,
    format: DocumentFormat,
    pdf: bool,
) -> anyhow::Result<()> {
    let contents = tokio::fs::read_to_string(record_path)
        .await
        .with_context(|| format!("Failed to read {}", record_path.display()))?;
    let record: WorkoutRecord = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid workout record in {}", record_path.display()))?;

    let service = DocumentService::production(config)?;
    let artifact = match (format, pdf) {
        (_, false) => service.generate(&record, format).await?,
        (DocumentFormat::Docx, true) => service.generate_docx_pdf(&record).await?,
        (DocumentFormat::Html, true) => service.generate_html_pdf(&record).await?,
    };

    info!("Wrote {}", artifact.path.display());
    println!("{}", artifact.path.display());
    Ok(())
}

async fn run_variables(config: Config, template: &str) -> anyhow::Result<()> {
    let format = DocumentFormat::from_path(Path::new(template))
        .with_context(|| format!("'{template}' is neither a .docx nor an .html template"))?;
    let service = DocumentService::production(config)?;
    let report = service.template_variables(template, format).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_cleanup(config: Config, max_age_hours: Option<u64>) -> anyhow::Result<()> {
    let max_age_hours = max_age_hours.unwrap_or(config.cleanup.max_age_hours);
    let service = DocumentService::production(config)?;
    let removed = service.cleanup_old_files(max_age_hours).await;
    println!("Removed {removed} file(s) older than {max_age_hours}h");
    Ok(())
}
