use analytics::{DescriptiveSummary, StatisticsCalculator, SummaryRequest};
use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{DEFAULT_PERCENTILES, OptionOverrides, RawAnalysisOptions, Settings};
use core_types::{NumericSample, SampleFilter};
use distributions::{DistributionFitter, FitResult};
use engine::section::Section;
use engine::{AnalysisRequest, AnalyticsEngine, AnalyticsReport, JsonFileSource};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// The main entry point for the vendstat analytics CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();

    // Logs go to stderr so JSON output on stdout stays clean.
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .init();

    let cli = Cli::parse();
    let settings = configuration::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Report(args) => handle_report(args, settings).await,
        Commands::Describe(args) => handle_describe(args),
        Commands::Fit(args) => handle_fit(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Statistical analytics over vending order data.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file (defaults to ./vendstat.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis over an exported dataset.
    Report(ReportArgs),
    /// Describe a list of values.
    Describe(DescribeArgs),
    /// Fit distributions to a list of values.
    Fit(FitArgs),
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Parser)]
struct ReportArgs {
    /// The dataset file (JSON export of the data-access layer).
    #[arg(long)]
    input: PathBuf,

    /// A JSON file with analysis options. Command-line flags win over it.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Maximum number of order amounts to analyze.
    #[arg(long)]
    limit: Option<u32>,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,

    #[command(flatten)]
    overrides: OptionOverrides,
}

#[derive(Parser)]
struct DescribeArgs {
    /// Comma separated values (e.g. "12.5,30,8").
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
    values: Vec<f64>,

    #[arg(long, default_value_t = 0.95)]
    confidence: f64,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Parser)]
struct FitArgs {
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
    values: Vec<f64>,

    /// Distributions to fit (comma separated: normal,poisson).
    #[arg(long, value_delimiter = ',')]
    distributions: Option<Vec<String>>,

    /// Fit samples below ten observations and flag them instead of failing.
    #[arg(long)]
    informational: bool,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_report(args: ReportArgs, settings: Settings) -> anyhow::Result<()> {
    let file_options = match &args.options {
        Some(path) => read_options(path)?,
        None => RawAnalysisOptions::default(),
    };
    let options = RawAnalysisOptions::from(args.overrides).merged_over(&file_options);

    let engine = AnalyticsEngine::new(settings)?;
    let request = AnalysisRequest {
        filter: SampleFilter { limit: args.limit, ..SampleFilter::default() },
        options,
        as_of: Utc::now(),
    };

    tracing::info!(input = %args.input.display(), "Starting analysis");
    let report = engine.run(&JsonFileSource::new(&args.input), request).await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

fn handle_describe(args: DescribeArgs) -> anyhow::Result<()> {
    let sample = NumericSample::new(args.values)?;
    let summary = StatisticsCalculator::new().summarize(
        &sample,
        SummaryRequest {
            percentiles: &DEFAULT_PERCENTILES,
            confidence_level: args.confidence,
            auxiliary_data: false,
        },
    )?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Table => println!("{}", summary_table(&summary)),
    }
    Ok(())
}

fn handle_fit(args: FitArgs) -> anyhow::Result<()> {
    let options = RawAnalysisOptions { distributions: args.distributions, ..Default::default() }
        .validate()?;
    let sample = NumericSample::new(args.values)?;

    let fitter = DistributionFitter::new();
    let fit = if args.informational {
        fitter.fit_informational(&sample, &options.distributions)
    } else {
        fitter.fit(&sample, &options.distributions)?
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&fit)?),
        OutputFormat::Table => println!("{}", fit_table(&fit)),
    }
    Ok(())
}

fn read_options(path: &Path) -> anyhow::Result<RawAnalysisOptions> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse options file {}", path.display()))
}

// ==============================================================================
// Table Rendering
// ==============================================================================

fn print_report(report: &AnalyticsReport) {
    let mut sections = Table::new();
    sections.load_preset(UTF8_FULL).set_header(vec!["Section", "Status", "Detail"]);
    sections.add_row(section_row("descriptive", &report.descriptive));
    sections.add_row(section_row("probability", &report.probability));
    sections.add_row(section_row("insights", &report.insights));
    println!("{sections}");

    if let Some(summary) = report.descriptive.data() {
        println!("{}", summary_table(summary));
    }
    if let Some(probability) = report.probability.data() {
        println!("{}", fit_table(&probability.amounts));
    }
    if let Some(insights) = report.insights.data() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec!["Recommendation", "Category", "Priority"]);
        for rec in &insights.recommendations {
            table.add_row(vec![
                rec.title.clone(),
                format!("{:?}", rec.category),
                rec.priority.to_string(),
            ]);
        }
        println!("{table}");
        if !insights.data_gaps.is_empty() {
            println!("Data gaps: {}", insights.data_gaps.join(", "));
        }
    }
}

fn section_row<T>(name: &str, section: &Section<T>) -> Vec<String> {
    match section {
        Section::Ready { .. } => vec![name.to_string(), "ready".to_string(), String::new()],
        Section::NoData { reason } => vec![name.to_string(), "no data".to_string(), reason.clone()],
        Section::Failed { kind, reason } => {
            vec![name.to_string(), format!("failed ({kind})"), reason.clone()]
        }
    }
}

fn summary_table(summary: &DescriptiveSummary) -> Table {
    let stats = &summary.statistics;
    let ci = &summary.confidence_interval;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Measure", "Value"]);
    table.add_row(vec!["count".to_string(), stats.count.to_string()]);
    for (name, value) in [
        ("mean", stats.mean),
        ("median", stats.median),
        ("std dev", stats.standard_deviation),
        ("min", stats.min),
        ("max", stats.max),
        ("skewness", stats.skewness),
        ("kurtosis", stats.kurtosis),
        ("cv %", stats.coefficient_of_variation),
    ] {
        table.add_row(vec![name.to_string(), format!("{value:.4}")]);
    }
    for p in &stats.percentiles {
        table.add_row(vec![format!("p{}", p.percentile), format!("{:.4}", p.value)]);
    }
    table.add_row(vec![
        format!("{:.0}% CI", ci.confidence_level * 100.0),
        format!("[{:.4}, {:.4}]", ci.lower, ci.upper),
    ]);
    table.add_row(vec!["outliers".to_string(), summary.outliers.outliers.len().to_string()]);
    table.add_row(vec!["data quality".to_string(), summary.data_quality.score.to_string()]);
    table
}

fn fit_table(fit: &FitResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Model", "Parameters", "KS D", "p-value", "Rejected", "Best"]);
    for model in &fit.models {
        let parameters = model
            .parameters
            .iter()
            .map(|(name, value)| format!("{name}={value:.4}"))
            .collect::<Vec<_>>()
            .join(", ");
        let gof = &model.goodness_of_fit;
        table.add_row(vec![
            model.kind.to_string(),
            parameters,
            format!("{:.4}", gof.statistic),
            format!("{:.4}", gof.p_value),
            gof.reject_null.to_string(),
            (fit.best == Some(model.kind)).to_string(),
        ]);
    }
    if !fit.reliable {
        table.add_row(vec![format!("unreliable: n={} below 10", fit.sample_size)]);
    }
    table
}
