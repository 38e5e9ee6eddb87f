//! GenOpp - generic drug opportunity grading CLI
//!
//! Runs the agent panel for one molecule and writes the graded report.
//!
//! Exit codes:
//!   0 - Success (grade at or above threshold, or no --fail-below set)
//!   1 - Runtime error (config, agent failure, timeout, write failure, etc.)
//!   2 - Overall grade below the --fail-below threshold

use anyhow::{Context, Result};
use genopp::cli::{Args, OutputFormat};
use genopp::config::{Config, CONFIG_FILE_NAME};
use genopp::models::{AnalysisResponse, ScoreGroup};
use genopp::pipeline::Pipeline;
use genopp::report::{self, format_score, ConclusionTier};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("GenOpp v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_analysis(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .genopp.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize grading weights, scoring rules and sources.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the pipeline once. Returns exit code (0 or 2).
async fn run_analysis(args: Args) -> Result<i32> {
    let start_time = Instant::now();
    let show_progress = !args.quiet && !args.stdout;

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config
        .validate()
        .context("Invalid configuration after applying command-line overrides")?;

    let pipeline = Pipeline::from_config(&config)?;
    let request = args.request();

    if show_progress {
        println!("🧪 Evaluating: {}", request.molecule_or(report::FALLBACK_MOLECULE));
        println!("   Agents: {}", pipeline.registry().len());
        println!("   On agent failure: {}", config.pipeline.on_agent_failure);
        if let Some(secs) = config.pipeline.timeout_seconds {
            println!("   Timeout: {}s", secs);
        }
        if config.sources.enabled {
            println!("   Live sources: enabled");
        }
    }

    let spinner = show_progress.then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message(format!("Running {} agents...", pipeline.registry().len()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let outcome = pipeline.run(&request).await;

    if let Some(pb) = spinner {
        match &outcome {
            Ok(_) => pb.finish_with_message("Agents complete"),
            Err(_) => pb.abandon_with_message("Run aborted"),
        }
    }
    let response = outcome?;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&response)?,
        OutputFormat::Text => response.report_content.clone(),
    };

    if args.stdout {
        println!("{}", output);
    } else {
        let path = PathBuf::from(&config.general.output);
        report::write_report(&path, &output)?;
        if show_progress {
            print_summary(&response, start_time.elapsed().as_secs_f64());
            println!("\n✅ Analysis complete! Report saved to: {}", path.display());
        }
    }

    if let Some(threshold) = args.fail_below {
        if response.grading.overall_score < threshold {
            eprintln!(
                "\n⛔ Overall grade {} is below {}. Failing (exit code 2).",
                format_score(response.grading.overall_score),
                format_score(threshold)
            );
            return Ok(2);
        }
    }

    Ok(0)
}

fn print_summary(response: &AnalysisResponse, duration: f64) {
    let grading = &response.grading;

    println!("\n📊 Grading Summary:");
    println!("   Overall: {}", format_score(grading.overall_score));
    for group in ScoreGroup::ALL {
        println!("   - {}: {}", group.label(), format_score(grading.group(group)));
    }
    println!(
        "   Verdict: {}",
        ConclusionTier::from_score(grading.overall_score)
    );
    println!("   Run: {}", response.run_id);
    println!("   Duration: {:.1}s", duration);
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location. A file that exists but fails validation is an error.
    match Config::load_default()? {
        Some(config) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
