use anyhow::Context;
use clap::{Parser, ValueEnum};
use fnlab_config::LabConfig;
use fnlab_core::harness::{Harness, HarnessSettings};
use fnlab_core::metrics::RunMetrics;
use fnlab_core::peripherals::gpio::GpioLed;
use fnlab_core::peripherals::systick::IntervalTimer;
use fnlab_core::peripherals::uart::Uart;
use fnlab_core::routines::{HostRoutines, TemplateRoutines};
use fnlab_core::score::{RunStatus, Scorecard};
use fnlab_core::Routines;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RoutineSet {
    /// Working host implementation of every routine
    Reference,
    /// Unedited starter project: every routine returns zero
    Template,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Functions Lab test harness", long_about = None)]
struct Args {
    /// Path to the lab configuration (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable per-test-case debug logging
    #[arg(short, long)]
    trace: bool,

    /// Routines to run the test vectors through
    #[arg(short, long, value_enum, default_value_t = RoutineSet::Reference)]
    routines: RoutineSet,

    /// Report passing checks too, not only failures
    #[arg(short, long)]
    verbose: bool,

    /// Number of post-test idle reports (0 = forever); overrides the config
    #[arg(long)]
    idle_cycles: Option<u64>,

    /// Do not echo the UART report stream to stdout
    #[arg(long)]
    no_uart_stdout: bool,

    /// Directory to write result.json into
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RunResult<'a> {
    status: RunStatus,
    student: &'a str,
    routines: &'a str,
    total_points: u32,
    max_points: u32,
    #[serde(flatten)]
    scorecard: &'a Scorecard,
    config: &'a LabConfig,
}

fn run_with<R: Routines>(
    settings: HarnessSettings,
    routines: R,
    uart_stdout: bool,
) -> anyhow::Result<Scorecard> {
    let sink = if uart_stdout {
        Uart::stdout()
    } else {
        Uart::discard()
    };
    let timer = IntervalTimer::new(settings.test_period);
    let metrics = Arc::new(RunMetrics::new());

    let mut harness = Harness::new(
        settings,
        routines,
        Box::new(sink),
        Box::new(timer),
        Box::new(GpioLed::new(0)),
    );
    harness.add_observer(metrics.clone());

    let scorecard = harness.run().context("Lab run aborted")?;
    info!(
        "Ran {} test cases ({} checks passed, {} failed) in {:?}",
        metrics.get_cases(),
        metrics.get_checks_passed(),
        metrics.get_checks_failed(),
        metrics.elapsed()
    );
    Ok(scorecard)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the UART stream.
    let level = if args.trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Functions Lab harness");

    let mut config = if let Some(path) = &args.config {
        info!("Loading lab config: {:?}", path);
        LabConfig::from_file(path)?
    } else {
        info!("Using default lab configuration");
        LabConfig::default()
    };
    if args.verbose {
        config.only_print_fails = false;
    }
    if let Some(cycles) = args.idle_cycles {
        config.idle_cycles = cycles;
    }

    let settings = HarnessSettings::from_config(&config)?;
    info!(
        "{} test vectors, routines: {:?}",
        settings.vectors.len(),
        args.routines
    );

    let uart_stdout = !args.no_uart_stdout;
    let scorecard = match args.routines {
        RoutineSet::Reference => run_with(settings, HostRoutines::new(), uart_stdout)?,
        RoutineSet::Template => run_with(settings, TemplateRoutines::new(), uart_stdout)?,
    };

    let status = scorecard.status();
    info!(
        "Final score: {} of {} points ({:?})",
        scorecard.total_points(),
        scorecard.max_points(),
        status
    );

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        let result = RunResult {
            status,
            student: &config.student_name,
            routines: match args.routines {
                RoutineSet::Reference => "reference",
                RoutineSet::Template => "template",
            },
            total_points: scorecard.total_points(),
            max_points: scorecard.max_points(),
            scorecard: &scorecard,
            config: &config,
        };
        let path = dir.join("result.json");
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {:?}", path))?;
        info!("Wrote {:?}", path);
    }

    if status == RunStatus::Fail {
        std::process::exit(1);
    }
    Ok(())
}
