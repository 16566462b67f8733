//! timeit-run - Run a timed focus cycle in the terminal
//!
//! Owns the one-second driver for the cycle engine: starts a cycle, ticks it
//! until it finishes, and interrupts it on Ctrl-C.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use libtimeit::clock::{SystemClock, TimestampIdGenerator};
use libtimeit::cycle::{derived_display, window_title, Cycle};
use libtimeit::events::{CycleEvent, EventBus, EventReceiver};
use libtimeit::logging::LoggingConfig;
use libtimeit::{Config, CycleEngine, CycleHistory, CycleState, TickResult, TimeitError};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "timeit-run")]
#[command(version)]
#[command(about = "Run a timed focus cycle in the terminal")]
#[command(long_about = "\
timeit-run - Run a timed focus cycle in the terminal

USAGE:
    # Focus on a task for the configured default duration
    timeit-run \"Write report\"

    # Pick the duration (1-60 minutes)
    timeit-run \"Write report\" --minutes 25

    # Machine-readable summary when the cycle ends
    timeit-run \"Write report\" -m 25 --format json

SIGNALS:
    SIGINT, SIGTERM - Interrupt the running cycle and print the summary

CONFIGURATION:
    Configuration file: ~/.config/timeit/config.toml (or $TIMEIT_CONFIG)

    [cycle]
    default_minutes = 5

    [timer]
    tick_interval_ms = 1000

    [logging]
    format = \"text\"   # text, json or pretty
    level = \"info\"

EXIT CODES:
    0 - Cycle finished or was interrupted
    1 - Runtime error
    2 - Configuration error or invalid arguments
    3 - Invalid task or duration
")]
struct Cli {
    /// What you are going to work on
    task: String,

    /// Cycle length in minutes (overrides config)
    #[arg(short, long, value_name = "MINUTES")]
    minutes: Option<u32>,

    /// Tick interval in milliseconds (overrides config)
    #[arg(long, value_name = "MS", hide = true)]
    tick_ms: Option<u64>,

    /// Summary format
    #[arg(short, long, value_enum, default_value_t = SummaryFormat::Text)]
    format: SummaryFormat,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// How the end-of-cycle summary is printed
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SummaryFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<TimeitError>()
            .map(TimeitError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default()?;
    LoggingConfig::from_config(&config.logging, cli.verbose).init();

    let minutes = cli.minutes.unwrap_or(config.cycle.default_minutes);
    let tick_ms = cli.tick_ms.unwrap_or(config.timer.tick_interval_ms).max(1);

    let event_bus = EventBus::new(16);
    let printer = tokio::spawn(print_events(event_bus.subscribe()));

    let engine = CycleEngine::from_config(
        &config.cycle,
        Arc::new(SystemClock),
        Arc::new(TimestampIdGenerator::new()),
    )
    .with_sink(Arc::new(event_bus.clone()));

    let shutdown = Arc::new(AtomicBool::new(false));
    setup_signal_handlers(shutdown.clone())?;

    let (state, cycle_id) = engine.start(&CycleState::new(), &cli.task, minutes)?;
    info!(cycle_id = %cycle_id, tick_ms, "driver running");

    let state = drive(&engine, state, Duration::from_millis(tick_ms), shutdown).await;

    // Closing every sender ends the printer task
    drop(engine);
    drop(event_bus);
    printer.await.context("event printer task failed")?;

    let cycle = CycleHistory::new(&state).get(&cycle_id)?;
    print_summary(cycle, cli.format)
}

/// Set up signal handlers for interrupting the cycle
fn setup_signal_handlers(shutdown: Arc<AtomicBool>) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;

    std::thread::spawn(move || {
        if let Some(sig) = signals.forever().next() {
            debug!(signal = sig, "received shutdown signal");
            shutdown.store(true, Ordering::Relaxed);
        }
    });

    Ok(())
}

/// Tick the engine until the cycle finishes or a signal arrives
async fn drive(
    engine: &CycleEngine,
    mut state: CycleState,
    period: Duration,
    shutdown: Arc<AtomicBool>,
) -> CycleState {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        if shutdown.load(Ordering::Relaxed) {
            info!("interrupt requested, stopping cycle");
            let state = engine.interrupt(&state);
            println!();
            return state;
        }

        let (next, result) = engine.tick_now(&state);
        match result {
            TickResult::Running { .. } => {
                print_countdown(&window_title(&next));
                state = next;
            }
            TickResult::Completed { cycle_id } => {
                let task = next.find(&cycle_id).map(|c| c.task.clone()).unwrap_or_default();
                print_countdown(&format!("{} - {}", derived_display(&next), task));
                println!();
                return next;
            }
            TickResult::Idle => return next,
        }
    }
}

fn print_countdown(line: &str) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "\r{}", line);
    let _ = stdout.flush();
}

/// Print advisory cycle events to stderr until the bus closes
async fn print_events(mut receiver: EventReceiver) {
    loop {
        match receiver.recv().await {
            Ok(CycleEvent::CycleStarted {
                task,
                minutes_amount,
                ..
            }) => eprintln!("Started '{}' for {} minute(s)", task, minutes_amount),
            Ok(CycleEvent::CycleCompleted { task, .. }) => {
                // Terminal bell stands in for the end-of-cycle sound
                eprintln!("\x07Finished '{}'", task);
            }
            Ok(CycleEvent::CycleInterrupted {
                task,
                elapsed_seconds,
                ..
            }) => eprintln!(
                "Interrupted '{}' after {:02}:{:02}",
                task,
                elapsed_seconds / 60,
                elapsed_seconds % 60
            ),
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "event printer lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_summary(cycle: &Cycle, format: SummaryFormat) -> Result<()> {
    match format {
        SummaryFormat::Json => {
            let json = serde_json::to_string_pretty(cycle).context("failed to encode summary")?;
            println!("{}", json);
        }
        SummaryFormat::Text => {
            let focused = cycle.focused_seconds().unwrap_or(0);
            println!(
                "{}: {} ({:02}:{:02} of {} minute(s) focused)",
                cycle.task,
                cycle.status(),
                focused / 60,
                focused % 60,
                cycle.minutes_amount
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_task_and_minutes() {
        let cli = Cli::try_parse_from(["timeit-run", "Write report", "--minutes", "25"]).unwrap();
        assert_eq!(cli.task, "Write report");
        assert_eq!(cli.minutes, Some(25));
        assert_eq!(cli.format, SummaryFormat::Text);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_requires_task() {
        assert!(Cli::try_parse_from(["timeit-run"]).is_err());
    }

    #[test]
    fn test_cli_parses_json_format() {
        let cli =
            Cli::try_parse_from(["timeit-run", "Write report", "--format", "json"]).unwrap();
        assert_eq!(cli.format, SummaryFormat::Json);
    }

    #[test]
    fn test_cli_rejects_unknown_format_before_running() {
        let err = Cli::try_parse_from(["timeit-run", "Write report", "--format", "xml"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_summary_prints_for_interrupted_cycle() {
        let engine = CycleEngine::with_system_defaults();
        let (state, id) = engine.start(&CycleState::new(), "Write report", 5).unwrap();
        let state = engine.interrupt(&state);
        let cycle = state.find(&id).unwrap();

        assert!(print_summary(cycle, SummaryFormat::Text).is_ok());
        assert!(print_summary(cycle, SummaryFormat::Json).is_ok());
    }

    #[tokio::test]
    async fn test_drive_interrupts_on_shutdown() {
        let engine = CycleEngine::with_system_defaults();
        let (state, id) = engine.start(&CycleState::new(), "Write report", 5).unwrap();
        let shutdown = Arc::new(AtomicBool::new(true));

        let state = drive(&engine, state, Duration::from_millis(10), shutdown).await;

        assert_eq!(state.active_cycle_id(), None);
        assert_eq!(
            state.find(&id).unwrap().status(),
            libtimeit::CycleStatus::Interrupted
        );
    }
}
