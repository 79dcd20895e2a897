use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use log::{error, info};

use speed_dial::directory::DEFAULT_DIRECTORY_URL;
use speed_dial::errors::{format_error_for_display, SpeedDialError};
use speed_dial::progress::{LogProgress, ProgressCallback};
use speed_dial::results::RunSummary;
use speed_dial::speedtest::config::DEFAULT_TICK_INTERVAL_MS;
use speed_dial::speedtest::{
    AnySampler, ControllerConfig, LatencyProbeSampler, ProbeConfig,
    RandomSampler, TestPhaseController,
};
use speed_dial::tui::{poll_action, Action, DisplayMode, TuiController};

/// How long to wait for a key press between two frames.
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Each phase fills the dial on its own, with random readouts
    Discrete,
    /// One sweep across all phases, driven by latency probes
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SamplerKind {
    Random,
    Probe,
}

#[derive(Parser)]
#[command(author, version = version(), about, long_about = None)]
struct Cli {
    /// Pacing of the dial
    #[arg(long, value_enum, default_value_t = Variant::Discrete)]
    variant: Variant,

    /// Where readouts come from [default: random for discrete, probe for continuous]
    #[arg(long, value_enum)]
    sampler: Option<SamplerKind>,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    tick_ms: u64,

    /// Percent added to progress on every tick [default: 2 discrete, 1 continuous]
    #[arg(long)]
    step: Option<f64>,

    /// Server directory queried by the probe sampler
    #[arg(long, default_value = DEFAULT_DIRECTORY_URL)]
    directory_url: String,

    /// Give up on a probe after this many milliseconds
    #[arg(long)]
    probe_timeout_ms: Option<u64>,

    /// Run once without the dial and print the result as JSON
    #[arg(long)]
    json: bool,

    /// Start with the dark palette
    #[arg(long)]
    dark: bool,

    /// Append log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

fn version() -> &'static str {
    match option_env!("SPEEDDIAL_BUILD_GIT_HASH") {
        Some(hash) => Box::leak(
            format!("{} (rev {})", env!("CARGO_PKG_VERSION"), hash).into_boxed_str(),
        ),
        None => env!("CARGO_PKG_VERSION"),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let mode = DisplayMode::from_stdout(cli.json);

    if let Err(e) = run(cli, mode).await {
        error!("{}", e);
        eprintln!("{}", format_error_for_display(&e));
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, mode: DisplayMode) -> Result<(), SpeedDialError> {
    init_logging(&cli, mode)?;

    let config = controller_config(&cli);
    let sampler = build_sampler(&cli)?;
    info!(
        "Starting {} run with the {} sampler",
        config.pacing.name(),
        sampler.name()
    );

    match mode {
        DisplayMode::Tui => run_interactive(config, sampler, cli.dark).await,
        DisplayMode::Silent | DisplayMode::Json => {
            run_headless(config, sampler, mode).await
        }
    }
}

/// Logs go to `--log-file` when given. Without one they go to stderr in
/// headless modes and nowhere while the dial owns the screen.
fn init_logging(cli: &Cli, mode: DisplayMode) -> Result<(), SpeedDialError> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(cli.verbose.log_level_filter())
        .parse_default_env()
        .format_timestamp_millis();

    match cli.log_file {
        Some(ref path) => {
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    SpeedDialError::config(format!(
                        "Cannot open log file {}: {}",
                        path.display(),
                        e
                    ))
                    .with_source(e)
                })?;
            builder.target(env_logger::Target::Pipe(Box::new(log_file)));
        }
        None if mode.logs_to_stderr() => {
            builder.target(env_logger::Target::Stderr);
        }
        None => return Ok(()),
    }

    builder.init();
    Ok(())
}

fn controller_config(cli: &Cli) -> ControllerConfig {
    let config = match cli.variant {
        Variant::Discrete => ControllerConfig::discrete(),
        Variant::Continuous => ControllerConfig::continuous(),
    }
    .with_tick_interval(Duration::from_millis(cli.tick_ms));

    match cli.step {
        Some(step) => config.with_step(step),
        None => config,
    }
}

fn build_sampler(cli: &Cli) -> Result<AnySampler, SpeedDialError> {
    let kind = cli.sampler.unwrap_or(match cli.variant {
        Variant::Discrete => SamplerKind::Random,
        Variant::Continuous => SamplerKind::Probe,
    });

    match kind {
        SamplerKind::Random => Ok(AnySampler::Random(RandomSampler::default())),
        SamplerKind::Probe => {
            let config = ProbeConfig::new(&cli.directory_url)?
                .with_timeout(cli.probe_timeout_ms.map(Duration::from_millis));
            Ok(AnySampler::Probe(LatencyProbeSampler::new(config)?))
        }
    }
}

async fn run_interactive(
    config: ControllerConfig,
    sampler: AnySampler,
    dark_mode: bool,
) -> Result<(), SpeedDialError> {
    let mut tui = TuiController::new(DisplayMode::Tui);
    tui.set_dark_mode(dark_mode);

    let mut controller =
        TestPhaseController::new(config, sampler, tui.progress_callback())?;

    tui.init()?;

    loop {
        tui.render()?;

        let action =
            tokio::task::block_in_place(|| poll_action(FRAME_INTERVAL))?;
        match action {
            Some(Action::Toggle) => controller.toggle(),
            Some(Action::ToggleTheme) => {
                let dark_mode = tui.toggle_dark_mode();
                info!("Dark mode {}", if dark_mode { "on" } else { "off" });
            }
            Some(Action::Quit) => break,
            None => {}
        }
    }

    controller.stop();
    tui.cleanup()
}

async fn run_headless(
    config: ControllerConfig,
    sampler: AnySampler,
    mode: DisplayMode,
) -> Result<(), SpeedDialError> {
    let pacing = config.pacing;
    let sampler_name = sampler.name();
    let callback: Arc<dyn ProgressCallback> = Arc::new(LogProgress);
    let mut controller = TestPhaseController::new(config, sampler, callback)?;

    controller.start();
    let interrupted = tokio::select! {
        _ = controller.wait() => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        info!("Interrupted");
        controller.stop();
    }

    let summary = RunSummary::new(pacing, sampler_name, controller.snapshot());
    match mode {
        DisplayMode::Json => println!("{}", summary.to_json()?),
        _ => println!("{}", summary.to_text()),
    }

    Ok(())
}
