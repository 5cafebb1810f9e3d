use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sumpwatch::{data, events, ui, App, AppConfig};
use sumpwatch_adapters::script::{ScriptAlarm, ScriptCommand, ScriptSensor};
use sumpwatch_adapters::sim::SimulatedSump;
use sumpwatch_core::{AlarmSink, Monitor, NullAlarm, Poller, SensorSource, SharedReading};

#[derive(Parser, Debug)]
#[command(name = "sumpwatch")]
#[command(about = "Terminal HMI for monitoring a sump pump")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run against a simulated sump instead of the sensor scripts
    #[arg(long)]
    simulate: bool,

    /// Processing tick period (e.g., "1s", "250ms"); sets the sample rate
    #[arg(short, long)]
    tick: Option<String>,

    /// Simulated seconds per real second (only used with --simulate)
    #[arg(long, requires = "simulate")]
    speed: Option<f64>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;

    if let Some(ref tick) = args.tick {
        let period = data::duration::parse_interval(tick)?;
        config.monitor.sample_rate_hz = 1.0 / period.as_secs_f64();
        config.monitor.validate()?;
    }
    if let Some(speed) = args.speed {
        config.sim.time_scale = speed;
        config.sim.validate()?;
    }
    if let Some(path) = args.log_file {
        config.log.file = path;
    }

    init_logging(&config.log.file, &config.log.filter)?;

    // Background runtime for the poller and alarm commands
    let rt = tokio::runtime::Runtime::new()?;
    let guard = rt.enter();

    let source = build_source(&config, args.simulate)?;
    let description = source.description().to_string();
    let sink = build_alarm(&config, args.simulate)?;

    let monitor = Monitor::new(config.monitor.clone(), sink)?;
    let shared = SharedReading::new();
    let poller = Poller::builder(source)
        .calibration(config.monitor.calibration.clone())
        .interval(config.monitor.poll_interval())
        .build()
        .start(shared.clone());

    info!(
        source = %description,
        tick = ?config.monitor.tick_interval(),
        poll = ?config.monitor.poll_interval(),
        "Starting sumpwatch"
    );

    let app = App::new(monitor, shared, &description);
    let result = run_tui(app, config.monitor.tick_interval());

    // Signal shutdown and wait for the poll in flight
    rt.block_on(poller.shutdown());
    drop(guard);
    rt.shutdown_timeout(Duration::from_secs(1));
    info!("Stopped");

    result
}

fn init_logging(path: &Path, default_filter: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_source(config: &AppConfig, simulate: bool) -> Result<Box<dyn SensorSource>> {
    if simulate {
        return Ok(Box::new(SimulatedSump::new(
            config.sim.clone(),
            config.monitor.calibration.clone(),
        )));
    }

    let sensor = ScriptSensor::new(
        ScriptCommand::parse(&config.sensors.depth_command)?,
        ScriptCommand::parse(&config.sensors.leak_command)?,
    )
    .with_timeout(Duration::from_millis(config.sensors.timeout_ms));
    Ok(Box::new(sensor))
}

fn build_alarm(config: &AppConfig, simulate: bool) -> Result<Box<dyn AlarmSink>> {
    if simulate || !config.alarm.enabled {
        warn!("Alarm output disabled; leaks are shown on screen only");
        return Ok(Box::new(NullAlarm));
    }

    Ok(Box::new(ScriptAlarm::new(
        ScriptCommand::parse(&config.alarm.on_command)?,
        ScriptCommand::parse(&config.alarm.off_command)?,
        config.alarm.timeout_ms.map(Duration::from_millis),
        tokio::runtime::Handle::current(),
    )))
}

/// Run the TUI until the user quits
fn run_tui(mut app: App, tick_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app, tick_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick_interval: Duration,
) -> Result<()> {
    let mut next_tick = Instant::now() + tick_interval;

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let timeout = next_tick
            .saturating_duration_since(Instant::now())
            .min(Duration::from_millis(100));
        if let Some(event) = events::poll_event(timeout)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        if Instant::now() >= next_tick {
            app.tick();
            next_tick += tick_interval;
            // Don't try to catch up after a stall
            if next_tick < Instant::now() {
                next_tick = Instant::now() + tick_interval;
            }
        }
    }

    Ok(())
}
