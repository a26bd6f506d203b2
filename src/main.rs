use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use roomba_core::config::LogConfig;

use roomba_dash::transport::wake::WakePin;
use roomba_dash::{app, config, logging, Dashboard, RobotLink, SerialTransport};

#[derive(Parser)]
#[command(name = "roomba-dash")]
#[command(about = "Telemetry dashboard and remote control for Open Interface robots", long_about = None)]
struct Cli {
    /// Interactive dashboard instead of the headless text report
    #[arg(long)]
    ui: bool,

    /// Serial device the robot is attached to
    #[arg(long, value_name = "PATH")]
    tty: Option<String>,

    /// Run against a simulated robot instead of a serial device
    #[arg(long, conflicts_with = "tty")]
    demo: bool,

    /// Sysfs GPIO number wired to the robot's BRC pin, pulsed before connecting
    #[arg(long, value_name = "GPIO")]
    brc: Option<WakePin>,

    /// JSON configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Write the final display state here as JSON when the interactive dashboard exits
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let bootstrap = LogConfig::default();
    let level = cli.log_level.as_deref().unwrap_or(&bootstrap.level);
    logging::init_logger(level, bootstrap.buffer_lines).context("installing logger")?;

    let config = config::load_or_default(cli.config.as_deref())?;
    let config_level = cli.log_level.is_none().then_some(config.log.level.as_str());
    logging::reconfigure(config_level, config.log.buffer_lines);

    info!("roomba-dash {}", env!("CARGO_PKG_VERSION"));

    let link = match (&cli.tty, cli.demo) {
        (Some(path), _) => {
            let timeout = Duration::from_millis(config.poll.read_timeout_ms);
            let serial = SerialTransport::open(path, timeout, cli.brc.as_ref())
                .with_context(|| format!("connecting to robot on {}", path))?;
            RobotLink::new(serial)
        }
        (None, true) => {
            info!("Using simulated robot");
            app::demo_link(&config)
        }
        (None, false) => anyhow::bail!("robot not initialized: pass --tty <device> or --demo"),
    };

    let dashboard = Dashboard::new(link, config);

    if cli.ui {
        let keys = app::spawn_key_reader(io::BufReader::new(io::stdin()))?;
        let state = dashboard.run_interactive(keys, &mut io::stdout())?;
        if let Some(path) = &cli.snapshot {
            app::write_snapshot(&state, path)?;
        }
    } else {
        dashboard.run_headless(&mut io::stdout().lock())?;
    }

    log::logger().flush();
    Ok(())
}
