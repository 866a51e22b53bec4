use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use spinwheel::entries::{entry_count, parse_entries};
use spinwheel::{FontConfig, MissingForced, SpinWheel, WheelCommand, WheelConfig, WindowConfig};

/// Spin a wheel of entries. Stdin lines are read as commands
/// (`spin`, `spin <label>`, `add <label>`, `shuffle`, `sort`, `clear`,
/// `clear-results`, `forced <label>`, `unforced`).
#[derive(Parser, Debug)]
#[command(name = "spinwheel", version, about)]
struct Cli {
    /// File with one entry per line
    #[arg(long)]
    entries: Option<PathBuf>,

    /// Entry every spin should land on
    #[arg(long)]
    forced: Option<String>,

    /// What to do when the forced entry is not on the wheel
    #[arg(long, default_value = "reject")]
    missing_forced: MissingForced,

    #[arg(long, default_value = "Wheel")]
    title: String,

    /// Window width and height in logical pixels
    #[arg(long, default_value_t = 640)]
    size: usize,

    /// TrueType font for labels
    #[arg(long)]
    font: Option<PathBuf>,

    /// Seed for reproducible spins
    #[arg(long)]
    seed: Option<u64>,

    /// Disable the pointer flash on wedge crossings
    #[arg(long)]
    no_tick: bool,

    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install the log subscriber")?;

    let entries = cli
        .entries
        .as_ref()
        .map(|path| -> anyhow::Result<Vec<String>> {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read entries from {}", path.display()))?;
            tracing::info!(count = entry_count(&text), "loaded entries from {}", path.display());
            Ok(parse_entries(&text))
        })
        .transpose()?;

    let config = WheelConfig::builder()
        .title(cli.title)
        .maybe_entries(entries)
        .maybe_forced(cli.forced)
        .missing_forced(cli.missing_forced)
        .maybe_seed(cli.seed)
        .tick_feedback(!cli.no_tick)
        .window(WindowConfig {
            width: cli.size,
            height: cli.size,
            ..WindowConfig::default()
        })
        .font(FontConfig {
            path: cli.font,
            ..FontConfig::default()
        })
        .build();

    let (sender, receiver) = mpsc::channel();

    // Stdin commands feed the window until stdin closes or the window goes away
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<WheelCommand>() {
                Ok(command) => {
                    if sender.send(command).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("{e}"),
            }
        }
    });

    let mut wheel = SpinWheel::new(config);
    wheel
        .show_with_commands(receiver)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("wheel window failed")
}
