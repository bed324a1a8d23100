use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;
use std::process;

use rusty_logic::board::Board;
use rusty_logic::circuit_config::CircuitFactory;
use rusty_logic::console::{run_console, ConsoleConfig};
use rusty_logic::systems::{adder_board, lcd_board, BenEater};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum System {
    /// 4-bit ripple-carry adder with two switch banks
    Adder,
    /// 8-bit microcoded breadboard CPU running the multiply demo
    BenEater,
    /// ROM-driven character LCD
    Lcd,
}

#[derive(Debug, Parser)]
#[command(name = "rusty_logic", version, about = "Gate-level digital circuit simulator")]
struct Cli {
    /// Prebuilt board to load
    #[arg(long, value_enum, default_value_t = System::Adder, conflicts_with = "config")]
    system: System,

    /// JSON circuit description to load instead of a prebuilt board
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tick the clock this many times, print the probes and exit
    #[arg(long)]
    ticks: Option<usize>,

    /// Console refresh interval in milliseconds
    #[arg(long, default_value_t = 100)]
    refresh_ms: u64,
}

fn load(cli: &Cli) -> Result<Board, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.config {
        info!("loading circuit from {}", path.display());
        return Ok(CircuitFactory::new().create_from_json(path)?);
    }
    let board = match cli.system {
        System::Adder => adder_board(4)?,
        System::BenEater => BenEater::with_demo()?.board,
        System::Lcd => lcd_board()?,
    };
    Ok(board)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut board = load(&cli)?;
    let report = board.init()?;
    info!(
        "'{}' settled after {} pass(es)",
        board.name(),
        report.passes
    );

    match cli.ticks {
        Some(ticks) => {
            if ticks > 0 {
                board.tick_clock(ticks)?;
            }
            println!("{} after {} tick(s)", board.name(), ticks);
            for (label, reading) in board.readings() {
                let mut rows = reading.lines();
                println!("  {:>8}: {}", label, rows.next().unwrap_or_default());
                for row in rows {
                    println!("  {:>8}  {}", "", row);
                }
            }
            Ok(())
        }
        None => run_console(
            board,
            ConsoleConfig {
                refresh_rate_ms: cli.refresh_ms,
                ..ConsoleConfig::default()
            },
        ),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
