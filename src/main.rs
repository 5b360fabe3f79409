//! Verbos - Spanish verb conjugation trainer
//!
//! Flashcards, quizzes and conjugation drills in the terminal.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ratatui::prelude::*;

use verbos::config::Config;
use verbos::progress::Progress;
use verbos::selector::build_working_set;
use verbos::ui::App;
use verbos::{Catalog, Selection, SessionState, SessionStore};

const LOG_FILE: &str = "verbos.log";

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "verbos")]
#[command(author, version, about = "Spanish verb conjugation trainer for the terminal", long_about = None)]
struct Args {
    /// Directory for the saved session and the log file
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Seed for shuffling, for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Start a fresh session on a named set
    #[arg(short, long, value_name = "ID")]
    set: Option<String>,

    /// Print the named sets and exit
    #[arg(long)]
    list_sets: bool,

    /// Print progress of the saved session and exit
    #[arg(long)]
    stats: bool,

    /// Forget the saved session and exit
    #[arg(long)]
    clear: bool,
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    let args = Args::parse();

    // Determine data directory
    let data_dir = args.data_dir.unwrap_or_else(SessionStore::default_path);

    // Initialize storage and logging
    let store = SessionStore::new(data_dir)?;
    init_logging(store.data_dir())?;

    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };

    if args.list_sets {
        return list_sets();
    }

    if args.clear {
        if store.clear()? {
            println!("✓ Cleared saved progress");
        } else {
            println!("No saved progress to clear");
        }
        return Ok(());
    }

    if args.stats {
        return print_stats(&store, &mut rng);
    }

    let config = Config::load().unwrap_or_else(|err| {
        warn!("using default config: {:#}", err);
        Config::default()
    });

    // Run TUI
    run_tui(store, config, rng, args.set)
}

/// The terminal belongs to the TUI, so log lines go to a file.
fn init_logging(data_dir: &Path) -> Result<()> {
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {:?}", path))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn list_sets() -> Result<()> {
    let catalog = Catalog::bundled().context("Failed to load bundled catalog")?;
    for set in catalog.sets() {
        let count = build_working_set(&catalog, &Selection::set(set.id.clone())).len();
        println!(
            "{:<22} {:<28} {:<13} {:>3} items  {}",
            set.id,
            set.name,
            set.difficulty.name(),
            count,
            set.description
        );
    }
    Ok(())
}

fn print_stats(store: &SessionStore, rng: &mut ChaCha8Rng) -> Result<()> {
    let catalog = Catalog::bundled().context("Failed to load bundled catalog")?;
    let Some(session) = store
        .load_or_discard()
        .and_then(|snapshot| SessionState::restore(snapshot, rng))
    else {
        println!("No saved session");
        return Ok(());
    };

    let progress = Progress::of(&session);
    let label = session
        .selection()
        .map(|s| s.label(&catalog))
        .unwrap_or_else(|| "Unnamed set".to_string());

    println!("{}", label);
    println!(
        "  Mastered:  {}/{} ({}%)",
        progress.mastered,
        progress.total_items,
        progress.mastery_percent()
    );
    println!(
        "  Accuracy:  {}% ({}/{} attempts)",
        progress.accuracy_percent(),
        progress.correct_attempts,
        progress.total_attempts
    );
    println!(
        "  Regular:   {}   Irregular: {}",
        progress.regular_mastered, progress.irregular_mastered
    );
    if progress.is_complete() {
        println!("  ★ Complete");
    } else {
        println!("  Card {} of {} remaining", progress.position, progress.remaining);
    }
    Ok(())
}

fn run_tui(store: SessionStore, config: Config, rng: ChaCha8Rng, set: Option<String>) -> Result<()> {
    // Create app before touching the terminal so errors print normally
    let mut app = App::new(store, config, rng)?;

    if let Some(id) = set {
        if app.catalog.set(&id).is_none() {
            bail!("Unknown set '{}'. Try --list-sets", id);
        }
        app.start_session(Selection::set(id));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("starting tui");

    // Run main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| app.render(frame))?;
        app.handle_events()?;
    }
    Ok(())
}
