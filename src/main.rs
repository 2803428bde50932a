use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

use adaptive_connect_four::ai::{Agent, RandomAgent};
use adaptive_connect_four::config::AppConfig;
use adaptive_connect_four::game::{Difficulty, GameOutcome, GameSession, Mode, SessionStats, Side};
use adaptive_connect_four::learning::LearningStore;
use adaptive_connect_four::online::{GameBackend, InMemoryBackend, OnlineSession, SessionPhase};
use adaptive_connect_four::storage::{
    load_or_create_guest_id, FileStore, KeyValueStore, MemoryStore, ThemeSelection,
};

/// Connect Four against an adaptive AI, a friend, or the network.
#[derive(Parser)]
#[command(name = "connect-four", about = "Connect Four with an adaptive AI")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play against the AI on the terminal
    Play {
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
    },
    /// Two players sharing one terminal
    Local,
    /// Two in-process clients matched online, playing random moves
    OnlineDemo {
        #[arg(long, default_value_t = 1)]
        games: usize,
    },
    /// Inspect or reset what the AI has learned
    Learning {
        #[command(subcommand)]
        action: LearningAction,
    },
    /// Inspect or reset game statistics
    Stats {
        #[command(subcommand)]
        action: StatsAction,
    },
    /// Print the default configuration as TOML
    Config,
}

#[derive(Subcommand)]
enum LearningAction {
    Stats,
    Reset,
}

#[derive(Subcommand)]
enum StatsAction {
    Show,
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }

    match cli.command {
        Command::Config => {
            print!("{}", AppConfig::default_toml()?);
            Ok(())
        }
        Command::Play { difficulty } => {
            let store = open_store(&config);
            play(Mode::SinglePlayer(difficulty), &config, store).await
        }
        Command::Local => {
            let store = open_store(&config);
            play(Mode::LocalTwoPlayer, &config, store).await
        }
        Command::OnlineDemo { games } => online_demo(games).await,
        Command::Learning { action } => {
            let store = open_store(&config);
            let mut learning = LearningStore::load(store.as_ref(), config.learning.clone())
                .context("loading learning data")?;
            match action {
                LearningAction::Stats => {
                    let stats = learning.stats();
                    println!("games learned:    {}", stats.total_games);
                    println!("patterns stored:  {}", stats.patterns_learned);
                    for difficulty in Difficulty::ALL {
                        let count = learning
                            .patterns()
                            .iter()
                            .filter(|p| p.difficulty == difficulty)
                            .count();
                        println!("  {difficulty:<8} {count}");
                    }
                }
                LearningAction::Reset => {
                    learning.clear();
                    learning
                        .save(store.as_ref())
                        .context("saving cleared learning data")?;
                    println!("AI learning data cleared");
                }
            }
            Ok(())
        }
        Command::Stats { action } => {
            let store = open_store(&config);
            match action {
                StatsAction::Show => {
                    let stats = SessionStats::load(store.as_ref()).context("loading stats")?;
                    print_stats(&stats);
                }
                StatsAction::Reset => {
                    SessionStats::default()
                        .save(store.as_ref())
                        .context("saving stats")?;
                    println!("statistics cleared");
                }
            }
            Ok(())
        }
    }
}

/// File storage under the data directory, or memory when it is unusable.
fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    match FileStore::open(&config.storage) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "persistent storage unavailable, progress will not be saved");
            Arc::new(MemoryStore::new())
        }
    }
}

fn print_stats(stats: &SessionStats) {
    println!(
        "vs AI:  {} wins, {} losses, {} draws",
        stats.wins, stats.losses, stats.draws
    );
    println!(
        "local:  player 1 {} / player 2 {} / {} draws",
        stats.player_one_wins, stats.player_two_wins, stats.local_draws
    );
}

async fn read_column(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<usize>> {
    loop {
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line == "q" {
            return Ok(None);
        }
        match line.parse::<usize>() {
            Ok(col) => return Ok(Some(col)),
            Err(_) => println!("enter a column 0-6, or q to quit"),
        }
    }
}

async fn play(mode: Mode, config: &AppConfig, store: Arc<dyn KeyValueStore>) -> Result<()> {
    let guest = load_or_create_guest_id(store.as_ref()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not persist guest id");
        "guest".to_string()
    });
    let theme = ThemeSelection::load(store.as_ref()).unwrap_or_default();
    tracing::info!(player = %guest, theme = theme.selected(), ?mode, "starting game");

    let mut session = GameSession::new(
        mode,
        config.ai.clone(),
        config.learning.clone(),
        store,
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("\n{}", session.state().board());
        if let Some(outcome) = session.state().outcome() {
            match outcome {
                GameOutcome::Winner(side) => println!("{} wins!", side.name()),
                GameOutcome::Draw => println!("Draw."),
            }
            print_stats(&session.stats());
            println!("new game? [y/N]");
            match lines.next_line().await? {
                Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                    session.reset_game();
                    continue;
                }
                _ => return Ok(()),
            }
        }

        if session.is_ai_turn() {
            println!("AI is thinking...");
            let report = session.play_ai_turn().await?;
            println!("AI plays column {}", report.mv.col);
            continue;
        }

        println!("{} to move:", session.state().current_side().name());
        let Some(col) = read_column(&mut lines).await? else {
            return Ok(());
        };
        if let Err(e) = session.drop_disc(col) {
            println!("{e}");
        }
    }
}

async fn online_demo(games: usize) -> Result<()> {
    let backend: Arc<dyn GameBackend> = Arc::new(InMemoryBackend::new());
    for round in 0..games {
        let mut alice = OnlineSession::new(backend.clone(), format!("demo_a{round}"));
        let mut bob = OnlineSession::new(backend.clone(), format!("demo_b{round}"));

        alice.find_match().await?;
        bob.find_match().await?;
        while alice.phase() != SessionPhase::Playing {
            if alice.next_update().await.is_none() {
                bail!("subscription closed before the match was reported");
            }
        }

        let mut agents: [Box<dyn Agent>; 2] =
            [Box::new(RandomAgent::new()), Box::new(RandomAgent::new())];
        let mut game = alice.game().cloned().context("matched game missing")?;
        while !game.state.is_terminal() {
            let side = game.state.current_side();
            let (mover, watcher) = match side {
                Side::One => (&mut alice, &mut bob),
                Side::Two => (&mut bob, &mut alice),
            };
            let agent = &mut agents[usize::from(side.seat() - 1)];
            let Some(col) = agent.select_action(&game.state) else {
                break;
            };
            game = mover.make_move(col).await?.clone();
            // The opponent's projection catches up through its subscription
            while watcher.game().is_some_and(|g| g.version < game.version) {
                if watcher.next_update().await.is_none() {
                    bail!("subscription closed mid-game");
                }
            }
        }

        println!("{}", game.state.board());
        match game.state.outcome() {
            Some(GameOutcome::Winner(side)) => println!(
                "game {} won by {} after {} moves",
                round + 1,
                game.player_for(side).unwrap_or("?"),
                game.state.board().disc_count()
            ),
            _ => println!("game {} drawn", round + 1),
        }
        alice.leave_game();
        bob.leave_game();
    }
    tracing::info!(games, "online demo finished");
    Ok(())
}
