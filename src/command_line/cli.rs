#![allow(clippy::cast_precision_loss)]

use clap::{ArgAction, Args, Parser, Subcommand};
use minesweeper_agent::agent::ai::Agent;
use minesweeper_agent::agent::cell::Dimensions;
use minesweeper_agent::agent::config::{AgentConfig, ConsistencyPolicy};
use minesweeper_agent::agent::inference::EngineStats;
use minesweeper_agent::game::board::{Board, Minefield};
use minesweeper_agent::game::play::{GameOutcome, GameReport, play};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};
use tracing_subscriber::EnvFilter;

/// File extension recognised when playing a directory of layouts.
const LAYOUT_EXTENSION: &str = "board";

/// Defines the command-line interface for the minesweeper agent.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "minesweeper-agent",
    version,
    about = "A Minesweeper agent that only opens cells it can prove are safe"
)]
pub(crate) struct Cli {
    /// Specifies the subcommand to execute (e.g. `play`, `file`, `dir`).
    #[clap(subcommand)]
    pub command: Commands,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Play one or more games on randomly generated boards.
    Play {
        /// Number of rows.
        #[arg(long, default_value_t = 8)]
        height: usize,

        /// Number of columns.
        #[arg(long, default_value_t = 8)]
        width: usize,

        /// Number of mines placed on each board.
        #[arg(short, long, default_value_t = 8)]
        mines: usize,

        /// Number of games to play.
        #[arg(short, long, default_value_t = 1)]
        games: usize,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Play a board read from a layout file (`*` mine, `.` clear, `#` comment).
    File {
        /// Path to the layout file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Play every `.board` layout file under a directory.
    Dir {
        /// Directory to search recursively.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct CommonOptions {
    /// Enable debug output, logging every observation and fixed point.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Print game and inference statistics after playing (`--stats false` to disable).
    #[arg(short, long, action = ArgAction::Set, default_value_t = true)]
    pub(crate) stats: bool,

    /// Print each board before it is played.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_board: bool,

    /// How the knowledge base handles internal-consistency faults.
    #[arg(long, default_value_t = ConsistencyPolicy::default())]
    pub(crate) policy: ConsistencyPolicy,

    /// Seed for board generation and random moves.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

/// Totals over every game played in one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Session {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub stuck: usize,
    pub moves: usize,
    pub safe_moves: usize,
    pub random_moves: usize,
    pub engine: EngineStats,
}

impl Session {
    pub(crate) fn record(&mut self, report: &GameReport) {
        self.games += 1;
        match report.outcome {
            GameOutcome::Won => self.wins += 1,
            GameOutcome::Lost(_) => self.losses += 1,
            GameOutcome::NoMoves => self.stuck += 1,
        }
        self.moves += report.moves;
        self.safe_moves += report.safe_moves;
        self.random_moves += report.random_moves;

        let s = report.stats;
        self.engine.observations += s.observations;
        self.engine.passes += s.passes;
        self.engine.derived_sentences += s.derived_sentences;
        self.engine.inferred_safes += s.inferred_safes;
        self.engine.inferred_mines += s.inferred_mines;
        self.engine.clamped_faults += s.clamped_faults;
    }

    pub(crate) fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64 * 100.0
        }
    }
}

/// Installs the `tracing` subscriber. `RUST_LOG` is honoured unless `--debug`
/// is given.
pub(crate) fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Plays `games` games on random boards of the given size.
///
/// # Errors
///
/// If the board parameters are invalid or the agent reports a fault.
pub(crate) fn play_random(
    dimensions: Dimensions,
    mines: usize,
    games: usize,
    common: &CommonOptions,
) -> Result<(), String> {
    let mut rng = common.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let mut session = Session::default();
    let time = Instant::now();

    for game in 0..games {
        let board = Minefield::random(dimensions, mines, &mut rng).map_err(|e| e.to_string())?;
        let label = format!("game {}/{games}", game + 1);
        let report = play_board(&board, common, &label, rng.u64(..))?;
        session.record(&report);
    }

    report_session(&session, time.elapsed(), common)
}

/// Plays a single layout file.
///
/// # Errors
///
/// If the file cannot be read or parsed, or the agent reports a fault.
pub(crate) fn play_file(path: &Path, common: &CommonOptions) -> Result<(), String> {
    let board = Minefield::from_file(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let seed = common.seed.unwrap_or_else(|| fastrand::u64(..));
    let time = Instant::now();

    let mut session = Session::default();
    session.record(&play_board(&board, common, &path.display().to_string(), seed)?);
    report_session(&session, time.elapsed(), common)
}

/// Plays every layout file under `path`.
/// Files that do not end in `.board` are skipped.
///
/// # Errors
///
/// If `path` is not a directory, or any layout fails to parse or play.
pub(crate) fn play_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("Provided path is not a directory: {}", path.display()));
    }

    let mut rng = common.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let mut session = Session::default();
    let time = Instant::now();

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != LAYOUT_EXTENSION) {
            tracing::debug!(path = %file_path.display(), "skipping non-layout file");
            continue;
        }

        let board = Minefield::from_file(file_path).map_err(|e| format!("{}: {e}", file_path.display()))?;
        let report = play_board(&board, common, &file_path.display().to_string(), rng.u64(..))?;
        session.record(&report);
    }

    report_session(&session, time.elapsed(), common)
}

/// Plays one board with a fresh agent and prints the outcome line.
///
/// # Errors
///
/// If the agent reports a fault while playing.
pub(crate) fn play_board(
    board: &Minefield,
    common: &CommonOptions,
    label: &str,
    seed: u64,
) -> Result<GameReport, String> {
    if common.print_board {
        println!("{label}:\n{board}");
    }

    let config = AgentConfig::new(common.policy, Some(seed));
    let mut agent = Agent::new(board.dimensions(), config);
    let report = play(board, &mut agent).map_err(|e| format!("{label}: {e}"))?;

    println!(
        "{label}: {} after {} moves ({} random), {}/{} mines flagged",
        report.outcome,
        report.moves,
        report.random_moves,
        agent.known_mines().len(),
        board.mine_count()
    );
    Ok(report)
}

fn report_session(session: &Session, elapsed: Duration, common: &CommonOptions) -> Result<(), String> {
    if !common.stats {
        return Ok(());
    }

    epoch::advance().map_err(|e| e.to_string())?;
    let allocated_bytes = stats::allocated::mib()
        .and_then(|m| m.read())
        .map_err(|e| e.to_string())?;
    let resident_bytes = stats::resident::mib()
        .and_then(|m| m.read())
        .map_err(|e| e.to_string())?;

    let allocated_mib = allocated_bytes as f64 / (1024.0 * 1024.0);
    let resident_mib = resident_bytes as f64 / (1024.0 * 1024.0);

    print_stats(session, elapsed, allocated_mib, resident_mib);
    Ok(())
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of game and inference statistics.
pub(crate) fn print_stats(session: &Session, elapsed: Duration, allocated: f64, resident: f64) {
    let elapsed_secs = elapsed.as_secs_f64();
    let e = session.engine;

    println!("\n=========================[ Game Statistics ]=========================");
    stat_line("Games", session.games);
    stat_line("Won", session.wins);
    stat_line("Lost", session.losses);
    stat_line("No moves left", session.stuck);
    stat_line("Win rate (%)", format!("{:.1}", session.win_rate()));
    stat_line("Moves", session.moves);
    stat_line("Safe moves", session.safe_moves);
    stat_line("Random moves", session.random_moves);

    println!("======================[ Inference Statistics ]=======================");
    stat_line_with_rate("Observations", e.observations, elapsed_secs);
    stat_line_with_rate("Passes", e.passes, elapsed_secs);
    stat_line_with_rate("Derived sentences", e.derived_sentences, elapsed_secs);
    stat_line("Inferred safes", e.inferred_safes);
    stat_line("Inferred mines", e.inferred_mines);
    stat_line("Clamped faults", e.clamped_faults);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use minesweeper_agent::agent::cell::Cell;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_play() {
        let cli = Cli::try_parse_from([
            "minesweeper-agent",
            "play",
            "--height",
            "16",
            "--width",
            "30",
            "-m",
            "99",
            "--games",
            "5",
            "--policy",
            "clamp",
            "--seed",
            "42",
        ])
        .unwrap();

        match cli.command {
            Commands::Play {
                height,
                width,
                mines,
                games,
                common,
            } => {
                assert_eq!((height, width, mines, games), (16, 30, 99, 5));
                assert_eq!(common.policy, ConsistencyPolicy::Clamp);
                assert_eq!(common.seed, Some(42));
                assert!(!common.debug);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_stats_can_be_disabled() {
        let stats_of = |args: &[&str]| match Cli::try_parse_from(args).unwrap().command {
            Commands::Dir { common, .. } => common.stats,
            other => panic!("unexpected command {other:?}"),
        };

        assert!(stats_of(&["minesweeper-agent", "dir", "--path", "boards"]));
        assert!(!stats_of(&["minesweeper-agent", "dir", "--path", "boards", "--stats", "false"]));
        assert!(!stats_of(&["minesweeper-agent", "dir", "--path", "boards", "-s", "false"]));
        assert!(stats_of(&["minesweeper-agent", "dir", "--path", "boards", "--stats", "true"]));
    }

    #[test]
    fn test_parse_file_requires_path() {
        assert!(Cli::try_parse_from(["minesweeper-agent", "file"]).is_err());
        let cli = Cli::try_parse_from(["minesweeper-agent", "file", "--path", "a.board"]).unwrap();
        assert!(matches!(cli.command, Commands::File { .. }));
    }

    #[test]
    fn test_session_record() {
        let mut session = Session::default();
        let stats = EngineStats {
            observations: 3,
            passes: 5,
            ..EngineStats::default()
        };

        session.record(&GameReport {
            outcome: GameOutcome::Won,
            moves: 4,
            safe_moves: 3,
            random_moves: 1,
            stats,
        });
        session.record(&GameReport {
            outcome: GameOutcome::Lost(Cell::new(0, 0)),
            moves: 1,
            safe_moves: 0,
            random_moves: 1,
            stats,
        });

        assert_eq!(session.games, 2);
        assert_eq!(session.wins, 1);
        assert_eq!(session.losses, 1);
        assert_eq!(session.moves, 5);
        assert_eq!(session.engine.passes, 10);
        assert!((session.win_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_play_dir_rejects_files() {
        let common = CommonOptions::default();
        assert!(play_dir(Path::new("Cargo.toml"), &common).is_err());
    }
}
