//! # minesweeper-agent
//!
//! `minesweeper-agent` plays Minesweeper using only what it can prove. Every
//! revealed clue becomes a sentence in a knowledge base; the inference engine
//! runs the knowledge base to a fixed point and the agent opens a cell only
//! once it is known to be safe. When nothing is certain it opens a random
//! cell that is neither opened nor known to be a mine.
//!
//! ## Usage
//!
//! ```sh
//! minesweeper-agent <SUBCOMMAND> [OPTIONS]
//! ```
//!
//! ### Subcommands
//!
//! 1.  **`play`**: Play games on random boards.
//!     ```sh
//!     minesweeper-agent play --height 16 --width 16 --mines 40 --games 100 --seed 7
//!     ```
//!
//! 2.  **`file`**: Play a layout file (`*` or `X` for a mine, `.` for a clear cell).
//!     ```sh
//!     minesweeper-agent file --path boards/corner.board
//!     ```
//!
//! 3.  **`dir`**: Play every `.board` file under a directory.
//!     ```sh
//!     minesweeper-agent dir --path boards/
//!     ```
//!
//! 4.  **`completions`**: Print a shell completion script.
//!     ```sh
//!     minesweeper-agent completions bash
//!     ```
//!
//! ### Common Options
//!
//! -   `-d, --debug`: Log every observation and fixed point (default: `false`).
//! -   `-s, --stats <true|false>`: Print game and inference statistics (default: `true`).
//! -   `-p, --print-board`: Print each board before playing it (default: `false`).
//! -   `--policy <strict|clamp>`: How consistency faults are handled
//!     (default: `strict` in debug builds, `clamp` in release builds).
//! -   `--seed <N>`: Seed boards and random moves for reproducible runs.

use crate::command_line::cli::{Cli, Commands, init_tracing, play_dir, play_file, play_random};
use clap::{CommandFactory, Parser};
use minesweeper_agent::agent::cell::Dimensions;

mod command_line;

/// Global allocator using `tikv-jemallocator` so memory figures can be read
/// back through `tikv-jemalloc-ctl`.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            height,
            width,
            mines,
            games,
            common,
        } => {
            init_tracing(common.debug);
            play_random(Dimensions::new(height, width), mines, games, &common)
        }
        Commands::File { path, common } => {
            init_tracing(common.debug);
            play_file(&path, &common)
        }
        Commands::Dir { path, common } => {
            init_tracing(common.debug);
            play_dir(&path, &common)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
