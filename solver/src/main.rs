//! Command-line front end: reads a JSON request, prints the JSON response.
//!
//! ```text
//! $ onestroke generate --difficulty hard --index 3
//! {"ok":true,"nodes":[1,2,3,...],"edges":[[1,2],...]}
//! $ echo '{"nodes":[1,2,3],"edges":[[1,2],[2,3],[3,1]]}' | onestroke solve
//! {"ok":true,"path":[1,2,3,1]}
//! $ onestroke hint --input state.json --explain
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, error};

use onestroke::api::{self, GenerateRequest, Operation};
use onestroke::explain::{Explainer, LocalExplainer, NoExplainer};
use onestroke::Difficulty;

/// Generate, solve and get hints for one-stroke drawing puzzles.
#[derive(Parser)]
#[command(about, long_about = None, version)]
struct Args {
    /// Enable debug messages
    #[arg(short, long, default_value_t = false, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a level
    Generate {
        /// Difficulty tier: easy, medium or hard
        #[arg(short = 'f', long, default_value_t = Difficulty::Medium)]
        difficulty: Difficulty,

        /// Level number; the same number always gives the same level
        #[arg(short, long, conflicts_with = "seed")]
        index: Option<u64>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Print an Euler trail for a JSON graph
    Solve {
        /// JSON request file; standard input if absent
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Suggest the next move for a JSON hint request
    Hint {
        /// JSON request file; standard input if absent
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Explain the suggestion
        #[arg(short, long, default_value_t = false)]
        explain: bool,
    },
}

fn read_request(input: Option<PathBuf>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut request = String::new();
            io::stdin().read_to_string(&mut request)?;
            Ok(request)
        }
    }
}

fn run(command: Command) -> Result<String, String> {
    let (operation, input, explainer): (Operation, Option<PathBuf>, &dyn Explainer) = match command {
        Command::Generate { difficulty, index, seed } => {
            let response = api::generate(&GenerateRequest { difficulty, index, seed });
            return serde_json::to_string(&response).map_err(|e| e.to_string());
        }
        Command::Solve { input } => (Operation::Solve, input, &NoExplainer),
        Command::Hint { input, explain: true } => (Operation::Hint, input, &LocalExplainer),
        Command::Hint { input, explain: false } => (Operation::Hint, input, &NoExplainer),
    };

    let request = read_request(input).map_err(|e| format!("cannot read request: {}", e))?;
    debug!("{} request: {}", operation, request.trim());
    api::handle_json(operation, &request, explainer).map_err(|e| format!("bad {} request: {}", operation, e))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match run(args.command) {
        Ok(response) => {
            println!("{}", response);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
