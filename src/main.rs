//! Interactive terminal front end for the tutoring engine.
//!
//! Picks a problem from the built-in catalog, then loops reading learner
//! messages from stdin and printing the coach's replies. A handful of slash
//! commands manage the session; everything else is a dialogue turn.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;

use coach::engine::CoachEngine;
use coach::io::client::{ModelClient, OpenAiClient};
use coach::io::config::{CoachConfig, load_config, write_config};
use coach::problems::{Difficulty, ProblemLibrary};

#[derive(Parser)]
#[command(
    name = "coach",
    version,
    about = "Socratic algorithm-interview coach in your terminal"
)]
struct Cli {
    /// Start with the first problem whose title contains this text.
    #[arg(short, long)]
    problem: Option<String>,

    /// Start with a random problem.
    #[arg(short, long)]
    random: bool,

    /// Restrict problem selection to a difficulty (easy, medium, hard).
    #[arg(short, long)]
    difficulty: Option<String>,

    /// Config file path.
    #[arg(short, long, default_value = "coach.toml")]
    config: PathBuf,

    /// Write a default config file to the config path and exit.
    #[arg(long)]
    init_config: bool,

    /// Override the configured model id.
    #[arg(short, long)]
    model: Option<String>,

    /// Override the configured API base URL.
    #[arg(long)]
    base_url: Option<String>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    coach::logging::init();
    let cli = Cli::parse();

    if cli.init_config {
        write_config(&cli.config, &CoachConfig::default())?;
        println!("wrote default config to {}", cli.config.display());
        return Ok(());
    }

    let mut config = load_config(&cli.config)?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    let difficulty = cli.difficulty.as_deref().map(parse_difficulty).transpose()?;

    let api_key = std::env::var("COACH_API_KEY")
        .or_else(|_| std::env::var("OPENAI_API_KEY"))
        .unwrap_or_default();
    let client = OpenAiClient::new(&config, api_key)?;

    let library = ProblemLibrary::with_builtins();
    let mut engine = CoachEngine::new(client, &config);
    let session = engine.create_session();

    println!("coach - practice algorithm problems without being handed the answer.");
    println!("Commands: problems, select <title>, new, status, quit. Anything else is a message.\n");

    let first = if let Some(needle) = &cli.problem {
        Some(
            library
                .by_title(needle)
                .ok_or_else(|| anyhow!("no problem matching {needle:?}"))?,
        )
    } else if cli.random {
        Some(
            library
                .random(difficulty)
                .context("no problems available at that difficulty")?,
        )
    } else {
        None
    };
    if let Some(problem) = first {
        let opening = engine.assign_problem(&session, problem)?;
        println!("coach> {opening}\n");
    } else {
        print_catalog(&library, difficulty);
        println!("Pick one with `select <title>` or `new` for a random problem.\n");
    }

    let stdin = io::stdin();
    loop {
        print!("you> ");
        io::stdout().flush().context("flush stdout")?;
        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line.context("read stdin")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match command(input) {
            Some(Command::Quit) => break,
            Some(Command::Problems) => print_catalog(&library, difficulty),
            Some(Command::Select(needle)) => {
                match library.by_title(&needle) {
                    Some(problem) => {
                        let opening = engine.assign_problem(&session, problem)?;
                        println!("coach> {opening}\n");
                    }
                    None => println!("No problem matching {needle:?}. Try `problems`."),
                };
            }
            Some(Command::New) => {
                let problem = library
                    .random(difficulty)
                    .context("no problems available at that difficulty")?;
                let opening = engine.assign_problem(&session, problem)?;
                println!("coach> {opening}\n");
            }
            Some(Command::Status) => {
                let snapshot = engine.snapshot(&session)?;
                println!(
                    "phase: {:?} | problem: {} | guidance attempts: {} | follow-ups: {}",
                    snapshot.phase,
                    snapshot.problem_title.as_deref().unwrap_or("(none)"),
                    snapshot.guidance_attempts,
                    snapshot.followup_progress,
                );
            }
            None => match turn(&mut engine, &session, input) {
                Ok(reply) => println!("coach> {reply}\n"),
                Err(err) => eprintln!("turn failed (nothing was recorded, try again): {err:#}"),
            },
        }
    }

    println!("See you next session.");
    Ok(())
}

enum Command {
    Quit,
    Problems,
    Select(String),
    New,
    Status,
}

fn command(input: &str) -> Option<Command> {
    match input {
        "quit" | "exit" => return Some(Command::Quit),
        "problems" => return Some(Command::Problems),
        "new" => return Some(Command::New),
        "status" => return Some(Command::Status),
        _ => {}
    }
    input
        .strip_prefix("select ")
        .map(|needle| Command::Select(needle.trim().to_string()))
}

fn turn<C: ModelClient>(engine: &mut CoachEngine<C>, session: &str, input: &str) -> Result<String> {
    engine.process_turn(session, input)
}

fn parse_difficulty(tag: &str) -> Result<Difficulty> {
    match tag.to_lowercase().as_str() {
        "easy" => Ok(Difficulty::Easy),
        "medium" => Ok(Difficulty::Medium),
        "hard" => Ok(Difficulty::Hard),
        other => bail!("unknown difficulty {other:?} (expected easy, medium, or hard)"),
    }
}

fn print_catalog(library: &ProblemLibrary, difficulty: Option<Difficulty>) {
    println!("Available problems:");
    for problem in library.list(difficulty) {
        println!("  - {} ({})", problem.title, problem.difficulty.as_str());
    }
}
