//! askdb - chat with the Chinook music database

mod commands;
mod config;
mod credentials;
mod runtime;
mod tools;
mod transcript;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tools::DEFAULT_ROW_CAP;

use crate::runtime::{SessionRuntime, SessionSettings};
use crate::transcript::Transcript;

/// askdb - ask questions about the Chinook database in plain English
#[derive(Parser, Debug)]
#[command(name = "askdb")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use (default: gpt-4o-mini)
    #[arg(short, long)]
    model: Option<String>,

    /// Path to the database file (downloaded on first use if absent)
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// URL to download the database from
    #[arg(long)]
    db_url: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing (RUST_LOG overrides the default filter)
    if args.verbose {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "askdb=debug".into());
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Load config file
    let cfg = config::Config::load();

    // Resolve the API key before doing anything else. Without one there
    // is no session to set up.
    let api_key = match credentials::resolve_api_key(&cfg) {
        Some(key) => key,
        None => {
            println!("Please add your OpenAI API key to continue.");
            eprintln!();
            eprintln!(
                "Set it with: export {}=your-key",
                credentials::API_KEY_ENV
            );
            eprintln!("Or add it to the config file: askdb --init-config");
            std::process::exit(1);
        }
    };

    // Merge config with CLI args (CLI takes precedence)
    let model = args
        .model
        .or(cfg.model.clone())
        .unwrap_or_else(|| "gpt-4o-mini".to_string());

    let db_path = args
        .db_path
        .or_else(|| cfg.db_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(askdb_db::DEFAULT_DB_PATH));

    let db_url = args
        .db_url
        .or(cfg.db_url.clone())
        .unwrap_or_else(|| askdb_db::DEFAULT_DB_URL.to_string());

    let row_cap = cfg.row_cap.unwrap_or(DEFAULT_ROW_CAP);

    let settings = SessionSettings {
        api_key,
        model,
        db_path,
        db_url,
        row_cap,
    };

    let mut runtime = SessionRuntime::new(settings);
    let mut transcript = Transcript::new();

    run_chat(&mut runtime, &mut transcript).await
}

async fn run_chat(
    runtime: &mut SessionRuntime,
    transcript: &mut Transcript,
) -> anyhow::Result<()> {
    let mut stdout = io::stdout();

    // Show the seeded greeting
    transcript.render(&mut stdout)?;
    println!();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        if commands::is_command(input) {
            match commands::execute_command(input) {
                commands::CommandResult::Exit => break,
                commands::CommandResult::Message(msg) => {
                    println!("{}", msg);
                }
                commands::CommandResult::History => {
                    transcript.render(&mut stdout)?;
                }
                commands::CommandResult::Unknown(cmd) => {
                    println!("Unknown command: {}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            println!();
            continue;
        }

        transcript.push_user(input);
        if let Some(turn) = transcript.last() {
            transcript::render_turn(turn, &mut stdout)?;
        }

        println!("Generating response...");

        // Build the agent on first use; a failure here is fatal since
        // there is no database to talk to.
        let agent = match runtime.agent().await {
            Ok(agent) => agent,
            Err(e) => {
                eprintln!("Error loading database: {:#}", e);
                std::process::exit(1);
            }
        };

        match agent.ask(input).await {
            Ok(answer) => {
                transcript.push_assistant(answer);
                if let Some(turn) = transcript.last() {
                    transcript::render_turn(turn, &mut stdout)?;
                }
            }
            Err(e) => {
                // Show the failure but leave the transcript untouched;
                // the question stays on record without an answer.
                eprintln!("An error occurred: {}", e);
            }
        }

        println!();
    }

    Ok(())
}
