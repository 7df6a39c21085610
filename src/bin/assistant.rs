// Interactive assistant session over a JSON record fixture.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::warn;

use portal_assistant::ChatbotService;
use portal_assistant::ai::HttpTransport;
use portal_assistant::context::{ContextFetcher, FetchStatus};
use portal_assistant::core::config::AppConfig;
use portal_assistant::core::models::UserRole;
use portal_assistant::store::{InMemoryStore, RecordStore};

#[derive(Debug, Parser)]
#[command(name = "portal-assistant", about = "Chat about your assignments")]
struct Args {
    /// JSON file with `users`, `assignments` and `submissions`
    #[arg(long, env = "PORTAL_DATA")]
    data: PathBuf,

    /// Id of the student or teacher chatting
    #[arg(long)]
    user: String,

    /// Overrides the role stored in the user's profile
    #[arg(long)]
    role: Option<UserRole>,

    /// Reply length cap in tokens
    #[arg(long)]
    max_tokens: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    portal_assistant::setup_logging();
    let args = Args::parse();

    let config = AppConfig::from_env().map_err(|e| anyhow!("invalid configuration: {e}"))?;
    let max_tokens = args.max_tokens.unwrap_or(config.max_tokens);

    let store = Arc::new(
        InMemoryStore::from_json_file(&args.data)
            .with_context(|| format!("loading {}", args.data.display()))?,
    );

    let role = match args.role {
        Some(role) => role,
        None => store
            .user_profile(&args.user)
            .await?
            .map(|p| p.role)
            .ok_or_else(|| anyhow!("no profile for {}; pass --role", args.user))?,
    };

    let fetcher = ContextFetcher::new(store);
    let outcome = fetcher.fetch(&args.user, role).await;
    if let FetchStatus::Partial { failures } | FetchStatus::Failed { failures } = &outcome.status
    {
        warn!("Context is incomplete: {}", failures.join("; "));
        println!("(Some of your records could not be loaded; answers may be incomplete.)");
    }

    let chatbot = ChatbotService::new(config, Arc::new(HttpTransport::new()?));

    println!("Assignment Assistant ready. Commands: /clear, /history, /quit");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" => break,
            "/clear" => {
                chatbot.clear_history();
                println!("History cleared.");
            }
            "/history" => {
                for turn in chatbot.history() {
                    println!("{:?}: {}", turn.role, turn.content);
                }
            }
            message => match chatbot
                .send_message(message, &outcome.snapshot, max_tokens)
                .await
            {
                Ok(reply) => println!("{reply}"),
                Err(e) => println!("{}", e.user_hint()),
            },
        }
    }

    Ok(())
}
