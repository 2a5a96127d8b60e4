use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;
use partchat_core::{markup, ChatClient, ChatRole, Config, Conversation, Provider};

mod app;
mod handler;
mod logging;
mod markup_lines;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "partchat")]
#[command(about = "Terminal chat client for the PartSelect assistant backend")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides PARTCHAT_API_BASE and the config file)
    #[arg(long, global = true)]
    api_base: Option<String>,
    /// Model provider the backend should use (openai, deepseek)
    #[arg(short, long, global = true)]
    provider: Option<Provider>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Send a single message and print the reply
    Ask {
        /// Your message
        message: String,
        /// Print the reply as sanitized HTML
        #[arg(long)]
        html: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat);

    match command {
        Commands::Chat => {
            logging::init_file(cli.verbose);
        }
        Commands::Ask { .. } => logging::init_stderr(cli.verbose),
    }

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(%err, "falling back to default config");
        Config::default()
    });
    let api_base = config.resolve_api_base(cli.api_base.as_deref());
    let provider = config.resolve_provider(cli.provider);
    let client = ChatClient::new(&api_base);

    tracing::info!(%api_base, %provider, "starting partchat");

    match command {
        Commands::Chat => run_chat(client, provider).await,
        Commands::Ask { message, html } => ask(&client, provider, &message, html).await,
    }
}

async fn run_chat(client: ChatClient, provider: Provider) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let api_base = client.base_url().to_string();
    let mut app = App::new(Arc::new(client), api_base, provider, events.sender());

    let result = run_loop(&mut terminal, &mut app, &mut events).await;
    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App, events: &mut tui::EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }

    if app.conversation.is_sending() {
        tracing::debug!("exiting with a request still in flight");
    }
    Ok(())
}

async fn ask(client: &ChatClient, provider: Provider, message: &str, html: bool) -> Result<()> {
    let mut conversation = Conversation::new(provider);

    if !conversation.send(client, message).await {
        bail!("nothing to send: message is empty");
    }

    let Some(reply) = conversation
        .messages()
        .last()
        .filter(|msg| msg.role == ChatRole::Assistant)
    else {
        bail!("conversation ended without a reply");
    };

    if html {
        println!("{}", markup::to_html(&reply.content));
    } else {
        println!("{}", format!("Assistant ({}):", provider.display_name()).bold().yellow());
        println!("{}", reply.content);
    }

    Ok(())
}
