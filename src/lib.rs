pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod db;
pub mod history;
pub mod phrase;
pub mod repl;
pub mod session;

use anyhow::Context;
use api::BackendClient;
use clap::Parser;
use cli::{Cli, Command, HistoryAction, SettingsAction};
use commands::chat::{self, ChatState};
use commands::{auth, image, settings, AppState};
use config::BackendConfig;
use db::Database;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Outcome of a one-shot command as seen by the user.
pub enum Exit {
    Ok,
    Alert(String),
}

pub fn run() -> anyhow::Result<Exit> {
    init_tracing();
    let cli = Cli::parse();

    let data_dir = config::data_dir(cli.data_dir.clone());
    let database = Database::new(&data_dir)
        .with_context(|| format!("failed to open database in {}", data_dir.display()))?;
    let backend_config = BackendConfig::resolve(&database);
    tracing::debug!("backend config: {:?}", backend_config);
    let backend = BackendClient::new(backend_config).context("failed to build HTTP client")?;
    let state = AppState::new(database, Arc::new(backend));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(dispatch(&state, cli.command))
}

async fn dispatch(state: &AppState, command: Command) -> anyhow::Result<Exit> {
    let result = match command {
        Command::Login { email, password } => auth::login(state, email, password)
            .await
            .map(|outcome| {
                println!(
                    "Login successful! {} saved conversation(s).",
                    outcome.chat_history.len()
                );
            }),
        Command::Register {
            username,
            email,
            password,
        } => auth::register(state, username, email, password)
            .await
            .map(|()| println!("Registration successful!")),
        Command::Logout => auth::logout(state).map(|()| println!("Logged out.")),
        Command::Chat => {
            repl::run_chat(state).await?;
            Ok(())
        }
        Command::Ask { text } => ask(state, &text.join(" ")).await,
        Command::History { action } => history(state, action).await,
        Command::Ocr {
            image: path,
            source,
            target,
        } => image::ocr_translate(state, Some(&path), source, target)
            .await
            .map(|result| {
                println!("Extracted Text:\n{}\n", result.extracted_text);
                println!("Translated Text:\n{}", result.translated_text);
            }),
        Command::Settings { action } => match action {
            SettingsAction::List => settings::get_settings(state).map(|map| {
                for (key, value) in map {
                    println!("{} = {}", key, value);
                }
            }),
            SettingsAction::Set { key, value } => settings::set_setting(state, &key, &value),
            SettingsAction::Unset { key } => settings::delete_setting(state, &key),
        },
    };

    Ok(match result {
        Ok(()) => Exit::Ok,
        Err(alert) => Exit::Alert(alert),
    })
}

async fn ask(state: &AppState, text: &str) -> Result<(), String> {
    let mut chat = ChatState::default();
    chat::send_message(state, &mut chat, text).await?;
    for msg in chat.conversation.messages().iter().skip(1) {
        println!("{}", msg.text);
    }
    Ok(())
}

async fn history(state: &AppState, action: HistoryAction) -> Result<(), String> {
    let mut chat = ChatState::load(state);
    match action {
        HistoryAction::List { offline } => {
            if !offline {
                chat::refresh_history(state, &mut chat).await?;
            }
            for (i, entry) in chat.history.entries().iter().enumerate() {
                println!("{:>3}. {} {}", i + 1, entry.display_date(), entry.preview());
            }
            Ok(())
        }
        HistoryAction::Show { position } => {
            chat::view_chat_history(&mut chat, position)?;
            for msg in chat.conversation.messages() {
                println!("{}: {}", msg.sender, msg.text);
            }
            Ok(())
        }
        HistoryAction::Delete { position } => {
            let done = chat::delete_chat_history(state, &mut chat, position).await?;
            println!("Chat history deleted successfully");
            if let Some(alert) = done.refresh_alert {
                eprintln!("Warning: {}", alert);
            }
            Ok(())
        }
    }
}
