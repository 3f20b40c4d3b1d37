//! Interactive chat loop on stdin/stdout.

use crate::commands::chat::{self, ChatState};
use crate::commands::{auth, AppState};
use crate::conversation::{StartNewOutcome, WELCOME_TEXT};
use crate::db::models::Sender;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  /new          save this conversation and start a new one
  /history      list saved conversations
  /refresh      reload saved conversations from the server
  /open <n>     view saved conversation n (read-only)
  /delete <n>   delete saved conversation n
  /logout       forget the session and leave
  /quit         leave
Anything else is sent to the translator.";

#[derive(Debug, PartialEq, Eq)]
pub enum ReplInput {
    Text(String),
    New,
    History,
    Refresh,
    Open(usize),
    Delete(usize),
    Logout,
    Help,
    Quit,
    Invalid(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return ReplInput::Text(line.to_string());
        };
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let position = parts.next().map(str::parse::<usize>);

        match (name, position) {
            ("new", None) => ReplInput::New,
            ("history", None) => ReplInput::History,
            ("refresh", None) => ReplInput::Refresh,
            ("open", Some(Ok(n))) => ReplInput::Open(n),
            ("delete", Some(Ok(n))) => ReplInput::Delete(n),
            ("logout", None) => ReplInput::Logout,
            ("help", None) => ReplInput::Help,
            ("quit" | "exit", None) => ReplInput::Quit,
            ("open" | "delete", _) => ReplInput::Invalid(format!("Usage: /{} <n>", name)),
            _ => ReplInput::Invalid(format!("Unknown command /{} (try /help)", name)),
        }
    }
}

/// Tracks what part of the conversation is already on screen.
#[derive(Default)]
struct Transcript {
    generation: u64,
    shown: usize,
}

impl Transcript {
    fn print_new(&mut self, chat: &ChatState) {
        let conv = &chat.conversation;
        if conv.generation() != self.generation {
            self.generation = conv.generation();
            self.shown = 0;
            if conv.show_welcome() {
                println!("{}", WELCOME_TEXT);
            }
        }
        for msg in &conv.messages()[self.shown..] {
            match msg.sender {
                Sender::You => println!("  You: {}", msg.text),
                Sender::Chatbot => println!("  Chatbot: {}", msg.text),
            }
        }
        self.shown = conv.messages().len();
    }
}

fn alert(message: &str) {
    eprintln!("! {}", message);
}

fn print_history(chat: &ChatState) {
    if chat.history.is_empty() {
        println!("No saved conversations.");
        return;
    }
    for (i, entry) in chat.history.entries().iter().enumerate() {
        let marker = match &entry.chat_id {
            Some(id) if chat.conversation.is_showing(id) => "*",
            _ => " ",
        };
        println!("{}{:>3}. {} {}", marker, i + 1, entry.display_date(), entry.preview());
    }
}

pub async fn run_chat(state: &AppState) -> anyhow::Result<()> {
    let mut chat = ChatState::load(state);
    if let Err(message) = chat::refresh_history(state, &mut chat).await {
        alert(&message);
    }

    let mut transcript = Transcript::default();
    if chat.conversation.show_welcome() {
        println!("{}", WELCOME_TEXT);
    }
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if chat.conversation.input_enabled() {
            print!("> ");
        } else {
            print!("(read-only, /new to chat) > ");
        }
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ReplInput::parse(&line) {
            ReplInput::Text(text) => {
                if let Err(message) = chat::send_message(state, &mut chat, &text).await {
                    alert(&message);
                }
            }
            ReplInput::New => match chat::start_new_conversation(state, &mut chat).await {
                Ok(done) => {
                    if done.value == StartNewOutcome::Saved {
                        println!("Conversation saved.");
                    }
                    if let Some(message) = done.refresh_alert {
                        alert(&message);
                    }
                }
                Err(message) => alert(&message),
            },
            ReplInput::History => print_history(&chat),
            ReplInput::Refresh => match chat::refresh_history(state, &mut chat).await {
                Ok(_) => print_history(&chat),
                Err(message) => alert(&message),
            },
            ReplInput::Open(n) => {
                if let Err(message) = chat::view_chat_history(&mut chat, n) {
                    alert(&message);
                }
            }
            ReplInput::Delete(n) => match chat::delete_chat_history(state, &mut chat, n).await {
                Ok(done) => {
                    println!("Chat history deleted successfully");
                    if let Some(message) = done.refresh_alert {
                        alert(&message);
                    }
                }
                Err(message) => alert(&message),
            },
            ReplInput::Logout => {
                match auth::logout(state) {
                    Ok(()) => println!("Logged out."),
                    Err(message) => alert(&message),
                }
                break;
            }
            ReplInput::Help => println!("{}", HELP),
            ReplInput::Quit => break,
            ReplInput::Invalid(message) => alert(&message),
        }
        transcript.print_new(&chat);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplInput::parse("/new"), ReplInput::New);
        assert_eq!(ReplInput::parse("  /open 3 "), ReplInput::Open(3));
        assert_eq!(ReplInput::parse("/delete 1"), ReplInput::Delete(1));
        assert_eq!(ReplInput::parse("/exit"), ReplInput::Quit);
    }

    #[test]
    fn test_parse_text_is_passed_through() {
        assert_eq!(
            ReplInput::parse("French for 'cat'"),
            ReplInput::Text("French for 'cat'".into())
        );
        assert_eq!(ReplInput::parse("   "), ReplInput::Text("   ".into()));
    }

    #[test]
    fn test_parse_bad_commands() {
        assert_eq!(
            ReplInput::parse("/open two"),
            ReplInput::Invalid("Usage: /open <n>".into())
        );
        assert!(matches!(ReplInput::parse("/dance"), ReplInput::Invalid(_)));
    }
}
