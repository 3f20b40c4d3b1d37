use crate::api::OcrLanguage;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "phrasebox")]
#[command(version)]
#[command(about = "Chat with the phrase translator, manage saved conversations and translate text in images")]
pub struct Cli {
    /// Directory for the local database
    #[arg(long, global = true, env = "PHRASEBOX_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PHRASEBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "PHRASEBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Interactive chat
    Chat,
    /// Ask a single question, e.g. "What is the French for 'open the door'?"
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Saved conversations
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Extract text from an image and translate it
    Ocr {
        image: PathBuf,
        #[arg(long = "from", default_value = "en")]
        source: OcrLanguage,
        #[arg(long = "to", default_value = "es")]
        target: OcrLanguage,
    },
    /// Local settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List saved conversations
    List {
        /// Use the local copy instead of asking the server
        #[arg(long)]
        offline: bool,
    },
    /// Print a saved conversation
    Show { position: usize },
    /// Delete a saved conversation
    Delete { position: usize },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    List,
    Set { key: String, value: String },
    Unset { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ocr_languages() {
        let cli = Cli::try_parse_from(["phrasebox", "ocr", "menu.png", "--from", "fr", "--to", "en"])
            .unwrap();
        match cli.command {
            Command::Ocr { source, target, .. } => {
                assert_eq!(source, OcrLanguage::French);
                assert_eq!(target, OcrLanguage::English);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_ask_joins_words() {
        let cli = Cli::try_parse_from(["phrasebox", "ask", "German", "for", "'bread'"]).unwrap();
        match cli.command {
            Command::Ask { text } => assert_eq!(text.join(" "), "German for 'bread'"),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
