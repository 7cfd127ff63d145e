//! Command-line interface parsing and handling.
//!
//! The default command opens the chat view for the logged-in user;
//! `login`, `signup`, and `logout` manage the persisted identity.

use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::api::client::{BearerBackend, CounselingBackend, CounselorClient, SimpleBackend};
use crate::auth::{login_flow, signup_flow};
use crate::core::config::Config;
use crate::core::profile::{Profile, ProfileStore};
use crate::ui::chat_loop::{run_chat, ChatExit};

#[derive(Parser)]
#[command(name = "confide")]
#[command(about = "A full-screen terminal client for an AI counseling service")]
#[command(
    long_about = "Confide is a full-screen terminal client for an AI counseling service.\n\n\
Getting started:\n\
  confide signup    Create an account (logs you in on success)\n\
  confide login     Log in and start chatting\n\
  confide           Open the chat view when already logged in\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Up/Down/Mouse     Scroll through the conversation\n\
  Esc               Dismiss the session summary\n\
  Ctrl+C            Quit without ending the session\n\n\
Commands:\n\
  /end              End the session and get a summary\n\
  /logout           Log out and clear your saved login\n\
  /log [file]       Log the transcript to a file\n\n\
Saying goodbye (\"bye\", \"see you\", ...) also ends the session."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Counseling server base URL (overrides the configured one)
    #[arg(short, long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Talk to the simple demo server (no login, no summaries)
    #[arg(long, global = true)]
    pub simple: bool,

    /// Enable transcript logging to the specified file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and start chatting
    Login,
    /// Create an account, then start chatting
    Signup,
    /// Start the chat interface (default)
    Chat,
    /// Log out and clear the saved login
    Logout,
    /// Set configuration values
    Set {
        /// Configuration key to set (currently: server)
        key: String,
        /// Value to set for the key
        value: Option<String>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load()?;
    let base_url = args
        .server
        .clone()
        .unwrap_or_else(|| config.server_url().to_string());
    let client = CounselorClient::new(&base_url);
    let store = ProfileStore::open();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Login => match login_flow(&client, &store).await? {
            Some(profile) => start_chat(&client, &store, profile, args.log).await,
            None => {
                println!("Login cancelled.");
                Ok(())
            }
        },
        Commands::Signup => match signup_flow(&client, &store).await? {
            Some(profile) => start_chat(&client, &store, profile, args.log).await,
            None => {
                println!("Signup cancelled.");
                Ok(())
            }
        },
        Commands::Logout => {
            store.clear()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            match (key.as_str(), value) {
                ("server", Some(url)) => {
                    config.server = Some(url.clone());
                    config.save()?;
                    println!("Set server to: {url}");
                }
                ("server", None) => config.print_all(),
                (other, _) => eprintln!("Unknown configuration key: {other}"),
            }
            Ok(())
        }
        Commands::Chat => {
            if args.simple {
                let backend: Arc<dyn CounselingBackend> =
                    Arc::new(SimpleBackend::new(client.clone()));
                let app = crate::core::app::ChatApp::new(None, None, args.log);
                run_chat(backend, None, app).await?;
                Ok(())
            } else {
                match store.load()? {
                    Some(profile) => start_chat(&client, &store, profile, args.log).await,
                    None => {
                        println!("You're not logged in. Run `confide login` first.");
                        Ok(())
                    }
                }
            }
        }
    }
}

async fn start_chat(
    client: &CounselorClient,
    store: &ProfileStore,
    profile: Profile,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let context = profile.latest_summary().map(str::to_string);
    let backend: Arc<dyn CounselingBackend> = Arc::new(BearerBackend::new(
        client.clone(),
        profile.token.clone(),
    ));
    let app = crate::core::app::ChatApp::new(Some(profile.username.clone()), context, log_file);

    match run_chat(backend, Some(store), app).await? {
        ChatExit::Quit => Ok(()),
        ChatExit::LoggedOut => {
            println!("Logged out.");
            Ok(())
        }
        ChatExit::SessionExpired => {
            println!("Your session has expired. Please log in again with `confide login`.");
            Ok(())
        }
    }
}
