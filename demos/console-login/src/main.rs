//! Console front end for the login flow.
//!
//! Each invocation is one "page load": state that has to survive between
//! them (the credential cookie, the pending handshake) lives in files
//! under `--state-dir`.
//!
//! ```text
//! console-login providers
//! console-login login okta          # prints the authorize URL; open it
//! console-login callback <code> <state>
//! console-login status
//! console-login logout
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use portico::prelude::*;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "console-login", about = "Log in to a session service from the terminal")]
struct Cli {
    /// Base URL of the session service.
    #[arg(long, default_value = "http://localhost:8080")]
    service_url: String,

    /// Origin the provider redirects back to.
    #[arg(long, default_value = "http://localhost:3000")]
    origin: String,

    /// Where the credential and the pending handshake are kept.
    #[arg(long, default_value = ".portico")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List identity providers.
    Providers {
        /// Only providers with this name.
        #[arg(long)]
        name: Option<String>,
    },
    /// Start logging in with a provider.
    Login { provider_id: String },
    /// Finish logging in with the code and state the provider returned.
    Callback { code: String, state: String },
    /// Establish a session from an access key you already have.
    Key { key: String },
    /// Show the signed-in user.
    Status,
    /// Log out.
    Logout,
}

// ---------------------------------------------------------------------------
// File-backed local storage
// ---------------------------------------------------------------------------

/// [`LocalStorage`] kept in a JSON object on disk, so a handshake started
/// by `login` is still there for `callback`.
struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    fn read(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| SessionError::Storage(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }

    fn write(&self, items: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SessionError::Storage(e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(items)
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        fs::write(&self.path, bytes).map_err(|e| SessionError::Storage(e.to_string()))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut items = self.read()?;
        items.insert(key.to_string(), value.to_string());
        self.write(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), SessionError> {
        let mut items = self.read()?;
        if items.remove(key).is_some() {
            self.write(&items)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

type Controller = HttpSessionController<FileCredentialStore, FileStorage, Arc<RecordingNavigator>>;

async fn run(cli: Cli, ctl: &mut Controller) -> Result<(), PorticoError> {
    match cli.command {
        Command::Providers { name: Some(name) } => {
            let api = HttpSessionApi::new(HttpConfig::new(cli.service_url))?;
            for p in api.list_providers_named(&name).await? {
                println!("{}\t{}", p.id, p.display_name());
            }
        }
        Command::Providers { name: None } => {
            ctl.initialize().await?;
            for p in ctl.providers() {
                println!("{}\t{}", p.id, p.display_name());
            }
        }
        Command::Login { provider_id } => {
            ctl.initialize().await?;
            let provider = ctl
                .providers()
                .iter()
                .find(|p| p.id == provider_id)
                .cloned()
                .ok_or_else(|| {
                    portico::protocol::ProtocolError::InvalidProvider {
                        id: provider_id.clone(),
                        reason: "not in the directory".into(),
                    }
                })?;
            let handshake = ctl.begin_login_redirect(&provider)?;
            println!("state: {}", handshake.state);
        }
        Command::Callback { code, state } => {
            let user = ctl.complete_callback(&code, &state).await?;
            println!("signed in as {}", user.id);
        }
        Command::Key { key } => {
            let user = ctl.register_session_from_key(AccessCredential::new(key)).await?;
            println!("signed in as {}", user.id);
        }
        Command::Status => match ctl.credential().cloned() {
            Some(credential) => {
                let user = ctl.register_session_from_key(credential).await?;
                println!("signed in as {}", user.id);
            }
            None => println!("not signed in"),
        },
        Command::Logout => {
            ctl.end_session().await?;
            println!("signed out");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    let nav = Arc::new(RecordingNavigator::new());
    let mut ctl = PorticoBuilder::new()
        .service_url(&cli.service_url)
        .origin(&cli.origin)
        .build(
            FileCredentialStore::new(cli.state_dir.join("credential.json")),
            FileStorage {
                path: cli.state_dir.join("storage.json"),
            },
            Arc::clone(&nav),
        )?;

    let result = run(cli, &mut ctl).await;

    for step in nav.history() {
        match step {
            Navigation::Push(route) => eprintln!("-> {route}"),
            Navigation::Assign(url) => eprintln!("open: {url}"),
        }
    }
    if let Err(e) = &result {
        tracing::error!(kind = ?auth_kind(e), "{e}");
    }
    result.map_err(Into::into)
}

fn auth_kind(err: &PorticoError) -> Option<AuthErrorKind> {
    match err {
        PorticoError::Auth(e) => Some(e.kind()),
        _ => None,
    }
}
