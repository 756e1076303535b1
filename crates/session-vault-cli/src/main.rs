//! session-vault CLI — `svault` command.
//!
//! Operates a file-backed vault: the persistent scope lives in
//! `<dir>/persistent.json`, the session scope in `<dir>/session.json`.
//! Hardened mode derives its cipher from `SESSION_VAULT_PASSPHRASE` and a
//! random salt kept in `<dir>/salt.json`.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use base64::Engine;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use session_vault::browser;
use session_vault::crypto::random::random_salt_16;
use session_vault::identifier;
use session_vault::time::{millis_to_rfc3339, now_millis, DAY_MILLIS};
use session_vault::{
    ExpiringKeyStore, FileStorage, StorageScope, VaultCipher, VaultConfig, VaultMode,
};

const DIR_ENV_VAR: &str = "SESSION_VAULT_DIR";
const PASSPHRASE_ENV_VAR: &str = "SESSION_VAULT_PASSPHRASE";
const SALT_FILE_VERSION: u32 = 1;

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_vault_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DIR_ENV_VAR) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").map_err(|_| anyhow!("HOME not set; pass --dir"))?;
    Ok(PathBuf::from(home).join(".session-vault"))
}

fn persistent_path(dir: &Path) -> PathBuf {
    dir.join("persistent.json")
}

fn session_path(dir: &Path) -> PathBuf {
    dir.join("session.json")
}

fn salt_path(dir: &Path) -> PathBuf {
    dir.join("salt.json")
}

// ── Salt file ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct SaltFile {
    version: u32,
    salt: String,
}

/// Load the vault salt, creating one on first use.
fn load_or_create_salt(dir: &Path) -> Result<[u8; 16]> {
    let path = salt_path(dir);
    if path.exists() {
        let bytes = std::fs::read(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file: SaltFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let raw = base64::engine::general_purpose::STANDARD
            .decode(&file.salt)
            .context("salt is not valid base64")?;
        return raw
            .try_into()
            .map_err(|_| anyhow!("salt in {} must be 16 bytes", path.display()));
    }

    let salt = random_salt_16();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let file = SaltFile {
        version: SALT_FILE_VERSION,
        salt: base64::engine::general_purpose::STANDARD.encode(salt),
    };
    std::fs::write(&path, serde_json::to_string_pretty(&file)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::debug!("created vault salt at {}", path.display());
    Ok(salt)
}

// ── Store construction ────────────────────────────────────────────────────────

fn open_store(dir: &Path, mode: VaultMode) -> Result<ExpiringKeyStore<FileStorage>> {
    let session = FileStorage::open(session_path(dir)).context("failed to open session scope")?;
    let persistent =
        FileStorage::open(persistent_path(dir)).context("failed to open persistent scope")?;
    let mut builder =
        ExpiringKeyStore::builder(session, persistent).config(VaultConfig::new(mode));

    if mode.is_hardened() {
        let passphrase = std::env::var(PASSPHRASE_ENV_VAR)
            .map_err(|_| anyhow!("hardened mode requires {PASSPHRASE_ENV_VAR}"))?;
        let salt = load_or_create_salt(dir)?;
        let cipher = VaultCipher::from_passphrase(passphrase.as_bytes(), &salt)
            .context("failed to derive vault key")?;
        builder = builder.cipher(cipher);
    }

    builder.build().context("failed to build vault")
}

/// Parse a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn scope_for(session: bool) -> StorageScope {
    if session {
        StorageScope::Session
    } else {
        StorageScope::Persistent
    }
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// session-vault CLI — read and write an expiring, optionally encrypted
/// key-value vault.
#[derive(Parser, Debug)]
#[command(
    name = "svault",
    about = "session-vault CLI",
    version,
    long_about = "svault — session-vault CLI\n\nStore values with optional expiry, inspect the login state,\nlog out, and generate trace identifiers."
)]
struct Cli {
    /// Vault directory (default: $SESSION_VAULT_DIR or ~/.session-vault)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Operating mode: development or hardened (default: $SESSION_VAULT_MODE)
    #[arg(long, global = true)]
    mode: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a value (JSON, or a bare string)
    Set {
        key: String,
        value: String,

        /// Expire after this many days (persistent scope only)
        #[arg(long)]
        ttl_days: Option<u32>,

        /// Use the session scope
        #[arg(long)]
        session: bool,
    },

    /// Print a stored value
    Get {
        key: String,

        /// Use the session scope
        #[arg(long)]
        session: bool,
    },

    /// Remove a stored value
    Clear {
        key: String,

        /// Use the session scope
        #[arg(long)]
        session: bool,
    },

    /// Clear the session scope and every identity key
    Logout,

    /// Show vault mode, location and login state
    Status,

    /// Generate identifiers
    Uuid {
        /// How many to generate
        #[arg(long, default_value_t = 1)]
        count: usize,
    },

    /// Generate a trace identifier
    TraceId,

    /// Identify the browser behind a user-agent string
    Sniff {
        user_agent: String,

        /// MIME types advertised by the host (repeatable)
        #[arg(long)]
        mime: Vec<String>,
    },
}

// ── Main entry point ──────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = run(cli);

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let verbose = cli.verbose;

    // Commands that never touch the vault.
    match &cli.command {
        Commands::Uuid { count } => return cmd_uuid(*count),
        Commands::TraceId => return cmd_trace_id(),
        Commands::Sniff { user_agent, mime } => return cmd_sniff(user_agent, mime),
        _ => {}
    }

    let dir = match cli.dir {
        Some(dir) => dir,
        None => default_vault_dir()?,
    };
    let mode = match cli.mode {
        Some(raw) => raw.parse::<VaultMode>()?,
        None => VaultConfig::from_env()?.mode,
    };
    if verbose {
        eprintln!("vault: {} ({mode})", dir.display());
    }
    let store = open_store(&dir, mode)?;

    match cli.command {
        Commands::Set {
            key,
            value,
            ttl_days,
            session,
        } => cmd_set(&store, &key, &value, ttl_days, session, verbose),
        Commands::Get { key, session } => cmd_get(&store, &key, session),
        Commands::Clear { key, session } => cmd_clear(&store, &key, session),
        Commands::Logout => cmd_logout(&store),
        Commands::Status => cmd_status(&store, &dir),
        Commands::Uuid { .. } | Commands::TraceId | Commands::Sniff { .. } => Ok(()),
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `svault set KEY VALUE [--ttl-days N] [--session]`
fn cmd_set(
    store: &ExpiringKeyStore<FileStorage>,
    key: &str,
    raw: &str,
    ttl_days: Option<u32>,
    session: bool,
    verbose: bool,
) -> Result<()> {
    let scope = scope_for(session);
    let value = parse_value(raw);
    if value.is_null() {
        println!("Skipped: null values are never stored");
        return Ok(());
    }
    if session && ttl_days.is_some() {
        eprintln!("warning: --ttl-days is ignored for the session scope");
    }

    store
        .set(scope, key, &value, ttl_days)
        .with_context(|| format!("failed to store '{key}'"))?;

    println!("Stored {key} ({scope})");
    if verbose {
        if let Some(days) = ttl_days.filter(|d| *d > 0 && !session) {
            let deadline = now_millis() + u64::from(days) * DAY_MILLIS;
            println!("  Expires: {}", millis_to_rfc3339(deadline));
        }
    }
    Ok(())
}

/// `svault get KEY [--session]`
fn cmd_get(store: &ExpiringKeyStore<FileStorage>, key: &str, session: bool) -> Result<()> {
    let scope = scope_for(session);
    let lookup = store
        .get::<serde_json::Value>(scope, key)
        .with_context(|| format!("failed to read '{key}'"))?;

    if lookup.cascade_triggered {
        eprintln!("note: the user id expired; the session has been logged out");
    }
    match lookup.value {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => println!("(not found)"),
    }
    Ok(())
}

/// `svault clear KEY [--session]`
fn cmd_clear(store: &ExpiringKeyStore<FileStorage>, key: &str, session: bool) -> Result<()> {
    let scope = scope_for(session);
    store
        .clear(scope, key)
        .with_context(|| format!("failed to clear '{key}'"))?;
    println!("Cleared {key} ({scope})");
    Ok(())
}

/// `svault logout`
fn cmd_logout(store: &ExpiringKeyStore<FileStorage>) -> Result<()> {
    store.logout_cascade().context("logout failed")?;
    println!("Logged out");
    Ok(())
}

/// `svault status`
fn cmd_status(store: &ExpiringKeyStore<FileStorage>, dir: &Path) -> Result<()> {
    let authenticated = store
        .is_authenticated()
        .context("failed to read login state")?;
    println!("Vault:         {}", dir.display());
    println!("Mode:          {}", store.config().mode);
    println!(
        "Entries:       {} persistent, {} session",
        store.backend(StorageScope::Persistent).len(),
        store.backend(StorageScope::Session).len()
    );
    println!(
        "Authenticated: {}",
        if authenticated { "yes" } else { "no" }
    );
    Ok(())
}

/// `svault uuid [--count N]`
fn cmd_uuid(count: usize) -> Result<()> {
    for _ in 0..count {
        println!("{}", identifier::uuid());
    }
    Ok(())
}

/// `svault trace-id`
fn cmd_trace_id() -> Result<()> {
    println!("{}", identifier::trace_id());
    Ok(())
}

/// `svault sniff UA [--mime TYPE]...`
fn cmd_sniff(user_agent: &str, mime: &[String]) -> Result<()> {
    match browser::detect(user_agent, mime) {
        Some(info) => match info.version {
            Some(version) => println!("{} {version}", info.kind),
            None => println!("{}", info.kind),
        },
        None => println!("unknown"),
    }
    Ok(())
}
