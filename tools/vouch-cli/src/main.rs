//! vouch CLI - generate keys, sign and verify vouch-tokens, and manage
//! revocation and reputation state from the command line.

mod config;
mod keyfile;
mod reputation_store;
mod revocation_store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::CliConfig;
use keyfile::{load as load_keyfile, save as save_keyfile};
use reputation_store::FileReputationStore;
use revocation_store::FileRevocationStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vouch_cache::MemoryKeyCache;
use vouch_core::{base64url_decode, base64url_encode, Identifier, KeyPair, PublicKey};
use vouch_identity::DidWebResolver;
use vouch_replay::MemoryReplayGuard;
use vouch_reputation::ReputationStore;
use vouch_revocation::RevocationRegistry;
use vouch_signer::SignerBuilder;
use vouch_verifier::Verifier;

/// vouch - cryptographic identity core for agent-to-agent authentication
#[derive(Parser)]
#[command(name = "vouch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (default: ~/.config/vouch/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new Ed25519 keypair bound to an identifier
    Keygen {
        /// Output key file path
        #[arg(short, long)]
        out: PathBuf,

        /// Identifier to bind the key to, e.g. id:web:agent.example
        #[arg(short, long)]
        identifier: String,
    },

    /// Sign a payload into a vouch-token
    Sign {
        /// Path to the signer's key file
        #[arg(short, long)]
        key: PathBuf,

        /// Intent payload as a JSON string
        #[arg(short, long, default_value = "{}")]
        payload: String,

        /// Expiry in seconds from now (default: signer config default)
        #[arg(short, long)]
        expires: Option<i64>,

        /// Self-asserted reputation score (0-100), clamped at encode time
        #[arg(short, long)]
        reputation: Option<u8>,

        /// Parent token to delegate from
        #[arg(long)]
        parent: Option<String>,
    },

    /// Delegate a parent token's authority to this keypair
    Delegate {
        /// Path to the delegate's key file
        #[arg(short, long)]
        key: PathBuf,

        /// Parent token to delegate from
        #[arg(long)]
        parent: String,

        /// Intent payload as a JSON string
        #[arg(short, long, default_value = "{}")]
        payload: String,

        /// Expiry in seconds from now
        #[arg(short, long)]
        expires: Option<i64>,
    },

    /// Verify a vouch-token
    Verify {
        /// Token string
        token: String,

        /// Verify against this explicit public key (base64url) instead of
        /// resolving the issuer; skips identity resolution
        #[arg(long)]
        public_key: Option<String>,

        /// Trust an identifier's public key without resolution, as
        /// id=base64url-key; may be repeated
        #[arg(long = "trust-root")]
        trust_roots: Vec<String>,

        /// Never contact the network; only trusted roots and the cache
        /// are consulted
        #[arg(long)]
        offline: bool,
    },

    /// Manage revoked identifiers
    Revoke {
        #[command(subcommand)]
        action: RevokeAction,
    },

    /// Manage reputation scores
    Reputation {
        #[command(subcommand)]
        action: ReputationAction,
    },
}

#[derive(Subcommand)]
enum RevokeAction {
    /// Mark an identifier revoked
    Add {
        identifier: String,
        /// Human-readable reason
        #[arg(short, long)]
        reason: String,
        /// Authority that issued the revocation
        #[arg(long)]
        authority: Option<String>,
        /// Unix timestamp the revocation takes effect (default: immediate)
        #[arg(long)]
        effective_from: Option<i64>,
    },
    /// Clear a revocation
    Reinstate { identifier: String },
    /// List all local revocations
    List,
}

#[derive(Subcommand)]
enum ReputationAction {
    /// Print an identifier's current score, tier, and success rate
    Get { identifier: String },
    /// Record a successful action
    RecordSuccess {
        identifier: String,
        #[arg(short, long)]
        reason: String,
    },
    /// Record a failed action
    RecordFailure {
        identifier: String,
        #[arg(short, long)]
        reason: String,
    },
    /// Apply a positive adjustment outside the normal success/failure flow
    Boost {
        identifier: String,
        amount: i32,
        #[arg(short, long)]
        reason: String,
    },
    /// Apply a negative adjustment outside the normal success/failure flow
    Slash {
        identifier: String,
        amount: i32,
        #[arg(short, long)]
        reason: String,
    },
    /// Print an identifier's action history
    History {
        identifier: String,
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level, cli.json_logs)?;
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Keygen { out, identifier } => keygen(&out, &identifier)?,
        Commands::Sign {
            key,
            payload,
            expires,
            reputation,
            parent,
        } => sign(&config, &key, &payload, expires, reputation, parent.as_deref())?,
        Commands::Delegate {
            key,
            parent,
            payload,
            expires,
        } => sign(&config, &key, &payload, expires, None, Some(parent.as_str()))?,
        Commands::Verify {
            token,
            public_key,
            trust_roots,
            offline,
        } => verify(&config, &token, public_key.as_deref(), &trust_roots, offline).await?,
        Commands::Revoke { action } => revoke(&config, action).await?,
        Commands::Reputation { action } => reputation(&config, action).await?,
    }

    Ok(())
}

fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("failed to parse log level")?;

    if json {
        tracing_subscriber::registry().with(filter).with(fmt::layer().json()).init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).compact())
            .init();
    }
    Ok(())
}

fn keygen(out: &PathBuf, identifier: &str) -> Result<()> {
    let id = Identifier::new(identifier).context("invalid identifier")?;
    let keypair = KeyPair::generate(Some(id));
    let public_key = base64url_encode(&keypair.public_key().to_bytes());

    save_keyfile(out, &keypair)?;
    eprintln!("{} Key saved to: {}", "OK".green().bold(), out.display());
    eprintln!("{}: {}", "Public key".cyan(), public_key);
    Ok(())
}

fn sign(
    config: &CliConfig,
    key: &PathBuf,
    payload: &str,
    expires: Option<i64>,
    reputation: Option<u8>,
    parent: Option<&str>,
) -> Result<()> {
    let keypair = load_keyfile(key)?;
    let payload: serde_json::Value = serde_json::from_str(payload).context("payload must be valid JSON")?;

    let signer = SignerBuilder::new()
        .keypair(keypair)
        .default_expiry(config.signer.default_token_expiry)
        .max_delegation_depth(config.signer.max_delegation_depth)
        .build()
        .context("failed to construct signer (does the key file have a bound identifier?)")?;

    let token = signer
        .sign(payload, expires, reputation, parent)
        .context("failed to sign token")?;
    println!("{}", token);
    Ok(())
}

async fn verify(
    config: &CliConfig,
    token: &str,
    public_key: Option<&str>,
    trust_roots: &[String],
    offline: bool,
) -> Result<()> {
    let resolver: Arc<dyn vouch_identity::IdentityResolver> = if offline {
        Arc::new(vouch_identity::StaticResolver::new())
    } else {
        Arc::new(DidWebResolver::new(std::time::Duration::from_secs(
            config.verifier.resolver_timeout_seconds,
        )))
    };
    let cache = Arc::new(MemoryKeyCache::new(
        config.verifier.cache_max_size,
        std::time::Duration::from_secs(config.verifier.cache_ttl_seconds as u64),
    ));
    let replay = Arc::new(MemoryReplayGuard::new(config.verifier.replay_max_size));
    let revocation_store = FileRevocationStore::open(&config.revocation_file)
        .context("failed to open revocation file")?;
    let revocation = Arc::new(RevocationRegistry::new(Arc::new(revocation_store)));

    let verifier = Verifier::new(resolver, cache, replay, revocation, config.verifier.clone());

    for pair in trust_roots {
        let (id, key) = parse_trust_root(pair)?;
        verifier.add_trusted_root(id, key);
    }

    let explicit_key = public_key
        .map(parse_public_key)
        .transpose()
        .context("invalid --public-key")?;

    // `verify` never consults the identity resolver: with an explicit key
    // it checks only that signature, and with none it falls back to
    // trusted-roots/cache lookup only. `check_vouch` is the only path that
    // resolves an unknown issuer over the network.
    let (valid, passport) = if explicit_key.is_some() || offline {
        verifier.verify(token, explicit_key).await
    } else {
        verifier.check_vouch(token).await
    };

    if valid {
        let passport = passport.expect("valid verification always returns a passport");
        println!("{} Token is valid", "OK".green().bold());
        println!("  {}: {}", "Issuer".cyan(), passport.issuer);
        println!("  {}: {}", "Subject".cyan(), passport.subject);
        println!("  {}: {}", "Expires at".cyan(), passport.expires_at);
        if !passport.delegation_chain.is_empty() {
            println!("  {}: {}", "Delegation depth".cyan(), passport.delegation_chain.len());
        }
        println!("  {}: {}", "Payload".cyan(), passport.payload);
    } else {
        println!("{} Token failed verification", "FAIL".red().bold());
        std::process::exit(1);
    }
    Ok(())
}

fn parse_public_key(raw: &str) -> Result<PublicKey> {
    let bytes = base64url_decode(raw)?;
    let bytes: [u8; 32] = bytes.try_into().map_err(|_| anyhow::anyhow!("public key must be 32 bytes"))?;
    Ok(PublicKey::from_bytes(&bytes)?)
}

fn parse_trust_root(pair: &str) -> Result<(Identifier, PublicKey)> {
    let (id, key) = pair
        .split_once('=')
        .context("trust root must be of the form id=base64url-key")?;
    let identifier = Identifier::new(id).context("invalid identifier in trust root")?;
    let key = parse_public_key(key)?;
    Ok((identifier, key))
}

async fn revoke(config: &CliConfig, action: RevokeAction) -> Result<()> {
    let store = FileRevocationStore::open(&config.revocation_file).context("failed to open revocation file")?;
    let registry = RevocationRegistry::new(Arc::new(store));

    match action {
        RevokeAction::Add {
            identifier,
            reason,
            authority,
            effective_from,
        } => {
            registry.revoke(&identifier, &reason, authority.as_deref(), effective_from).await?;
            println!("{} {} revoked", "OK".green().bold(), identifier);
        }
        RevokeAction::Reinstate { identifier } => {
            registry.reinstate(&identifier).await?;
            println!("{} {} reinstated", "OK".green().bold(), identifier);
        }
        RevokeAction::List => {
            let records = registry.list_local_revocations().await?;
            if records.is_empty() {
                println!("No local revocations in {}", config.revocation_file.display());
                return Ok(());
            }
            for record in records {
                println!(
                    "{}  reason={}  revoked_at={}{}",
                    record.identifier.yellow(),
                    record.reason,
                    record.revoked_at,
                    record
                        .effective_from
                        .map(|t| format!("  effective_from={t}"))
                        .unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

async fn reputation(config: &CliConfig, action: ReputationAction) -> Result<()> {
    let store = FileReputationStore::open(&config.reputation_file).context("failed to open reputation file")?;

    match action {
        ReputationAction::Get { identifier } => {
            let snapshot = store.get_score(&identifier).await?;
            print_snapshot(&snapshot);
        }
        ReputationAction::RecordSuccess { identifier, reason } => {
            let snapshot = store.record_success(&identifier, &reason, None).await?;
            print_snapshot(&snapshot);
        }
        ReputationAction::RecordFailure { identifier, reason } => {
            let snapshot = store.record_failure(&identifier, &reason, None).await?;
            print_snapshot(&snapshot);
        }
        ReputationAction::Boost { identifier, amount, reason } => {
            let snapshot = store.boost(&identifier, amount, &reason).await?;
            print_snapshot(&snapshot);
        }
        ReputationAction::Slash { identifier, amount, reason } => {
            let snapshot = store.slash(&identifier, amount, &reason).await?;
            print_snapshot(&snapshot);
        }
        ReputationAction::History { identifier, limit } => {
            let history = store.get_history(&identifier, limit).await?;
            if history.is_empty() {
                println!("No history for {identifier}");
                return Ok(());
            }
            for event in history {
                println!(
                    "{}  {:+}  {}  {}",
                    format!("{:?}", event.action).to_lowercase(),
                    event.delta,
                    event.reason,
                    event.timestamp
                );
            }
        }
    }
    Ok(())
}

fn print_snapshot(snapshot: &vouch_reputation::ReputationSnapshot) {
    println!("{}: {}", "Identifier".cyan(), snapshot.identifier);
    println!("{}: {}", "Score".cyan(), snapshot.score);
    println!("{}: {:?}", "Tier".cyan(), snapshot.tier);
    println!("{}: {:.2}", "Success rate".cyan(), snapshot.success_rate);
    println!("{}: {}", "Total actions".cyan(), snapshot.total_actions);
}
