// src/main.rs
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rand::Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bubble_lens::backend::{ClearArithmetic, ClearKey, Decryptor, EncryptedArithmetic, Encryptor, TfheKey};
use bubble_lens::disclosure::{channel, DisclosureSigner};
use bubble_lens::{BubbleConfig, BubbleService, UserId};

const ARTICLES_PER_USER: usize = 5;
const MAX_READS: u32 = 100;
const MAX_SENTIMENT: u32 = 20;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// Plaintext-equivalent arithmetic, instant
    Clear,
    /// Real TFHE radix ciphertexts, slow
    Tfhe,
}

/// Simulate encrypted reading-history analysis for a handful of users
#[derive(Parser, Debug)]
#[command(name = "bubble-lens")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "BUBBLE_LENS_CONFIG", default_value = "bubble-lens.toml")]
    config: PathBuf,

    /// Arithmetic backend
    #[arg(long, value_enum, env = "BUBBLE_LENS_BACKEND", default_value = "clear")]
    backend: Backend,

    /// Number of simulated users
    #[arg(long, env = "BUBBLE_LENS_USERS", default_value_t = 3)]
    users: usize,

    /// Log level (overrides config file)
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Disclosure timeout in seconds (overrides config file)
    #[arg(long, env = "DISCLOSURE_TIMEOUT_SECS")]
    disclosure_timeout_secs: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = BubbleConfig::load(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if cli.disclosure_timeout_secs.is_some() {
        config.disclosure_timeout_secs = cli.disclosure_timeout_secs;
    }
    config.validate()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("bubble_lens={},info", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(config = %cli.config.display(), backend = ?cli.backend, users = cli.users, "starting");

    match cli.backend {
        Backend::Clear => run(&config, cli.users, ClearArithmetic::new(), &ClearKey),
        Backend::Tfhe => {
            info!("generating TFHE keys");
            let (key, ops) = TfheKey::generate();
            run(&config, cli.users, ops, &key)
        }
    }
}

fn run<A, K>(config: &BubbleConfig, users: usize, ops: A, key: &K) -> anyhow::Result<()>
where
    A: EncryptedArithmetic,
    K: Encryptor<A::Ciphertext> + Decryptor<A::Ciphertext>,
{
    let (oracle, relay) = channel(DisclosureSigner::generate());
    let mut service = BubbleService::new(config, ops, oracle, relay.verifier())?;
    let categories = service.registry().count();

    // 1. Clients encrypt and submit their histories
    let mut rng = rand::thread_rng();
    let mut ids = Vec::with_capacity(users);
    for n in 0..users {
        let user = UserId::new(format!("reader-{n}"));
        let articles: Vec<u32> = (0..ARTICLES_PER_USER).map(|_| rng.gen_range(1..10_000)).collect();
        let reads: Vec<u32> = (0..categories).map(|_| rng.gen_range(0..=MAX_READS)).collect();
        let sentiment: Vec<u32> = (0..categories).map(|_| rng.gen_range(0..=MAX_SENTIMENT)).collect();

        service.submit(
            user.clone(),
            key.encrypt_all(&articles),
            key.encrypt_all(&reads),
            key.encrypt_all(&sentiment),
        )?;
        ids.push(user);
    }

    // 2. Homomorphic analysis, then one disclosure request per user
    for user in &ids {
        service.analyze(user)?;
        service.request_reveal(user)?;
    }

    // 3. The key holder answers; the service verifies and publishes
    for disclosure in relay.fulfil(key) {
        service.on_disclosed(disclosure.request_id, &disclosure.cleartexts, &disclosure.proof)?;
    }

    println!("\nVerified results ({categories} categories)");
    for user in &ids {
        let result = service.get_decrypted_analysis(user);
        let bias: Vec<String> = service
            .registry()
            .iter()
            .zip(&result.bias_vector)
            .map(|(c, b)| format!("{}={b}", c.name))
            .collect();
        println!(
            "  {user} → diversity {:>3} | bias [{}] | recommended {:?}",
            result.diversity_score,
            bias.join(", "),
            result.recommended_articles
        );
    }
    Ok(())
}
