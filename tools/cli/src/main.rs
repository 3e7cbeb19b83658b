//! Lockbox CLI - Command line interface for vault containers.
//!
//! Encrypts a file into a self-contained vault container and back, inspects
//! container headers, and runs the self-audit.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lockbox_common::Error;
use lockbox_crypto::{constant_time_eq, KdfParams, Password};
use lockbox_vault::{inspect, run_self_audit, LogProgress, PipelineConfig, VaultPipeline};

#[derive(Parser)]
#[command(name = "lockbox")]
#[command(about = "Lockbox - Password-based file encryption")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file into a vault container.
    Encrypt {
        /// File to encrypt.
        #[arg(short, long)]
        input: PathBuf,

        /// Container to write.
        #[arg(short, long)]
        output: PathBuf,

        /// KDF strength: "interactive", "moderate", or "sensitive".
        #[arg(short, long, default_value = "interactive")]
        strength: String,

        /// Plaintext chunk size in bytes.
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Chunks processed concurrently.
        #[arg(long)]
        parallel: Option<usize>,

        /// JSON pipeline configuration; overrides --strength.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Decrypt a vault container.
    Decrypt {
        /// Container to decrypt.
        #[arg(short, long)]
        input: PathBuf,

        /// File to write. Only created if the whole container verifies.
        #[arg(short, long)]
        output: PathBuf,

        /// Chunks processed concurrently.
        #[arg(long)]
        parallel: Option<usize>,

        /// JSON pipeline configuration; its `max_kdf` caps the KDF cost a
        /// container may demand.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show container metadata without decrypting.
    Inspect {
        /// Container to inspect.
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Run the built-in self-audit.
    Audit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Encrypt {
            input,
            output,
            strength,
            chunk_size,
            parallel,
            config,
        } => {
            let config = build_config(&strength, chunk_size, parallel, config.as_deref()).await?;
            cmd_encrypt(&input, &output, config).await
        }

        Commands::Decrypt {
            input,
            output,
            parallel,
            config,
        } => {
            let config = build_config("interactive", None, parallel, config.as_deref()).await?;
            cmd_decrypt(&input, &output, config).await
        }

        Commands::Inspect { input } => cmd_inspect(&input).await,

        Commands::Audit => cmd_audit().await,
    }
}

/// Prompt for password securely.
fn prompt_password(prompt: &str) -> Result<Password> {
    let password = rpassword::prompt_password(prompt).context("Failed to read password")?;
    Ok(Password::new(password))
}

async fn build_config(
    strength: &str,
    chunk_size: Option<usize>,
    parallel: Option<usize>,
    path: Option<&Path>,
) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let kdf = KdfParams::preset(strength).ok_or_else(|| {
                anyhow::anyhow!("Invalid strength. Use: interactive, moderate, or sensitive")
            })?;
            PipelineConfig::new(kdf)
        }
    };

    if let Some(chunk_size) = chunk_size {
        config = config.with_chunk_size(chunk_size);
    }
    if let Some(parallel) = parallel {
        config = config.with_parallel_chunks(parallel);
    }

    Ok(config)
}

/// Encrypt a file.
async fn cmd_encrypt(input: &Path, output: &Path, config: PipelineConfig) -> Result<()> {
    info!("Encrypting {} to {}", input.display(), output.display());

    let pipeline = VaultPipeline::new(config).context("Invalid pipeline configuration")?;
    let config = pipeline.config();
    info!(
        chunk_size = config.chunk_size,
        parallel_chunks = config.parallel_chunks,
        memory_cost_mib = config.kdf.memory_cost_mib,
        time_cost = config.kdf.time_cost,
        "Pipeline configured"
    );

    let password = prompt_password("Enter password: ")?;
    let confirm = prompt_password("Confirm password: ")?;
    if !constant_time_eq(password.as_bytes(), confirm.as_bytes()) {
        anyhow::bail!("Passwords do not match");
    }
    drop(confirm);

    let size = pipeline
        .encrypt_file(password, input, output, &LogProgress::new("encrypt"))
        .await
        .context("Failed to encrypt file")?;

    println!("Vault written: {} ({} bytes)", output.display(), size);
    Ok(())
}

/// Decrypt a container.
async fn cmd_decrypt(input: &Path, output: &Path, config: PipelineConfig) -> Result<()> {
    info!("Decrypting {} to {}", input.display(), output.display());

    let pipeline = VaultPipeline::new(config).context("Invalid pipeline configuration")?;
    let limit = &pipeline.config().max_kdf;
    info!(
        parallel_chunks = pipeline.config().parallel_chunks,
        max_memory_cost_mib = limit.memory_cost_mib,
        max_time_cost = limit.time_cost,
        "Pipeline configured"
    );
    let password = prompt_password("Enter password: ")?;

    match pipeline
        .decrypt_file(password, input, output, &LogProgress::new("decrypt"))
        .await
    {
        Ok(size) => {
            println!("File restored: {} ({} bytes)", output.display(), size);
            Ok(())
        }
        Err(Error::Authentication) => {
            anyhow::bail!("Wrong password or corrupted vault; nothing was written")
        }
        Err(e) => Err(e).context("Failed to decrypt vault"),
    }
}

/// Show container metadata.
async fn cmd_inspect(input: &Path) -> Result<()> {
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let info = inspect(&bytes).context("Not a readable vault container")?;

    println!("Vault Container:");
    println!("  Version: {}", info.version);
    println!("  Chunk size: {} bytes", info.chunk_size);
    println!("  Chunks: {}", info.records);
    println!("  Payload: {} bytes", info.payload_bytes);
    println!("  Container: {} bytes", info.container_bytes);
    println!("  KDF Parameters:");
    println!("    Memory: {} MiB", info.kdf.memory_cost_mib);
    println!("    Time: {} iterations", info.kdf.time_cost);
    println!("    Parallelism: {}", info.kdf.parallelism);
    println!("    Pre-hash rounds: {}", info.kdf.prehash_rounds);

    Ok(())
}

/// Run the self-audit.
async fn cmd_audit() -> Result<()> {
    let report = run_self_audit().await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.passed() {
        let failed: Vec<_> = report.failures().map(|c| c.name).collect();
        anyhow::bail!("Self-audit failed: {}", failed.join(", "));
    }

    println!("Self-audit passed.");
    Ok(())
}
