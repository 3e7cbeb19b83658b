//! Vault engine for Lockbox.
//!
//! This module provides:
//! - The versioned container format
//! - The file pipeline that encrypts and decrypts whole files chunk by chunk
//! - Pipeline configuration and progress reporting
//! - A self-audit harness over the whole stack
//!
//! # Architecture
//! The pipeline sits between a front end that supplies a password and bytes
//! and the primitives in `lockbox-crypto`. It owns the file key for the
//! duration of one call and the fail-closed decryption policy.

pub mod audit;
pub mod config;
pub mod format;
pub mod pipeline;
pub mod progress;

pub use audit::{run_self_audit, AuditReport, CheckOutcome};
pub use config::{default_max_kdf, PipelineConfig, DEFAULT_CHUNK_SIZE};
pub use format::{inspect, parse_header, ContainerInfo, Header, FORMAT_VERSION, MAGIC};
pub use pipeline::VaultPipeline;
pub use progress::{LogProgress, NoProgress, Progress, ProgressSink};
