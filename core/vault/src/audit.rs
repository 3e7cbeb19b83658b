//! Self-audit harness.
//!
//! A fixed battery of deterministic checks over the primitives and the
//! pipeline. Nothing here touches the filesystem or the network.

use serde::Serialize;
use tokio::task;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::pipeline::VaultPipeline;
use crate::progress::NoProgress;
use lockbox_crypto::{
    constant_time_eq, derive_key, isolate_buffer, random_bytes, zeroize, KdfParams, Salt,
};

const AUDIT_PASSWORD: &str = "lockbox-self-audit";
const AUDIT_SALT: [u8; 32] = [0x5A; 32];
const AUDIT_PLAINTEXT: &[u8] = b"The quick brown fox jumps over the lazy dog";
const AUDIT_CHUNK_SIZE: usize = 16;

/// Low-cost parameters so the audit finishes quickly.
fn audit_kdf() -> KdfParams {
    KdfParams::new(8, 1, 1).with_prehash_rounds(10_000)
}

/// Result of one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: Option<String>,
}

impl CheckOutcome {
    fn from_result(name: &'static str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => {
                info!(check = name, "Self-audit check passed");
                Self {
                    name,
                    passed: true,
                    detail: None,
                }
            }
            Err(detail) => {
                warn!(check = name, detail = %detail, "Self-audit check failed");
                Self {
                    name,
                    passed: false,
                    detail: Some(detail),
                }
            }
        }
    }
}

/// Outcomes of every check, in the order they ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub checks: Vec<CheckOutcome>,
}

impl AuditReport {
    /// True iff every check passed.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Run every check and report each outcome individually.
pub async fn run_self_audit() -> AuditReport {
    let checks = vec![
        CheckOutcome::from_result("memory_hygiene", check_memory_hygiene()),
        CheckOutcome::from_result("kdf_determinism", check_kdf_determinism().await),
        CheckOutcome::from_result("round_trip", check_round_trip().await),
    ];

    AuditReport { checks }
}

fn check_memory_hygiene() -> Result<(), String> {
    let mut original = random_bytes(64).map_err(|e| e.to_string())?;
    let isolated = isolate_buffer(&original);
    if !constant_time_eq(&original, &isolated) {
        return Err("isolated copy differs from original".to_string());
    }

    let snapshot = isolated.to_vec();
    zeroize(&mut original);
    if original.iter().any(|b| *b != 0) {
        return Err("original not zeroed".to_string());
    }
    if !constant_time_eq(&isolated, &snapshot) {
        return Err("isolated copy changed when original was zeroed".to_string());
    }

    Ok(())
}

async fn check_kdf_determinism() -> Result<(), String> {
    task::spawn_blocking(|| {
        let salt = Salt::from_bytes(AUDIT_SALT);
        let params = audit_kdf();

        let first = derive_key(AUDIT_PASSWORD.as_bytes(), &salt, &params).map_err(|e| e.to_string())?;
        let second = derive_key(AUDIT_PASSWORD.as_bytes(), &salt, &params).map_err(|e| e.to_string())?;

        if constant_time_eq(&first, &second) {
            Ok(())
        } else {
            Err("identical inputs derived different keys".to_string())
        }
    })
    .await
    .map_err(|e| e.to_string())?
}

async fn check_round_trip() -> Result<(), String> {
    let config = PipelineConfig::new(audit_kdf()).with_chunk_size(AUDIT_CHUNK_SIZE);
    let pipeline = VaultPipeline::new(config).map_err(|e| e.to_string())?;

    let container = pipeline
        .encrypt(AUDIT_PASSWORD.into(), AUDIT_PLAINTEXT, &NoProgress)
        .await
        .map_err(|e| e.to_string())?;
    let plaintext = pipeline
        .decrypt(AUDIT_PASSWORD.into(), &container, &NoProgress)
        .await
        .map_err(|e| e.to_string())?;

    if constant_time_eq(&plaintext, AUDIT_PLAINTEXT) {
        Ok(())
    } else {
        Err("decrypted bytes differ from the original".to_string())
    }
}
