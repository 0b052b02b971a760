//! Authentication module: admin login + JWT
//!
//! Provides:
//! - JWT token encoding/decoding (`jwt` submodule)
//! - `require_auth` middleware guarding admin routes (`middleware` submodule)

pub mod jwt;
pub mod middleware;

use crate::AdminAccountConfig;
use anyhow::{Context, Result};
use tracing::warn;

/// bcrypt cost used when hashing a plaintext admin password at startup
pub const BCRYPT_COST: u32 = 12;

/// Whether `value` already looks like a bcrypt hash
pub fn is_bcrypt_hash(value: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| value.starts_with(prefix))
}

/// Replace a plaintext admin password by its bcrypt hash.
///
/// Hashes are left untouched.
pub fn prepare_admin_password(admin: &mut AdminAccountConfig, cost: u32) -> Result<()> {
    if is_bcrypt_hash(&admin.password_hash) {
        return Ok(());
    }
    warn!(
        username = %admin.username,
        "Admin password is configured in plaintext; hashing it at startup. Store a bcrypt hash instead."
    );
    admin.password_hash =
        bcrypt::hash(&admin.password_hash, cost).context("Failed to hash admin password")?;
    Ok(())
}

/// Check a login attempt against the configured admin account
pub fn verify_admin(admin: &AdminAccountConfig, username: &str, password: &str) -> bool {
    username == admin.username && bcrypt::verify(password, &admin.password_hash).unwrap_or(false)
}
