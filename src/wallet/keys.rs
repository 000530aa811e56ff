// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Node key parsing.
//!
//! Keys are accepted as PEM (SEC1 `EC PRIVATE KEY` or PKCS#8 `PRIVATE KEY`)
//! or as a raw 32-byte hex string, optionally `0x`-prefixed.

use std::path::Path;

use alloy::signers::local::PrivateKeySigner;
use k256::SecretKey;

use super::WalletError;

/// Parse a private key from PEM format to hex string.
///
/// # Returns
/// * `Ok(String)` - Hex-encoded private key (64 characters, no 0x prefix)
/// * `Err(WalletError)` - If PEM parsing fails
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, WalletError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| WalletError::InvalidKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| WalletError::InvalidKey(format!("Invalid PEM: {}", e)))?;

    // SEC1 first, PKCS#8 wrapper second
    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| WalletError::InvalidKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from a hex-encoded private key.
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, WalletError> {
    let trimmed = private_key_hex.trim();
    let key_bytes = alloy::hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .map_err(|e| WalletError::InvalidKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes).map_err(|e| WalletError::InvalidKey(e.to_string()))
}

/// Create a signer from a PEM-encoded private key.
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, WalletError> {
    let hex_key = pem_to_hex(pem_bytes)?;
    signer_from_hex(&hex_key)
}

/// Read a key file, detecting PEM vs hex from its contents.
pub fn signer_from_file(path: &Path) -> Result<PrivateKeySigner, WalletError> {
    let contents = std::fs::read(path)
        .map_err(|e| WalletError::KeyFile(format!("failed to read {}: {e}", path.display())))?;

    if contents.starts_with(b"-----BEGIN") {
        return signer_from_pem(&contents);
    }

    let text = std::str::from_utf8(&contents)
        .map_err(|e| WalletError::InvalidKey(format!("Invalid UTF-8: {}", e)))?;
    if text.trim().is_empty() {
        return Err(WalletError::KeyFile(format!(
            "key file is empty: {}",
            path.display()
        )));
    }
    signer_from_hex(text)
}
