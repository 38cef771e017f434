//! Storage for the optional shared-secret token sent with submissions.
//!
//! The token lives in the OS keyring when one is available. Headless hosts
//! fall back to a ChaCha20-Poly1305 sealed file under `.visigov/secrets`,
//! with the key material kept in a separate 0600 file.
//! `VISIGOV_DISABLE_KEYRING=1` forces the fallback path.

use std::path::{Path, PathBuf};

use crate::app_dirs;

const KEYRING_SERVICE: &str = "visigov";
const KEYRING_KEY: &str = "visigov_feedback_token";

/// Environment variable supplying the token directly, bypassing storage.
pub const TOKEN_ENV: &str = "VISIGOV_FEEDBACK_TOKEN";
const DISABLE_KEYRING_ENV: &str = "VISIGOV_DISABLE_KEYRING";

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Errors raised by token storage.
#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    /// Keyring backend missing or refusing access.
    #[error("Token store unavailable: {0}")]
    Unavailable(String),
    /// Filesystem failure on the fallback files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Sealing or unsealing the fallback file failed.
    #[error("Crypto error: {0}")]
    Crypto(String),
    /// The fallback files exist but hold unusable data.
    #[error("Decode error: {0}")]
    Decode(String),
    /// The secrets directory could not be prepared.
    #[error("App dir error: {0}")]
    AppDir(#[from] app_dirs::AppDirError),
}

/// Keyring-first token storage with a sealed-file fallback.
#[derive(Clone, Debug)]
pub struct TokenStore {
    secrets_dir: PathBuf,
}

impl TokenStore {
    /// Open the store, preparing the fallback directory.
    pub fn new() -> Result<Self, TokenStoreError> {
        Ok(Self {
            secrets_dir: app_dirs::secrets_dir()?,
        })
    }

    /// Read the stored token, if any.
    pub fn load(&self) -> Result<Option<String>, TokenStoreError> {
        if let Some(token) = keyring_load()? {
            return Ok(Some(token));
        }
        self.fallback_load()
    }

    /// Persist a token; empty input is ignored.
    pub fn store(&self, token: &str) -> Result<(), TokenStoreError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(());
        }
        if keyring_store(token).is_ok() {
            let _ = self.fallback_clear();
            return Ok(());
        }
        self.fallback_store(token)
    }

    /// Remove the token from both backends.
    pub fn clear(&self) -> Result<(), TokenStoreError> {
        let _ = keyring_clear();
        let _ = self.fallback_clear();
        Ok(())
    }

    fn sealed_path(&self) -> PathBuf {
        self.secrets_dir.join("feedback_token.bin")
    }

    fn key_path(&self) -> PathBuf {
        self.secrets_dir.join("feedback_token.key")
    }

    fn fallback_load(&self) -> Result<Option<String>, TokenStoreError> {
        let sealed_path = self.sealed_path();
        if !sealed_path.exists() {
            return Ok(None);
        }
        let sealed = std::fs::read(sealed_path)?;
        if sealed.len() < NONCE_LEN {
            return Err(TokenStoreError::Decode("token file too short".into()));
        }
        let key = std::fs::read(self.key_path())?;
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = open_sealed(&key, nonce, ciphertext)?;
        String::from_utf8(plaintext)
            .map(Some)
            .map_err(|err| TokenStoreError::Decode(err.to_string()))
    }

    fn fallback_store(&self, token: &str) -> Result<(), TokenStoreError> {
        let key = self.load_or_create_key()?;
        let nonce = random_bytes(NONCE_LEN)?;
        let ciphertext = seal(&key, &nonce, token.as_bytes())?;
        let mut sealed = nonce;
        sealed.extend_from_slice(&ciphertext);
        write_private_file(&self.sealed_path(), &sealed)
    }

    fn fallback_clear(&self) -> Result<(), TokenStoreError> {
        let _ = std::fs::remove_file(self.sealed_path());
        let _ = std::fs::remove_file(self.key_path());
        Ok(())
    }

    fn load_or_create_key(&self) -> Result<Vec<u8>, TokenStoreError> {
        let key_path = self.key_path();
        if key_path.exists() {
            let key = std::fs::read(&key_path)?;
            if key.len() != KEY_LEN {
                return Err(TokenStoreError::Decode("token key invalid".into()));
            }
            return Ok(key);
        }
        let key = random_bytes(KEY_LEN)?;
        write_private_file(&key_path, &key)?;
        Ok(key)
    }
}

/// Resolve the token to send with submissions: env var first, then storage.
///
/// Storage failures degrade to "no token" with a warning; a broken keyring
/// must never block a submission attempt.
pub fn resolve_token() -> Option<String> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        let token = token.trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }
    match TokenStore::new().and_then(|store| store.load()) {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!("Feedback token unavailable: {err}");
            None
        }
    }
}

fn keyring_disabled() -> bool {
    std::env::var(DISABLE_KEYRING_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn keyring_entry() -> Result<keyring::Entry, TokenStoreError> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_KEY)
        .map_err(|err| TokenStoreError::Unavailable(err.to_string()))
}

fn keyring_load() -> Result<Option<String>, TokenStoreError> {
    if keyring_disabled() {
        return Ok(None);
    }
    match keyring_entry()?.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(_) => Ok(None),
    }
}

fn keyring_store(token: &str) -> Result<(), TokenStoreError> {
    if keyring_disabled() {
        return Err(TokenStoreError::Unavailable("keyring disabled".into()));
    }
    keyring_entry()?
        .set_password(token)
        .map_err(|err| TokenStoreError::Unavailable(err.to_string()))
}

fn keyring_clear() -> Result<(), TokenStoreError> {
    if keyring_disabled() {
        return Ok(());
    }
    let _ = keyring_entry()?.delete_credential();
    Ok(())
}

fn random_bytes(len: usize) -> Result<Vec<u8>, TokenStoreError> {
    use rand::TryRngCore;
    let mut out = vec![0u8; len];
    rand::rngs::OsRng
        .try_fill_bytes(&mut out)
        .map_err(|err| TokenStoreError::Unavailable(err.to_string()))?;
    Ok(out)
}

fn write_private_file(path: &Path, bytes: &[u8]) -> Result<(), TokenStoreError> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    file.write_all(bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

fn seal(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, TokenStoreError> {
    use chacha20poly1305::aead::{Aead, KeyInit};
    let cipher = chacha20poly1305::ChaCha20Poly1305::new_from_slice(key)
        .map_err(|err| TokenStoreError::Crypto(err.to_string()))?;
    cipher
        .encrypt(chacha20poly1305::Nonce::from_slice(nonce), plaintext)
        .map_err(|err| TokenStoreError::Crypto(err.to_string()))
}

fn open_sealed(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, TokenStoreError> {
    use chacha20poly1305::aead::{Aead, KeyInit};
    if key.len() != KEY_LEN {
        return Err(TokenStoreError::Decode("token key invalid".into()));
    }
    let cipher = chacha20poly1305::ChaCha20Poly1305::new_from_slice(key)
        .map_err(|err| TokenStoreError::Crypto(err.to_string()))?;
    cipher
        .decrypt(chacha20poly1305::Nonce::from_slice(nonce), ciphertext)
        .map_err(|err| TokenStoreError::Crypto(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct KeyringDisabledGuard;

    impl KeyringDisabledGuard {
        fn set() -> Self {
            // SAFETY: the ConfigBaseGuard held alongside this guard serializes
            // the tests that touch this variable.
            unsafe {
                std::env::set_var(DISABLE_KEYRING_ENV, "1");
            }
            Self
        }
    }

    impl Drop for KeyringDisabledGuard {
        fn drop(&mut self) {
            // SAFETY: see `set`.
            unsafe {
                std::env::remove_var(DISABLE_KEYRING_ENV);
            }
        }
    }

    #[test]
    fn fallback_roundtrip_when_keyring_disabled() {
        let base = tempdir().unwrap();
        let _config = app_dirs::ConfigBaseGuard::set(base.path().to_path_buf());
        let _keyring = KeyringDisabledGuard::set();
        let store = TokenStore::new().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.store("tok_abcdefghijklmnopqrstuvwxyz").unwrap();
        assert_eq!(
            store.load().unwrap().as_deref(),
            Some("tok_abcdefghijklmnopqrstuvwxyz")
        );
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn storing_blank_token_is_a_no_op() {
        let base = tempdir().unwrap();
        let _config = app_dirs::ConfigBaseGuard::set(base.path().to_path_buf());
        let _keyring = KeyringDisabledGuard::set();
        let store = TokenStore::new().unwrap();
        store.store("   ").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn seal_and_open_roundtrip() {
        let key = vec![7u8; KEY_LEN];
        let nonce = vec![9u8; NONCE_LEN];
        let sealed = seal(&key, &nonce, b"secret").unwrap();
        assert_ne!(sealed, b"secret");
        let opened = open_sealed(&key, &nonce, &sealed).unwrap();
        assert_eq!(opened, b"secret");
    }

    #[test]
    fn open_rejects_wrong_key() {
        let key = vec![7u8; KEY_LEN];
        let nonce = vec![9u8; NONCE_LEN];
        let sealed = seal(&key, &nonce, b"secret").unwrap();
        let wrong = vec![8u8; KEY_LEN];
        assert!(open_sealed(&wrong, &nonce, &sealed).is_err());
    }
}
