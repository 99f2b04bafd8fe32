//! AES-256-GCM encryption for platform credentials at rest.
//!
//! The master key comes from one of:
//! - a hex key file in the data directory, generated on first use
//! - the OS keychain, generated on first use
//! - a password, through Argon2id
//!
//! Encrypted format: `nonce (12 bytes) || ciphertext`
//!
//! SECURITY: Error types never contain plaintext or key material.

use std::path::Path;

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use thiserror::Error;

use voxclone_types::config::KeySource;

const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;

/// File name of the master key inside the data directory.
pub const KEY_FILE_NAME: &str = "vault.key";

const KEYCHAIN_SERVICE: &str = "voxclone";
const KEYCHAIN_USER: &str = "credential-master-key";

/// Fixed Argon2id salt; the password carries the entropy.
const PASSWORD_SALT: &[u8] = b"voxclone-credentials-v1";

/// Errors from vault encryption operations.
///
/// IMPORTANT: no variant includes plaintext, key material or ciphertext in
/// its Display/Debug output.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("invalid ciphertext: too short")]
    CiphertextTooShort,

    #[error("decrypted value is not valid UTF-8")]
    InvalidUtf8,

    #[error("key derivation failed")]
    KeyDerivationFailed,

    #[error("key file error: {0}")]
    KeyFile(String),

    #[error("keychain unavailable: {0}")]
    KeychainUnavailable(String),

    #[error("keychain error: {0}")]
    KeychainError(String),
}

/// Symmetric cipher for credential blobs.
///
/// Every encryption draws a fresh random nonce, so the same API key stored
/// twice never yields the same bytes.
pub struct VaultCrypto {
    cipher: Aes256Gcm,
}

impl VaultCrypto {
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Open the vault with the configured key source.
    pub fn from_source(source: KeySource, data_dir: &Path) -> Result<Self, VaultError> {
        match source {
            KeySource::File => Self::from_key_file(&data_dir.join(KEY_FILE_NAME)),
            KeySource::Keychain => Self::from_keychain(),
        }
    }

    /// Derive the key from a password with Argon2id (19 MiB, 2 passes, 1 lane).
    pub fn from_password(password: &str) -> Result<Self, VaultError> {
        use argon2::{Algorithm, Argon2, Params, Version};

        let params = Params::new(19456, 2, 1, Some(KEY_SIZE))
            .map_err(|_| VaultError::KeyDerivationFailed)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = [0u8; KEY_SIZE];
        argon2
            .hash_password_into(password.as_bytes(), PASSWORD_SALT, &mut key)
            .map_err(|_| VaultError::KeyDerivationFailed)?;

        Ok(Self::new(&key))
    }

    /// Load the hex key stored at `path`, creating it on first use.
    ///
    /// A new file is written with owner-only permissions on Unix.
    pub fn from_key_file(path: &Path) -> Result<Self, VaultError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let key = parse_key(contents.trim())
                    .ok_or_else(|| VaultError::KeyFile("corrupted key file".to_string()))?;
                Ok(Self::new(&key))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let key = rand_bytes();
                write_key_file(path, &hex_encode(&key))?;
                tracing::info!(path = %path.display(), "Generated new vault key");
                Ok(Self::new(&key))
            }
            Err(e) => Err(VaultError::KeyFile(e.to_string())),
        }
    }

    /// Load the key from the OS keychain, generating and storing one on first use.
    pub fn from_keychain() -> Result<Self, VaultError> {
        let entry = keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_USER)
            .map_err(|e| VaultError::KeychainUnavailable(e.to_string()))?;

        match entry.get_password() {
            Ok(hex_key) => {
                let key = parse_key(&hex_key).ok_or_else(|| {
                    VaultError::KeychainError("corrupted key in keychain".to_string())
                })?;
                Ok(Self::new(&key))
            }
            Err(keyring::Error::NoEntry) => {
                let key = rand_bytes();
                entry
                    .set_password(&hex_encode(&key))
                    .map_err(|e| VaultError::KeychainError(e.to_string()))?;
                Ok(Self::new(&key))
            }
            Err(e) => Err(VaultError::KeychainUnavailable(e.to_string())),
        }
    }

    /// Encrypt `plaintext`, returning `nonce || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| VaultError::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Decrypt data produced by [`VaultCrypto::encrypt`].
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, VaultError> {
        if data.len() < NONCE_SIZE {
            return Err(VaultError::CiphertextTooShort);
        }
        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| VaultError::DecryptionFailed)
    }

    pub fn encrypt_str(&self, plaintext: &str) -> Result<Vec<u8>, VaultError> {
        self.encrypt(plaintext.as_bytes())
    }

    pub fn decrypt_str(&self, data: &[u8]) -> Result<String, VaultError> {
        String::from_utf8(self.decrypt(data)?).map_err(|_| VaultError::InvalidUtf8)
    }
}

fn write_key_file(path: &Path, hex_key: &str) -> Result<(), VaultError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| VaultError::KeyFile(e.to_string()))?;
    }
    std::fs::write(path, hex_key).map_err(|e| VaultError::KeyFile(e.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(|e| VaultError::KeyFile(e.to_string()))?;
    }
    Ok(())
}

fn parse_key(hex_key: &str) -> Option<[u8; KEY_SIZE]> {
    let bytes = hex_decode(hex_key).ok()?;
    bytes.try_into().ok()
}

fn rand_bytes() -> [u8; KEY_SIZE] {
    use aes_gcm::aead::rand_core::RngCore;
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    key
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Result<Vec<u8>, String> {
    if s.len() % 2 != 0 {
        return Err("odd length hex string".to_string());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .ok_or_else(|| format!("invalid hex at position {i}"))
                .and_then(|pair| {
                    u8::from_str_radix(pair, 16).map_err(|e| format!("invalid hex at {i}: {e}"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = (i * 7) as u8;
        }
        key
    }

    #[test]
    fn test_api_key_survives_encryption() {
        let crypto = VaultCrypto::new(&test_key());
        let sealed = crypto.encrypt_str("sk_live_8f2c").unwrap();
        assert!(!sealed.windows(4).any(|w| w == b"sk_l"));
        assert_eq!(crypto.decrypt_str(&sealed).unwrap(), "sk_live_8f2c");
    }

    #[test]
    fn test_wrong_key_fails() {
        let mut other = test_key();
        other[3] ^= 0xFF;
        let sealed = VaultCrypto::new(&test_key()).encrypt(b"secret").unwrap();

        let result = VaultCrypto::new(&other).decrypt(&sealed);
        assert!(matches!(result, Err(VaultError::DecryptionFailed)));
    }

    #[test]
    fn test_nonce_is_fresh_per_call() {
        let crypto = VaultCrypto::new(&test_key());
        let a = crypto.encrypt(b"same").unwrap();
        let b = crypto.encrypt(b"same").unwrap();
        assert_ne!(a, b);
        assert_eq!(crypto.decrypt(&a).unwrap(), crypto.decrypt(&b).unwrap());
    }

    #[test]
    fn test_ciphertext_too_short() {
        let crypto = VaultCrypto::new(&test_key());
        assert!(matches!(
            crypto.decrypt(&[0u8; 5]),
            Err(VaultError::CiphertextTooShort)
        ));
    }

    #[test]
    fn test_from_password_is_deterministic() {
        let a = VaultCrypto::from_password("correct horse").unwrap();
        let b = VaultCrypto::from_password("correct horse").unwrap();
        let c = VaultCrypto::from_password("battery staple").unwrap();

        let sealed = a.encrypt(b"token").unwrap();
        assert_eq!(b.decrypt(&sealed).unwrap(), b"token");
        assert!(c.decrypt(&sealed).is_err());
    }

    #[test]
    fn test_key_file_created_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(KEY_FILE_NAME);

        let first = VaultCrypto::from_key_file(&path).unwrap();
        assert!(path.exists());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.len(), 64);

        let sealed = first.encrypt(b"persisted").unwrap();
        let second = VaultCrypto::from_key_file(&path).unwrap();
        assert_eq!(second.decrypt(&sealed).unwrap(), b"persisted");
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(KEY_FILE_NAME);
        VaultCrypto::from_key_file(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupted_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(KEY_FILE_NAME);
        std::fs::write(&path, "not-hex").unwrap();

        assert!(matches!(
            VaultCrypto::from_key_file(&path),
            Err(VaultError::KeyFile(_))
        ));
    }

    #[test]
    fn test_from_source_file() {
        let dir = tempfile::tempdir().unwrap();
        VaultCrypto::from_source(KeySource::File, dir.path()).unwrap();
        assert!(dir.path().join(KEY_FILE_NAME).exists());
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(hex_encode(&[0xDE, 0xAD, 0x00]), "dead00");
        assert_eq!(hex_decode("dead00").unwrap(), vec![0xDE, 0xAD, 0x00]);
        assert!(hex_decode("abc").is_err());
        assert!(parse_key("00").is_none());
    }

    #[test]
    fn test_errors_never_contain_secrets() {
        let errors = [
            VaultError::EncryptionFailed,
            VaultError::DecryptionFailed,
            VaultError::CiphertextTooShort,
            VaultError::InvalidUtf8,
            VaultError::KeyDerivationFailed,
            VaultError::KeyFile("permission denied".to_string()),
            VaultError::KeychainUnavailable("no service".to_string()),
        ];
        for err in &errors {
            assert!(!err.to_string().contains("sk_live"));
        }
    }
}
