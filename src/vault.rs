/*!
 * Secure-at-rest credential store for translation providers.
 *
 * Secrets are encrypted with AES-256-GCM under a per-secret key derived
 * from a master key via HKDF-SHA256. When no usable master key can be
 * obtained the vault degrades to plaintext storage with a warning instead
 * of refusing to save or load.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use aes_gcm::{
    Aes256Gcm, KeyInit, Nonce,
    aead::{Aead, AeadCore, OsRng},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hkdf::Hkdf;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::errors::VaultError;

/// Size of the AES-256 key in bytes
const KEY_SIZE: usize = 32;

/// Size of the GCM nonce in bytes
const NONCE_SIZE: usize = 12;

/// Size of the per-secret salt for key derivation
const SALT_SIZE: usize = 32;

/// Size of the GCM authentication tag
const TAG_SIZE: usize = 16;

/// HKDF domain separation string
const HKDF_INFO: &[u8] = b"doctrans-credentials-v1";

/// Environment variable that supplies the master key directly
pub const VAULT_KEY_ENV: &str = "DOCTRANS_VAULT_KEY";

/// File name of the credential document inside the vault directory
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// File name of the generated master key inside the vault directory
pub const KEY_FILE: &str = "vault.key";

/// How a secret was persisted by the most recent save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultStatus {
    /// Stored encrypted with the vault cipher
    Encrypted,
    /// Stored as plaintext because no usable cipher was available
    Degraded,
}

/// Per-provider credential entry as stored on disk
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialEntry {
    /// Secret material, base64 ciphertext when `encrypted`, raw text otherwise
    #[serde(default)]
    pub secret: String,

    /// Per-secret key derivation salt, base64
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,

    /// Whether `secret` is ciphertext
    #[serde(default)]
    pub encrypted: bool,

    /// Endpoint override, empty for the provider default
    #[serde(default)]
    pub endpoint: String,

    /// Preferred model, empty for the provider default
    #[serde(default)]
    pub model: String,

    /// Whether the provider may be offered for selection
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for CredentialEntry {
    fn default() -> Self {
        Self {
            secret: String::new(),
            salt: None,
            encrypted: false,
            endpoint: String::new(),
            model: String::new(),
            enabled: true,
        }
    }
}

// Secrets stay out of debug output even in degraded mode
impl fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("secret", &"[REDACTED]")
            .field("encrypted", &self.encrypted)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// On-disk document wrapping all provider entries
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VaultDocument {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    updated_at: String,

    #[serde(default)]
    providers: BTreeMap<String, CredentialEntry>,
}

fn default_version() -> u32 {
    1
}

impl Default for VaultDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            updated_at: String::new(),
            providers: BTreeMap::new(),
        }
    }
}

/// AES-256-GCM with per-secret HKDF-SHA256 key derivation
struct VaultCipher {
    master_key: SecretString,
}

impl VaultCipher {
    /// Create a cipher, rejecting master keys shorter than the AES key size
    fn new(master_key: SecretString) -> Option<Self> {
        if master_key.expose_secret().len() < KEY_SIZE {
            return None;
        }
        Some(Self { master_key })
    }

    fn generate_salt() -> Vec<u8> {
        let mut salt = vec![0u8; SALT_SIZE];
        rand::rng().fill_bytes(&mut salt);
        salt
    }

    /// Encrypt a secret value.
    ///
    /// Returns (nonce || ciphertext || tag, salt). Each secret gets its own
    /// random salt, so identical plaintexts never share a ciphertext.
    fn encrypt(&self, plaintext: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
        let salt = Self::generate_salt();
        let derived_key = self.derive_key(&salt)?;

        let cipher = Aes256Gcm::new_from_slice(&derived_key).ok()?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher.encrypt(&nonce, plaintext).ok()?;

        let mut encrypted = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        encrypted.extend_from_slice(&nonce);
        encrypted.extend_from_slice(&ciphertext);
        Some((encrypted, salt))
    }

    /// Decrypt a value produced by [`Self::encrypt`]
    fn decrypt(&self, encrypted: &[u8], salt: &[u8]) -> Option<Vec<u8>> {
        if encrypted.len() < NONCE_SIZE + TAG_SIZE {
            return None;
        }
        let derived_key = self.derive_key(salt)?;

        let cipher = Aes256Gcm::new_from_slice(&derived_key).ok()?;
        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        cipher.decrypt(nonce, ciphertext).ok()
    }

    fn derive_key(&self, salt: &[u8]) -> Option<[u8; KEY_SIZE]> {
        let hk = Hkdf::<Sha256>::new(Some(salt), self.master_key.expose_secret().as_bytes());
        let mut derived = [0u8; KEY_SIZE];
        hk.expand(HKDF_INFO, &mut derived).ok()?;
        Some(derived)
    }
}

impl fmt::Debug for VaultCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultCipher")
            .field("master_key", &"[REDACTED]")
            .finish()
    }
}

/// Persistent store of per-provider credentials
///
/// Every mutation is written through to `credentials.json` immediately via
/// a temp-file rename, so a crash never leaves a half-written document.
pub struct CredentialVault {
    path: PathBuf,
    cipher: Option<VaultCipher>,
    document: VaultDocument,
}

impl CredentialVault {
    /// Open the vault rooted at `dir`, creating the directory if needed and
    /// loading any existing credential document.
    ///
    /// The master key comes from [`VAULT_KEY_ENV`] when set, otherwise from
    /// a key file generated on first use. If neither yields a usable key the
    /// vault opens in degraded mode and stores secrets unencrypted.
    pub fn open(dir: &Path) -> Result<Self, VaultError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(CREDENTIALS_FILE);
        let document = Self::load_document(&path)?;
        let cipher = Self::resolve_cipher(dir);
        if cipher.is_none() {
            log::warn!("Credential vault is degraded: secrets will be stored unencrypted");
        }
        Ok(Self {
            path,
            cipher,
            document,
        })
    }

    /// Open the vault with encryption disabled regardless of key availability
    pub fn open_unencrypted(dir: &Path) -> Result<Self, VaultError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(CREDENTIALS_FILE);
        let document = Self::load_document(&path)?;
        log::warn!("Credential vault is degraded: secrets will be stored unencrypted");
        Ok(Self {
            path,
            cipher: None,
            document,
        })
    }

    /// Whether secrets written now would be encrypted at rest
    pub fn is_encrypting(&self) -> bool {
        self.cipher.is_some()
    }

    /// Location of the credential document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a secret for a provider, persisting immediately.
    ///
    /// Returns how the secret was written. A failing encryption path never
    /// aborts the save; the value falls back to plaintext with a warning.
    pub fn put(&mut self, provider_id: &str, secret: &str) -> Result<VaultStatus, VaultError> {
        let encrypted = self
            .cipher
            .as_ref()
            .and_then(|cipher| cipher.encrypt(secret.as_bytes()));
        let had_cipher = self.cipher.is_some();

        let entry = self
            .document
            .providers
            .entry(provider_id.to_string())
            .or_default();
        let status = match encrypted {
            Some((ciphertext, salt)) => {
                entry.secret = BASE64.encode(&ciphertext);
                entry.salt = Some(BASE64.encode(&salt));
                entry.encrypted = true;
                VaultStatus::Encrypted
            }
            None => {
                if had_cipher {
                    log::warn!(
                        "Encrypting the credential for '{}' failed; storing it unencrypted",
                        provider_id
                    );
                }
                entry.secret = secret.to_string();
                entry.salt = None;
                entry.encrypted = false;
                VaultStatus::Degraded
            }
        };
        self.save()?;
        Ok(status)
    }

    /// Fetch the secret for a provider.
    ///
    /// Returns `None` when no non-empty secret is stored. A value that can
    /// no longer be decrypted is returned as stored, mirroring degraded-mode
    /// semantics rather than failing the lookup.
    pub fn get(&self, provider_id: &str) -> Option<SecretString> {
        let entry = self.document.providers.get(provider_id)?;
        if entry.secret.is_empty() {
            return None;
        }
        if !entry.encrypted {
            return Some(SecretString::from(entry.secret.clone()));
        }

        let decrypted = self
            .cipher
            .as_ref()
            .zip(entry.salt.as_deref())
            .and_then(|(cipher, salt)| {
                let ciphertext = BASE64.decode(entry.secret.as_bytes()).ok()?;
                let salt = BASE64.decode(salt.as_bytes()).ok()?;
                cipher.decrypt(&ciphertext, &salt)
            })
            .and_then(|bytes| String::from_utf8(bytes).ok());

        match decrypted {
            Some(secret) => Some(SecretString::from(secret)),
            None => {
                log::warn!(
                    "Could not decrypt the credential for '{}'; returning the stored value",
                    provider_id
                );
                Some(SecretString::from(entry.secret.clone()))
            }
        }
    }

    /// Whether a non-empty secret is stored for a provider
    pub fn has_secret(&self, provider_id: &str) -> bool {
        self.document
            .providers
            .get(provider_id)
            .is_some_and(|entry| !entry.secret.is_empty())
    }

    /// Remove a provider's entry entirely, persisting immediately.
    ///
    /// Returns whether an entry existed.
    pub fn delete(&mut self, provider_id: &str) -> Result<bool, VaultError> {
        let removed = self.document.providers.remove(provider_id).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Stored entry for a provider, if any
    pub fn credential(&self, provider_id: &str) -> Option<&CredentialEntry> {
        self.document.providers.get(provider_id)
    }

    /// Provider ids with a stored entry, in stable order
    pub fn provider_ids(&self) -> Vec<String> {
        self.document.providers.keys().cloned().collect()
    }

    /// Set the endpoint override for a provider, persisting immediately
    pub fn set_endpoint(&mut self, provider_id: &str, endpoint: &str) -> Result<(), VaultError> {
        self.entry_mut(provider_id).endpoint = endpoint.to_string();
        self.save()
    }

    /// Set the preferred model for a provider, persisting immediately
    pub fn set_model(&mut self, provider_id: &str, model: &str) -> Result<(), VaultError> {
        self.entry_mut(provider_id).model = model.to_string();
        self.save()
    }

    /// Enable or disable a provider, persisting immediately
    pub fn set_enabled(&mut self, provider_id: &str, enabled: bool) -> Result<(), VaultError> {
        self.entry_mut(provider_id).enabled = enabled;
        self.save()
    }

    fn entry_mut(&mut self, provider_id: &str) -> &mut CredentialEntry {
        self.document
            .providers
            .entry(provider_id.to_string())
            .or_default()
    }

    fn load_document(path: &Path) -> Result<VaultDocument, VaultError> {
        if !path.exists() {
            return Ok(VaultDocument::default());
        }
        let raw = fs::read_to_string(path)?;
        if raw.trim().is_empty() {
            return Ok(VaultDocument::default());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn resolve_cipher(dir: &Path) -> Option<VaultCipher> {
        if let Ok(key) = std::env::var(VAULT_KEY_ENV) {
            if let Some(cipher) = VaultCipher::new(SecretString::from(key)) {
                return Some(cipher);
            }
            log::warn!(
                "{} is set but shorter than {} bytes; falling back to the key file",
                VAULT_KEY_ENV,
                KEY_SIZE
            );
        }
        match Self::load_or_create_key_file(&dir.join(KEY_FILE)) {
            Ok(key) => VaultCipher::new(key),
            Err(e) => {
                log::warn!("Could not obtain a vault master key: {}", e);
                None
            }
        }
    }

    fn load_or_create_key_file(path: &Path) -> Result<SecretString, VaultError> {
        if path.exists() {
            let raw = fs::read_to_string(path)?;
            return Ok(SecretString::from(raw.trim().to_string()));
        }

        let mut key_bytes = vec![0u8; KEY_SIZE];
        rand::rng().fill_bytes(&mut key_bytes);
        let encoded = BASE64.encode(&key_bytes);
        fs::write(path, &encoded)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
                log::warn!("Could not restrict permissions on {}: {}", path.display(), e);
            }
        }

        log::info!("Generated a new vault master key at {}", path.display());
        Ok(SecretString::from(encoded))
    }

    // Write-then-rename so readers never observe a partial document
    fn save(&mut self) -> Result<(), VaultError> {
        self.document.updated_at = chrono::Local::now().to_rfc3339();
        let json = serde_json::to_string_pretty(&self.document)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| VaultError::Io(e.error))?;
        Ok(())
    }
}

impl fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVault")
            .field("path", &self.path)
            .field("encrypting", &self.cipher.is_some())
            .field("providers", &self.document.providers.len())
            .finish()
    }
}
