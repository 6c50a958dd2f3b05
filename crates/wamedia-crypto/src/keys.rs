//! Media key → per-session key bundle
//!
//! A 32-byte media key is expanded with the media type's info string into
//! 112 bytes and split:
//!
//! ```text
//! [0..16)   IV          AES-CBC initialization vector
//! [16..48)  cipher key  AES-256
//! [48..80)  MAC key     HMAC-SHA256
//! [80..112) ref key     reserved for reference/thumbnail derivation
//! ```

use wamedia_core::{MediaError, MediaResult, MediaType};
use zeroize::Zeroize;

use crate::{kdf, IV_SIZE, KEY_SIZE};

/// Bytes of HKDF output split into a [`MediaKeyBundle`].
pub const EXPANDED_LEN: usize = IV_SIZE + 3 * KEY_SIZE;

/// The 32-byte root secret shared between sender and recipient.
///
/// Zeroized on drop.
#[derive(Clone)]
pub struct MediaKey {
    bytes: [u8; KEY_SIZE],
}

impl MediaKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Copy a key out of a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> MediaResult<Self> {
        let bytes: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| MediaError::InvalidKeyLength { len: bytes.len() })?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Derive the key bundle for one encryption or decryption session.
    pub fn bundle(&self, media_type: MediaType) -> MediaResult<MediaKeyBundle> {
        MediaKeyBundle::derive(&self.bytes, media_type)
    }
}

impl Drop for MediaKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MediaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// IV, cipher key, MAC key and ref key for one session. Zeroized on drop.
#[derive(Clone)]
pub struct MediaKeyBundle {
    iv: [u8; IV_SIZE],
    cipher_key: [u8; KEY_SIZE],
    mac_key: [u8; KEY_SIZE],
    ref_key: [u8; KEY_SIZE],
}

impl MediaKeyBundle {
    /// Derive a bundle from a root secret of exactly 32 bytes.
    ///
    /// Stricter than [`kdf::expand`], which accepts any key of 32 bytes or more.
    pub fn derive(root_secret: &[u8], media_type: MediaType) -> MediaResult<Self> {
        if root_secret.len() != KEY_SIZE {
            return Err(MediaError::InvalidKeyLength {
                len: root_secret.len(),
            });
        }

        let mut expanded = kdf::expand(root_secret, EXPANDED_LEN, media_type.domain())?;

        let mut bundle = Self {
            iv: [0u8; IV_SIZE],
            cipher_key: [0u8; KEY_SIZE],
            mac_key: [0u8; KEY_SIZE],
            ref_key: [0u8; KEY_SIZE],
        };
        bundle.iv.copy_from_slice(&expanded[..16]);
        bundle.cipher_key.copy_from_slice(&expanded[16..48]);
        bundle.mac_key.copy_from_slice(&expanded[48..80]);
        bundle.ref_key.copy_from_slice(&expanded[80..112]);
        expanded.zeroize();

        tracing::debug!(media_type = %media_type, "derived media key bundle");
        Ok(bundle)
    }

    /// Derive a bundle from a media type given by name, e.g. `"VIDEO"`.
    pub fn derive_named(root_secret: &[u8], media_type: &str) -> MediaResult<Self> {
        Self::derive(root_secret, media_type.parse()?)
    }

    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    pub fn cipher_key(&self) -> &[u8; KEY_SIZE] {
        &self.cipher_key
    }

    pub fn mac_key(&self) -> &[u8; KEY_SIZE] {
        &self.mac_key
    }

    pub fn ref_key(&self) -> &[u8; KEY_SIZE] {
        &self.ref_key
    }
}

impl Drop for MediaKeyBundle {
    fn drop(&mut self) {
        self.iv.zeroize();
        self.cipher_key.zeroize();
        self.mac_key.zeroize();
        self.ref_key.zeroize();
    }
}

impl std::fmt::Debug for MediaKeyBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaKeyBundle")
            .field("iv", &"[REDACTED]")
            .field("cipher_key", &"[REDACTED]")
            .field("mac_key", &"[REDACTED]")
            .field("ref_key", &"[REDACTED]")
            .finish()
    }
}
