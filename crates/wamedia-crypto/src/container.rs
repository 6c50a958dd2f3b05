//! One-shot container encryption/decryption
//!
//! Container format (binary):
//! ```text
//! [N bytes: AES-256-CBC ciphertext, PKCS#7 padded][10 bytes: tag]
//! tag = first 10 bytes of HMAC-SHA256(mac_key, iv || ciphertext)
//! ```
//!
//! The tag is verified in constant time before any decryption happens.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use wamedia_core::{MediaError, MediaResult, MediaType};

use crate::keys::MediaKeyBundle;
use crate::MAC_SIZE;

pub(crate) type HmacSha256 = Hmac<Sha256>;
pub(crate) type CbcEncryptor = cbc::Encryptor<Aes256>;
pub(crate) type CbcDecryptor = cbc::Decryptor<Aes256>;

pub(crate) fn new_encryptor(bundle: &MediaKeyBundle) -> CbcEncryptor {
    CbcEncryptor::new(bundle.cipher_key().into(), bundle.iv().into())
}

pub(crate) fn new_decryptor(bundle: &MediaKeyBundle) -> CbcDecryptor {
    CbcDecryptor::new(bundle.cipher_key().into(), bundle.iv().into())
}

/// HMAC keyed with the bundle's MAC key, already fed the IV.
pub(crate) fn container_mac(bundle: &MediaKeyBundle) -> HmacSha256 {
    let Ok(mut mac) = HmacSha256::new_from_slice(bundle.mac_key()) else {
        unreachable!("HMAC-SHA256 accepts any key size");
    };
    mac.update(bundle.iv());
    mac
}

/// Constant-time check of a truncated tag against a running MAC.
pub(crate) fn verify_tag(mac: HmacSha256, tag: &[u8]) -> MediaResult<()> {
    mac.verify_truncated_left(tag).map_err(|_| {
        tracing::warn!("media container MAC validation failed");
        MediaError::MacMismatch
    })
}

/// Encrypt `plaintext` into `ciphertext || tag`.
pub fn encrypt_all(plaintext: &[u8], bundle: &MediaKeyBundle) -> Vec<u8> {
    let mut container = new_encryptor(bundle).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut mac = container_mac(bundle);
    mac.update(&container);
    let tag = mac.finalize().into_bytes();

    container.extend_from_slice(&tag[..MAC_SIZE]);
    container
}

/// Verify and decrypt a container produced by [`encrypt_all`].
pub fn decrypt_all(container: &[u8], bundle: &MediaKeyBundle) -> MediaResult<Vec<u8>> {
    if container.len() < MAC_SIZE {
        return Err(MediaError::MalformedContainer {
            len: container.len(),
        });
    }

    let (ciphertext, tag) = container.split_at(container.len() - MAC_SIZE);

    let mut mac = container_mac(bundle);
    mac.update(ciphertext);
    verify_tag(mac, tag)?;

    new_decryptor(bundle)
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| MediaError::CipherFailure(format!("AES-256-CBC decrypt: {e}")))
}

/// Derive the bundle for `media_type` and encrypt in one call.
pub fn encrypt_media(
    plaintext: &[u8],
    root_secret: &[u8],
    media_type: MediaType,
) -> MediaResult<Vec<u8>> {
    let bundle = MediaKeyBundle::derive(root_secret, media_type)?;
    Ok(encrypt_all(plaintext, &bundle))
}

/// Derive the bundle for `media_type` and decrypt in one call.
pub fn decrypt_media(
    container: &[u8],
    root_secret: &[u8],
    media_type: MediaType,
) -> MediaResult<Vec<u8>> {
    let bundle = MediaKeyBundle::derive(root_secret, media_type)?;
    decrypt_all(container, &bundle)
}
