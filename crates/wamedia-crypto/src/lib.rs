//! wamedia-crypto: end-to-end encryption for media attachments
//!
//! Architecture: HKDF key bundle → AES-256-CBC + truncated HMAC-SHA256
//!
//! Key hierarchy:
//! ```text
//! Media Key (256-bit, shared out of band)
//!   └── HKDF-SHA256 expand, info = per-media-type string, 112 bytes
//!         ├── IV          (16 bytes)
//!         ├── Cipher Key  (32 bytes, AES-256-CBC, PKCS#7)
//!         ├── MAC Key     (32 bytes, HMAC-SHA256, tag truncated to 10 bytes)
//!         │     └── Sidecar: one tag per 64 KiB plaintext chunk
//!         └── Ref Key     (32 bytes, unused here)
//! ```
//!
//! Container: `ciphertext || trunc10(HMAC(mac_key, iv || ciphertext))`,
//! produced in one shot (`container`) or incrementally over a pull-based
//! byte source (`stream`).

pub mod codec;
pub mod container;
pub mod kdf;
pub mod keys;
pub mod sidecar;
pub mod stream;

pub use codec::MediaCodec;
pub use container::{decrypt_all, decrypt_media, encrypt_all, encrypt_media};
pub use kdf::expand;
pub use keys::{MediaKey, MediaKeyBundle};
pub use sidecar::{generate_sidecar, Sidecar, DEFAULT_CHUNK_SIZE};
pub use stream::{DecryptingSource, EncryptingSource};

/// Size of a media key, cipher key, MAC key or ref key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of the AES-CBC initialization vector
pub const IV_SIZE: usize = 16;

/// AES block size
pub const BLOCK_SIZE: usize = 16;

/// Size of a truncated HMAC-SHA256 tag
pub const MAC_SIZE: usize = 10;
