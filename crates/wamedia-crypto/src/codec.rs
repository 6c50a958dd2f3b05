//! Config-driven entry point tying the codecs together.

use wamedia_core::{ByteSource, MediaConfig, MediaResult, MediaType};

use crate::keys::MediaKey;
use crate::sidecar::{generate_sidecar, Sidecar};
use crate::stream::{DecryptingSource, EncryptingSource};

/// Applies a [`MediaConfig`] to encryption, decryption and sidecar generation.
#[derive(Debug, Clone, Default)]
pub struct MediaCodec {
    config: MediaConfig,
}

impl MediaCodec {
    pub fn new(config: MediaConfig) -> MediaResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub fn encrypting_source<S: ByteSource>(
        &self,
        source: S,
        key: &MediaKey,
        media_type: MediaType,
    ) -> MediaResult<EncryptingSource<S>> {
        Ok(EncryptingSource::new(source, &key.bundle(media_type)?))
    }

    pub fn decrypting_source<S: ByteSource>(
        &self,
        source: S,
        key: &MediaKey,
        media_type: MediaType,
    ) -> MediaResult<DecryptingSource<S>> {
        Ok(DecryptingSource::new(source, &key.bundle(media_type)?))
    }

    /// Encrypt everything `source` yields into a container.
    pub fn encrypt_to_vec<S: ByteSource>(
        &self,
        source: S,
        key: &MediaKey,
        media_type: MediaType,
    ) -> MediaResult<Vec<u8>> {
        self.encrypting_source(source, key, media_type)?
            .read_to_end(self.config.stream.read_chunk_size)
    }

    /// Decrypt a whole container. Returns plaintext only if the tag verified.
    pub fn decrypt_to_vec<S: ByteSource>(
        &self,
        source: S,
        key: &MediaKey,
        media_type: MediaType,
    ) -> MediaResult<Vec<u8>> {
        self.decrypting_source(source, key, media_type)?
            .read_to_end(self.config.stream.read_chunk_size)
    }

    /// Build the sidecar for `source` if `media_type` is configured to have one.
    pub fn sidecar_for<S: ByteSource + ?Sized>(
        &self,
        source: &mut S,
        key: &MediaKey,
        media_type: MediaType,
    ) -> MediaResult<Option<Sidecar>> {
        if !self.config.sidecar.applies_to(media_type) {
            return Ok(None);
        }
        let bundle = key.bundle(media_type)?;
        generate_sidecar(source, bundle.mac_key(), self.config.sidecar.chunk_size).map(Some)
    }
}
