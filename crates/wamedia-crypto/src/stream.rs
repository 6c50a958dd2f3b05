//! Streaming container encryption and decryption over a [`ByteSource`]
//!
//! Both codecs are themselves byte sources, so they chain:
//! `DecryptingSource<EncryptingSource<MemorySource>>` round-trips.
//!
//! Encryption emits ciphertext block by block as plaintext arrives and
//! appends the padded final block plus the 10-byte tag once the wrapped
//! source is exhausted. The tag covers `iv || all ciphertext`.
//!
//! Decryption cannot know where the tag starts until the source ends, so it
//! always holds back the last `MAC_SIZE + BLOCK_SIZE` raw bytes. Only whole
//! blocks in front of that window are decrypted early. At end-of-source the
//! window holds the final (padded) block(s) and the tag; the tag is checked
//! against everything seen before the final block is released.
//!
//! `close()` (also run on drop) releases the cipher and running MAC state
//! and zeroizes buffered input. The AES key schedules are zeroized on drop;
//! the HMAC-SHA256 state is dropped but not scrubbed, since `hmac` offers no
//! zeroizing drop.
//!
//! Plaintext handed out before end-of-source is unauthenticated. Callers
//! that need verified output must drain the stream and treat any error as
//! invalidating everything read so far, or use [`crate::decrypt_all`].

use std::collections::VecDeque;

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut};
use hmac::Mac;
use wamedia_core::{ByteSource, MediaError, MediaResult, MediaType};
use zeroize::Zeroize;

use crate::container::{
    container_mac, new_decryptor, new_encryptor, verify_tag, CbcDecryptor, CbcEncryptor,
    HmacSha256,
};
use crate::keys::MediaKeyBundle;
use crate::{BLOCK_SIZE, MAC_SIZE};

/// Raw bytes a decrypting source never releases before end-of-source.
const HOLD_BACK: usize = MAC_SIZE + BLOCK_SIZE;

enum EncryptState {
    Streaming {
        cipher: CbcEncryptor,
        mac: HmacSha256,
    },
    Finalized,
    Closed,
}

/// Encrypts the plaintext pulled from `S` into a container.
pub struct EncryptingSource<S: ByteSource> {
    source: S,
    state: EncryptState,
    /// Plaintext tail shorter than one block, waiting for more input
    pending: Vec<u8>,
    output: VecDeque<u8>,
    emitted: u64,
}

impl<S: ByteSource> EncryptingSource<S> {
    pub fn new(source: S, bundle: &MediaKeyBundle) -> Self {
        Self {
            source,
            state: EncryptState::Streaming {
                cipher: new_encryptor(bundle),
                mac: container_mac(bundle),
            },
            pending: Vec::with_capacity(BLOCK_SIZE),
            output: VecDeque::new(),
            emitted: 0,
        }
    }

    /// Derive the session bundle from a 32-byte media key and wrap `source`.
    pub fn with_media_key(
        source: S,
        media_key: &[u8],
        media_type: MediaType,
    ) -> MediaResult<Self> {
        let bundle = MediaKeyBundle::derive(media_key, media_type)?;
        Ok(Self::new(source, &bundle))
    }

    /// True once the trailer has been produced.
    pub fn is_finalized(&self) -> bool {
        matches!(self.state, EncryptState::Finalized)
    }

    fn absorb(&mut self, plaintext: &[u8]) {
        let EncryptState::Streaming { cipher, mac } = &mut self.state else {
            return;
        };
        self.pending.extend_from_slice(plaintext);
        let whole = self.pending.len() - self.pending.len() % BLOCK_SIZE;
        if whole == 0 {
            return;
        }

        let mut blocks: Vec<u8> = self.pending.drain(..whole).collect();
        for block in blocks.chunks_exact_mut(BLOCK_SIZE) {
            cipher.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        mac.update(&blocks);
        self.output.extend(blocks);
    }

    fn finalize(&mut self) {
        let EncryptState::Streaming { cipher, mut mac } =
            std::mem::replace(&mut self.state, EncryptState::Finalized)
        else {
            return;
        };

        let last = cipher.encrypt_padded_vec_mut::<Pkcs7>(&self.pending);
        self.pending.zeroize();
        mac.update(&last);
        let tag = mac.finalize().into_bytes();

        self.output.extend(last);
        self.output.extend(&tag[..MAC_SIZE]);
        tracing::debug!(
            ciphertext_bytes = self.emitted + self.output.len() as u64 - MAC_SIZE as u64,
            "media encryption stream finalized"
        );
    }

    fn take_output(&mut self, max_bytes: usize) -> Vec<u8> {
        let n = max_bytes.min(self.output.len());
        self.emitted += n as u64;
        self.output.drain(..n).collect()
    }
}

impl<S: ByteSource> ByteSource for EncryptingSource<S> {
    fn pull(&mut self, max_bytes: usize) -> MediaResult<Vec<u8>> {
        if matches!(self.state, EncryptState::Closed) {
            return Err(MediaError::Unsupported("pull on a closed stream"));
        }
        if max_bytes == 0 {
            return Ok(Vec::new());
        }

        while self.output.is_empty() && matches!(self.state, EncryptState::Streaming { .. }) {
            let plaintext = self.source.pull(max_bytes)?;
            tracing::trace!(bytes = plaintext.len(), "encrypting source pulled plaintext");
            if !plaintext.is_empty() {
                self.absorb(&plaintext);
            } else if self.source.is_exhausted() {
                self.finalize();
            } else {
                break;
            }
        }

        Ok(self.take_output(max_bytes))
    }

    fn is_exhausted(&self) -> bool {
        !matches!(self.state, EncryptState::Streaming { .. }) && self.output.is_empty()
    }

    fn close(&mut self) {
        if !matches!(self.state, EncryptState::Closed) {
            drop(std::mem::replace(&mut self.state, EncryptState::Closed));
            self.pending.zeroize();
            self.output.clear();
            self.source.close();
        }
    }

    fn position(&self) -> Option<u64> {
        Some(self.emitted)
    }
}

impl<S: ByteSource> Drop for EncryptingSource<S> {
    fn drop(&mut self) {
        self.close();
    }
}

enum DecryptState {
    Streaming {
        cipher: CbcDecryptor,
        mac: HmacSha256,
    },
    Finalized,
    /// Finalization failed; nothing more will ever be released.
    Failed,
    Closed,
}

/// Verifies and decrypts a container pulled from `S`.
pub struct DecryptingSource<S: ByteSource> {
    source: S,
    state: DecryptState,
    /// Raw container bytes not yet decrypted (always includes the tail window)
    buffer: Vec<u8>,
    output: VecDeque<u8>,
    /// Ciphertext bytes already MACed and decrypted
    consumed: u64,
    emitted: u64,
}

impl<S: ByteSource> DecryptingSource<S> {
    pub fn new(source: S, bundle: &MediaKeyBundle) -> Self {
        Self {
            source,
            state: DecryptState::Streaming {
                cipher: new_decryptor(bundle),
                mac: container_mac(bundle),
            },
            buffer: Vec::new(),
            output: VecDeque::new(),
            consumed: 0,
            emitted: 0,
        }
    }

    /// Derive the session bundle from a 32-byte media key and wrap `source`.
    pub fn with_media_key(
        source: S,
        media_key: &[u8],
        media_type: MediaType,
    ) -> MediaResult<Self> {
        let bundle = MediaKeyBundle::derive(media_key, media_type)?;
        Ok(Self::new(source, &bundle))
    }

    /// True once the tag has verified and the final block has been decrypted.
    pub fn is_verified(&self) -> bool {
        matches!(self.state, DecryptState::Finalized)
    }

    fn absorb(&mut self, raw: &[u8]) {
        let DecryptState::Streaming { cipher, mac } = &mut self.state else {
            return;
        };
        self.buffer.extend_from_slice(raw);

        let releasable = self.buffer.len().saturating_sub(HOLD_BACK);
        let whole = releasable - releasable % BLOCK_SIZE;
        if whole == 0 {
            return;
        }

        let mut blocks: Vec<u8> = self.buffer.drain(..whole).collect();
        mac.update(&blocks);
        for block in blocks.chunks_exact_mut(BLOCK_SIZE) {
            cipher.decrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        self.consumed += whole as u64;
        self.output.extend(blocks);
    }

    fn finalize(&mut self) -> MediaResult<()> {
        let DecryptState::Streaming { cipher, mut mac } =
            std::mem::replace(&mut self.state, DecryptState::Failed)
        else {
            return Ok(());
        };

        let tail = std::mem::take(&mut self.buffer);
        if tail.len() < MAC_SIZE {
            return Err(MediaError::MalformedContainer {
                len: self.consumed as usize + tail.len(),
            });
        }

        let (ciphertext, tag) = tail.split_at(tail.len() - MAC_SIZE);
        mac.update(ciphertext);
        verify_tag(mac, tag)?;

        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|e| MediaError::CipherFailure(format!("AES-256-CBC decrypt: {e}")))?;

        self.consumed += ciphertext.len() as u64;
        self.output.extend(plaintext);
        self.state = DecryptState::Finalized;
        tracing::debug!(
            ciphertext_bytes = self.consumed,
            "media decryption stream verified"
        );
        Ok(())
    }

    fn take_output(&mut self, max_bytes: usize) -> Vec<u8> {
        let n = max_bytes.min(self.output.len());
        self.emitted += n as u64;
        self.output.drain(..n).collect()
    }
}

impl<S: ByteSource> ByteSource for DecryptingSource<S> {
    fn pull(&mut self, max_bytes: usize) -> MediaResult<Vec<u8>> {
        match self.state {
            DecryptState::Closed => {
                return Err(MediaError::Unsupported("pull on a closed stream"))
            }
            DecryptState::Failed => {
                return Err(MediaError::Unsupported("pull after failed verification"))
            }
            _ => {}
        }
        if max_bytes == 0 {
            return Ok(Vec::new());
        }

        while self.output.is_empty() && matches!(self.state, DecryptState::Streaming { .. }) {
            let raw = self.source.pull(max_bytes)?;
            tracing::trace!(bytes = raw.len(), "decrypting source pulled ciphertext");
            if !raw.is_empty() {
                self.absorb(&raw);
            } else if self.source.is_exhausted() {
                self.finalize()?;
            } else {
                break;
            }
        }

        Ok(self.take_output(max_bytes))
    }

    fn is_exhausted(&self) -> bool {
        !matches!(self.state, DecryptState::Streaming { .. })
            && self.buffer.is_empty()
            && self.output.is_empty()
    }

    fn close(&mut self) {
        if !matches!(self.state, DecryptState::Closed) {
            drop(std::mem::replace(&mut self.state, DecryptState::Closed));
            self.buffer.zeroize();
            self.output.clear();
            self.source.close();
        }
    }

    fn position(&self) -> Option<u64> {
        Some(self.emitted)
    }
}

impl<S: ByteSource> Drop for DecryptingSource<S> {
    fn drop(&mut self) {
        self.close();
    }
}
