//! Per-chunk integrity sidecar for streamable media
//!
//! The plaintext is cut into fixed-size chunks (64 KiB by default, the last
//! one may be short) and each chunk gets its own truncated tag:
//!
//! ```text
//! sidecar = trunc10(HMAC-SHA256(mac_key, chunk_0)) || trunc10(HMAC(chunk_1)) || ...
//! ```
//!
//! Tags are independent of each other and of the IV, so a range fetch only
//! has to verify the chunks it touches. This is a different authentication
//! domain from the container tag.

use std::ops::Range;

use hmac::Mac;
use wamedia_core::{ByteSource, MediaError, MediaResult};

use crate::container::HmacSha256;
use crate::{KEY_SIZE, MAC_SIZE};

/// Default chunk size: 64 KiB of plaintext per tag
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// An ordered list of 10-byte chunk tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sidecar {
    tags: Vec<u8>,
}

impl Sidecar {
    /// Wrap raw sidecar bytes. The length must be a multiple of 10.
    pub fn from_bytes(bytes: Vec<u8>) -> MediaResult<Self> {
        if bytes.len() % MAC_SIZE != 0 {
            return Err(MediaError::MalformedSidecar { len: bytes.len() });
        }
        Ok(Self { tags: bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.tags
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.tags
    }

    /// Number of chunk tags
    pub fn len(&self) -> usize {
        self.tags.len() / MAC_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tag(&self, index: usize) -> Option<&[u8]> {
        self.tags.chunks_exact(MAC_SIZE).nth(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.tags.chunks_exact(MAC_SIZE)
    }

    /// Check `chunk` against the tag at `index` in constant time.
    ///
    /// Indices past the end of the sidecar never verify.
    pub fn verify_chunk(
        &self,
        index: usize,
        chunk: &[u8],
        mac_key: &[u8; KEY_SIZE],
    ) -> MediaResult<()> {
        let tag = self.tag(index).ok_or(MediaError::MacMismatch)?;
        chunk_mac(mac_key, chunk)
            .verify_truncated_left(tag)
            .map_err(|_| {
                tracing::warn!(index, "sidecar chunk MAC validation failed");
                MediaError::MacMismatch
            })
    }

    /// Chunk indices covering plaintext bytes `start..end`, clamped to the
    /// chunks this sidecar actually has.
    pub fn chunks_for_range(&self, start: u64, end: u64, chunk_size: usize) -> Range<usize> {
        if chunk_size == 0 || start >= end {
            return 0..0;
        }
        let chunk_size = chunk_size as u64;
        let first = (start / chunk_size).min(self.len() as u64) as usize;
        let last = end.div_ceil(chunk_size).min(self.len() as u64) as usize;
        first..last.max(first)
    }
}

fn chunk_mac(mac_key: &[u8; KEY_SIZE], chunk: &[u8]) -> HmacSha256 {
    let Ok(mut mac) = HmacSha256::new_from_slice(mac_key) else {
        unreachable!("HMAC-SHA256 accepts any key size");
    };
    mac.update(chunk);
    mac
}

/// Read `source` to the end in `chunk_size` pieces and tag each piece.
///
/// Short pulls are accumulated, so every chunk but the last is exactly
/// `chunk_size` bytes and the sidecar holds `ceil(len / chunk_size)` tags.
pub fn generate_sidecar<S: ByteSource + ?Sized>(
    source: &mut S,
    mac_key: &[u8; KEY_SIZE],
    chunk_size: usize,
) -> MediaResult<Sidecar> {
    if chunk_size == 0 {
        return Err(MediaError::InvalidChunkSize(chunk_size));
    }

    let mut tags = Vec::new();
    let mut chunk = Vec::with_capacity(chunk_size);
    let mut total: u64 = 0;

    while !source.is_exhausted() {
        let bytes = source.pull(chunk_size - chunk.len())?;
        if bytes.is_empty() && !source.is_exhausted() {
            return Err(MediaError::SourceStalled);
        }
        total += bytes.len() as u64;
        chunk.extend_from_slice(&bytes);
        if chunk.len() == chunk_size {
            let tag = chunk_mac(mac_key, &chunk).finalize().into_bytes();
            tags.extend_from_slice(&tag[..MAC_SIZE]);
            chunk.clear();
        }
    }
    if !chunk.is_empty() {
        let tag = chunk_mac(mac_key, &chunk).finalize().into_bytes();
        tags.extend_from_slice(&tag[..MAC_SIZE]);
    }

    tracing::debug!(
        plaintext_bytes = total,
        chunks = tags.len() / MAC_SIZE,
        chunk_size,
        "generated media sidecar"
    );
    Ok(Sidecar { tags })
}
