//! Pull-based byte sources
//!
//! `ByteSource` is the interface the codecs both consume and expose, so a
//! decrypting source can wrap an encrypting source, which wraps a file, and
//! so on. A `pull` may return fewer bytes than asked for, but blocks until it
//! has at least one byte or has reached end-of-data. An empty pull therefore
//! always leaves `is_exhausted()` reporting true.

use std::io::Read;

use crate::error::{MediaError, MediaResult};

/// Pull size used by [`ByteSource::read_to_end`] callers that have no config.
pub const DEFAULT_READ_SIZE: usize = 8192;

pub trait ByteSource {
    /// Return up to `max_bytes` bytes. Never returns more than `max_bytes`.
    ///
    /// Returns an empty buffer only at end-of-data (or for `max_bytes == 0`).
    fn pull(&mut self, max_bytes: usize) -> MediaResult<Vec<u8>>;

    /// True once no further bytes will ever be returned.
    fn is_exhausted(&self) -> bool;

    /// Release the source. Further pulls fail or return nothing.
    fn close(&mut self);

    /// Bytes handed out so far, if tracked.
    fn position(&self) -> Option<u64> {
        None
    }

    /// Total length, if known up front.
    fn size(&self) -> Option<u64> {
        None
    }

    fn is_seekable(&self) -> bool {
        false
    }

    fn is_writable(&self) -> bool {
        false
    }

    fn seek(&mut self, _offset: u64) -> MediaResult<()> {
        Err(MediaError::Unsupported("seek on a non-seekable stream"))
    }

    fn rewind(&mut self) -> MediaResult<()> {
        Err(MediaError::Unsupported("rewind on a non-seekable stream"))
    }

    fn write(&mut self, _data: &[u8]) -> MediaResult<usize> {
        Err(MediaError::Unsupported("write on a read-only stream"))
    }

    /// Pull until exhausted, `chunk` bytes at a time.
    fn read_to_end(&mut self, chunk: usize) -> MediaResult<Vec<u8>> {
        if chunk == 0 {
            return Err(MediaError::InvalidChunkSize(chunk));
        }
        let mut out = Vec::new();
        while !self.is_exhausted() {
            let bytes = self.pull(chunk)?;
            if bytes.is_empty() && !self.is_exhausted() {
                return Err(MediaError::SourceStalled);
            }
            out.extend_from_slice(&bytes);
        }
        Ok(out)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn pull(&mut self, max_bytes: usize) -> MediaResult<Vec<u8>> {
        (**self).pull(max_bytes)
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn position(&self) -> Option<u64> {
        (**self).position()
    }

    fn size(&self) -> Option<u64> {
        (**self).size()
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }

    fn is_writable(&self) -> bool {
        (**self).is_writable()
    }

    fn seek(&mut self, offset: u64) -> MediaResult<()> {
        (**self).seek(offset)
    }

    fn rewind(&mut self) -> MediaResult<()> {
        (**self).rewind()
    }

    fn write(&mut self, data: &[u8]) -> MediaResult<usize> {
        (**self).write(data)
    }
}

/// An in-memory, seekable source over an owned buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
    pos: usize,
    closed: bool,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            closed: false,
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl ByteSource for MemorySource {
    fn pull(&mut self, max_bytes: usize) -> MediaResult<Vec<u8>> {
        if self.closed {
            return Err(MediaError::Unsupported("pull on a closed stream"));
        }
        let end = self.pos.saturating_add(max_bytes).min(self.data.len());
        let out = self.data[self.pos..end].to_vec();
        self.pos = end;
        Ok(out)
    }

    fn is_exhausted(&self) -> bool {
        self.closed || self.pos >= self.data.len()
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn position(&self) -> Option<u64> {
        Some(self.pos as u64)
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn is_seekable(&self) -> bool {
        !self.closed
    }

    fn seek(&mut self, offset: u64) -> MediaResult<()> {
        if self.closed {
            return Err(MediaError::Unsupported("seek on a closed stream"));
        }
        self.pos = usize::try_from(offset)
            .unwrap_or(usize::MAX)
            .min(self.data.len());
        Ok(())
    }

    fn rewind(&mut self) -> MediaResult<()> {
        self.seek(0)
    }
}

/// Adapts any [`std::io::Read`] into a [`ByteSource`].
///
/// A reader cannot announce end-of-data ahead of time, so the source is
/// exhausted only after the first zero-length read.
pub struct ReaderSource<R> {
    inner: Option<R>,
    pos: u64,
    eof: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: Some(inner),
            pos: 0,
            eof: false,
        }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn pull(&mut self, max_bytes: usize) -> MediaResult<Vec<u8>> {
        let Some(reader) = self.inner.as_mut() else {
            return Err(MediaError::Unsupported("pull on a closed stream"));
        };
        if self.eof || max_bytes == 0 {
            return Ok(Vec::new());
        }
        let mut buf = vec![0u8; max_bytes];
        let n = reader.read(&mut buf)?;
        if n == 0 {
            self.eof = true;
        }
        buf.truncate(n);
        self.pos += n as u64;
        Ok(buf)
    }

    fn is_exhausted(&self) -> bool {
        self.eof || self.inner.is_none()
    }

    fn close(&mut self) {
        self.inner = None;
    }

    fn position(&self) -> Option<u64> {
        Some(self.pos)
    }
}
