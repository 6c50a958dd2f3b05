//! wamedia-core: shared types, config schema, error taxonomy, and the
//! pull-based `ByteSource` interface the codecs wrap.

pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use config::{MediaConfig, SidecarConfig, StreamConfig};
pub use error::{ErrorKind, MediaError, MediaResult};
pub use source::{ByteSource, MemorySource, ReaderSource, DEFAULT_READ_SIZE};
pub use types::MediaType;
