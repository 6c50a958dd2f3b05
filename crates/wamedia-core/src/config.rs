use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MediaError, MediaResult};
use crate::types::MediaType;

/// Top-level codec configuration (loaded from wamedia.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub stream: StreamConfig,
    pub sidecar: SidecarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Pull size used when draining a stream to completion (default: 8192)
    pub read_chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SidecarConfig {
    /// Plaintext bytes covered by each sidecar tag (default: 65536)
    pub chunk_size: usize,
    /// Media types that get a sidecar (default: VIDEO, AUDIO)
    pub media_types: Vec<MediaType>,
}

impl SidecarConfig {
    pub fn applies_to(&self, media_type: MediaType) -> bool {
        self.media_types.contains(&media_type)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: 8192,
        }
    }
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            media_types: vec![MediaType::Video, MediaType::Audio],
        }
    }
}

impl MediaConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> MediaResult<Self> {
        let config: MediaConfig =
            toml::from_str(s).map_err(|e| MediaError::Config(format!("parsing config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> MediaResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MediaError::Config(format!("reading {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded media config");
        Ok(config)
    }

    pub fn validate(&self) -> MediaResult<()> {
        if self.stream.read_chunk_size == 0 {
            return Err(MediaError::Config("stream.read_chunk_size must be > 0".into()));
        }
        if self.sidecar.chunk_size == 0 {
            return Err(MediaError::Config("sidecar.chunk_size must be > 0".into()));
        }
        Ok(())
    }
}
