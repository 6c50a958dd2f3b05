use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MediaError;

/// Kind of media being protected. Each kind maps to a fixed HKDF info string,
/// so keys derived for one kind are independent of keys for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [
        MediaType::Image,
        MediaType::Video,
        MediaType::Audio,
        MediaType::Document,
    ];

    /// Protocol name, e.g. `"IMAGE"`
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Image => "IMAGE",
            MediaType::Video => "VIDEO",
            MediaType::Audio => "AUDIO",
            MediaType::Document => "DOCUMENT",
        }
    }

    /// HKDF info string. Must match other clients byte-for-byte.
    pub fn domain(self) -> &'static [u8] {
        match self {
            MediaType::Image => b"WhatsApp Image Keys",
            MediaType::Video => b"WhatsApp Video Keys",
            MediaType::Audio => b"WhatsApp Audio Keys",
            MediaType::Document => b"WhatsApp Document Keys",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MediaError::UnknownMediaType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_strings() {
        assert_eq!(MediaType::Image.domain(), b"WhatsApp Image Keys");
        assert_eq!(MediaType::Video.domain(), b"WhatsApp Video Keys");
        assert_eq!(MediaType::Audio.domain(), b"WhatsApp Audio Keys");
        assert_eq!(MediaType::Document.domain(), b"WhatsApp Document Keys");
    }

    #[test]
    fn test_parse_names() {
        for t in MediaType::ALL {
            assert_eq!(t.as_str().parse::<MediaType>().unwrap(), t);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "UNKNOWN_TYPE".parse::<MediaType>().unwrap_err();
        assert!(matches!(err, MediaError::UnknownMediaType(ref s) if s == "UNKNOWN_TYPE"));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("image".parse::<MediaType>().is_err());
    }
}
