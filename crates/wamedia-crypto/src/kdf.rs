//! HKDF-SHA256 expand step
//!
//! The input key is used directly as the pseudorandom key, with no extract
//! step and no salt:
//!
//! ```text
//! T(1) = HMAC(key, info || 0x01)
//! T(i) = HMAC(key, T(i-1) || info || i)
//! OKM  = first `length` bytes of T(1) || T(2) || ...
//! ```

use hkdf::Hkdf;
use sha2::Sha256;
use wamedia_core::{MediaError, MediaResult};

use crate::KEY_SIZE;

/// Largest output HKDF-SHA256 can produce (255 blocks of 32 bytes).
pub const MAX_OUTPUT_LEN: usize = 255 * KEY_SIZE;

/// Expand `key` into `length` bytes bound to `info`.
///
/// Fails with `KeyTooShort` for keys under 32 bytes, checked first, and
/// `OutputTooLarge` when more than [`MAX_OUTPUT_LEN`] bytes are requested.
pub fn expand(key: &[u8], length: usize, info: &[u8]) -> MediaResult<Vec<u8>> {
    if key.len() < KEY_SIZE {
        return Err(MediaError::KeyTooShort { len: key.len() });
    }
    if length > MAX_OUTPUT_LEN {
        return Err(MediaError::OutputTooLarge { requested: length });
    }
    let hkdf = Hkdf::<Sha256>::from_prk(key)
        .map_err(|_| MediaError::KeyTooShort { len: key.len() })?;

    let mut okm = vec![0u8; length];
    hkdf.expand(info, &mut okm)
        .map_err(|_| MediaError::OutputTooLarge { requested: length })?;
    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmac::{Hmac, Mac};

    // RFC 5869 test case 1, expand step only (PRK given)
    const RFC_PRK: &str = "077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5";
    const RFC_INFO: &str = "f0f1f2f3f4f5f6f7f8f9";
    const RFC_OKM: &str =
        "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865";

    #[test]
    fn test_rfc5869_expand_vector() {
        let prk = hex::decode(RFC_PRK).unwrap();
        let info = hex::decode(RFC_INFO).unwrap();

        let okm = expand(&prk, 42, &info).unwrap();
        assert_eq!(hex::encode(okm), RFC_OKM);
    }

    #[test]
    fn test_matches_hmac_chaining() {
        let key = [7u8; 32];
        let info = b"WhatsApp Video Keys";

        let mut t1 = Hmac::<Sha256>::new_from_slice(&key).unwrap();
        t1.update(info);
        t1.update(&[1]);
        let t1 = t1.finalize().into_bytes();

        let mut t2 = Hmac::<Sha256>::new_from_slice(&key).unwrap();
        t2.update(&t1);
        t2.update(info);
        t2.update(&[2]);
        let t2 = t2.finalize().into_bytes();

        let okm = expand(&key, 64, info).unwrap();
        assert_eq!(&okm[..32], t1.as_slice());
        assert_eq!(&okm[32..], t2.as_slice());
    }

    #[test]
    fn test_truncates_to_length() {
        let key = [1u8; 32];
        let long = expand(&key, 112, b"x").unwrap();
        let short = expand(&key, 50, b"x").unwrap();
        assert_eq!(long.len(), 112);
        assert_eq!(&long[..50], short.as_slice());
    }

    #[test]
    fn test_empty_info_and_zero_length() {
        let key = [1u8; 32];
        assert_eq!(expand(&key, 32, b"").unwrap().len(), 32);
        assert!(expand(&key, 0, b"").unwrap().is_empty());
    }

    #[test]
    fn test_accepts_longer_keys() {
        let key = [3u8; 64];
        assert_eq!(expand(&key, 32, b"info").unwrap().len(), 32);
    }

    #[test]
    fn test_rejects_short_key() {
        let err = expand(b"short_key", 32, b"").unwrap_err();
        assert!(matches!(err, MediaError::KeyTooShort { len: 9 }));
    }

    #[test]
    fn test_short_key_reported_before_output_limit() {
        let err = expand(b"short", MAX_OUTPUT_LEN + 1, b"").unwrap_err();
        assert!(matches!(err, MediaError::KeyTooShort { len: 5 }));
    }

    #[test]
    fn test_block_count_limit() {
        let key = [0u8; 32];
        assert!(expand(&key, MAX_OUTPUT_LEN, b"").is_ok());
        let err = expand(&key, MAX_OUTPUT_LEN + 1, b"").unwrap_err();
        assert!(matches!(err, MediaError::OutputTooLarge { .. }));
    }

    #[test]
    fn test_different_info_different_output() {
        let key = [9u8; 32];
        let a = expand(&key, 32, b"WhatsApp Image Keys").unwrap();
        let b = expand(&key, 32, b"WhatsApp Audio Keys").unwrap();
        assert_ne!(a, b, "different domains must produce different keys");
    }
}
