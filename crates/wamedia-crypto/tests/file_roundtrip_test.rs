//! End-to-end: plaintext file → encrypted file → decrypted file, plus a
//! sidecar read from the same plaintext file.

use std::fs::File;
use std::io::Write;

use tempfile::TempDir;
use wamedia_core::{ByteSource, MediaConfig, MediaType, ReaderSource};
use wamedia_crypto::{decrypt_media, MediaCodec, MediaKey, DEFAULT_CHUNK_SIZE};

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn sample_media(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i.wrapping_mul(31) ^ (i >> 5)) as u8)
        .collect()
}

#[test]
fn encrypt_and_decrypt_files() {
    let tmp = TempDir::new().unwrap();
    let key = MediaKey::from_bytes(*b"0123456789abcdef0123456789abcdef");
    let codec = MediaCodec::default();
    let original = sample_media(300_000);
    let src = write_file(&tmp, "VIDEO.original", &original);

    // Encrypt to disk
    let mut enc = codec
        .encrypting_source(ReaderSource::new(File::open(&src).unwrap()), &key, MediaType::Video)
        .unwrap();
    let enc_path = tmp.path().join("VIDEO.encrypted");
    let mut out = File::create(&enc_path).unwrap();
    while !enc.is_exhausted() {
        out.write_all(&enc.pull(4096).unwrap()).unwrap();
    }
    drop(out);

    let encrypted = std::fs::read(&enc_path).unwrap();
    assert_eq!(
        decrypt_media(&encrypted, key.as_bytes(), MediaType::Video).unwrap(),
        original
    );

    // Decrypt from disk
    let decrypted = codec
        .decrypt_to_vec(
            ReaderSource::new(File::open(&enc_path).unwrap()),
            &key,
            MediaType::Video,
        )
        .unwrap();
    assert_eq!(decrypted, original);

    // Sidecar over the plaintext file
    let mut plain = ReaderSource::new(File::open(&src).unwrap());
    let sidecar = codec
        .sidecar_for(&mut plain, &key, MediaType::Video)
        .unwrap()
        .unwrap();
    assert_eq!(sidecar.len(), original.len().div_ceil(DEFAULT_CHUNK_SIZE));

    let mac_key = *key.bundle(MediaType::Video).unwrap().mac_key();
    for (i, chunk) in original.chunks(DEFAULT_CHUNK_SIZE).enumerate() {
        sidecar.verify_chunk(i, chunk, &mac_key).unwrap();
    }
}

#[test]
fn wrong_media_type_fails_file_decrypt() {
    let tmp = TempDir::new().unwrap();
    let key = MediaKey::from_bytes([9u8; 32]);
    let codec = MediaCodec::new(MediaConfig::default()).unwrap();

    let container = codec
        .encrypt_to_vec(
            ReaderSource::new(std::io::Cursor::new(sample_media(1000))),
            &key,
            MediaType::Audio,
        )
        .unwrap();
    let path = write_file(&tmp, "AUDIO.encrypted", &container);

    let err = codec
        .decrypt_to_vec(
            ReaderSource::new(File::open(&path).unwrap()),
            &key,
            MediaType::Document,
        )
        .unwrap_err();
    assert!(err.is_integrity_failure());
}

#[test]
fn closed_encrypting_source_refuses_pulls() {
    let key = MediaKey::from_bytes([1u8; 32]);
    let codec = MediaCodec::default();
    let mut enc = codec
        .encrypting_source(
            ReaderSource::new(std::io::Cursor::new(sample_media(100))),
            &key,
            MediaType::Image,
        )
        .unwrap();

    let partial = enc.pull(16).unwrap();
    assert_eq!(partial.len(), 16);
    enc.close();
    assert!(enc.is_exhausted());
    assert!(enc.pull(16).is_err());
}
