use wamedia_core::{ByteSource, MediaType, MemorySource};
use wamedia_crypto::{
    decrypt_all, encrypt_all, generate_sidecar, DecryptingSource, EncryptingSource,
    MediaKeyBundle, DEFAULT_CHUNK_SIZE,
};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn bundle() -> MediaKeyBundle {
    MediaKeyBundle::derive(&[0xABu8; 32], MediaType::Video).unwrap()
}

#[divan::bench]
fn derive_bundle() -> MediaKeyBundle {
    MediaKeyBundle::derive(divan::black_box(&[0xABu8; 32]), MediaType::Video).unwrap()
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt_all(bencher: divan::Bencher, size: usize) {
    let bundle = bundle();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| encrypt_all(divan::black_box(&data), divan::black_box(&bundle)));
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt_all(bencher: divan::Bencher, size: usize) {
    let bundle = bundle();
    let container = encrypt_all(&make_data(size), &bundle);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| decrypt_all(divan::black_box(&container), divan::black_box(&bundle)).unwrap());
}

#[divan::bench(args = [65536, 1048576])]
fn bench_stream_roundtrip(bencher: divan::Bencher, size: usize) {
    let bundle = bundle();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            let enc = EncryptingSource::new(MemorySource::new(data.clone()), &bundle);
            let mut dec = DecryptingSource::new(enc, &bundle);
            dec.read_to_end(8192).unwrap()
        });
}

#[divan::bench(args = [1048576])]
fn bench_sidecar(bencher: divan::Bencher, size: usize) {
    let bundle = bundle();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            let mut src = MemorySource::new(data.clone());
            generate_sidecar(&mut src, bundle.mac_key(), DEFAULT_CHUNK_SIZE).unwrap()
        });
}

fn main() {
    divan::main();
}
