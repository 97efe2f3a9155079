use std::sync::Arc;
use std::time::Duration;

use cachet::cipher::aes;
use cachet::{Crypter, EncryptParams, PasswordCrypter, StaticPassword};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Generate a payload of given size.
fn generate_payload(size: usize) -> String {
    "x".repeat(size)
}

/// Benchmark AES-CBC encrypt/decrypt roundtrip with varying payload sizes.
fn bench_aes_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("aes_roundtrip");
    group.sample_size(50);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let key = b"0123456789abcdef";
    let sizes = [32, 256, 1024, 4096, 16384];

    for size in sizes {
        let payload = generate_payload(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(
            BenchmarkId::new("roundtrip", format!("{}B", size)),
            &payload,
            |b, payload| {
                b.iter(|| {
                    let encrypted = aes::encrypt(black_box(key), black_box(payload)).unwrap();
                    let decrypted = aes::decrypt(black_box(key), black_box(&encrypted)).unwrap();
                    black_box(decrypted);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the scrypt-backed password scheme (dominated by the KDF).
fn bench_password_encrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("password_encrypt");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    let crypter = PasswordCrypter::new(Arc::new(StaticPassword::new("benchmark-password")));
    let params = EncryptParams::new();

    group.bench_function("encrypt_32B", |b| {
        b.iter(|| {
            let (ciphertext, decrypt_params) = crypter
                .encrypt(black_box("a 32 byte secret payload here!!"), &params)
                .unwrap();
            black_box((ciphertext, decrypt_params));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_aes_roundtrip, bench_password_encrypt);
criterion_main!(benches);
