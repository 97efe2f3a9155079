//! Concurrent use of the caches and the memoizing envelope.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use cachet::{EncryptParams, Registry, StaticPassword};

mod support;
use support::{MockCrypter, MockKmsFactory, TEST_PASSWORD};

#[test]
fn test_local_key_created_once_across_threads() {
    let dir = tempfile::TempDir::new().unwrap();
    let registry = Arc::new(
        Registry::builder()
            .data_dir(dir.path())
            .password_source(Arc::new(StaticPassword::new(TEST_PASSWORD)))
            .kms_factory(Arc::new(MockKmsFactory::default()))
            .build(),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                let secret = registry
                    .encrypt_secret("local", &format!("value-{i}"), &EncryptParams::new())
                    .unwrap();
                (format!("value-{i}"), secret.marshal_text())
            })
        })
        .collect();

    // Every token decrypts with the one generated key.
    for handle in handles {
        let (plaintext, token) = handle.join().unwrap();
        assert_eq!(
            registry.load_secret(&token).unwrap().decrypt().unwrap(),
            plaintext
        );
    }
}

#[test]
fn test_kms_clients_shared_across_threads() {
    let dir = tempfile::TempDir::new().unwrap();
    let factory = Arc::new(MockKmsFactory::default());
    let registry = Arc::new(
        Registry::builder()
            .data_dir(dir.path())
            .kms_factory(factory.clone())
            .build(),
    );

    let params: EncryptParams = [
        ("region".to_string(), "us-east-1".to_string()),
        ("keyID".to_string(), "alias/MyKey".to_string()),
    ]
    .into_iter()
    .collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            let params = params.clone();
            thread::spawn(move || {
                registry.encrypt_secret("kms", "payload", &params).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(factory.created.load(Ordering::SeqCst), 1);
}

#[test]
fn test_memoized_decrypt_runs_once_across_threads() {
    let mock = Arc::new(MockCrypter::default());
    let mut registry = Registry::new();
    registry.register(mock.clone());

    let secret = Arc::new(registry.load_secret("mock:k=v:mock-ct/shared").unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let secret = secret.clone();
            thread::spawn(move || secret.decrypt().unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "shared");
    }
    assert_eq!(mock.decrypt_calls.load(Ordering::SeqCst), 1);
}
