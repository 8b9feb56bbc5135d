//! Benchmarks for transaction encoding

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vault_core::{Command, EncryptedEnvelope, VaultValue};
use vault_wire::{wrap, DataVaultTx, SignatureTriple};

fn plaintext_tx() -> DataVaultTx {
    DataVaultTx {
        block_height: 123_456,
        cmd: Command::Upsert,
        key: "profile/display-name".into(),
        version: 42,
        value: VaultValue::Plain("x".repeat(256)),
        nonce: 0x1234_5678,
    }
}

fn encrypted_tx() -> DataVaultTx {
    let env = EncryptedEnvelope::new(
        "A".repeat(344),
        "AAAAAAAAAAAAAAAAAAAAAA==".into(),
        "ZBvQZ7DrhSsPOGax3/2IX1qeiPATyAcGPN6Q8Nj3QGE=".into(),
        "pally".into(),
        "dvTag".into(),
    );
    DataVaultTx {
        value: VaultValue::Encrypted(env),
        ..plaintext_tx()
    }
}

fn bench_plaintext_tx(c: &mut Criterion) {
    let tx = plaintext_tx();
    c.bench_function("tx_encode_plaintext", |b| {
        b.iter(|| black_box(&tx).to_bytes().unwrap())
    });
}

fn bench_encrypted_tx(c: &mut Criterion) {
    let tx = encrypted_tx();
    c.bench_function("tx_encode_encrypted", |b| {
        b.iter(|| black_box(&tx).to_bytes().unwrap())
    });
}

fn bench_wrap(c: &mut Criterion) {
    let tx_bytes = encrypted_tx().to_bytes().unwrap();
    let sigs = SignatureTriple::new("pally", "dvTag", &[0xAA; 64]).unwrap();
    c.bench_function("message_wrap", |b| {
        b.iter(|| wrap(80, black_box(&sigs), black_box(&tx_bytes)))
    });
}

criterion_group!(benches, bench_plaintext_tx, bench_encrypted_tx, bench_wrap);
criterion_main!(benches);
