#![allow(clippy::expect_used)]

use criterion::{criterion_group, criterion_main, Criterion};
use serde::{Deserialize, Serialize};

use msgseal::Verifier;

#[derive(Clone, Serialize, Deserialize)]
struct Session {
    user_id: u64,
    subject: String,
    roles: Vec<String>,
}

fn make_session() -> Session {
    Session {
        user_id: 1_000_000,
        subject: "user:alice".into(),
        roles: vec!["read".into(), "write".into()],
    }
}

fn bench_primary(c: &mut Criterion) {
    let verifier = Verifier::new([0xABu8; 32].to_vec());
    let session = make_session();
    let token = verifier
        .generate(&session, None, Some("session"))
        .expect("generate");

    c.bench_function("generate", |b| {
        b.iter(|| {
            verifier
                .generate(&session, None, Some("session"))
                .expect("generate")
        });
    });
    c.bench_function("verify_primary", |b| {
        b.iter(|| {
            verifier
                .verify::<Session>(&token, Some("session"))
                .expect("verify")
        });
    });
}

fn bench_rotation(c: &mut Criterion) {
    let old = Verifier::new([0x01u8; 32].to_vec());
    let token = old
        .generate(&make_session(), None, None)
        .expect("generate");

    let verifier = Verifier::new([0xABu8; 32].to_vec());
    for i in 0..8u8 {
        verifier.rotate(vec![0x10 + i; 32]);
    }
    verifier.rotate([0x01u8; 32].to_vec());

    c.bench_function("verify_last_of_9_rotations", |b| {
        b.iter(|| verifier.verify::<Session>(&token, None).expect("verify"));
    });
}

criterion_group!(benches, bench_primary, bench_rotation);
criterion_main!(benches);
