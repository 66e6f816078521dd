//! # Gov-Toolkit Benchmarks
//!
//! | Crate | Operation | Expectation |
//! |-------|-----------|-------------|
//! | gt-01 Numeric | decimal <-> base units | < 5us per amount |
//! | gt-02 Interface Codec | encode call, decode dynamic output | linear in output length |
//! | gt-03 Contract Invoker | sign one legacy transaction | < 1ms |
//! | gt-05 Ledger | parse and aggregate a payout file | linear in rows |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gt_01_numeric::{to_base_units, to_decimal};
use gt_02_interface_codec::{InterfaceCatalog, InterfaceCodec, Token, ELECTION};
use gt_03_contract_invoker::sign_transaction;
use gt_05_ledger::{aggregate, parse_ledger, LedgerLayout};
use shared_crypto::LocalKeyCredential;
use shared_types::{Address, UnsignedTransaction, U256};
use std::collections::HashSet;
use std::time::Duration;

const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

// ============================================================================
// GT-01: Numeric conversion
// ============================================================================

fn bench_numeric(c: &mut Criterion) {
    let mut group = c.benchmark_group("gt-01-numeric");

    group.bench_function("to_base_units", |b| {
        b.iter(|| to_base_units(black_box("1234567.123456789012345678")))
    });

    let value = U256::from_dec_str("1234567123456789012345678").unwrap_or_default();
    group.bench_function("to_decimal", |b| b.iter(|| to_decimal(black_box(value))));

    group.finish();
}

// ============================================================================
// GT-02: Interface codec
// ============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("gt-02-interface-codec");
    let catalog = InterfaceCatalog::bundled().expect("bundled interfaces parse");
    let election = catalog.get(ELECTION).expect("election interface");

    let args = [Token::uint(2u64), Token::uint(100u64)];
    group.bench_function("encode_set_electable_validators", |b| {
        b.iter(|| InterfaceCodec::encode(&election, "setElectableValidators", black_box(&args)))
    });

    for count in [1usize, 16, 128] {
        // ABI layout of address[]: offset word, length word, then one word each.
        let mut output = vec![0u8; 64];
        output[31] = 0x20;
        output[56..64].copy_from_slice(&(count as u64).to_be_bytes());
        for i in 0..count {
            let mut word = [0u8; 32];
            word[24..].copy_from_slice(&(i as u64 + 1).to_be_bytes());
            output.extend_from_slice(&word);
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::new("decode_validators_voted_for", count),
            &output,
            |b, output| {
                b.iter(|| {
                    InterfaceCodec::decode(&election, "getValidatorsVotedForByAccount", black_box(output))
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// GT-03: Transaction signing
// ============================================================================

fn bench_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("gt-03-contract-invoker");
    group.measurement_time(Duration::from_secs(10));
    let credential = LocalKeyCredential::from_hex(KEY).expect("valid key");

    let unsigned = UnsignedTransaction {
        nonce: 7,
        gas_price: U256::from(5_000_000_000u64),
        gas_limit: 90_000,
        to: Some(Address::from_low_u64(0x8d66)),
        value: U256::zero(),
        data: vec![0xab; 68],
        chain_id: 42220,
    };
    group.bench_function("sign_legacy_transaction", |b| {
        b.iter(|| sign_transaction(black_box(unsigned.clone()), &credential))
    });

    group.finish();
}

// ============================================================================
// GT-05: Ledger parsing and aggregation
// ============================================================================

fn voter_ledger(rows: usize) -> String {
    let mut text = String::from("epoch,validator,voter,votes,reward\n");
    for i in 0..rows {
        let validator = Address::from_low_u64((i % 100) as u64 + 1);
        let voter = Address::from_low_u64((i % 1_000) as u64 + 10_000);
        text.push_str(&format!("1,{validator:?},{voter:?},{i},{}\n", 1_000 + i));
    }
    text
}

fn bench_ledger(c: &mut Criterion) {
    let mut group = c.benchmark_group("gt-05-ledger");
    let excluded: HashSet<Address> = [Address::from_low_u64(10_000)].into_iter().collect();

    for rows in [100usize, 1_000, 10_000] {
        let text = voter_ledger(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("parse_and_aggregate", rows), &text, |b, text| {
            b.iter(|| {
                let records = parse_ledger(black_box(text), &LedgerLayout::VOTER_PAYOUT)
                    .expect("generated ledger parses");
                aggregate(&records, &excluded).expect("no overflow")
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_numeric, bench_codec, bench_signing, bench_ledger);
criterion_main!(benches);
