//! Performance benchmarks for the ABI codec hot paths: call encoding and
//! decoding, read-result decoding, event recognition, and selector lookup.
//! These run on every transaction build and every receipt fold, so they
//! sit on the latency path of the whole pipeline.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use chain_client::abi::AbiRegistry;
use chain_client::types::EventLog;
use chain_client::{ERC20_ABI_NAME, decode_known_event, decode_known_events};
use criterion::{Criterion, criterion_group, criterion_main};
use ethers::abi::Token;
use ethers::types::{Address, Bytes, H256, U256};
use std::hint::black_box;

/// `keccak256("Transfer(address,address,uint256)")`.
const TRANSFER_TOPIC: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

fn address_topic(address: Address) -> H256 {
    let mut bytes = [0u8; 32];
    bytes[12..].copy_from_slice(address.as_bytes());
    H256::from(bytes)
}

fn transfer_arguments() -> [Token; 2] {
    [
        Token::Address(Address::repeat_byte(0xBB)),
        Token::Uint(U256::from(1_000_000u64)),
    ]
}

fn transfer_log() -> EventLog {
    let mut amount = [0u8; 32];
    U256::from(1_000_000u64).to_big_endian(&mut amount);
    EventLog {
        address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
        topics: vec![
            TRANSFER_TOPIC.parse().unwrap(),
            address_topic(Address::repeat_byte(0xAA)),
            address_topic(Address::repeat_byte(0xBB)),
        ],
        data: Bytes::from(amount.to_vec()),
        removed: false,
    }
}

fn benchmark_encode_call(c: &mut Criterion) {
    let registry = AbiRegistry::with_builtin().unwrap();
    let args = transfer_arguments();

    c.bench_function("abi/encode_transfer_call", |b| {
        b.iter(|| {
            let data = registry
                .encode_call(ERC20_ABI_NAME, "transfer", black_box(&args))
                .unwrap();
            black_box(data)
        });
    });
}

fn benchmark_decode_call(c: &mut Criterion) {
    let registry = AbiRegistry::with_builtin().unwrap();
    let data = registry
        .encode_call(ERC20_ABI_NAME, "transfer", &transfer_arguments())
        .unwrap();

    c.bench_function("abi/decode_transfer_call", |b| {
        b.iter(|| {
            let tokens = registry
                .decode_call(ERC20_ABI_NAME, "transfer", black_box(&data))
                .unwrap();
            black_box(tokens)
        });
    });
}

fn benchmark_decode_read_result(c: &mut Criterion) {
    let registry = AbiRegistry::with_builtin().unwrap();
    let mut word = [0u8; 32];
    U256::from(250_000_000_000u64).to_big_endian(&mut word);

    c.bench_function("abi/decode_balance_result", |b| {
        b.iter(|| {
            let tokens = registry
                .decode_result(ERC20_ABI_NAME, "balanceOf", black_box(&word))
                .unwrap();
            black_box(tokens)
        });
    });
}

fn benchmark_decode_known_event(c: &mut Criterion) {
    let log = transfer_log();

    c.bench_function("events/decode_transfer", |b| {
        b.iter(|| {
            let event = decode_known_event(black_box(&log)).unwrap();
            black_box(event)
        });
    });
}

fn benchmark_decode_receipt_logs(c: &mut Criterion) {
    // A busy receipt: recognized transfers mixed with foreign logs.
    let mut logs = vec![transfer_log(); 8];
    logs.push(EventLog {
        topics: vec![H256::repeat_byte(0x17)],
        ..transfer_log()
    });

    c.bench_function("events/decode_receipt_logs", |b| {
        b.iter(|| {
            let events = decode_known_events(black_box(&logs));
            black_box(events)
        });
    });
}

fn benchmark_selector_lookup(c: &mut Criterion) {
    let registry = AbiRegistry::with_builtin().unwrap();

    c.bench_function("abi/function_selector", |b| {
        b.iter(|| {
            let selector = registry
                .function_selector(ERC20_ABI_NAME, black_box("transferFrom"))
                .unwrap();
            black_box(selector)
        });
    });
}

criterion_group!(
    benches,
    benchmark_encode_call,
    benchmark_decode_call,
    benchmark_decode_read_result,
    benchmark_decode_known_event,
    benchmark_decode_receipt_logs,
    benchmark_selector_lookup,
);

criterion_main!(benches);
