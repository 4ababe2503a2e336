//! Preset parsing and compilation benchmarks
//!
//! Presets in the wild carry a few dozen blocks; the larger sizes check that
//! parsing and deduplication stay linear.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wpreset_core::{compile_preset, generate_preset_content, parse_preset_content, FilterSettings};

fn generate_preset(blocks: usize) -> String {
    let mut text = String::from("# Preset: Bench\n\n--wf-tcp=80,443\n--wf-udp=443,50000-50100\n\n");
    for i in 0..blocks {
        if i > 0 {
            text.push_str("\n--new\n\n");
        }
        let (filter, list) = if i % 2 == 0 {
            ("--filter-tcp=80,443", format!("--hostlist=lists/list{i}-hosts.txt"))
        } else {
            ("--filter-udp=443", format!("--ipset=lists/ipset-list{i}.txt"))
        };
        text.push_str(&format!(
            "{filter}\n{list}\n--dpi-desync=fake,multisplit\n--dpi-desync-repeats=6\n--dpi-desync-split-pos=1,midsld\n"
        ));
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_preset");

    for blocks in [10, 100, 1000] {
        let text = generate_preset(blocks);
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &text, |b, text| {
            b.iter(|| black_box(parse_preset_content(text)));
        });
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let data = parse_preset_content(&generate_preset(100));

    c.bench_function("generate_preset_100", |b| {
        b.iter(|| black_box(generate_preset_content(&data, true)));
    });
}

fn bench_compile(c: &mut Criterion) {
    let data = parse_preset_content(&generate_preset(100));
    let settings = FilterSettings {
        remove_ipsets: true,
        allzone: true,
        wssize: true,
        ..FilterSettings::default()
    };

    c.bench_function("compile_preset_100", |b| {
        b.iter(|| black_box(compile_preset(&data, &settings)));
    });
}

criterion_group!(benches, bench_parse, bench_generate, bench_compile);
criterion_main!(benches);
