//! Negotiation and conversion benchmarks.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use audioconvert::buffer::Buffer;
use audioconvert::caps::{AudioCaps, AudioStructure};
use audioconvert::config::{ConvertConfig, DitherMode, NoiseShapingMode};
use audioconvert::elements::AudioConvertElement;
use audioconvert::format::{AudioFormat, Endianness};
use audioconvert::metadata::Metadata;
use audioconvert::negotiation::{expand, fixate};

const FRAMES: usize = 4096;

fn configured(input: &AudioFormat, output: &AudioFormat, config: ConvertConfig) -> AudioConvertElement {
    let mut element = AudioConvertElement::new().with_config(config);
    element
        .set_format(&AudioStructure::from(input), &AudioStructure::from(output))
        .unwrap();
    element
}

fn bench_negotiation(c: &mut Criterion) {
    let mut group = c.benchmark_group("negotiation");

    let input = AudioFormat::int(44100, 2, 16, 16, true, Endianness::Little);
    let incaps = AudioCaps::from_format(&input);
    let peer: AudioCaps = "audio/x-raw-float, width=(int)32".parse().unwrap();

    group.bench_function("expand", |b| {
        b.iter(|| std::hint::black_box(expand(&incaps, None)));
    });
    group.bench_function("expand_filtered_fixate", |b| {
        b.iter(|| {
            let caps = expand(&incaps, Some(&peer));
            std::hint::black_box(fixate(&input, &caps).unwrap())
        });
    });

    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");

    let s16 = |channels| AudioFormat::int(44100, channels, 16, 16, true, Endianness::Little);
    let s32 = AudioFormat::int(44100, 2, 32, 32, true, Endianness::Little);
    let f32le = AudioFormat::float(44100, 2, 32, Endianness::Little);
    let shaped = ConvertConfig::new()
        .with_dithering(DitherMode::Tpdf)
        .with_noise_shaping(NoiseShapingMode::High);

    let cases = [
        ("s16_to_f32", s16(2), f32le.clone(), ConvertConfig::default()),
        ("s16_swap", s16(2), AudioFormat::int(44100, 2, 16, 16, true, Endianness::Big), ConvertConfig::default()),
        ("downmix_6_to_2", s16(6), s16(2), ConvertConfig::default()),
        ("s32_to_s16_shaped", s32, s16(2), shaped),
    ];

    for (name, input, output, config) in cases {
        let mut element = configured(&input, &output, config);
        let src = vec![0x11u8; FRAMES * input.unit_size()];
        let mut dst = Buffer::zeroed(FRAMES * output.unit_size(), Metadata::new());

        group.throughput(Throughput::Elements(FRAMES as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &src, |b, src| {
            b.iter(|| {
                let mut inbuf = Buffer::from_bytes(src.clone());
                element.transform(&mut inbuf, &mut dst).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_gap(c: &mut Criterion) {
    let mut group = c.benchmark_group("gap_silence");

    for width in [8, 16, 24, 32] {
        let input = AudioFormat::int(44100, 2, 16, 16, true, Endianness::Little);
        let output = AudioFormat::int(44100, 2, width, width, false, Endianness::Big);
        let mut element = configured(&input, &output, ConvertConfig::default());
        let mut dst = Buffer::zeroed(FRAMES * output.unit_size(), Metadata::new());

        group.throughput(Throughput::Bytes(dst.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &input, |b, input| {
            b.iter(|| {
                let mut gap = Buffer::new(vec![0; FRAMES * input.unit_size()], Metadata::new().with_gap());
                element.transform(&mut gap, &mut dst).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_negotiation, bench_convert, bench_gap);
criterion_main!(benches);
