//! Benchmarks for quantization and indexed encoding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use palettize::gif::GifEncoderAdapter;
use palettize::png::{PngIndexedEncoder, PngOptions};
use palettize::quantize::{
    DistanceMetric, FastQuantizer, MedianCutQuantizer, QuantizationConfig, Quantizer,
};
use palettize::RasterBuffer;

/// Generate a test image with gradient pattern.
fn generate_test_image(width: u32, height: u32) -> RasterBuffer {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width) as u8;
            let g = ((y * 255) / height) as u8;
            let b = (((x + y) * 127) / (width + height)) as u8;
            pixels.extend_from_slice(&[r, g, b, 255]);
        }
    }
    RasterBuffer::new(width, height, pixels).unwrap()
}

/// Generate a test image with random-ish pattern (worst case for backoff).
fn generate_noisy_image(width: u32, height: u32) -> RasterBuffer {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    let mut seed = 12345u32;
    for _ in 0..(width * height) {
        // Simple LCG for deterministic "random" values
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        let r = (seed >> 16) as u8;
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        let g = (seed >> 16) as u8;
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        let b = (seed >> 16) as u8;
        pixels.extend_from_slice(&[r, g, b, 255]);
    }
    RasterBuffer::new(width, height, pixels).unwrap()
}

fn quantize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Quantize");

    for size in [64u32, 256, 512] {
        let gradient = generate_test_image(size, size);
        let noisy = generate_noisy_image(size, size);
        group.throughput(Throughput::Bytes(size as u64 * size as u64 * 4));

        for (name, image) in [("gradient", &gradient), ("noisy", &noisy)] {
            let mut fast = FastQuantizer::new(QuantizationConfig::default());
            group.bench_with_input(
                BenchmarkId::new(format!("fast/{name}"), format!("{size}x{size}")),
                image,
                |b, image| b.iter(|| fast.quantize(black_box(image)).unwrap()),
            );

            let mut dithered = FastQuantizer::new(QuantizationConfig::crushed(32));
            group.bench_with_input(
                BenchmarkId::new(format!("fast-dither/{name}"), format!("{size}x{size}")),
                image,
                |b, image| b.iter(|| dithered.quantize(black_box(image)).unwrap()),
            );

            let mut median = MedianCutQuantizer::new(256, DistanceMetric::Rgba);
            group.bench_with_input(
                BenchmarkId::new(format!("median-cut/{name}"), format!("{size}x{size}")),
                image,
                |b, image| b.iter(|| median.quantize(black_box(image)).unwrap()),
            );
        }
    }

    group.finish();
}

fn encode_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Indexed Encoding");

    for size in [64u32, 256, 512] {
        let image = FastQuantizer::new(QuantizationConfig::default())
            .quantize(&generate_test_image(size, size))
            .unwrap();
        group.throughput(Throughput::Bytes(size as u64 * size as u64));

        for level in [1u8, 6, 9] {
            let encoder = PngIndexedEncoder::new(PngOptions {
                compression_level: level,
            });
            let mut buf = Vec::new();
            group.bench_with_input(
                BenchmarkId::new(format!("png/level{level}"), format!("{size}x{size}")),
                &image,
                |b, image| {
                    b.iter(|| {
                        encoder
                            .encode_indexed_into(
                                &mut buf,
                                black_box(image.indices()),
                                image.width(),
                                image.height(),
                                image.palette(),
                                false,
                            )
                            .unwrap()
                    })
                },
            );
        }

        let gif = GifEncoderAdapter::new();
        group.bench_with_input(
            BenchmarkId::new("gif", format!("{size}x{size}")),
            &image,
            |b, image| b.iter(|| gif.encode_indexed(black_box(image), false).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, quantize_benchmark, encode_benchmark);
criterion_main!(benches);
