use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use fovea_image::Image;
use fovea_filters::{box_blur, filter_2d, gaussian_blur, BorderMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn create_test_image(width: usize, height: usize) -> Image<u8, 3> {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..(width * height * 3)).map(|_| rng.random()).collect();
    Image::new([width, height].into(), data).unwrap()
}

fn bench_smoothing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Smoothing");

    for (width, height) in [(320, 240), (640, 480), (1280, 720)].iter() {
        for kernel_size in [3, 5, 9].iter() {
            group.throughput(criterion::Throughput::Elements(
                (*width * *height * *kernel_size) as u64,
            ));

            let parameter_string = format!("{}x{}x{}", width, height, kernel_size);

            let image = create_test_image(*width, *height);

            group.bench_with_input(
                BenchmarkId::new("box_blur", &parameter_string),
                &image,
                |b, i| {
                    b.iter(|| {
                        black_box(box_blur(
                            i,
                            (*kernel_size, *kernel_size),
                            BorderMode::Replicate,
                        ))
                    })
                },
            );

            group.bench_with_input(
                BenchmarkId::new("gaussian_blur", &parameter_string),
                &image,
                |b, i| {
                    b.iter(|| {
                        black_box(gaussian_blur(
                            i,
                            (*kernel_size, *kernel_size),
                            (1.5, 1.5),
                            BorderMode::Replicate,
                        ))
                    })
                },
            );

            group.bench_with_input(
                BenchmarkId::new("filter_2d", &parameter_string),
                &image,
                |b, i| {
                    let coefficients =
                        vec![1.0 / (kernel_size * kernel_size) as f32; kernel_size * kernel_size];
                    b.iter(|| {
                        black_box(filter_2d(
                            i,
                            &coefficients,
                            (*kernel_size, *kernel_size),
                            BorderMode::Replicate,
                        ))
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_smoothing);
criterion_main!(benches);
