// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use criterion::{criterion_group, criterion_main, Criterion};
use edgefirst_filter::image::{frame_size, yuv420_to_rgba, PixelFormat, Yuv420};

pub fn benchmark_convert(c: &mut Criterion) {
    let fmts = [PixelFormat::I420, PixelFormat::Nv12, PixelFormat::Nv21];
    let dims = [
        (320, 240),
        (640, 480),
        (960, 540),
        (1280, 720),
        (1920, 1080),
        (3840, 2160),
    ];

    for fmt in fmts.iter() {
        let mut group = c.benchmark_group(format!("convert/{}", fmt));
        for dim in dims.iter() {
            let frame = vec![128u8; frame_size(dim.0, dim.1, *fmt)];
            let mut rgba = vec![0u8; frame_size(dim.0, dim.1, PixelFormat::Rgba)];
            let src = match fmt {
                PixelFormat::I420 => Yuv420::i420(&frame, dim.0, dim.1).unwrap(),
                PixelFormat::Nv21 => Yuv420::nv21(&frame, dim.0, dim.1).unwrap(),
                _ => Yuv420::nv12(&frame, dim.0, dim.1).unwrap(),
            };
            group.bench_with_input(format!("{}x{}", dim.0, dim.1), &src, |b, src| {
                b.iter(|| yuv420_to_rgba(src, dim.0, dim.1, &mut rgba))
            });
        }
    }
}

criterion_group!(benches, benchmark_convert);
criterion_main!(benches);
