// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use edgefirst_filter::{
    image::{
        frame_size, rgba_len, save_rgba, yuv420_to_rgba, yuv420_to_rgba_vec, PixelFormat, Yuv420,
    },
    Error,
};
use serial_test::serial;
use std::{error::Error as StdError, time::Instant};

/// Tightly packed NV12 frame filled with a single color.
fn nv12_frame(width: u32, height: u32, y: u8, u: u8, v: u8) -> Vec<u8> {
    let luma = (width * height) as usize;
    let mut frame = vec![y; frame_size(width, height, PixelFormat::Nv12)];
    for pair in frame[luma..].chunks_exact_mut(2) {
        pair[0] = u;
        pair[1] = v;
    }
    frame
}

#[test]
fn test_formats() -> Result<(), Box<dyn StdError>> {
    assert_eq!(frame_size(1920, 1080, PixelFormat::Nv12), 3110400);
    assert_eq!(frame_size(1920, 1080, PixelFormat::I420), 3110400);
    assert_eq!(frame_size(1920, 1080, PixelFormat::Nv21), 3110400);
    assert_eq!(frame_size(1920, 1080, PixelFormat::Rgba), 8294400);

    // odd dimensions round the chroma planes up
    assert_eq!(frame_size(3, 3, PixelFormat::I420), 9 + 2 * 4);
    assert_eq!(frame_size(5, 1, PixelFormat::Nv12), 5 + 2 * 3);

    assert_eq!(rgba_len(640, 480), Some(1228800));
    assert_eq!(rgba_len(0, 480), Some(0));

    assert_eq!("nv12".parse::<PixelFormat>()?, PixelFormat::Nv12);
    assert_eq!("YUV420P".parse::<PixelFormat>()?, PixelFormat::I420);
    assert!("yuyv".parse::<PixelFormat>().is_err());
    assert_eq!(PixelFormat::Nv21.to_string(), "NV21");

    Ok(())
}

#[test]
fn test_white_and_black() -> Result<(), Box<dyn StdError>> {
    let frame = nv12_frame(4, 4, 235, 128, 128);
    let rgba = yuv420_to_rgba_vec(&Yuv420::nv12(&frame, 4, 4)?, 4, 4)?;
    assert_eq!(rgba.len(), 64);
    assert!(rgba.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));

    let frame = nv12_frame(4, 4, 16, 128, 128);
    let rgba = yuv420_to_rgba_vec(&Yuv420::nv12(&frame, 4, 4)?, 4, 4)?;
    assert!(rgba.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));

    Ok(())
}

#[test]
fn test_clamping() -> Result<(), Box<dyn StdError>> {
    // BT.601 red, the blue channel underflows and is clamped
    let frame = nv12_frame(2, 2, 81, 90, 240);
    let rgba = yuv420_to_rgba_vec(&Yuv420::nv12(&frame, 2, 2)?, 2, 2)?;
    assert!(rgba.chunks_exact(4).all(|px| px == [255, 0, 0, 255]));

    // full scale chroma saturates red and blue
    let frame = nv12_frame(2, 2, 255, 255, 255);
    let rgba = yuv420_to_rgba_vec(&Yuv420::nv12(&frame, 2, 2)?, 2, 2)?;
    assert_eq!(&rgba[..4], &[255, 125, 255, 255]);

    Ok(())
}

#[test]
fn test_nv21_chroma_order() -> Result<(), Box<dyn StdError>> {
    let frame = nv12_frame(2, 2, 81, 90, 240);

    let nv12 = yuv420_to_rgba_vec(&Yuv420::nv12(&frame, 2, 2)?, 2, 2)?;
    assert_eq!(&nv12[..4], &[255, 0, 0, 255]);

    // the same bytes read as VU pairs swap the chroma channels
    let nv21 = yuv420_to_rgba_vec(&Yuv420::nv21(&frame, 2, 2)?, 2, 2)?;
    assert_eq!(&nv21[..4], &[15, 63, 255, 255]);

    Ok(())
}

#[test]
fn test_i420_planes() -> Result<(), Box<dyn StdError>> {
    let (width, height) = (4u32, 2u32);
    let mut frame = vec![235u8; frame_size(width, height, PixelFormat::I420)];
    // U plane then V plane, one sample per 2x2 block
    frame[8..10].copy_from_slice(&[128, 128]);
    frame[10..12].copy_from_slice(&[128, 240]);

    let src = Yuv420::i420(&frame, width, height)?;
    assert_eq!(src.y.len(), 8);
    assert_eq!(src.uv_stride, 2);
    assert_eq!(src.uv_pixel_stride, 1);

    let rgba = yuv420_to_rgba_vec(&src, width, height)?;
    for (i, px) in rgba.chunks_exact(4).enumerate() {
        let expected: [u8; 4] = if i % 4 < 2 {
            [255, 255, 255, 255]
        } else {
            [255, 164, 255, 255]
        };
        assert_eq!(px, expected, "pixel {}", i);
    }

    Ok(())
}

#[test]
fn test_padded_strides() -> Result<(), Box<dyn StdError>> {
    // 2x2 frame inside rows of 6 luma and 4 chroma bytes, padding is zero
    let y = [235, 235, 0, 0, 0, 0, 235, 235];
    let u = [128u8, 0, 0, 0];
    let v = [128u8, 0, 0, 0];
    let src = Yuv420 {
        y: &y,
        u: &u,
        v: &v,
        y_stride: 6,
        uv_stride: 4,
        uv_pixel_stride: 2,
    };
    src.validate(2, 2)?;

    let mut rgba = [0u8; 16];
    yuv420_to_rgba(&src, 2, 2, &mut rgba);
    assert!(rgba.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));

    Ok(())
}

#[test]
fn test_rejected_planes() {
    let frame = vec![128u8; frame_size(4, 4, PixelFormat::Nv12) - 1];
    assert!(matches!(
        Yuv420::nv12(&frame, 4, 4),
        Err(Error::BufferTooSmall { expected: 24, .. })
    ));
    assert!(matches!(
        Yuv420::i420(&frame, 4, 4),
        Err(Error::BufferTooSmall { .. })
    ));

    let y = [0u8; 7];
    let uv = [128u8; 2];
    let short_luma = Yuv420 {
        y: &y,
        u: &uv,
        v: &uv,
        y_stride: 4,
        uv_stride: 2,
        uv_pixel_stride: 1,
    };
    assert!(matches!(short_luma.validate(4, 2), Err(Error::InvalidPlanes(_))));

    let y = [0u8; 8];
    let narrow_stride = Yuv420 {
        y_stride: 2,
        y: &y,
        ..short_luma
    };
    assert!(matches!(narrow_stride.validate(4, 2), Err(Error::InvalidPlanes(_))));

    let u = [128u8; 1];
    let short_chroma = Yuv420 {
        y: &y,
        u: &u,
        ..short_luma
    };
    assert!(matches!(short_chroma.validate(4, 2), Err(Error::InvalidPlanes(_))));

    assert!(matches!(
        short_chroma.validate(0, 2),
        Err(Error::InvalidDimensions { width: 0, height: 2 })
    ));
    assert!(yuv420_to_rgba_vec(&short_chroma, 4, 2).is_err());
}

#[test]
fn test_zero_dimensions() {
    let frame = vec![128u8; 64];
    for (width, height) in [(0, 4), (4, 0), (0, 0)] {
        for src in [
            Yuv420::nv12(&frame, width, height),
            Yuv420::nv21(&frame, width, height),
            Yuv420::i420(&frame, width, height),
        ] {
            assert!(
                matches!(src, Err(Error::InvalidDimensions { .. })),
                "{}x{} accepted",
                width,
                height
            );
        }
    }

    assert!(matches!(
        Yuv420::nv21(&[], 0, 4),
        Err(Error::InvalidDimensions { width: 0, height: 4 })
    ));
    assert!(matches!(
        Yuv420::nv12(&[], 4, 0),
        Err(Error::InvalidDimensions { width: 4, height: 0 })
    ));
}

#[test]
fn test_save_rgba() -> Result<(), Box<dyn StdError>> {
    let (width, height) = (16u32, 8u32);
    let pixels: Vec<u8> = (0..width * height)
        .flat_map(|i| [(i * 2) as u8, 64, 255 - i as u8, 255])
        .collect();

    let path = std::env::temp_dir().join("edgefirst-filter-save.png");
    save_rgba(&path, &pixels, width, height)?;
    let saved = image::open(&path)?.to_rgba8();
    assert_eq!(saved.dimensions(), (width, height));
    assert_eq!(saved.as_raw(), &pixels);
    std::fs::remove_file(&path)?;

    let path = std::env::temp_dir().join("edgefirst-filter-save.jpeg");
    save_rgba(&path, &pixels, width, height)?;
    let saved = image::open(&path)?;
    assert_eq!((saved.width(), saved.height()), (width, height));
    std::fs::remove_file(&path)?;

    assert!(matches!(
        save_rgba(&path, &pixels[..100], width, height),
        Err(Error::BufferTooSmall { .. })
    ));

    Ok(())
}

#[test]
#[serial]
fn test_convert_1080p() -> Result<(), Box<dyn StdError>> {
    let (width, height) = (1920, 1080);
    let frame = nv12_frame(width, height, 235, 128, 128);
    let src = Yuv420::nv12(&frame, width, height)?;
    let mut rgba = vec![0u8; frame_size(width, height, PixelFormat::Rgba)];

    let now = Instant::now();
    yuv420_to_rgba(&src, width, height, &mut rgba);
    println!("nv12 -> rgba 1920x1080: {:?}", now.elapsed());

    assert!(rgba.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
    Ok(())
}
