#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_compressor::IncomingFile;
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

/// A photo-like test pattern: smooth gradients with a little texture.
pub fn test_pattern(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let texture = ((x * 31 + y * 17) % 13) as u8;
        Rgb([
            ((x * 255) / width.max(1)) as u8 ^ texture,
            ((y * 255) / height.max(1)) as u8,
            (((x + y) * 127) / (width + height).max(1)) as u8 + texture,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub fn incoming(name: &str, width: u32, height: u32, format: ImageFormat) -> IncomingFile {
    IncomingFile::new(name, encode(&test_pattern(width, height), format))
}

pub fn write_image(dir: &Path, name: &str, width: u32, height: u32, format: ImageFormat) -> PathBuf {
    let path = dir.join(name);
    File::create(&path)
        .unwrap()
        .write_all(&encode(&test_pattern(width, height), format))
        .unwrap();
    path
}

pub fn write_text(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    File::create(&path)
        .unwrap()
        .write_all(b"not an image")
        .unwrap();
    path
}
