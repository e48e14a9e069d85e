//! Colour tables read from archive payloads.

use image::Rgba;

use crate::{binary_utils::InputStream, error::Result};

/// Byte layout of a single palette record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb888,
    Bgr888,
    Rgba8888,
    Bgra8888,
    /// Fourth byte is padding; colours come out opaque.
    Rgbx8888,
    Bgrx8888,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb888 | PixelFormat::Bgr888 => 3,
            _ => 4,
        }
    }

    fn decode(self, raw: &[u8]) -> Rgba<u8> {
        match self {
            PixelFormat::Rgb888 => Rgba([raw[0], raw[1], raw[2], 0xFF]),
            PixelFormat::Bgr888 => Rgba([raw[2], raw[1], raw[0], 0xFF]),
            PixelFormat::Rgba8888 => Rgba([raw[0], raw[1], raw[2], raw[3]]),
            PixelFormat::Bgra8888 => Rgba([raw[2], raw[1], raw[0], raw[3]]),
            PixelFormat::Rgbx8888 => Rgba([raw[0], raw[1], raw[2], 0xFF]),
            PixelFormat::Bgrx8888 => Rgba([raw[2], raw[1], raw[0], 0xFF]),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Rgba<u8>>,
}

impl Palette {
    /// Reads `count` records of the given format; fails on truncated input.
    pub fn read(stream: &mut InputStream, count: usize, format: PixelFormat) -> Result<Self> {
        let raw = stream.read(count * format.bytes_per_pixel())?;
        let colors = raw
            .chunks_exact(format.bytes_per_pixel())
            .map(|record| format.decode(record))
            .collect();

        Ok(Palette { colors })
    }

    pub fn from_colors(colors: Vec<Rgba<u8>>) -> Self {
        Palette { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rgba<u8>> {
        self.colors.get(index)
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Rgba<u8>> {
        self.colors.iter_mut()
    }

    /// Some engines store transparency instead of opacity.
    pub fn invert_alpha(&mut self) {
        for color in self.iter_mut() {
            color.0[3] ^= 0xFF;
        }
    }
}
