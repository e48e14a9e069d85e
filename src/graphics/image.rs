//! RGBA pixel buffers reconstructed from indexed, planar or masked sources.

use std::io::Cursor;

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, Rgba, RgbaImage};

use crate::{
    error::{DecodeError, Result},
    graphics::palette::Palette,
};

/// Order of the colour planes in a planar payload. Each plane is `width * height` bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneLayout {
    Bgr,
    Bgra,
}

impl PlaneLayout {
    fn plane_count(self) -> usize {
        match self {
            PlaneLayout::Bgr => 3,
            PlaneLayout::Bgra => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pixels: RgbaImage,
}

impl Image {
    /// Fully transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Image {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Image { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> &Rgba<u8> {
        self.pixels.get_pixel(x, y)
    }

    fn pixel_count(width: u32, height: u32) -> usize {
        width as usize * height as usize
    }

    /// Looks every pixel up in `palette`; an index past the end of the palette is an error.
    pub fn from_indexed(
        width: u32,
        height: u32,
        indices: &[u8],
        palette: &Palette,
    ) -> Result<Self> {
        let count = Self::pixel_count(width, height);
        if indices.len() < count {
            return Err(DecodeError::InvalidData(format!(
                "{}x{} indexed image needs {} bytes, got {}",
                width,
                height,
                count,
                indices.len()
            )));
        }

        let mut pixels = RgbaImage::new(width, height);
        for (pixel, &index) in pixels.pixels_mut().zip(indices) {
            *pixel = *palette.get(index as usize).ok_or_else(|| {
                DecodeError::InvalidData(format!(
                    "palette index {} out of range (palette has {} colours)",
                    index,
                    palette.len()
                ))
            })?;
        }

        Ok(Image { pixels })
    }

    /// Assembles an image from consecutive colour planes. Without an alpha plane the result is
    /// opaque.
    pub fn from_planes(width: u32, height: u32, data: &[u8], layout: PlaneLayout) -> Result<Self> {
        let plane = Self::pixel_count(width, height);
        let needed = plane * layout.plane_count();
        if data.len() < needed {
            return Err(DecodeError::InvalidData(format!(
                "{}x{} planar image needs {} bytes, got {}",
                width,
                height,
                needed,
                data.len()
            )));
        }

        let mut pixels = RgbaImage::new(width, height);
        for (i, pixel) in pixels.pixels_mut().enumerate() {
            let b = data[i];
            let g = data[plane + i];
            let r = data[plane * 2 + i];
            let a = match layout {
                PlaneLayout::Bgr => 0xFF,
                PlaneLayout::Bgra => data[plane * 3 + i],
            };
            *pixel = Rgba([r, g, b, a]);
        }

        Ok(Image { pixels })
    }

    /// Replaces this image's alpha with the luminance of `mask`.
    pub fn composite_mask(&mut self, mask: &Image) -> Result<()> {
        if self.width() != mask.width() || self.height() != mask.height() {
            return Err(DecodeError::InvalidData(format!(
                "mask is {}x{} but image is {}x{}",
                mask.width(),
                mask.height(),
                self.width(),
                self.height()
            )));
        }

        for (pixel, mask_pixel) in self.pixels.pixels_mut().zip(mask.pixels.pixels()) {
            let [r, g, b, _] = mask_pixel.0;
            pixel.0[3] = ((r as u16 + g as u16 + b as u16) / 3) as u8;
        }
        Ok(())
    }

    /// Encodes the image as an in-memory PNG file.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        PngEncoder::new(&mut buffer).write_image(
            self.pixels.as_raw(),
            self.width(),
            self.height(),
            ColorType::Rgba8,
        )?;
        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_palette(size: usize) -> Palette {
        Palette::from_colors(
            (0..size)
                .map(|i| Rgba([i as u8, 0, 0, 0xFF]))
                .collect(),
        )
    }

    #[test]
    fn last_palette_index_resolves() {
        let palette = ramp_palette(16);
        let image = Image::from_indexed(2, 1, &[0, 15], &palette).unwrap();
        assert_eq!(image.pixel(1, 0), &Rgba([15, 0, 0, 0xFF]));
    }

    #[test]
    fn index_equal_to_palette_size_is_invalid() {
        let palette = ramp_palette(16);
        assert!(matches!(
            Image::from_indexed(2, 1, &[0, 16], &palette),
            Err(DecodeError::InvalidData(_))
        ));
    }

    #[test]
    fn short_index_buffer_is_invalid() {
        let palette = ramp_palette(4);
        assert!(Image::from_indexed(2, 2, &[0, 1, 2], &palette).is_err());
    }

    #[test]
    fn bgr_planes_are_reordered() {
        // 2x1: B plane, G plane, R plane
        let data = [1, 2, 3, 4, 5, 6];
        let image = Image::from_planes(2, 1, &data, PlaneLayout::Bgr).unwrap();
        assert_eq!(image.pixel(0, 0), &Rgba([5, 3, 1, 0xFF]));
        assert_eq!(image.pixel(1, 0), &Rgba([6, 4, 2, 0xFF]));

        let with_alpha = [1, 2, 3, 4, 5, 6, 7, 8];
        let image = Image::from_planes(2, 1, &with_alpha, PlaneLayout::Bgra).unwrap();
        assert_eq!(image.pixel(1, 0), &Rgba([6, 4, 2, 8]));
    }

    #[test]
    fn mask_luminance_becomes_alpha() {
        let mut image = Image::from_planes(1, 1, &[9, 9, 9], PlaneLayout::Bgr).unwrap();
        let mask = Image::from_rgba(RgbaImage::from_pixel(1, 1, Rgba([30, 60, 90, 0])));
        image.composite_mask(&mask).unwrap();
        assert_eq!(image.pixel(0, 0), &Rgba([9, 9, 9, 60]));
    }

    #[test]
    fn mask_size_mismatch_fails() {
        let mut image = Image::new(2, 2);
        assert!(matches!(
            image.composite_mask(&Image::new(2, 3)),
            Err(DecodeError::InvalidData(_))
        ));
    }

    #[test]
    fn png_output_has_signature() {
        let png = Image::new(3, 2).to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
