//! XYZ images (RPG Maker 2000/2003): a zlib stream of an RGB palette followed by indices.

use crate::{
    binary_utils::InputStream,
    containers::compression::inflate,
    error::Result,
    filesystem::InputFile,
    formats::{options::Configurable, ImageDecoder},
    graphics::{Image, Palette, PixelFormat},
};

const MAGIC: &[u8] = b"XYZ1";
const PALETTE_SIZE: usize = 256;

#[derive(Debug, Default)]
pub struct XyzImageDecoder;

impl Configurable for XyzImageDecoder {}

impl ImageDecoder for XyzImageDecoder {
    fn is_recognized_impl(&self, file: &mut InputFile) -> Result<bool> {
        Ok(file.stream.read(MAGIC.len())? == MAGIC)
    }

    fn decode_impl(&self, file: &mut InputFile) -> Result<Image> {
        file.stream.skip(MAGIC.len())?;
        let width = file.stream.read_u16_le()? as u32;
        let height = file.stream.read_u16_le()? as u32;

        let mut data = InputStream::new(inflate(&file.stream.read_to_eof())?);
        let palette = Palette::read(&mut data, PALETTE_SIZE, PixelFormat::Rgb888)?;
        let indices = data.read(width as usize * height as usize)?;

        Image::from_indexed(width, height, &indices, &palette)
    }
}
