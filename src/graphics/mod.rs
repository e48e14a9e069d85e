//! Image reconstruction shared by the format decoders
//!
//! Palettes, indexed and planar pixel layouts, mask compositing and PNG encoding of the result.

pub mod image;
pub mod palette;

pub use self::image::{Image, PlaneLayout};
pub use palette::{Palette, PixelFormat};
