//! 2D textures uploaded from decoded images.

use image::DynamicImage;

use crate::math::prelude::Vector2;

use super::backends::{TextureId, Visitor};
use super::errors::{Error, Result};
use super::MAX_TEXTURE_UNITS;

/// The internal pixel format of a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureFormat {
    R8,
    RG8,
    RGB8,
    RGBA8,
}

impl TextureFormat {
    /// Picks the format that stores `channels` 8-bit components per pixel.
    pub fn from_channels(channels: u8) -> Result<Self> {
        match channels {
            1 => Ok(TextureFormat::R8),
            2 => Ok(TextureFormat::RG8),
            3 => Ok(TextureFormat::RGB8),
            4 => Ok(TextureFormat::RGBA8),
            _ => Err(Error::UnsupportedChannels(channels)),
        }
    }

    pub fn channels(self) -> u8 {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::RG8 => 2,
            TextureFormat::RGB8 => 3,
            TextureFormat::RGBA8 => 4,
        }
    }
}

/// Specify how the texture is used whenever the pixel being textured maps to an area
/// outside the [0, 1] range of texture coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureWrap {
    Repeat,
    Mirror,
    Clamp,
}

/// Specify how the texture is sampled whenever the pixel being textured maps to an area
/// greater or smaller than one texel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureParams {
    pub wrap: TextureWrap,
    pub filter: TextureFilter,
    pub mipmap: bool,
}

impl Default for TextureParams {
    fn default() -> Self {
        TextureParams {
            wrap: TextureWrap::Repeat,
            filter: TextureFilter::Linear,
            mipmap: true,
        }
    }
}

/// Raw pixels produced by an image decoder, row by row with tightly packed 8-bit
/// channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Result<Self> {
        let image = ImageData {
            width,
            height,
            channels,
            pixels,
        };

        image.validate()?;
        Ok(image)
    }

    /// Decodes a PNG or JPEG image. Gray, gray-alpha, RGB and RGBA images keep their
    /// channel count; anything else is converted to RGBA.
    pub fn decode(bytes: &[u8], flip: bool) -> Result<Self> {
        let mut dynamic = image::load_from_memory(bytes)?;
        if flip {
            dynamic = dynamic.flipv();
        }

        let ((width, height), channels, pixels) = match dynamic {
            DynamicImage::ImageLuma8(v) => (v.dimensions(), 1, v.into_raw()),
            DynamicImage::ImageLumaA8(v) => (v.dimensions(), 2, v.into_raw()),
            DynamicImage::ImageRgb8(v) => (v.dimensions(), 3, v.into_raw()),
            DynamicImage::ImageRgba8(v) => (v.dimensions(), 4, v.into_raw()),
            other => {
                let v = other.to_rgba8();
                (v.dimensions(), 4, v.into_raw())
            }
        };

        ImageData::new(width, height, channels, pixels)
    }

    pub fn format(&self) -> Result<TextureFormat> {
        TextureFormat::from_channels(self.channels)
    }

    pub fn validate(&self) -> Result<()> {
        let format = self.format()?;
        let expected =
            self.width as usize * self.height as usize * usize::from(format.channels());

        if self.width == 0 || self.height == 0 || self.pixels.len() != expected {
            return Err(Error::ImageSizeMismatch(self.pixels.len(), expected));
        }

        Ok(())
    }
}

/// A 2D texture on the GPU.
#[derive(Debug)]
pub struct Texture {
    params: TextureParams,
    format: TextureFormat,
    dimensions: Vector2<u32>,
    id: Option<TextureId>,
}

impl Texture {
    /// Uploads `image`, using its channel count to pick the internal format.
    pub fn create(video: &mut dyn Visitor, params: TextureParams, image: &ImageData) -> Result<Self> {
        image.validate()?;
        let format = image.format()?;

        let id = unsafe { video.create_texture(params, image)? };
        debug!(
            "Created {:?} texture {} of {}x{}.",
            format, id, image.width, image.height
        );

        Ok(Texture {
            params,
            format,
            dimensions: Vector2::new(image.width, image.height),
            id: Some(id),
        })
    }

    #[inline]
    pub fn params(&self) -> TextureParams {
        self.params
    }

    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    #[inline]
    pub fn id(&self) -> Option<TextureId> {
        self.id
    }

    /// Associates this texture with a numbered texture unit.
    pub fn bind(&self, video: &mut dyn Visitor, unit: usize) -> Result<()> {
        if unit >= MAX_TEXTURE_UNITS {
            return Err(Error::TooManyTextureUnits(unit, MAX_TEXTURE_UNITS));
        }

        let id = self.id.ok_or(Error::TextureReleased)?;
        unsafe { video.bind_texture(unit, id) }
    }

    /// Destroys the texture. Calling it twice does nothing.
    pub fn release(&mut self, video: &mut dyn Visitor) -> Result<()> {
        if let Some(id) = self.id.take() {
            unsafe { video.delete_texture(id)? };
            debug!("Released texture {}.", id);
        }

        Ok(())
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            warn!("Texture {} dropped without being released.", id);
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use image::{ImageOutputFormat, Rgb, RgbImage};

    use super::*;

    fn encode(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageOutputFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn channels() {
        assert_eq!(TextureFormat::from_channels(1).unwrap(), TextureFormat::R8);
        assert_eq!(TextureFormat::from_channels(3).unwrap(), TextureFormat::RGB8);
        assert_eq!(TextureFormat::from_channels(4).unwrap(), TextureFormat::RGBA8);
        assert!(TextureFormat::from_channels(0).is_err());
        assert!(TextureFormat::from_channels(5).is_err());
    }

    #[test]
    fn size() {
        assert!(ImageData::new(2, 2, 3, vec![0; 12]).is_ok());
        assert!(ImageData::new(2, 2, 4, vec![0; 12]).is_err());
        assert!(ImageData::new(0, 2, 4, vec![]).is_err());
    }

    #[test]
    fn decode() {
        let mut rgb = RgbImage::new(1, 2);
        rgb.put_pixel(0, 0, Rgb([255, 0, 0]));
        rgb.put_pixel(0, 1, Rgb([0, 0, 255]));
        let bytes = encode(DynamicImage::ImageRgb8(rgb));

        let image = ImageData::decode(&bytes, false).unwrap();
        assert_eq!((image.width, image.height, image.channels), (1, 2, 3));
        assert_eq!(image.pixels, vec![255, 0, 0, 0, 0, 255]);
        assert_eq!(image.format().unwrap(), TextureFormat::RGB8);

        let image = ImageData::decode(&bytes, true).unwrap();
        assert_eq!(image.pixels, vec![0, 0, 255, 255, 0, 0]);

        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::new(3, 1));
        let image = ImageData::decode(&encode(rgba), false).unwrap();
        assert_eq!(image.channels, 4);
        assert_eq!(image.pixels.len(), 12);
    }

    #[test]
    fn garbage() {
        match ImageData::decode(b"not an image", false) {
            Err(Error::Decode(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
