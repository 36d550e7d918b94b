//! Inline image embedding.
//!
//! Images are resolved from a map of supplied blobs or through a [`Fetcher`],
//! optionally transcoded (GIF becomes PNG), measured, and written as an RTF
//! picture body with hex-encoded data.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fetch::Fetcher;

/// Twips per pixel.
pub const PIXELS_TO_TWIPS: f64 = 14.988078;

/// Pixel size assumed when neither attributes nor the image give one.
pub const DEFAULT_IMAGE_SIZE: u32 = 40;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Blip format written into the picture group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlipFormat {
    /// `\pngblip`
    Png,
    /// `\jpegblip`
    Jpeg,
}

impl BlipFormat {
    /// Control word introducing the picture data, with its delimiter.
    pub fn control_word(self) -> &'static str {
        match self {
            BlipFormat::Png => "\\pngblip ",
            BlipFormat::Jpeg => "\\jpegblip ",
        }
    }
}

/// A resolved image ready to be written.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// Image bytes as embedded
    pub data: Vec<u8>,
    /// Width in pixels
    pub pixel_width: u32,
    /// Height in pixels
    pub pixel_height: u32,
    /// Width in twips
    pub width: u32,
    /// Height in twips
    pub height: u32,
    /// Blip format
    pub format: BlipFormat,
    /// Whether the bytes were transcoded from GIF
    pub converted: bool,
}

impl EmbeddedImage {
    /// Picture body: goal sizes, format tag and hex data.
    pub fn to_rtf(&self) -> String {
        let mut out = format!(
            "\\picwgoal{}\\pichgoal{}{}",
            self.width,
            self.height,
            self.format.control_word()
        );
        out.reserve(self.data.len() * 2);
        out.push_str(&to_hex(&self.data));
        out
    }
}

/// Resolves image references against supplied blobs and a fetcher.
pub struct ImageEmbedder<'a> {
    images: &'a HashMap<String, Vec<u8>>,
    fetcher: &'a dyn Fetcher,
}

impl<'a> ImageEmbedder<'a> {
    /// Create an embedder over a blob map and a fetcher for everything else.
    pub fn new(images: &'a HashMap<String, Vec<u8>>, fetcher: &'a dyn Fetcher) -> Self {
        Self { images, fetcher }
    }

    /// RTF picture body for `src`, or an empty string when the image cannot
    /// be resolved.
    pub fn embed(&self, src: &str, width_attr: Option<u32>, height_attr: Option<u32>) -> String {
        self.prepare(src, width_attr, height_attr)
            .map(|image| image.to_rtf())
            .unwrap_or_default()
    }

    /// Resolve and measure an image without serializing it.
    pub fn prepare(
        &self,
        src: &str,
        width_attr: Option<u32>,
        height_attr: Option<u32>,
    ) -> Option<EmbeddedImage> {
        let mut data = self.resolve(src)?;
        let reference = src.to_ascii_lowercase();

        let mut converted = false;
        if reference.contains(".gif") {
            match transcode_to_png(&data) {
                Ok(png) => {
                    data = png;
                    converted = true;
                }
                Err(e) => log::warn!("could not convert GIF {}: {}", src, e),
            }
        }

        let detected = detect_dimensions(&data, src);
        if detected.is_none() {
            log::debug!("no dimensions for image {}", src);
        }
        let pixel_width = width_attr
            .or(detected.map(|(w, _)| w))
            .unwrap_or(DEFAULT_IMAGE_SIZE);
        let pixel_height = height_attr
            .or(detected.map(|(_, h)| h))
            .unwrap_or(DEFAULT_IMAGE_SIZE);

        let is_png = matches!(image::guess_format(&data), Ok(ImageFormat::Png));
        let format = if is_png || reference.contains(".png") || converted {
            BlipFormat::Png
        } else {
            BlipFormat::Jpeg
        };

        Some(EmbeddedImage {
            pixel_width,
            pixel_height,
            width: to_twips(pixel_width),
            height: to_twips(pixel_height),
            format,
            converted,
            data,
        })
    }

    /// Image bytes for `src`: the supplied blob under its URL-decoded name
    /// first, the fetcher otherwise.
    pub fn resolve(&self, src: &str) -> Option<Vec<u8>> {
        let key = decode_reference(src);
        if let Some(bytes) = self.images.get(&key).filter(|b| !b.is_empty()) {
            return Some(bytes.clone());
        }

        match self.fetcher.fetch(src) {
            Ok(bytes) if !bytes.is_empty() => Some(bytes),
            Ok(_) => {
                log::warn!("image {} is empty", src);
                None
            }
            Err(e) => {
                log::warn!("could not load image {}: {}", src, e);
                None
            }
        }
    }
}

/// Pixels to twips, rounded half away from zero.
pub fn to_twips(pixels: u32) -> u32 {
    (f64::from(pixels) * PIXELS_TO_TWIPS).round() as u32
}

/// Lowercase two-digit hex of every byte.
pub fn to_hex(data: &[u8]) -> String {
    let mut hex = String::with_capacity(data.len() * 2);
    for &byte in data {
        hex.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
        hex.push(HEX_DIGITS[usize::from(byte & 0x0f)] as char);
    }
    hex
}

/// Decode a reference the way form-encoded names are decoded: `+` is a
/// space, `%XX` a byte. Undecodable input is returned unchanged.
pub fn decode_reference(src: &str) -> String {
    let spaced = src.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => src.to_string(),
    }
}

fn transcode_to_png(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

fn detect_dimensions(data: &[u8], src: &str) -> Option<(u32, u32)> {
    if let Ok(img) = image::load_from_memory(data) {
        return Some((img.width(), img.height()));
    }

    let sniffed = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok());
    if sniffed.is_some() {
        return sniffed;
    }

    let path = Path::new(src);
    if path.is_file() {
        return image::image_dimensions(path).ok();
    }
    None
}
