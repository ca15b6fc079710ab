use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufWriter, Cursor, Write},
    path::Path,
};

use image::{codecs::bmp::BmpDecoder, DynamicImage, ImageDecoder, ImageError};

use crate::error::{Error, Result};

pub type Rgb = [u8; 3];

pub const MAX_PALETTE_LEN: usize = 256;

/// A grid of one-byte palette indices plus the palette they point into.
///
/// Every index in the grid is guaranteed to address an entry of the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    palette: Vec<Rgb>,
}

impl IndexedImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, palette: Vec<Rgb>) -> Result<Self> {
        if palette.len() > MAX_PALETTE_LEN {
            return Err(Error::invalid_image(format!(
                "palette has {} entries, at most {MAX_PALETTE_LEN} are allowed",
                palette.len()
            )));
        }
        let area = width as usize * height as usize;
        if pixels.len() != area {
            return Err(Error::invalid_image(format!(
                "{} pixels for a {width}x{height} grid",
                pixels.len()
            )));
        }
        if let Some(index) = pixels.iter().find(|&&index| usize::from(index) >= palette.len()) {
            return Err(Error::invalid_image(format!(
                "pixel index {index} is outside the {}-entry palette",
                palette.len()
            )));
        }

        Ok(Self { width, height, pixels, palette })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major palette indices.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn color_at(&self, x: u32, y: u32) -> Rgb {
        let index = self.pixels[y as usize * self.width as usize + x as usize];
        self.palette[usize::from(index)]
    }
}

fn malformed(err: ImageError) -> Error {
    Error::invalid_image(err.to_string())
}

/// Decodes an indexed bitmap, uncompressed or RLE, recovering each pixel's palette index.
///
/// Indices are looked up from the decoded colors, so entries sharing one color
/// collapse onto the first of them.
pub fn decode_bmp(bytes: &[u8]) -> Result<IndexedImage> {
    let decoder = BmpDecoder::new(Cursor::new(bytes)).map_err(malformed)?;
    let palette: Vec<Rgb> = decoder
        .get_palette()
        .ok_or_else(|| Error::invalid_image("not an indexed-color bitmap"))?
        .to_vec();
    let (width, height) = decoder.dimensions();
    let rgb = DynamicImage::from_decoder(decoder).map_err(malformed)?.into_rgb8();

    let mut reverse_palette: HashMap<Rgb, u8> = HashMap::new();
    for (index, &color) in palette.iter().enumerate() {
        reverse_palette.entry(color).or_insert(index as u8);
    }
    let pixels = rgb
        .pixels()
        .map(|pixel| {
            reverse_palette
                .get(&pixel.0)
                .copied()
                .ok_or_else(|| Error::invalid_image(format!("color {:?} is not in the palette", pixel.0)))
        })
        .collect::<Result<Vec<u8>>>()?;

    IndexedImage::new(width, height, pixels, palette)
}

pub fn load_bmp(path: &Path) -> Result<IndexedImage> {
    let bytes = fs::read(path)?;
    decode_bmp(&bytes)
}

/// Smallest PNG bit depth able to address every palette entry.
fn bit_depth_for(palette_len: usize) -> (png::BitDepth, usize) {
    match palette_len {
        0..=2 => (png::BitDepth::One, 1),
        3..=4 => (png::BitDepth::Two, 2),
        5..=16 => (png::BitDepth::Four, 4),
        _ => (png::BitDepth::Eight, 8),
    }
}

fn pack_rows(image: &IndexedImage, bits: usize) -> Vec<u8> {
    if bits == 8 {
        return image.pixels.clone();
    }
    image
        .pixels
        .chunks(image.width as usize)
        .flat_map(|row| row.chunks(8 / bits))
        .map(|group| {
            group
                .iter()
                .enumerate()
                .fold(0u8, |byte, (slot, &index)| byte | index << (8 - bits * (slot + 1)))
        })
        .collect()
}

/// Writes `image` as an indexed-color PNG at the best zlib compression level.
pub fn encode_png<W: Write>(image: &IndexedImage, writer: W) -> Result<()> {
    if image.palette.is_empty() {
        return Err(Error::EmptyPalette);
    }
    if image.width == 0 || image.height == 0 {
        return Err(Error::invalid_image("cannot encode a zero-sized image"));
    }

    let (depth, bits) = bit_depth_for(image.palette.len());
    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(depth);
    encoder.set_palette(image.palette.iter().flatten().copied().collect::<Vec<u8>>());
    encoder.set_compression(png::Compression::Best);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&pack_rows(image, bits))?;
    writer.finish()?;
    Ok(())
}

pub fn save_png(image: &IndexedImage, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    encode_png(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}
