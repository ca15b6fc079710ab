#![allow(dead_code)]

use std::{fs, fs::File, path::Path};

use byteorder::{WriteBytesExt, LE};
use palpack::Rgb;

/// Minimal writer for indexed bitmaps.
pub struct Bitmap<'a> {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u16,
    pub pixels: &'a [u8],
    pub palette: &'a [Rgb],
    pub top_down: bool,
    pub core_header: bool,
    /// Compression field of the info header, 1 for RLE8 and 2 for RLE4
    pub compression: u32,
    /// Pixel data written verbatim instead of packing `pixels` into rows
    pub data: Option<&'a [u8]>,
}

impl<'a> Bitmap<'a> {
    pub fn new(width: u32, height: u32, pixels: &'a [u8], palette: &'a [Rgb]) -> Self {
        Self {
            width,
            height,
            bits_per_pixel: 8,
            pixels,
            palette,
            top_down: false,
            core_header: false,
            compression: 0,
            data: None,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let bits = usize::from(self.bits_per_pixel);
        let width = self.width as usize;
        let stride = (width * bits + 31) / 32 * 4;
        let (header_len, entry_len) = if self.core_header { (12, 3) } else { (40, 4) };
        let pixel_offset = 14 + header_len + self.palette.len() * entry_len;
        let data_len = self.data.map_or(stride * self.height as usize, |data| data.len());
        let file_size = pixel_offset + data_len;

        let mut out = Vec::with_capacity(file_size);
        out.extend_from_slice(b"BM");
        out.write_u32::<LE>(file_size as u32).unwrap();
        out.write_u32::<LE>(0).unwrap();
        out.write_u32::<LE>(pixel_offset as u32).unwrap();
        out.write_u32::<LE>(header_len as u32).unwrap();
        if self.core_header {
            out.write_u16::<LE>(self.width as u16).unwrap();
            out.write_u16::<LE>(self.height as u16).unwrap();
            out.write_u16::<LE>(1).unwrap();
            out.write_u16::<LE>(self.bits_per_pixel).unwrap();
        } else {
            let height = self.height as i32;
            out.write_i32::<LE>(self.width as i32).unwrap();
            out.write_i32::<LE>(if self.top_down { -height } else { height }).unwrap();
            out.write_u16::<LE>(1).unwrap();
            out.write_u16::<LE>(self.bits_per_pixel).unwrap();
            out.write_u32::<LE>(self.compression).unwrap();
            out.write_u32::<LE>(data_len as u32).unwrap();
            out.write_i32::<LE>(2835).unwrap();
            out.write_i32::<LE>(2835).unwrap();
            out.write_u32::<LE>(self.palette.len() as u32).unwrap();
            out.write_u32::<LE>(0).unwrap();
        }
        for &[r, g, b] in self.palette {
            out.extend_from_slice(&[b, g, r]);
            if !self.core_header {
                out.push(0);
            }
        }

        if let Some(data) = self.data {
            out.extend_from_slice(data);
            return out;
        }

        let rows: Vec<&[u8]> = self.pixels.chunks(width).collect();
        let ordered: Vec<&[u8]> = if self.top_down { rows } else { rows.into_iter().rev().collect() };
        for row in ordered {
            let mut line: Vec<u8> = row
                .chunks(8 / bits)
                .map(|group| {
                    group
                        .iter()
                        .enumerate()
                        .fold(0u8, |byte, (slot, &index)| byte | index << (8 - bits * (slot + 1)))
                })
                .collect();
            line.resize(stride, 0);
            out.extend_from_slice(&line);
        }
        out
    }

    pub fn write(&self, path: &Path) {
        fs::write(path, self.encode()).unwrap();
    }
}

/// Palette with a distinct color for every index.
pub fn rainbow(len: usize) -> Vec<Rgb> {
    (0..len).map(|i| [i as u8, 255 - i as u8, (i as u8).rotate_left(3)]).collect()
}

pub struct DecodedPng {
    pub width: u32,
    pub height: u32,
    pub bit_depth: usize,
    pub palette: Vec<Rgb>,
    pub indices: Vec<u8>,
}

pub fn read_png(path: &Path) -> DecodedPng {
    let mut decoder = png::Decoder::new(File::open(path).unwrap());
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info().unwrap();
    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer).unwrap();
    assert_eq!(frame.color_type, png::ColorType::Indexed);

    let bits = match frame.bit_depth {
        png::BitDepth::One => 1,
        png::BitDepth::Two => 2,
        png::BitDepth::Four => 4,
        png::BitDepth::Eight => 8,
        depth => panic!("unexpected bit depth {depth:?}"),
    };
    let mask = ((1u16 << bits) - 1) as u8;
    let indices = buffer[..frame.buffer_size()]
        .chunks(frame.line_size)
        .flat_map(|line| {
            line.iter()
                .flat_map(move |&byte| (0..8 / bits).map(move |slot| (byte >> (8 - bits * (slot + 1))) & mask))
                .take(frame.width as usize)
        })
        .collect();
    let palette = reader
        .info()
        .palette
        .as_ref()
        .unwrap()
        .chunks(3)
        .map(|rgb| [rgb[0], rgb[1], rgb[2]])
        .collect();

    DecodedPng {
        width: frame.width,
        height: frame.height,
        bit_depth: bits,
        palette,
        indices,
    }
}
