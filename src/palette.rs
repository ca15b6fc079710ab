use crate::{
    error::{Error, Result},
    image::{IndexedImage, Rgb},
};

/// Pixel count per palette index, sized to the image's palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram(Vec<usize>);

impl Histogram {
    pub fn of(image: &IndexedImage) -> Self {
        let mut counts = vec![0; image.palette().len()];
        for &index in image.pixels() {
            counts[usize::from(index)] += 1;
        }
        Self(counts)
    }

    pub fn count(&self, index: u8) -> usize {
        self.0.get(usize::from(index)).copied().unwrap_or(0)
    }

    /// Number of indices referenced by at least one pixel.
    pub fn live_count(&self) -> usize {
        self.0.iter().filter(|&&count| count > 0).count()
    }

    /// Live indices in ascending order.
    pub fn live_indices(&self) -> impl Iterator<Item = u8> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(index, _)| index as u8)
    }
}

/// Old palette index to new palette index. Dead indices have no destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionMap(Vec<Option<u8>>);

impl ConversionMap {
    /// Hands out destinations 0..k to the live indices, ascending by original index.
    pub fn from_histogram(histogram: &Histogram) -> Self {
        let mut slots = vec![None; histogram.0.len()];
        for (destination, index) in histogram.live_indices().enumerate() {
            slots[usize::from(index)] = Some(destination as u8);
        }
        Self(slots)
    }

    pub fn get(&self, index: u8) -> Option<u8> {
        self.0.get(usize::from(index)).copied().flatten()
    }

    /// Number of live indices that have a destination.
    pub fn len(&self) -> usize {
        self.0.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every index maps onto itself, so compaction changes nothing.
    pub fn is_identity(&self) -> bool {
        self.0
            .iter()
            .enumerate()
            .all(|(index, destination)| *destination == Some(index as u8))
    }
}

/// Drops every palette entry no pixel refers to and renumbers the rest.
///
/// Surviving colors keep the ascending order of their original indices and
/// every pixel keeps its exact color. The input image is left untouched.
pub fn compact(image: &IndexedImage) -> Result<IndexedImage> {
    let histogram = Histogram::of(image);
    let conversion = ConversionMap::from_histogram(&histogram);
    if conversion.is_empty() {
        return Err(Error::EmptyPalette);
    }

    let palette: Vec<Rgb> = histogram
        .live_indices()
        .map(|index| image.palette()[usize::from(index)])
        .collect();

    let pixels = image
        .pixels()
        .iter()
        .map(|&index| {
            conversion
                .get(index)
                .ok_or_else(|| Error::invalid_image(format!("pixel index {index} has no destination")))
        })
        .collect::<Result<Vec<u8>>>()?;

    IndexedImage::new(image.width(), image.height(), pixels, palette)
}
