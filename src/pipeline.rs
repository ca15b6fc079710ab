use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    error::Error,
    image::{load_bmp, save_png},
    palette::compact,
    resources::{generate, write_table, ResourceEntry, TableConfig},
};

pub const BITMAP_EXTENSION: &str = "bmp";
pub const PNG_EXTENSION: &str = "png";

/// Where to look for assets and how to render the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub asset_dir: PathBuf,
    /// Table destination; relative paths are taken relative to `asset_dir`
    pub output: PathBuf,
    pub table: TableConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("."),
            output: PathBuf::from("../src/resources.ts"),
            table: TableConfig::default(),
        }
    }
}

impl Config {
    pub fn output_path(&self) -> PathBuf {
        self.asset_dir.join(&self.output)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compaction {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub colors_before: usize,
    pub colors_after: usize,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub compactions: Vec<Compaction>,
    pub resources: Vec<String>,
    pub table: PathBuf,
}

/// Regular files directly inside `dir` whose extension matches, sorted by file name.
pub fn scan(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to scan {}", dir.display()))? {
        let entry = entry.with_context(|| format!("failed to scan {}", dir.display()))?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case(extension));
        if !matches {
            continue;
        }
        // Follows symlinks, so a linked bitmap counts as a file.
        let metadata = fs::metadata(&path).with_context(|| format!("failed to inspect {}", path.display()))?;
        if metadata.is_file() {
            paths.push(path);
        }
    }
    let paths: Vec<PathBuf> = paths.into_iter().sorted_by(|a, b| a.file_name().cmp(&b.file_name())).collect();
    debug!("found {} .{} files in {}", paths.len(), extension, dir.display());
    Ok(paths)
}

/// Compacts the palette of one bitmap and stores it as a PNG next to it.
pub fn compact_bitmap(source: &Path) -> Result<Compaction> {
    let image = load_bmp(source).with_context(|| format!("failed to read {}", source.display()))?;
    let compacted = compact(&image).with_context(|| format!("failed to compact {}", source.display()))?;

    let destination = source.with_extension(PNG_EXTENSION);
    save_png(&compacted, &destination).with_context(|| format!("failed to write {}", destination.display()))?;

    info!(
        "compacted {} -> {} ({} -> {} colors)",
        source.display(),
        destination.display(),
        image.palette().len(),
        compacted.palette().len()
    );
    Ok(Compaction {
        source: source.to_path_buf(),
        destination,
        colors_before: image.palette().len(),
        colors_after: compacted.palette().len(),
    })
}

/// Fails when two bitmaps would be written to the same PNG, e.g. `a.bmp` and `a.BMP`.
fn check_destinations(bitmaps: &[PathBuf]) -> Result<()> {
    let mut destinations: HashMap<PathBuf, &PathBuf> = HashMap::new();
    for source in bitmaps {
        let destination = source.with_extension(PNG_EXTENSION);
        if let Some(other) = destinations.get(&destination) {
            let name = destination
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Err(anyhow::Error::new(Error::DuplicateResourceName(name)).context(format!(
                "{} and {} would both be written to {}",
                other.display(),
                source.display(),
                destination.display()
            )));
        }
        destinations.insert(destination, source);
    }
    Ok(())
}

/// Compacts every bitmap in the asset directory, then embeds every PNG found there into the table.
pub fn run(config: &Config) -> Result<Report> {
    let bitmaps = scan(&config.asset_dir, BITMAP_EXTENSION)?;
    check_destinations(&bitmaps)?;
    let compactions: Vec<Compaction> = bitmaps
        .par_iter()
        .map(|path| compact_bitmap(path))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .sorted_by(|a, b| a.source.cmp(&b.source))
        .collect();

    let entries = scan(&config.asset_dir, PNG_EXTENSION)?
        .iter()
        .map(|path| ResourceEntry::from_file(path).with_context(|| format!("failed to embed {}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    let table_path = config.output_path();
    let table = generate(&entries, &config.table)
        .with_context(|| format!("failed to generate {}", table_path.display()))?;
    write_table(&table, &table_path).with_context(|| format!("failed to write {}", table_path.display()))?;

    Ok(Report {
        compactions,
        resources: entries.into_iter().map(|entry| entry.name).collect(),
        table: table_path,
    })
}
