use ahash::AHashMap;
use bio::data_structures::interval_tree::IntervalTree;
use std::io::BufRead;
use std::ops::Range;
use std::path::Path;

use crate::error::{PulldownError, Result};
use crate::io::open_text;

/// Genomic regions indexed per sequence for overlap queries.
///
/// An empty set admits everything.
#[derive(Default)]
pub struct RegionSet {
    trees: AHashMap<String, IntervalTree<u64, ()>>,
    len: usize,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a 0-based half-open range.
    pub fn insert(&mut self, seqid: &str, range: Range<u64>) {
        self.trees
            .entry(seqid.to_string())
            .or_insert_with(IntervalTree::new)
            .insert(range, ());
        self.len += 1;
    }

    /// Add a region written as `chr`, `chr:start-end` (1-based inclusive).
    pub fn insert_region(&mut self, region: &str) -> Result<()> {
        let invalid = || PulldownError::InvalidRegion(region.to_string());
        match region.rsplit_once(':') {
            None if !region.is_empty() => {
                self.insert(region, 0..u64::MAX);
                Ok(())
            }
            None => Err(invalid()),
            Some((seqid, coords)) => {
                let (start, end) = coords.split_once('-').ok_or_else(invalid)?;
                let start: u64 = start.replace(',', "").parse().map_err(|_| invalid())?;
                let end: u64 = end.replace(',', "").parse().map_err(|_| invalid())?;
                if seqid.is_empty() || start == 0 || end < start {
                    return Err(invalid());
                }
                self.insert(seqid, (start - 1)..end);
                Ok(())
            }
        }
    }

    /// Load a BED file (0-based half-open; extra columns ignored).
    pub fn load_bed(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        for line in open_text(path)?.lines() {
            let line = line.map_err(|e| PulldownError::io(path, e))?;
            if line.is_empty() || line.starts_with('#') || line.starts_with("track") || line.starts_with("browser") {
                continue;
            }
            let cols: Vec<&str> = line.split('\t').collect();
            let invalid = || PulldownError::InvalidRegion(line.clone());
            if cols.len() < 3 {
                return Err(invalid());
            }
            let start: u64 = cols[1].parse().map_err(|_| invalid())?;
            let end: u64 = cols[2].parse().map_err(|_| invalid())?;
            if end <= start {
                return Err(invalid());
            }
            self.insert(cols[0], start..end);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if the 0-based half-open range overlaps any region, or the set is empty.
    pub fn admits(&self, seqid: &str, range: Range<u64>) -> bool {
        if self.is_empty() {
            return true;
        }
        self.trees
            .get(seqid)
            .is_some_and(|tree| tree.find(range).next().is_some())
    }
}
