use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{PulldownError, Result};

/// Distinct k-mers of a read pair found in the wanted set, per read and strand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OverlapCounts {
    pub lhs_fwd: u32,
    pub lhs_rev: u32,
    pub rhs_fwd: u32,
    pub rhs_rev: u32,
}

impl OverlapCounts {
    pub fn total(&self) -> u64 {
        self.lhs_fwd as u64 + self.lhs_rev as u64 + self.rhs_fwd as u64 + self.rhs_rev as u64
    }

    pub fn is_hit(&self) -> bool {
        self.total() > 0
    }
}

/// Key for a read-file pair: the longest common prefix of both names,
/// trailing underscores removed.
pub fn pair_key(left: &str, right: &str) -> String {
    let prefix_len: usize = left
        .chars()
        .zip(right.chars())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .sum();
    let key = left[..prefix_len].trim_end_matches('_');
    if key.is_empty() {
        format!("{},{}", left, right)
    } else {
        key.to_string()
    }
}

/// file-pair key -> overlap tuple -> number of read pairs.
///
/// Both levels are ordered maps, so iteration is already in output order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PulldownStats {
    table: BTreeMap<String, BTreeMap<OverlapCounts, u64>>,
}

impl PulldownStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &str, counts: OverlapCounts) {
        if let Some(row) = self.table.get_mut(key) {
            *row.entry(counts).or_insert(0) += 1;
        } else {
            self.table
                .entry(key.to_string())
                .or_default()
                .insert(counts, 1);
        }
    }

    pub fn get(&self, key: &str, counts: &OverlapCounts) -> u64 {
        self.table
            .get(key)
            .and_then(|row| row.get(counts))
            .copied()
            .unwrap_or(0)
    }

    /// Number of (file-pair, tuple) rows.
    pub fn rows(&self) -> usize {
        self.table.values().map(BTreeMap::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OverlapCounts, u64)> {
        self.table.iter().flat_map(|(key, row)| {
            row.iter()
                .map(move |(counts, &n)| (key.as_str(), counts, n))
        })
    }

    pub fn write_tsv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "source\tlhsFwd\tlhsRev\trhsFwd\trhsRev\tcount")?;
        for (key, c, n) in self.iter() {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}",
                key, c.lhs_fwd, c.lhs_rev, c.rhs_fwd, c.rhs_rev, n
            )?;
        }
        writer.flush()
    }

    pub fn write_tsv_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| PulldownError::io(path, e))?;
        self.write_tsv(BufWriter::new(file))
            .map_err(|e| PulldownError::io(path, e))
    }
}

/// Per file-pair totals for the JSON run summary.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PairSummary {
    pub source: String,
    pub left: String,
    pub right: String,
    pub total_pairs: u64,
    pub kept_pairs: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub k: usize,
    pub wanted_kmers: usize,
    pub pairs: Vec<PairSummary>,
}

impl RunSummary {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| PulldownError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| PulldownError::io(path, e.into()))?;
        writer.flush().map_err(|e| PulldownError::io(path, e))
    }
}
