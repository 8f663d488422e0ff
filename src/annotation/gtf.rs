use std::io::BufRead;
use std::path::Path;

use crate::error::{PulldownError, Result};
use crate::io::open_text;

/// One annotation line (GTF or GFF3), coordinates 1-based inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub seqid: String,
    pub source: String,
    pub kind: String,
    pub start: u64,
    pub end: u64,
    pub strand: char,
    pub attributes: String,
}

impl Feature {
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Look up an attribute in GTF (`key "value";`) or GFF3 (`key=value;`) form.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        for field in self.attributes.split(';') {
            let field = field.trim();
            if let Some(value) = field.strip_prefix(name) {
                if let Some(value) = value.strip_prefix('=') {
                    return Some(value.trim());
                }
                if value.starts_with(char::is_whitespace) {
                    return Some(value.trim().trim_matches('"'));
                }
            }
        }
        None
    }

    /// 0-based half-open range on the sequence.
    pub fn range(&self) -> std::ops::Range<u64> {
        (self.start - 1)..self.end
    }
}

/// Parse a single annotation line; `line_no` is only used in errors.
pub fn parse_feature(line: &str, line_no: usize) -> Result<Feature> {
    let malformed = |reason: &str| PulldownError::MalformedAnnotation {
        line: line_no,
        reason: reason.to_string(),
    };

    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() < 9 {
        return Err(malformed("expected 9 tab-separated columns"));
    }
    let start = cols[3]
        .parse::<u64>()
        .map_err(|_| malformed("start is not a number"))?;
    let end = cols[4]
        .parse::<u64>()
        .map_err(|_| malformed("end is not a number"))?;
    if start == 0 || end < start {
        return Err(malformed("invalid coordinates"));
    }
    let strand = match cols[6] {
        "+" => '+',
        "-" => '-',
        _ => '.',
    };

    Ok(Feature {
        seqid: cols[0].to_string(),
        source: cols[1].to_string(),
        kind: cols[2].to_string(),
        start,
        end,
        strand,
        attributes: cols[8].to_string(),
    })
}

/// Read every feature of an annotation file (gzip allowed).
pub fn read_features(path: impl AsRef<Path>) -> Result<Vec<Feature>> {
    let path = path.as_ref();
    let reader = open_text(path)?;
    let mut features = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| PulldownError::io(path, e))?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        features.push(parse_feature(&line, i + 1)?);
    }
    Ok(features)
}
