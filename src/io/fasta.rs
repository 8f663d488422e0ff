// src/io/fasta.rs
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{PulldownError, Result};
use crate::io::{is_gzip, is_stdio, open_text};

/// A named sequence; multi-line sequences are joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub name: String,
    pub sequence: String,
}

impl FastaRecord {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        FastaRecord {
            name: name.into(),
            sequence: sequence.into(),
        }
    }

    /// First whitespace-delimited token of the name line.
    pub fn id(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}

/// Open a FASTA file for reading, handles gzipped files and `-` for stdin
pub fn open_fasta(path: impl AsRef<Path>) -> Result<Box<dyn BufRead>> {
    open_text(path)
}

/// Streaming FASTA parser yielding one record at a time.
pub struct FastaReader<R: BufRead> {
    lines: Lines<R>,
    pending: Option<String>,
    path: PathBuf,
}

impl<R: BufRead> FastaReader<R> {
    /// `path` is only used to label errors.
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        FastaReader {
            lines: reader.lines(),
            pending: None,
            path: path.into(),
        }
    }

    fn next_line(&mut self) -> Option<Result<String>> {
        self.lines
            .next()
            .map(|line| line.map_err(|e| PulldownError::io(&self.path, e)))
    }
}

impl FastaReader<Box<dyn BufRead>> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Ok(FastaReader::new(open_fasta(path)?, path))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = match self.pending.take() {
            Some(name) => name,
            None => loop {
                match self.next_line()? {
                    Ok(line) => {
                        if let Some(name) = line.strip_prefix('>') {
                            break name.trim_end().to_string();
                        }
                    }
                    Err(e) => return Some(Err(e)),
                }
            },
        };

        let mut sequence = String::new();
        while let Some(line) = self.next_line() {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            if let Some(next_name) = line.strip_prefix('>') {
                self.pending = Some(next_name.trim_end().to_string());
                break;
            }
            sequence.push_str(line.trim());
        }

        Some(Ok(FastaRecord { name, sequence }))
    }
}

/// Load every record of a FASTA file, preserving order.
pub fn read_fasta_records(path: impl AsRef<Path>) -> Result<Vec<FastaRecord>> {
    FastaReader::from_path(path)?.collect()
}

pub enum FastaWriter {
    Plain(BufWriter<File>),
    Compressed(BufWriter<GzEncoder<File>>),
    Stdout(BufWriter<io::Stdout>),
}

impl FastaWriter {
    /// Create a writer; `.gz` paths are compressed and `-` writes to stdout.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if is_stdio(path) {
            return Ok(FastaWriter::Stdout(BufWriter::new(io::stdout())));
        }
        let file = File::create(path).map_err(|e| PulldownError::io(path, e))?;
        if is_gzip(path) {
            let encoder = GzEncoder::new(file, Compression::default());
            Ok(FastaWriter::Compressed(BufWriter::new(encoder)))
        } else {
            Ok(FastaWriter::Plain(BufWriter::new(file)))
        }
    }

    fn inner(&mut self) -> &mut dyn Write {
        match self {
            FastaWriter::Plain(writer) => writer,
            FastaWriter::Compressed(writer) => writer,
            FastaWriter::Stdout(writer) => writer,
        }
    }

    pub fn write_record(&mut self, name: &str, sequence: &str) -> io::Result<()> {
        let writer = self.inner();
        writeln!(writer, ">{}", name)?;
        writeln!(writer, "{}", sequence)
    }

    /// Flush buffers and finish the gzip stream, if any.
    pub fn finish(self) -> io::Result<()> {
        match self {
            FastaWriter::Plain(mut writer) => writer.flush(),
            FastaWriter::Stdout(mut writer) => writer.flush(),
            FastaWriter::Compressed(writer) => {
                let encoder = writer.into_inner().map_err(|e| e.into_error())?;
                encoder.finish()?;
                Ok(())
            }
        }
    }
}
