// src/io/fastq.rs
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{PulldownError, Result};
use crate::io::{is_gzip, open_text};

/// A 4-line read record, kept verbatim.
///
/// Fields hold the line text without its terminator; `line_ending` is the
/// terminator of the header line (`\n` or `\r\n`) and is written back
/// after every line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqRecord {
    pub header: String,
    pub sequence: String,
    pub plus: String,
    pub quality: String,
    pub line_ending: &'static str,
}

pub fn open_fastq(path: impl AsRef<Path>) -> Result<Box<dyn BufRead>> {
    open_text(path)
}

/// Stream FASTQ records for memory-efficient processing
///
/// Records are read four lines at a time and never materialised as a whole
/// file. A trailing group of fewer than four lines is dropped.
pub fn stream_fastq_records<R: BufRead>(reader: R, path: impl Into<PathBuf>) -> FastqStreamParser<R> {
    FastqStreamParser {
        reader,
        path: path.into(),
    }
}

/// Iterator adaptor to handle streaming FASTQ parsing
pub struct FastqStreamParser<R: BufRead> {
    reader: R,
    path: PathBuf,
}

impl<R: BufRead> FastqStreamParser<R> {
    /// Next line with its terminator split off, `None` at end of input.
    fn next_line(&mut self) -> Option<Result<(String, &'static str)>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let ending = if line.ends_with("\r\n") {
                    "\r\n"
                } else {
                    "\n"
                };
                let text_len = line.trim_end_matches(['\r', '\n']).len();
                line.truncate(text_len);
                Some(Ok((line, ending)))
            }
            Err(e) => Some(Err(PulldownError::io(&self.path, e))),
        }
    }
}

impl<R: BufRead> Iterator for FastqStreamParser<R> {
    type Item = Result<FastqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut group: [String; 4] = Default::default();
        let mut line_ending = "\n";
        for (i, slot) in group.iter_mut().enumerate() {
            match self.next_line()? {
                Ok((line, ending)) => {
                    if i == 0 {
                        line_ending = ending;
                    }
                    *slot = line;
                }
                Err(e) => return Some(Err(e)),
            }
        }
        let [header, sequence, plus, quality] = group;
        Some(Ok(FastqRecord {
            header,
            sequence,
            plus,
            quality,
            line_ending,
        }))
    }
}

/// Stream paired FASTQ records in lockstep.
///
/// Pairing is positional and stops at the end of the shorter stream.
pub fn stream_paired_fastq_records<R1: BufRead, R2: BufRead>(
    left: FastqStreamParser<R1>,
    right: FastqStreamParser<R2>,
) -> impl Iterator<Item = Result<(FastqRecord, FastqRecord)>> {
    left.zip(right)
        .map(|(l, r)| -> Result<(FastqRecord, FastqRecord)> { Ok((l?, r?)) })
}

pub enum FastqWriter {
    Plain(BufWriter<File>),
    Compressed(BufWriter<GzEncoder<File>>),
}

impl FastqWriter {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| PulldownError::io(path, e))?;
        if is_gzip(path) {
            let encoder = GzEncoder::new(file, Compression::default());
            Ok(FastqWriter::Compressed(BufWriter::new(encoder)))
        } else {
            Ok(FastqWriter::Plain(BufWriter::new(file)))
        }
    }

    pub fn write_record(&mut self, record: &FastqRecord) -> io::Result<()> {
        let writer: &mut dyn Write = match self {
            FastqWriter::Plain(writer) => writer,
            FastqWriter::Compressed(writer) => writer,
        };
        for line in [&record.header, &record.sequence, &record.plus, &record.quality] {
            writer.write_all(line.as_bytes())?;
            writer.write_all(record.line_ending.as_bytes())?;
        }
        Ok(())
    }

    pub fn finish(self) -> io::Result<()> {
        match self {
            FastqWriter::Plain(mut writer) => writer.flush(),
            FastqWriter::Compressed(writer) => {
                let encoder = writer.into_inner().map_err(|e| e.into_error())?;
                encoder.finish()?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parser(text: &str) -> FastqStreamParser<Cursor<String>> {
        stream_fastq_records(Cursor::new(text.to_string()), "test.fq")
    }

    #[test]
    fn test_stream_records() {
        let records: Vec<FastqRecord> = parser("@r1\nACGT\n+\nIIII\n@r2\nGGCC\n+r2\n!!!!\n")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].header, "@r2");
        assert_eq!(records[1].plus, "+r2");
        assert_eq!(records[1].quality, "!!!!");
    }

    #[test]
    fn test_ragged_tail_not_yielded() {
        let records: Vec<FastqRecord> = parser("@r1\nACGT\n+\nIIII\n@r2\nGG\n")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_paired_truncates_to_shorter() {
        let left = parser("@a\nA\n+\nI\n@b\nC\n+\nI\n@c\nG\n+\nI\n");
        let right = parser("@a\nT\n+\nI\n");
        let pairs: Vec<_> = stream_paired_fastq_records(left, right)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.sequence, "A");
        assert_eq!(pairs[0].1.sequence, "T");
    }

    #[test]
    fn test_writer_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fastq");
        let record = FastqRecord {
            header: "@read/1 extra".into(),
            sequence: "ACGTN".into(),
            plus: "+".into(),
            quality: "IIII#".into(),
            line_ending: "\n",
        };
        let mut writer = FastqWriter::new(&path).unwrap();
        writer.write_record(&record).unwrap();
        writer.finish().unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "@read/1 extra\nACGTN\n+\nIIII#\n");
    }

    #[test]
    fn test_crlf_records_round_trip() {
        let text = "@r\r\nGATTACA\r\n+\r\nIIIIIII\r\n";
        let records: Vec<FastqRecord> = parser(text).collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, "GATTACA");
        assert_eq!(records[0].line_ending, "\r\n");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fastq");
        let mut writer = FastqWriter::new(&path).unwrap();
        writer.write_record(&records[0]).unwrap();
        writer.finish().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_missing_final_newline() {
        let records: Vec<FastqRecord> = parser("@r1\nACGT\n+\nIIII").collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].quality, "IIII");
        assert_eq!(records[0].line_ending, "\n");
    }
}
