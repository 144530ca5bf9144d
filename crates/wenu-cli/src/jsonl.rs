//! JSON Lines input and output.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Lazily parsed records of a JSON Lines file; blank lines are skipped.
pub struct JsonLines<T> {
    path: PathBuf,
    lines: std::io::Lines<BufReader<File>>,
    line_no: usize,
    _record: std::marker::PhantomData<T>,
}

impl<T: DeserializeOwned> JsonLines<T> {
    /// Open `path` for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
            _record: std::marker::PhantomData,
        })
    }
}

impl<T: DeserializeOwned> Iterator for JsonLines<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    return Some(
                        Err(e).with_context(|| format!("reading {}", self.path.display())),
                    );
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(serde_json::from_str(&line).with_context(|| {
                format!("{}:{}: malformed record", self.path.display(), self.line_no)
            }));
        }
    }
}

/// Sink writing one JSON document per line, to a file or stdout.
pub struct JsonLinesWriter {
    out: Box<dyn Write>,
    written: usize,
}

impl JsonLinesWriter {
    /// Write to `path`, or to stdout when `None`.
    pub fn create(path: Option<&Path>) -> Result<Self> {
        let out: Box<dyn Write> = match path {
            Some(p) => Box::new(BufWriter::new(
                File::create(p).with_context(|| format!("creating {}", p.display()))?,
            )),
            None => Box::new(BufWriter::new(std::io::stdout())),
        };
        Ok(Self { out, written: 0 })
    }

    /// Append one record.
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flush and return the number of records written.
    pub fn finish(mut self) -> Result<usize> {
        self.out.flush()?;
        Ok(self.written)
    }
}
