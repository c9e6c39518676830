//! Line-oriented record grouping.
//!
//! Contiguous non-blank lines form one record block; a blank line closes
//! it. A block still open when the line sequence ends is not emitted.
//! [`TerminatedLines`] treats a final line terminator as ending the last
//! line, so a stream that ends in `\n` closes its last record while a stream
//! cut off mid-line drops it.

use std::io::{self, BufRead};

use serde::Serialize;

/// One `Label: Value` line, both sides trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawField {
    pub label: String,
    pub value: String,
    /// 1-based line number within the stream.
    pub line: usize,
}

impl RawField {
    /// Split on the first `:`. A line without a colon becomes a label with an
    /// empty value.
    fn from_line(line: &str, line_no: usize) -> Self {
        let (label, value) = line.split_once(':').unwrap_or((line, ""));
        Self {
            label: label.trim().to_string(),
            value: value.trim().to_string(),
            line: line_no,
        }
    }
}

/// The raw fields of one record, in stream order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedRecordBlock {
    pub fields: Vec<RawField>,
}

impl ParsedRecordBlock {
    /// Line number of the first field in the block.
    pub fn first_line(&self) -> usize {
        self.fields.first().map(|f| f.line).unwrap_or(0)
    }
}

/// Lazy iterator of record blocks over a fallible line sequence.
///
/// Not restartable: once the underlying lines are exhausted (or yield an
/// error) the iterator is fused.
pub struct RecordBlocks<I> {
    lines: I,
    line_no: usize,
    current: Vec<RawField>,
    finished: bool,
}

impl<I> RecordBlocks<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            line_no: 0,
            current: Vec::new(),
            finished: false,
        }
    }

    /// Fields accumulated after the last blank line. After the iterator is
    /// exhausted these are the fields of the unterminated trailing record,
    /// which was not emitted.
    pub fn unterminated(&self) -> &[RawField] {
        &self.current
    }
}

impl<R: BufRead> RecordBlocks<TerminatedLines<R>> {
    pub fn from_reader(reader: R) -> Self {
        Self::new(TerminatedLines::new(reader))
    }
}

impl<'a> RecordBlocks<TerminatedLines<&'a [u8]>> {
    pub fn from_text(text: &'a str) -> Self {
        Self::from_reader(text.as_bytes())
    }
}

impl<I, L> Iterator for RecordBlocks<I>
where
    I: Iterator<Item = io::Result<L>>,
    L: AsRef<str>,
{
    type Item = io::Result<ParsedRecordBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let line = match self.lines.next() {
                None => {
                    self.finished = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                Some(Ok(line)) => line,
            };
            self.line_no += 1;

            let line = line.as_ref();
            if line.trim().is_empty() {
                if !self.current.is_empty() {
                    let fields = std::mem::take(&mut self.current);
                    return Some(Ok(ParsedRecordBlock { fields }));
                }
                continue;
            }
            self.current.push(RawField::from_line(line, self.line_no));
        }
    }
}

/// Splits a reader into lines without their terminators.
///
/// Unlike [`BufRead::lines`], a stream that ends right after a `\n` yields
/// one final empty line, so the end of the last line is observable. Bytes
/// that are not valid UTF-8 decode to U+FFFD instead of failing the stream,
/// and a leading byte-order mark is dropped.
pub struct TerminatedLines<R> {
    reader: R,
    started: bool,
    ended_with_terminator: bool,
    finished: bool,
}

const BOM: char = '\u{FEFF}';

impl<R: BufRead> TerminatedLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            started: false,
            ended_with_terminator: false,
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for TerminatedLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                self.finished = true;
                self.ended_with_terminator.then(String::new).map(Ok)
            }
            Ok(_) => {
                self.ended_with_terminator = buf.ends_with(b"\n");
                if self.ended_with_terminator {
                    buf.pop();
                    if buf.ends_with(b"\r") {
                        buf.pop();
                    }
                }
                let mut line = String::from_utf8_lossy(&buf).into_owned();
                if !self.started {
                    self.started = true;
                    if line.starts_with(BOM) {
                        line.remove(0);
                    }
                }
                Some(Ok(line))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
