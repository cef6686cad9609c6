//! Reading documents out of one JSON byte stream.

use docschema_profile::Document;
use serde::de::Error as _;
use serde_json::de::IoRead;
use serde_json::{StreamDeserializer, Value};
use std::io::{self, BufRead, Read};

use crate::{to_document, ExtendedJson, SourceError};

/// Layout of a JSON input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// `[` as the first non-blank byte means an array of documents;
    /// anything else is read as a stream of values.
    #[default]
    Auto,
    /// One document per line; blank lines are skipped.
    JsonLines,
    /// A single top-level array of documents.
    JsonArray,
}

/// Lazy iterator over the documents of one reader.
///
/// Stops after the first error.
pub struct JsonDocuments<R: Read> {
    inner: Inner<R>,
    origin: String,
    mode: ExtendedJson,
}

enum Inner<R: Read> {
    Lines {
        reader: R,
        line: usize,
        buf: String,
    },
    Stream {
        stream: StreamDeserializer<'static, IoRead<R>, Value>,
        /// Blank lines consumed before the deserializer took over.
        skipped_lines: usize,
    },
    Array(ArrayElements<R>),
    Done,
}

impl<R: BufRead> JsonDocuments<R> {
    /// `origin` names the input in error messages (usually a file path).
    pub fn new(
        mut reader: R,
        format: InputFormat,
        mode: ExtendedJson,
        origin: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let origin = origin.into();
        let inner = match format {
            InputFormat::JsonLines => Inner::Lines {
                reader,
                line: 0,
                buf: String::new(),
            },
            InputFormat::JsonArray => Inner::Array(ArrayElements::new(reader, 0)),
            InputFormat::Auto => match first_significant_byte(&mut reader) {
                Ok((Some(b'['), skipped_lines)) => {
                    Inner::Array(ArrayElements::new(reader, skipped_lines))
                }
                Ok((_, skipped_lines)) => Inner::Stream {
                    stream: serde_json::Deserializer::from_reader(reader).into_iter::<Value>(),
                    skipped_lines,
                },
                Err(source) => return Err(SourceError::Io { origin, source }),
            },
        };
        Ok(Self {
            inner,
            origin,
            mode,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn next_value(&mut self) -> Option<Result<Value, SourceError>> {
        loop {
            match &mut self.inner {
                Inner::Done => return None,
                Inner::Lines { reader, line, buf } => {
                    buf.clear();
                    match reader.read_line(buf) {
                        Ok(0) => return None,
                        Ok(_) => {
                            *line += 1;
                            let text = buf.trim().trim_start_matches('\u{feff}');
                            if text.is_empty() {
                                continue;
                            }
                            let at = *line;
                            let parsed = serde_json::from_str(text);
                            return Some(parsed.map_err(|e| json_error(&self.origin, at, e)));
                        }
                        Err(source) => {
                            return Some(Err(SourceError::Io {
                                origin: self.origin.clone(),
                                source,
                            }))
                        }
                    }
                }
                Inner::Stream {
                    stream,
                    skipped_lines,
                } => {
                    let skipped = *skipped_lines;
                    let next = stream.next()?;
                    return Some(next.map_err(|e| json_error(&self.origin, skipped + e.line(), e)));
                }
                Inner::Array(elements) => return elements.next_value(&self.origin),
            }
        }
    }
}

fn json_error(origin: &str, line: usize, source: serde_json::Error) -> SourceError {
    SourceError::Json {
        origin: origin.to_string(),
        line,
        source,
    }
}

impl<R: BufRead> Iterator for JsonDocuments<R> {
    type Item = Result<Document, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_value()? {
            Ok(value) => Some(Ok(to_document(value, self.mode))),
            Err(e) => {
                self.inner = Inner::Done;
                Some(Err(e))
            }
        }
    }
}

const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Skip leading whitespace (and a UTF-8 byte order mark) and report the
/// first remaining byte without consuming it, along with the number of
/// newlines skipped.
fn first_significant_byte<R: BufRead>(reader: &mut R) -> io::Result<(Option<u8>, usize)> {
    let mut newlines = 0;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok((None, newlines));
        }
        if buf.starts_with(&BOM) {
            reader.consume(BOM.len());
            continue;
        }
        let (skip, byte) = match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(i) => (i, Some(buf[i])),
            None => (buf.len(), None),
        };
        newlines += buf[..skip].iter().filter(|&&b| b == b'\n').count();
        reader.consume(skip);
        if byte.is_some() {
            return Ok((byte, newlines));
        }
    }
}

// ============================================================================
// Top-level arrays
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayState {
    /// Before the opening `[`.
    Start,
    /// After `[`, no element read yet.
    First,
    /// After an element, expecting `,` or `]`.
    Next,
    Closed,
}

/// Splits a top-level JSON array into its elements one at a time.
///
/// Only the raw bytes of the current element are buffered; each element is
/// parsed on its own, so nothing after the requested element is read.
struct ArrayElements<R> {
    reader: R,
    /// 1-based line of the next unread byte.
    line: usize,
    state: ArrayState,
    raw: Vec<u8>,
}

impl<R: BufRead> ArrayElements<R> {
    fn new(reader: R, skipped_lines: usize) -> Self {
        Self {
            reader,
            line: skipped_lines + 1,
            state: ArrayState::Start,
            raw: Vec::new(),
        }
    }

    fn next_value(&mut self, origin: &str) -> Option<Result<Value, SourceError>> {
        match self.next_element() {
            Ok(Some(start_line)) => Some(
                serde_json::from_slice(&self.raw)
                    .map_err(|e| json_error(origin, start_line + e.line().saturating_sub(1), e)),
            ),
            Ok(None) => None,
            Err(ArrayError::Io(source)) => Some(Err(SourceError::Io {
                origin: origin.to_string(),
                source,
            })),
            Err(ArrayError::Syntax(message)) => Some(Err(json_error(
                origin,
                self.line,
                serde_json::Error::custom(message),
            ))),
        }
    }

    /// Buffers the next element into `raw` and returns the line it starts
    /// on, or `None` once the closing `]` has been read.
    fn next_element(&mut self) -> Result<Option<usize>, ArrayError> {
        match self.state {
            ArrayState::Closed => return Ok(None),
            ArrayState::Start => {
                if self.reader.fill_buf()?.starts_with(&BOM) {
                    self.reader.consume(BOM.len());
                }
                self.skip_whitespace()?;
                if self.peek()? != Some(b'[') {
                    return Err(ArrayError::Syntax("expected `[` at the start of a document array"));
                }
                self.bump(b'[');
                self.state = ArrayState::First;
            }
            ArrayState::First | ArrayState::Next => {}
        }

        self.skip_whitespace()?;
        match (self.peek()?, self.state) {
            (None, _) => return Err(ArrayError::Syntax("EOF while parsing a document array")),
            (Some(b']'), _) => {
                self.bump(b']');
                self.state = ArrayState::Closed;
                self.skip_whitespace()?;
                return match self.peek()? {
                    None => Ok(None),
                    Some(_) => Err(ArrayError::Syntax("trailing characters after document array")),
                };
            }
            (Some(b','), ArrayState::Next) => {
                self.bump(b',');
                self.skip_whitespace()?;
            }
            (Some(_), ArrayState::Next) => {
                return Err(ArrayError::Syntax("expected `,` or `]` in document array"))
            }
            (Some(_), _) => {}
        }

        let start_line = self.line;
        self.raw.clear();
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        while let Some(b) = self.peek()? {
            // Set once a string, object or array at depth 0 is closed.
            let mut complete = false;
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                    complete = depth == 0;
                }
            } else {
                match b {
                    b'"' => in_string = true,
                    b'{' | b'[' => depth += 1,
                    b'}' | b']' if depth == 0 => break,
                    b'}' | b']' => {
                        depth -= 1;
                        complete = depth == 0;
                    }
                    b',' if depth == 0 => break,
                    _ => {}
                }
            }
            self.raw.push(b);
            self.bump(b);
            if complete {
                break;
            }
        }
        self.state = ArrayState::Next;
        Ok(Some(start_line))
    }

    fn peek(&mut self) -> io::Result<Option<u8>> {
        Ok(self.reader.fill_buf()?.first().copied())
    }

    /// Consume `byte`, which the caller has just peeked.
    fn bump(&mut self, byte: u8) {
        if byte == b'\n' {
            self.line += 1;
        }
        self.reader.consume(1);
    }

    fn skip_whitespace(&mut self) -> io::Result<()> {
        while let Some(b) = self.peek()? {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.bump(b);
        }
        Ok(())
    }
}

enum ArrayError {
    Io(io::Error),
    Syntax(&'static str),
}

impl From<io::Error> for ArrayError {
    fn from(e: io::Error) -> Self {
        ArrayError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(text: &str, format: InputFormat) -> Vec<Result<Document, SourceError>> {
        JsonDocuments::new(
            Cursor::new(text.as_bytes().to_vec()),
            format,
            ExtendedJson::Recognise,
            "test",
        )
        .unwrap()
        .collect()
    }

    fn ids(results: Vec<Result<Document, SourceError>>) -> Vec<Document> {
        results.into_iter().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn json_lines_skip_blank_lines() {
        let docs = ids(read_all("{\"a\":1}\n\n  \n{\"b\":2}\n", InputFormat::JsonLines));
        assert_eq!(
            docs,
            vec![
                Document::object([("a", Document::int(1))]),
                Document::object([("b", Document::int(2))]),
            ]
        );
    }

    #[test]
    fn json_lines_errors_carry_line_numbers_and_stop() {
        let results = read_all("{\"a\":1}\n\n{oops}\n{\"b\":2}\n", InputFormat::JsonLines);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(SourceError::Json { origin, line, .. }) => {
                assert_eq!(origin, "test");
                assert_eq!(*line, 3);
            }
            other => panic!("expected JSON error, got {other:?}"),
        }
    }

    #[test]
    fn auto_detects_arrays() {
        let docs = ids(read_all("\n  [{\"a\":1}, {\"a\":2}, 3]", InputFormat::Auto));
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[2], Document::int(3));
    }

    #[test]
    fn auto_streams_concatenated_values() {
        let docs = ids(read_all("{\"a\":1}\n{\"a\":\n 2} {\"a\":3}", InputFormat::Auto));
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[1], Document::object([("a", Document::int(2))]));
    }

    #[test]
    fn auto_skips_byte_order_mark() {
        let docs = ids(read_all("\u{feff}[{\"a\":1}]", InputFormat::Auto));
        assert_eq!(docs, vec![Document::object([("a", Document::int(1))])]);
    }

    #[test]
    fn empty_input_has_no_documents() {
        assert!(read_all("", InputFormat::Auto).is_empty());
        assert!(read_all("   \n", InputFormat::JsonLines).is_empty());
    }

    #[test]
    fn forced_array_rejects_non_arrays() {
        let results = read_all("{\"a\":1}", InputFormat::JsonArray);
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(SourceError::Json { .. })));
    }

    #[test]
    fn stream_errors_stop_iteration() {
        let results = read_all("{\"a\":1} {\"a\": }", InputFormat::Auto);
        assert_eq!(results.len(), 2);
        assert!(results[1].is_err());
    }

    #[test]
    fn arrays_yield_elements_before_reading_the_rest() {
        let mut docs = JsonDocuments::new(
            Cursor::new(b"[{\"a\":1}, {\"b\": }]".to_vec()),
            InputFormat::JsonArray,
            ExtendedJson::Recognise,
            "test",
        )
        .unwrap();
        assert_eq!(
            docs.next().unwrap().unwrap(),
            Document::object([("a", Document::int(1))])
        );
        assert!(matches!(docs.next(), Some(Err(SourceError::Json { .. }))));
        assert!(docs.next().is_none());
    }

    #[test]
    fn array_scan_limit_stops_before_a_bad_element() {
        let source = JsonDocuments::new(
            Cursor::new(b"[{\"a\":1}, {\"b\": }]".to_vec()),
            InputFormat::Auto,
            ExtendedJson::Recognise,
            "export.json",
        )
        .unwrap();
        let fields = docschema_profile::discover(source, docschema_profile::ScanLimit::from_signed(1))
            .unwrap();
        assert_eq!(fields, vec![docschema_profile::FieldPath::new("a")]);
    }

    #[test]
    fn array_elements_may_contain_brackets_in_strings() {
        let docs = ids(read_all(
            "[{\"s\":\"a],{\\\"b\"}, [{\"t\":[1,{\"u\":\"}\"}]}], \"x\"]",
            InputFormat::Auto,
        ));
        assert_eq!(docs.len(), 3);
        assert_eq!(
            docs[0],
            Document::object([("s", Document::string("a],{\"b"))])
        );
        assert_eq!(docs[2], Document::string("x"));
    }

    #[test]
    fn array_errors_report_the_element_line() {
        let results = read_all("\n[\n  {\"a\":1},\n  {\"b\":\n    oops}\n]\n", InputFormat::Auto);
        assert_eq!(results.len(), 2);
        match &results[1] {
            Err(SourceError::Json { line, .. }) => assert_eq!(*line, 5),
            other => panic!("expected JSON error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_array_structure_is_an_error() {
        assert!(read_all("[]", InputFormat::JsonArray).is_empty());
        assert!(read_all(" [ ] \n", InputFormat::Auto).is_empty());

        let missing_comma = read_all("[{\"a\":1} {\"a\":2}]", InputFormat::Auto);
        assert_eq!(missing_comma.len(), 2);
        assert!(missing_comma[1].is_err());

        let unterminated = read_all("[{\"a\":1},", InputFormat::Auto);
        assert_eq!(unterminated.len(), 2);
        assert!(unterminated[1].is_err());

        let trailing = read_all("[{\"a\":1}] x", InputFormat::Auto);
        assert_eq!(trailing.len(), 2);
        assert!(trailing[1].is_err());
    }
}
