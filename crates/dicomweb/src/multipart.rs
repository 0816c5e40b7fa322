//! multipart/related codec
//!
//! Outgoing STOW-RS bodies are built with [`MultipartRelated`]. Incoming WADO-RS
//! responses are decoded by [`frame_and_parse`], which rebuilds a complete MIME
//! message from the HTTP header map and the raw body before parsing it. The
//! HTTP layer has already consumed the header block, but the boundary lives in
//! the `Content-Type` header, so the parser needs both halves in one byte
//! stream.

use base64::{engine::general_purpose, Engine as _};
use bytes::{BufMut, Bytes, BytesMut};
use http::HeaderMap;

use crate::error::{DicomWebError, Result};

/// One body segment of a multipart message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodySegment {
    /// Segment headers in wire order, names as received
    pub headers: Vec<(String, String)>,

    /// Payload after transfer decoding
    pub payload: Bytes,
}

impl BodySegment {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// A decoded multipart document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartMessage {
    /// Media type of the whole document, lowercased (e.g. `multipart/related`)
    pub media_type: String,

    pub boundary: String,

    pub segments: Vec<BodySegment>,
}

impl MultipartMessage {
    /// Consume the message, keeping only the segment payloads in order
    pub fn into_payloads(self) -> Vec<Bytes> {
        self.segments.into_iter().map(|s| s.payload).collect()
    }
}

/// Builder for an outgoing `multipart/related` body
#[derive(Debug)]
pub struct MultipartRelated {
    boundary: String,
    root_type: String,
    body: BytesMut,
    segments: usize,
}

impl MultipartRelated {
    /// Start a body with a fresh random boundary
    pub fn new(root_type: impl Into<String>) -> Self {
        Self::with_boundary(uuid::Uuid::new_v4().to_string(), root_type)
    }

    /// Start a body with a caller-chosen boundary
    pub fn with_boundary(boundary: impl Into<String>, root_type: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            root_type: root_type.into(),
            body: BytesMut::new(),
            segments: 0,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn len(&self) -> usize {
        self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments == 0
    }

    /// Media type of the body, with the root type quoted as RFC 2387 requires
    pub fn content_type(&self) -> String {
        format!(
            "multipart/related; type=\"{}\"; boundary={}",
            self.root_type, self.boundary
        )
    }

    /// Append one segment. `Content-Type` and `Content-Length` are always written.
    pub fn add_segment(&mut self, headers: &[(&str, String)], content_type: &str, payload: &[u8]) {
        self.body.reserve(payload.len() + 256);
        self.body.put_slice(format!("--{}\r\n", self.boundary).as_bytes());
        for (name, value) in headers {
            self.body.put_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        self.body
            .put_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        self.body
            .put_slice(format!("Content-Length: {}\r\n\r\n", payload.len()).as_bytes());
        self.body.put_slice(payload);
        self.body.put_slice(b"\r\n");
        self.segments += 1;
    }

    /// Close the body with the final delimiter
    pub fn finish(mut self) -> Bytes {
        self.body
            .put_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.body.freeze()
    }
}

/// Serialize an HTTP header map as a MIME header block, one `name: value` per line.
///
/// Bytes outside ASCII are replaced with `?`.
pub fn serialize_headers(headers: &HeaderMap) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, value) in headers.iter() {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend(
            value
                .as_bytes()
                .iter()
                .map(|&b| if b.is_ascii() { b } else { b'?' }),
        );
        out.push(b'\n');
    }
    out
}

/// Prepend the serialized header block and a blank line to the raw body
pub fn frame_response(headers: &HeaderMap, body: &[u8]) -> Vec<u8> {
    let mut framed = serialize_headers(headers);
    framed.reserve(body.len() + 1);
    framed.push(b'\n');
    framed.extend_from_slice(body);
    framed
}

/// Frame an HTTP response as a MIME message and parse it as multipart
pub fn frame_and_parse(headers: &HeaderMap, body: &[u8]) -> Result<MultipartMessage> {
    parse_message(&frame_response(headers, body))
}

/// Parse a complete MIME message (header block, blank line, body) as multipart
pub fn parse_message(raw: &[u8]) -> Result<MultipartMessage> {
    let (header_block, body) = split_header_block(raw)
        .ok_or_else(|| DicomWebError::decode("missing blank line after message headers"))?;
    let headers = parse_header_lines(header_block);

    let content_type = find_header(&headers, "content-type")
        .ok_or_else(|| DicomWebError::decode("message has no Content-Type header"))?;
    let (media_type, params) = parse_content_type(content_type);
    if !media_type.starts_with("multipart/") {
        return Err(DicomWebError::decode(format!(
            "expected multipart content, found '{}'",
            media_type
        )));
    }

    let boundary = params
        .into_iter()
        .find(|(name, _)| name == "boundary")
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DicomWebError::decode("multipart Content-Type has no boundary parameter"))?;

    let segments = split_segments(body, &boundary)?
        .into_iter()
        .map(parse_segment)
        .collect::<Result<Vec<_>>>()?;

    Ok(MultipartMessage {
        media_type,
        boundary,
        segments,
    })
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Split at the first empty line. Accepts CRLF and bare LF line endings.
fn split_header_block(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let mut line_start = 0;
    while line_start < data.len() {
        let rest = &data[line_start..];
        if rest.starts_with(b"\r\n") {
            return Some((&data[..line_start], &data[line_start + 2..]));
        }
        if rest.starts_with(b"\n") {
            return Some((&data[..line_start], &data[line_start + 1..]));
        }
        let newline = rest.iter().position(|&b| b == b'\n')?;
        line_start += newline + 1;
    }
    None
}

/// Parse header lines, unfolding continuation lines. Lines without a colon are skipped.
fn parse_header_lines(block: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(block);
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in text.split('\n') {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    headers
}

/// Split a Content-Type value into its lowercased media type and parameters
fn parse_content_type(value: &str) -> (String, Vec<(String, String)>) {
    let mut pieces = split_unquoted(value, ';').into_iter();
    let media_type = pieces
        .next()
        .map(|s| s.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let params = pieces
        .filter_map(|piece| {
            let (name, value) = piece.split_once('=')?;
            Some((name.trim().to_ascii_lowercase(), unquote(value.trim())))
        })
        .collect();

    (media_type, params)
}

fn split_unquoted(value: &str, separator: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                in_quotes = !in_quotes;
            }
            c if c == separator && !in_quotes => {
                pieces.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    pieces.push(current);
    pieces
}

fn unquote(value: &str) -> String {
    match value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => {
            let mut out = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                } else {
                    out.push(c);
                }
            }
            out
        }
        None => value.to_string(),
    }
}

/// Locate `--boundary` at the start of a line, followed by `--`, CR, LF, linear whitespace or end of data
fn find_delimiter(body: &[u8], delimiter: &[u8], from: usize) -> Option<usize> {
    let mut start = from;
    while start + delimiter.len() <= body.len() {
        let offset = body[start..]
            .windows(delimiter.len())
            .position(|window| window == delimiter)?;
        let pos = start + offset;
        let end = pos + delimiter.len();

        let at_line_start = pos == 0 || body[pos - 1] == b'\n';
        let terminated = end == body.len()
            || body[end..].starts_with(b"--")
            || matches!(body[end], b'\r' | b'\n' | b' ' | b'\t');
        if at_line_start && terminated {
            return Some(pos);
        }
        start = pos + 1;
    }
    None
}

/// The line break before a delimiter belongs to the delimiter, not the payload
fn strip_trailing_newline(segment: &[u8]) -> &[u8] {
    segment
        .strip_suffix(b"\r\n")
        .or_else(|| segment.strip_suffix(b"\n"))
        .unwrap_or(segment)
}

fn split_segments<'a>(body: &'a [u8], boundary: &str) -> Result<Vec<&'a [u8]>> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let mut segments = Vec::new();

    let mut cursor = find_delimiter(body, &delimiter, 0)
        .ok_or_else(|| DicomWebError::decode("missing start boundary"))?;

    loop {
        let after = cursor + delimiter.len();
        if body[after..].starts_with(b"--") {
            return Ok(segments);
        }

        // Skip transport padding up to the end of the delimiter line.
        let content_start = match body[after..].iter().position(|&b| b == b'\n') {
            Some(newline) => after + newline + 1,
            None => return Ok(segments),
        };

        match find_delimiter(body, &delimiter, content_start) {
            Some(next) => {
                segments.push(strip_trailing_newline(&body[content_start..next]));
                cursor = next;
            }
            None => {
                // No close delimiter: the last segment runs to the end of the data.
                segments.push(strip_trailing_newline(&body[content_start..]));
                return Ok(segments);
            }
        }
    }
}

fn parse_segment(raw: &[u8]) -> Result<BodySegment> {
    let (headers, payload) = match split_header_block(raw) {
        Some((header_block, payload)) => (parse_header_lines(header_block), payload),
        None => (parse_header_lines(raw), &raw[raw.len()..]),
    };

    let payload = match find_header(&headers, "content-transfer-encoding") {
        Some(encoding) if encoding.eq_ignore_ascii_case("base64") => {
            let compact: Vec<u8> = payload
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            let decoded = general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| DicomWebError::decode(format!("invalid base64 segment: {}", e)))?;
            Bytes::from(decoded)
        }
        _ => Bytes::copy_from_slice(payload),
    };

    Ok(BodySegment { headers, payload })
}
