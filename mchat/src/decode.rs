//! Incremental decoder for inline citation markup.
//!
//! The generation stream interleaves visible answer text with
//! `<citation source_id="N">...</citation>` spans, chunked at arbitrary
//! byte positions. The decoder consumes one fragment at a time, keeps the
//! unresolved tail in a residual buffer, and emits typed events whose
//! concatenated text payloads reconstruct the markup-stripped answer no
//! matter how the stream was chunked.
//!
//! ```rust
//! use mchat::{CitationDecoder, DecodeEvent};
//!
//! let mut decoder = CitationDecoder::new(1);
//! let mut events = decoder.feed("See <citation source_id=\"0\">this</citation>.");
//! events.extend(decoder.finish());
//!
//! assert_eq!(
//!     events,
//!     vec![
//!         DecodeEvent::Text("See ".to_string()),
//!         DecodeEvent::CitationStart(0),
//!         DecodeEvent::CitationText("this".to_string()),
//!         DecodeEvent::CitationEnd,
//!         DecodeEvent::Text(".".to_string()),
//!     ]
//! );
//! ```

const OPEN_TOKEN: &str = "<citation";
const CLOSE_TOKEN: &str = "</citation>";
const SOURCE_ID_ATTR: &str = "source_id=\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    Text(String),
    CitationStart(usize),
    CitationText(String),
    CitationEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeMode {
    Plain,
    InCitation,
}

/// Streaming citation decoder; one instance per chat turn.
///
/// State is exactly the current mode plus the residual buffer. The
/// residual invariant: after every `feed`, any prefix that could be
/// resolved has been resolved. What remains is either an incomplete
/// opening tag waiting for its `>`, or a trailing run that may still grow
/// into a tag token. That holdback is what makes the emitted sequence
/// independent of fragment boundaries.
#[derive(Debug)]
pub struct CitationDecoder {
    mode: DecodeMode,
    residual: String,
    source_count: usize,
}

impl CitationDecoder {
    /// `source_count` is the number of retrieved documents; a tag citing
    /// an index outside `0..source_count` is dropped.
    pub fn new(source_count: usize) -> Self {
        Self {
            mode: DecodeMode::Plain,
            residual: String::new(),
            source_count,
        }
    }

    /// Consumes one fragment and returns every event it resolves.
    /// Zero-length fragments are no-ops.
    pub fn feed(&mut self, fragment: &str) -> Vec<DecodeEvent> {
        self.residual.push_str(fragment);
        let mut events = Vec::new();

        while !self.residual.is_empty() {
            let resolved = match self.mode {
                DecodeMode::Plain => self.resolve_plain(&mut events),
                DecodeMode::InCitation => self.resolve_in_citation(&mut events),
            };

            if !resolved {
                break;
            }
        }

        events
    }

    /// End-of-stream flush. A residual in plain mode (possibly a partial
    /// tag that never completed) becomes final visible text; a residual
    /// inside an unterminated span becomes attributed text with no
    /// synthesized `CitationEnd`.
    pub fn finish(mut self) -> Vec<DecodeEvent> {
        if self.residual.is_empty() {
            return Vec::new();
        }

        let text = std::mem::take(&mut self.residual);
        match self.mode {
            DecodeMode::Plain => vec![DecodeEvent::Text(text)],
            DecodeMode::InCitation => vec![DecodeEvent::CitationText(text)],
        }
    }

    /// Plain-text scan. Both tag tokens are recognized here: an opening
    /// tag may start a span, while a stray closing tag (left behind when
    /// an invalid opening tag was dropped) is stripped silently.
    fn resolve_plain(&mut self, events: &mut Vec<DecodeEvent>) -> bool {
        let open = self.residual.find(OPEN_TOKEN);
        let close = self.residual.find(CLOSE_TOKEN);

        let tag_start = match (open, close) {
            (Some(o), Some(c)) => o.min(c),
            (Some(o), None) => o,
            (None, Some(c)) => c,
            (None, None) => {
                self.emit_before_holdback(events, DecodeMode::Plain);
                return false;
            }
        };

        if tag_start > 0 {
            let text = self.residual.drain(..tag_start).collect::<String>();
            events.push(DecodeEvent::Text(text));
        }

        if self.residual.starts_with(CLOSE_TOKEN) {
            self.residual.drain(..CLOSE_TOKEN.len());
            return true;
        }

        // Opening tag at the front; act only once its `>` has arrived.
        let Some(tag_end) = self.residual.find('>') else {
            return false;
        };

        let tag = self.residual.drain(..=tag_end).collect::<String>();
        if let Some(index) = parse_source_id(&tag)
            && index < self.source_count
        {
            events.push(DecodeEvent::CitationStart(index));
            self.mode = DecodeMode::InCitation;
        }

        true
    }

    fn resolve_in_citation(&mut self, events: &mut Vec<DecodeEvent>) -> bool {
        let Some(close) = self.residual.find(CLOSE_TOKEN) else {
            self.emit_before_holdback(events, DecodeMode::InCitation);
            return false;
        };

        if close > 0 {
            let text = self.residual.drain(..close).collect::<String>();
            events.push(DecodeEvent::CitationText(text));
        }

        self.residual.drain(..CLOSE_TOKEN.len());
        events.push(DecodeEvent::CitationEnd);
        self.mode = DecodeMode::Plain;
        true
    }

    /// Emits all residual text except the longest trailing run that is
    /// still a proper prefix of a tag token relevant in `mode`.
    fn emit_before_holdback(&mut self, events: &mut Vec<DecodeEvent>, mode: DecodeMode) {
        let keep = match mode {
            DecodeMode::Plain => partial_suffix_len(&self.residual, OPEN_TOKEN)
                .max(partial_suffix_len(&self.residual, CLOSE_TOKEN)),
            DecodeMode::InCitation => partial_suffix_len(&self.residual, CLOSE_TOKEN),
        };

        let cut = self.residual.len() - keep;
        if cut == 0 {
            return;
        }

        let text = self.residual.drain(..cut).collect::<String>();
        events.push(match mode {
            DecodeMode::Plain => DecodeEvent::Text(text),
            DecodeMode::InCitation => DecodeEvent::CitationText(text),
        });
    }
}

/// Length of the longest suffix of `haystack` that is a proper prefix of
/// `token`. Tokens are ASCII, so slicing them by byte length is safe.
fn partial_suffix_len(haystack: &str, token: &str) -> usize {
    let max = token.len().saturating_sub(1).min(haystack.len());
    (1..=max)
        .rev()
        .find(|&len| haystack.ends_with(&token[..len]))
        .unwrap_or(0)
}

/// Syntactic attribute scan over the raw opening tag: the decimal integer
/// between `source_id="` and the next quote. Not a markup parser.
fn parse_source_id(tag: &str) -> Option<usize> {
    let attr_start = tag.find(SOURCE_ID_ATTR)? + SOURCE_ID_ATTR.len();
    let rest = &tag[attr_start..];
    let attr_end = rest.find('"')?;
    rest[..attr_end].parse::<usize>().ok()
}
