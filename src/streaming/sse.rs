//! Incremental server-sent-events decoder.
//!
//! The server streams `text/event-stream` bodies: `data:` lines accumulate
//! into an event, a blank line dispatches it, and a `data: [DONE]` event
//! terminates the sequence. The decoder is byte-oriented so it can be fed
//! network chunks of arbitrary size; lines are only split at `\n`, which
//! keeps multi-byte UTF-8 sequences intact across feeds.

/// One dispatched SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SseFrame {
    /// A `data:` payload ready for JSON decoding.
    Data(String),
    /// The `[DONE]` terminator.
    Done,
}

/// Incremental parser for SSE byte streams.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    pending_data: Vec<String>,
}

impl SseDecoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed arbitrary bytes into the decoder and drain complete frames.
    pub(crate) fn feed(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(bytes);
        let mut frames = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);

            if line.is_empty() {
                if let Some(frame) = self.dispatch() {
                    frames.push(frame);
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.find(':') {
                Some(idx) => {
                    let value = &line[idx + 1..];
                    (&line[..idx], value.strip_prefix(' ').unwrap_or(value))
                }
                None => (line.as_ref(), ""),
            };
            if field == "data" {
                self.pending_data.push(value.to_string());
            }
            // Other fields (event, id, retry) carry nothing for this protocol.
        }

        frames
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        if self.pending_data.is_empty() {
            return None;
        }
        let payload = self.pending_data.join("\n");
        self.pending_data.clear();
        if payload.trim().is_empty() {
            return None;
        }
        if payload.trim() == "[DONE]" {
            return Some(SseFrame::Done);
        }
        Some(SseFrame::Data(payload))
    }

    /// Whether the input so far ends mid-frame: an unterminated line, or
    /// `data:` lines that never reached their blank-line boundary.
    pub(crate) fn has_partial_frame(&self) -> bool {
        !self.buffer.is_empty() || !self.pending_data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_parse_incrementally_across_chunk_boundaries() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"x\"").is_empty());
        assert!(decoder.feed(b":1}\n").is_empty());
        let frames = decoder.feed(b"\n");
        assert_eq!(frames, vec![SseFrame::Data("{\"x\":1}".to_string())]);
        assert!(!decoder.has_partial_frame());
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: {\"x\":1}\r\n\r\n");
        assert_eq!(frames, vec![SseFrame::Data("{\"x\":1}".to_string())]);
    }

    #[test]
    fn multiple_data_lines_join_with_newlines() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: line one\ndata: line two\n\n");
        assert_eq!(
            frames,
            vec![SseFrame::Data("line one\nline two".to_string())]
        );
    }

    #[test]
    fn comments_and_foreign_fields_are_ignored() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b": keep-alive\nevent: message\nid: 7\ndata: {}\n\n");
        assert_eq!(frames, vec![SseFrame::Data("{}".to_string())]);
    }

    #[test]
    fn done_marker_yields_the_terminator_frame() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: {\"a\":1}\n\ndata: [DONE]\n\n");
        assert_eq!(
            frames,
            vec![SseFrame::Data("{\"a\":1}".to_string()), SseFrame::Done]
        );
    }

    #[test]
    fn partial_frames_are_detected() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: {\"a\":1}");
        assert!(decoder.has_partial_frame());

        // Terminated line but no dispatching blank line.
        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: {\"a\":1}\n");
        assert!(decoder.has_partial_frame());

        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: {\"a\":1}\n\n");
        assert!(!decoder.has_partial_frame());
    }

    #[test]
    fn utf8_split_across_feeds_survives() {
        let mut decoder = SseDecoder::new();
        let payload = "data: {\"s\":\"héllo\"}\n\n".as_bytes();
        // Split inside the two-byte 'é' sequence.
        let split = payload.iter().position(|&b| b == 0xc3).unwrap() + 1;
        assert!(decoder.feed(&payload[..split]).is_empty());
        let frames = decoder.feed(&payload[split..]);
        assert_eq!(
            frames,
            vec![SseFrame::Data("{\"s\":\"héllo\"}".to_string())]
        );
    }
}
