//! Incremental `text/event-stream` decoder.
//!
//! Transport chunks do not align with protocol frames, so the decoder
//! buffers partial lines across [`push`](SseDecoder::push) calls and
//! emits a frame for every blank-line dispatch. Comment lines (leading
//! `:`) and unknown fields are ignored; multi-line `data:` values are
//! joined with `\n` per the EventSource specification.

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// The `event:` field, when the server set one.
    pub event: Option<String>,
    /// Joined `data:` payload.
    pub data: String,
}

/// Stateful decoder; feed it transport chunks, collect frames.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Unterminated trailing line from the previous chunk.
    partial_line: String,
    event: Option<String>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk and return every frame it completed.
    pub fn push(&mut self, chunk: &str) -> Vec<SseFrame> {
        let mut frames = Vec::new();

        let mut rest = chunk;
        while let Some(newline) = rest.find('\n') {
            let mut line = std::mem::take(&mut self.partial_line);
            line.push_str(&rest[..newline]);
            rest = &rest[newline + 1..];

            if line.ends_with('\r') {
                line.pop();
            }

            if let Some(frame) = self.consume_line(&line) {
                frames.push(frame);
            }
        }
        self.partial_line.push_str(rest);

        frames
    }

    /// Process one complete line; returns a frame on dispatch.
    fn consume_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            // Blank line dispatches the pending event, if any data
            // accumulated.
            if self.data_lines.is_empty() {
                self.event = None;
                return None;
            }
            let frame = SseFrame {
                event: self.event.take(),
                data: self.data_lines.join("\n"),
            };
            self.data_lines.clear();
            return Some(frame);
        }

        if line.starts_with(':') {
            // Comment (keep-alive) line.
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            // `id` and `retry` are valid fields we have no use for;
            // anything else is ignored per spec.
            _ => {}
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_single_frame() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push("event: progress\ndata: {\"processed\":3}\n\n");
        assert_eq!(
            frames,
            vec![SseFrame {
                event: Some("progress".into()),
                data: "{\"processed\":3}".into(),
            }]
        );
    }

    #[test]
    fn reassembles_frames_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push("event: prog").is_empty());
        assert!(decoder.push("ress\ndata: {\"a\"").is_empty());
        let frames = decoder.push(":1}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("progress"));
        assert_eq!(frames[0].data, "{\"a\":1}");
    }

    #[test]
    fn joins_multi_line_data_with_newlines() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push("data: first\ndata: second\n\n");
        assert_eq!(frames[0].data, "first\nsecond");
    }

    #[test]
    fn ignores_comment_keepalives() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(": keep-alive\n\n").is_empty());
        let frames = decoder.push(": ping\ndata: x\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "x");
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push("event: start\r\ndata: {}\r\n\r\n");
        assert_eq!(frames[0].event.as_deref(), Some("start"));
        assert_eq!(frames[0].data, "{}");
    }

    #[test]
    fn blank_line_without_data_dispatches_nothing() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push("event: lonely\n\n").is_empty());
        // The dangling event name must not leak into the next frame.
        let frames = decoder.push("data: x\n\n");
        assert_eq!(frames[0].event, None);
    }

    #[test]
    fn emits_multiple_frames_from_one_chunk() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push("data: 1\n\ndata: 2\n\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data, "1");
        assert_eq!(frames[1].data, "2");
    }

    #[test]
    fn value_space_after_colon_is_optional() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push("data:tight\n\n");
        assert_eq!(frames[0].data, "tight");
    }
}
