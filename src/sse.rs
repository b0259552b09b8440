//! Incremental framing for `data:`-prefixed event streams.
//!
//! Both directions of the relay speak the same protocol: newline-delimited
//! `data: <payload>` records terminated by a literal `data: [DONE]`. Records
//! can arrive fragmented across network reads, so callers feed raw chunks
//! into a [`LineBuffer`] and only act on complete lines.

/// Sentinel payload marking the end of a stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Stateful line splitter over fragmented byte chunks.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network read, returning every line completed by it.
    ///
    /// Trailing carriage returns are stripped and blank lines (record
    /// separators) are discarded. Bytes after the last newline stay buffered
    /// until a later chunk completes the line.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.push_str(&String::from_utf8_lossy(chunk));

        let mut lines = Vec::new();
        while let Some(line_end) = self.buf.find('\n') {
            let line = self.buf[..line_end].trim_end_matches('\r').to_string();
            self.buf.drain(..=line_end);
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
        lines
    }
}

/// Extract the payload of a `data: ` line, if it is one.
pub fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data: ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_complete_lines() {
        let mut buf = LineBuffer::new();
        let lines = buf.push(b"data: one\ndata: two\n");
        assert_eq!(lines, vec!["data: one", "data: two"]);
    }

    #[test]
    fn reassembles_fragmented_records() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"data: {\"content\":").is_empty());
        assert!(buf.push(b"\"hel").is_empty());
        let lines = buf.push(b"lo\"}\n");
        assert_eq!(lines, vec![r#"data: {"content":"hello"}"#]);
    }

    #[test]
    fn discards_blank_separator_lines() {
        let mut buf = LineBuffer::new();
        let lines = buf.push(b"data: a\n\ndata: b\n\n");
        assert_eq!(lines, vec!["data: a", "data: b"]);
    }

    #[test]
    fn strips_carriage_returns() {
        let mut buf = LineBuffer::new();
        let lines = buf.push(b"data: [DONE]\r\n");
        assert_eq!(lines, vec!["data: [DONE]"]);
    }

    #[test]
    fn keeps_partial_tail_buffered() {
        let mut buf = LineBuffer::new();
        let lines = buf.push(b"data: full\ndata: partial");
        assert_eq!(lines, vec!["data: full"]);
        assert_eq!(buf.push(b"\n"), vec!["data: partial"]);
    }

    #[test]
    fn data_payload_filters_other_lines() {
        assert_eq!(data_payload("data: [DONE]"), Some("[DONE]"));
        assert_eq!(data_payload(": keep-alive"), None);
        assert_eq!(data_payload("event: message"), None);
    }
}
