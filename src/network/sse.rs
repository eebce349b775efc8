//! Server-sent event decoding for `POST /threads/{id}/runs/stream`.
//!
//! Chunks arrive from the fetch body reader at arbitrary boundaries; the
//! decoder buffers bytes until a blank line closes a frame.

use crate::error::ClientResult;
use crate::models::ThreadValues;
use serde_json::Value;

/// One raw `event:` / `data:` frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Bytes before this offset are known not to start a delimiter.
    scanned: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((end, delimiter_len)) = find_frame_end(&self.buffer, self.scanned) {
            let raw: Vec<u8> = self.buffer.drain(..end + delimiter_len).take(end).collect();
            self.scanned = 0;
            if let Some(frame) = parse_frame(&String::from_utf8_lossy(&raw)) {
                frames.push(frame);
            }
        }
        // A delimiter may straddle the next chunk boundary.
        self.scanned = self.buffer.len().saturating_sub(3);
        frames
    }

    /// Flush a trailing frame the server did not terminate.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        parse_frame(&String::from_utf8_lossy(&rest))
    }
}

/// Earliest `\n\n` or `\r\n\r\n` at or after `from`, as (offset,
/// delimiter length).
fn find_frame_end(buf: &[u8], from: usize) -> Option<(usize, usize)> {
    let tail = buf.get(from..)?;
    let lf = tail.windows(2).position(|w| w == b"\n\n").map(|i| (from + i, 2));
    let crlf = tail.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (from + i, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn parse_frame(raw: &str) -> Option<SseFrame> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if event.is_none() && data.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data.join("\n"),
    })
}

/// Typed run stream event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Metadata { run_id: Option<String> },
    /// Full graph state after a step; replaces local state wholesale.
    Values(Box<ThreadValues>),
    /// Graph-emitted payload.  `namespace` is set for subgraph events.
    Custom { payload: Value, namespace: Option<String> },
    Error { message: String },
    End,
    /// Anything else (other stream modes, subgraph state snapshots).
    Other { event: String },
}

impl StreamEvent {
    pub fn from_frame(frame: &SseFrame) -> ClientResult<Self> {
        let name = frame.event.as_deref().unwrap_or("message");
        let (kind, namespace) = match name.split_once('|') {
            Some((kind, ns)) => (kind, Some(ns.to_string())),
            None => (name, None),
        };

        let event = match (kind, namespace) {
            ("metadata", None) => StreamEvent::Metadata {
                run_id: parse_data(&frame.data)
                    .get("run_id")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            ("values", None) => StreamEvent::Values(Box::new(serde_json::from_str(&frame.data)?)),
            ("custom", namespace) => StreamEvent::Custom {
                payload: parse_data(&frame.data),
                namespace,
            },
            ("error", _) => StreamEvent::Error {
                message: error_message(&frame.data),
            },
            ("end", _) => StreamEvent::End,
            _ => StreamEvent::Other {
                event: name.to_string(),
            },
        };
        Ok(event)
    }
}

/// Frame data as JSON, or as a JSON string when it is not valid JSON.
fn parse_data(data: &str) -> Value {
    serde_json::from_str(data).unwrap_or_else(|_| Value::String(data.to_string()))
}

fn error_message(data: &str) -> String {
    match parse_data(data) {
        Value::String(s) => s,
        Value::Object(obj) => ["message", "error", "detail"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| Value::Object(obj).to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use serde_json::json;

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: Some(event.to_string()),
            data: data.to_string(),
        }
    }

    #[test]
    fn frames_survive_arbitrary_chunking() {
        let wire = b"event: metadata\ndata: {\"run_id\":\"r1\"}\n\nevent: custom\r\ndata: {\"a\":1}\r\n\r\n";
        let mut decoder = SseDecoder::new();
        let mut frames = Vec::new();
        for chunk in wire.chunks(3) {
            frames.extend(decoder.push(chunk));
        }
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], frame("metadata", "{\"run_id\":\"r1\"}"));
        assert_eq!(frames[1], frame("custom", "{\"a\":1}"));
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn large_frame_in_single_byte_chunks() {
        let payload = format!("{{\"text\":\"{}\"}}", "x".repeat(4096));
        let wire = format!("event: custom\r\ndata: {}\r\n\r\nevent: end\n\n", payload);
        let mut decoder = SseDecoder::new();
        let mut frames = Vec::new();
        for byte in wire.as_bytes().chunks(1) {
            frames.extend(decoder.push(byte));
        }
        assert_eq!(frames, vec![frame("custom", &payload), frame("end", "")]);
    }

    #[test]
    fn multibyte_text_split_across_chunks() {
        let wire = "event: custom\ndata: \"héllo ☀\"\n\n".as_bytes();
        let (a, b) = wire.split_at(23);
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(a).is_empty());
        let frames = decoder.push(b);
        assert_eq!(frames[0].data, "\"héllo ☀\"");
    }

    #[test]
    fn multi_line_data_and_comments() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push(b": heartbeat\n\nevent: error\ndata: line one\ndata: line two\n\n");
        assert_eq!(frames, vec![frame("error", "line one\nline two")]);
    }

    #[test]
    fn unterminated_tail_is_flushed() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: end\ndata: null").is_empty());
        assert_eq!(decoder.finish(), Some(frame("end", "null")));
    }

    #[test]
    fn classifies_run_events() {
        let values = StreamEvent::from_frame(&frame(
            "values",
            r#"{"messages":[{"type":"human","content":"hi"}],"ui":[]}"#,
        ))
        .unwrap();
        match values {
            StreamEvent::Values(v) => assert_eq!(v.messages.len(), 1),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(
            StreamEvent::from_frame(&frame("metadata", r#"{"run_id":"r1"}"#)).unwrap(),
            StreamEvent::Metadata { run_id: Some("r1".into()) }
        );
        assert_eq!(StreamEvent::from_frame(&frame("end", "")).unwrap(), StreamEvent::End);
    }

    #[test]
    fn subgraph_events_only_contribute_custom_payloads() {
        let nested_values = StreamEvent::from_frame(&frame("values|tools:abc", r#"{"messages":[]}"#)).unwrap();
        assert!(matches!(nested_values, StreamEvent::Other { .. }));

        let nested_custom = StreamEvent::from_frame(&frame("custom|tools:abc", r#"{"type":"remove-ui","id":"x"}"#)).unwrap();
        assert_eq!(
            nested_custom,
            StreamEvent::Custom {
                payload: json!({"type": "remove-ui", "id": "x"}),
                namespace: Some("tools:abc".into()),
            }
        );
    }

    #[test]
    fn error_events_carry_a_readable_message() {
        let ev = StreamEvent::from_frame(&frame("error", r#"{"error":"GraphRecursionError","message":"too deep"}"#)).unwrap();
        assert_eq!(ev, StreamEvent::Error { message: "too deep".into() });
        let plain = StreamEvent::from_frame(&frame("error", "boom")).unwrap();
        assert_eq!(plain, StreamEvent::Error { message: "boom".into() });
    }

    #[test]
    fn malformed_values_are_decode_errors() {
        let err = StreamEvent::from_frame(&frame("values", "{not json")).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
