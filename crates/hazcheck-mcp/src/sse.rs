//! Minimal server-sent-events parser
//!
//! The MCP SSE transport only uses `event:` and `data:` fields, so this
//! parser ignores `id:` and retry hints.

/// One parsed SSE event
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Drain complete events from the front of `buf`, leaving any partial
/// event in place for the next chunk.
pub fn drain_events(buf: &mut String) -> Vec<SseEvent> {
    let mut events = Vec::new();

    loop {
        let Some(split) = find_event_boundary(buf) else {
            break;
        };
        let block: String = buf.drain(..split.end).collect();
        let block = &block[..split.body];

        let mut event = String::from("message");
        let mut data_lines: Vec<&str> = Vec::new();

        for line in block.lines() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if let Some(rest) = line.strip_prefix("event:") {
                event = rest.trim_start().to_string();
            } else if let Some(rest) = line.strip_prefix("data:") {
                data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
            }
        }

        if !data_lines.is_empty() {
            events.push(SseEvent {
                event,
                data: data_lines.join("\n"),
            });
        }
    }

    events
}

struct Boundary {
    /// Length of the event body, excluding the blank-line terminator
    body: usize,
    /// Total bytes consumed including the terminator
    end: usize,
}

fn find_event_boundary(buf: &str) -> Option<Boundary> {
    let lf = buf.find("\n\n").map(|i| Boundary { body: i, end: i + 2 });
    let crlf = buf
        .find("\r\n\r\n")
        .map(|i| Boundary { body: i, end: i + 4 });

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.body <= b.body { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}
