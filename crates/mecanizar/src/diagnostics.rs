//! Diagnostic trace output.
//!
//! Every generated method narrates what it is doing through a line-oriented
//! [`DiagnosticSink`]: the call signature, the action being performed, and
//! the final `is_success()` status. This is the only side-channel output the
//! crate produces.

use crate::browser::FieldMap;
use serde_json::Value;
use std::sync::Mutex;

/// One indent unit, as emitted by the bundled sinks.
const INDENT_UNIT: &str = "  ";

/// Line-oriented sink for diagnostic trace output.
///
/// Implementations prefix each line of `text` with `indent + 1` indent
/// units before forwarding it to their output channel.
pub trait DiagnosticSink: Send + Sync {
    /// Write one trace entry at the given indent level.
    fn write(&self, text: &str, indent: usize);
}

/// Default sink: forwards trace lines to `tracing` at DEBUG level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn write(&self, text: &str, indent: usize) {
        let prefix = INDENT_UNIT.repeat(indent + 1);
        for line in text.lines() {
            tracing::debug!(target: "mecanizar", "{prefix}{line}");
        }
    }
}

/// A captured trace entry: the text and the indent level it was written at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Trace text, without indent prefix
    pub text: String,
    /// Indent level the entry was written at
    pub indent: usize,
}

/// Sink that retains trace entries in memory for assertions.
#[derive(Debug, Default)]
pub struct BufferSink {
    entries: Mutex<Vec<TraceEntry>>,
}

impl BufferSink {
    /// Create an empty buffer sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured entries, in write order.
    #[must_use]
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.entries.lock().map(|e| (*e).clone()).unwrap_or_default()
    }

    /// Captured texts only, in write order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.text).collect()
    }

    /// Captured entries rendered with their indent prefixes, one per line.
    #[must_use]
    pub fn rendered(&self) -> String {
        self.entries()
            .iter()
            .map(|e| format!("{}{}", INDENT_UNIT.repeat(e.indent + 1), e.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Discard captured entries.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl DiagnosticSink for BufferSink {
    fn write(&self, text: &str, indent: usize) {
        if let Ok(mut entries) = self.entries.lock() {
            for line in text.lines() {
                entries.push(TraceEntry {
                    text: line.to_string(),
                    indent,
                });
            }
        }
    }
}

/// Format the `->{name}({args})` call-signature trace line.
///
/// No args renders as `->name()`; with args the dump is space-padded:
/// `->name( "bob", 42 )`.
#[must_use]
pub fn call_signature(name: &str, args: &[Value]) -> String {
    if args.is_empty() {
        format!("->{name}()")
    } else {
        let dumped: Vec<String> = args.iter().map(dump_value).collect();
        format!("->{name}( {} )", dumped.join(", "))
    }
}

/// Render one opaque argument for a trace line.
///
/// JSON rendering keeps strings quoted, so `"bob"` and `42` stay
/// distinguishable in the trace.
#[must_use]
pub fn dump_value(value: &Value) -> String {
    value.to_string()
}

/// Render a field/criteria map for a trace line or error message.
#[must_use]
pub fn dump_map(map: &FieldMap) -> String {
    serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string())
}

/// Install a `fmt` subscriber honoring `RUST_LOG`, for test binaries that
/// want trace lines on stderr. Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    mod call_signature_tests {
        use super::*;

        #[test]
        fn test_no_args() {
            assert_eq!(call_signature("newFetch", &[]), "->newFetch()");
        }

        #[test]
        fn test_args_are_dumped_and_space_padded() {
            let args = vec![json!("bob"), json!(42)];
            assert_eq!(call_signature("login", &args), "->login( \"bob\", 42 )");
        }
    }

    mod dump_tests {
        use super::*;

        #[test]
        fn test_dump_value_keeps_string_quotes() {
            assert_eq!(dump_value(&json!("x")), "\"x\"");
            assert_eq!(dump_value(&json!(1.5)), "1.5");
        }

        #[test]
        fn test_dump_map_is_deterministic() {
            let mut map = FieldMap::new();
            let _ = map.insert("text".to_string(), "Log in".to_string());
            let _ = map.insert("class".to_string(), "nav".to_string());
            assert_eq!(dump_map(&map), r#"{"class":"nav","text":"Log in"}"#);
        }
    }

    mod buffer_sink_tests {
        use super::*;

        #[test]
        fn test_entries_keep_order_and_indent() {
            let sink = BufferSink::new();
            sink.write("->newFetch()", 0);
            sink.write("is_success() returned true", 1);

            assert_eq!(
                sink.entries(),
                vec![
                    TraceEntry {
                        text: "->newFetch()".to_string(),
                        indent: 0
                    },
                    TraceEntry {
                        text: "is_success() returned true".to_string(),
                        indent: 1
                    },
                ]
            );
        }

        #[test]
        fn test_rendered_prefixes_indent_plus_one_units() {
            let sink = BufferSink::new();
            sink.write("top", 0);
            sink.write("nested", 1);
            assert_eq!(sink.rendered(), "  top\n    nested");
        }

        #[test]
        fn test_multiline_text_becomes_entries_per_line() {
            let sink = BufferSink::new();
            sink.write("a\nb", 0);
            assert_eq!(sink.texts(), vec!["a".to_string(), "b".to_string()]);
        }

        #[test]
        fn test_clear() {
            let sink = BufferSink::new();
            sink.write("x", 0);
            sink.clear();
            assert!(sink.entries().is_empty());
        }
    }
}
