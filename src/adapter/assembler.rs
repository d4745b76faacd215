// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Streaming tool-call assembler.
//!
//! Servers stream tool calls as interleaved fragments: an announcing delta
//! carrying an id, followed by any number of partial function-name and
//! argument pieces that must be concatenated in arrival order. This module
//! reconstructs complete [`ToolInvocation`]s out of that fragment sequence
//! with an explicit two-state machine: `Idle` (no call open) and
//! `Accumulating` (exactly one call open, its string fields growing).
//!
//! An assembler is owned by a single streaming call, constructed fresh at
//! call start and discarded at call end; it is never shared across calls.
//!
//! A server that never announces an id still gets its call through: the
//! first fragment opens a call under a synthesized identifier, matching how
//! the non-streaming path fills in a missing id.
//!
//! # Known limitation
//!
//! A fresh call is detected by a delta at wire index 0 carrying an id.
//! Multiple concurrently-interleaved tool calls on nonzero indices within one
//! turn are therefore not tracked separately; local servers emit calls
//! sequentially at index 0.

use tracing::warn;

use crate::types::ToolInvocation;

use super::translate;
use super::wire::WireToolCall;

/// One tool call under accumulation. Id is assigned at open and never
/// changes; name and arguments grow by concatenation.
#[derive(Debug)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Reconstructs complete tool invocations from streamed fragments.
#[derive(Debug, Default)]
pub struct ToolCallAssembler {
    in_progress: Option<PartialToolCall>,
    completed: Vec<ToolInvocation>,
}

impl ToolCallAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the tool-call fragments carried by one decoded delta.
    pub fn apply(&mut self, calls: &[WireToolCall]) {
        for call in calls {
            // A fresh announcement at index 0 closes whatever is open.
            if call.index == Some(0) {
                if let Some(id) = &call.id {
                    self.close_open_call();
                    self.in_progress = Some(PartialToolCall {
                        id: id.clone(),
                        name: String::new(),
                        arguments: String::new(),
                    });
                }
            }

            let Some(function) = &call.function else {
                continue;
            };

            let open = match &mut self.in_progress {
                Some(open) => open,
                None => {
                    // Announcement arrived without an id. Synthesize one,
                    // same as the non-streaming path, rather than drop the
                    // whole call and its fragments.
                    warn!("Tool-call fragment with no announced id, synthesizing one");
                    self.in_progress.insert(PartialToolCall {
                        id: translate::generate_invocation_id(),
                        name: String::new(),
                        arguments: String::new(),
                    })
                }
            };
            if let Some(name) = &function.name {
                open.name.push_str(name);
            }
            if let Some(arguments) = &function.arguments {
                open.arguments.push_str(arguments);
            }
        }
    }

    /// Close the stream: finalize any open call and hand back the completed
    /// batch, in completion order. An empty batch means no tool calls were
    /// reconstructed.
    pub fn finish(mut self) -> Vec<ToolInvocation> {
        self.close_open_call();
        self.completed
    }

    fn close_open_call(&mut self) {
        if let Some(open) = self.in_progress.take() {
            self.completed.push(ToolInvocation {
                id: open.id,
                name: open.name,
                arguments: ensure_json_object(open.arguments),
            });
        }
    }
}

/// Guarantee syntactically valid JSON arguments, even when the server never
/// sent a closed fragment.
fn ensure_json_object(arguments: String) -> String {
    if serde_json::from_str::<serde_json::Value>(&arguments).is_ok() {
        arguments
    } else {
        warn!(
            fragment_len = arguments.len(),
            "Tool-call arguments never formed valid JSON, substituting empty object"
        );
        "{}".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::wire::WireFunction;

    fn announce(id: &str, name: &str) -> WireToolCall {
        WireToolCall {
            index: Some(0),
            id: Some(id.to_string()),
            call_type: Some("function".to_string()),
            function: Some(WireFunction {
                name: Some(name.to_string()),
                arguments: Some(String::new()),
            }),
        }
    }

    fn args_fragment(arguments: &str) -> WireToolCall {
        WireToolCall {
            index: Some(0),
            id: None,
            call_type: None,
            function: Some(WireFunction {
                name: None,
                arguments: Some(arguments.to_string()),
            }),
        }
    }

    #[test]
    fn test_two_calls_reassembled_in_order() {
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(&[announce("a", "f")]);
        assembler.apply(&[args_fragment("{\"x\":")]);
        assembler.apply(&[args_fragment("1}")]);
        assembler.apply(&[announce("b", "g")]);
        assembler.apply(&[args_fragment("{}")]);

        let batch = assembler.finish();
        assert_eq!(
            batch,
            vec![
                ToolInvocation::new("a", "f", "{\"x\":1}"),
                ToolInvocation::new("b", "g", "{}"),
            ]
        );
    }

    #[test]
    fn test_unterminated_call_closed_on_finish() {
        // Transport ended before the arguments closed; the call still
        // surfaces, with the empty-object fallback.
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(&[announce("a", "f")]);
        assembler.apply(&[args_fragment("{\"pa")]);

        let batch = assembler.finish();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id, "a");
        assert_eq!(batch[0].arguments, "{}");
    }

    #[test]
    fn test_name_fragments_concatenated() {
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(&[announce("a", "read_")]);
        assembler.apply(&[WireToolCall {
            index: Some(0),
            id: None,
            call_type: None,
            function: Some(WireFunction {
                name: Some("file".to_string()),
                arguments: None,
            }),
        }]);
        assembler.apply(&[args_fragment("{}")]);

        let batch = assembler.finish();
        assert_eq!(batch[0].name, "read_file");
    }

    #[test]
    fn test_fragment_without_announcement_opens_synthesized_call() {
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(&[args_fragment("{\"x\":1}")]);

        let batch = assembler.finish();
        assert_eq!(batch.len(), 1);
        assert!(batch[0].id.starts_with("call-"));
        assert_eq!(batch[0].arguments, "{\"x\":1}");
    }

    #[test]
    fn test_no_calls_yields_empty_batch() {
        let assembler = ToolCallAssembler::new();
        assert!(assembler.finish().is_empty());
    }

    #[test]
    fn test_announcement_without_id_opens_with_synthesized_id() {
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(&[WireToolCall {
            index: Some(0),
            id: None,
            call_type: None,
            function: Some(WireFunction {
                name: Some("f".to_string()),
                arguments: None,
            }),
        }]);
        assembler.apply(&[args_fragment("{\"x\":1}")]);

        let batch = assembler.finish();
        assert_eq!(batch.len(), 1);
        assert!(batch[0].id.starts_with("call-"));
        assert_eq!(batch[0].name, "f");
        assert_eq!(batch[0].arguments, "{\"x\":1}");
    }

    #[test]
    fn test_second_announcement_closes_first() {
        let mut assembler = ToolCallAssembler::new();
        assembler.apply(&[announce("a", "f"), args_fragment("{}")]);
        assembler.apply(&[announce("b", "g")]);

        let batch = assembler.finish();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].id, "a");
        assert_eq!(batch[0].arguments, "{}");
        assert_eq!(batch[1].id, "b");
        // Second call never received arguments; fallback applies.
        assert_eq!(batch[1].arguments, "{}");
    }
}
