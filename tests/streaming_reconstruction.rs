// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! End-to-end streaming reconstruction tests.
//!
//! These drive the public decode surface (wire chunks plus the tool-call
//! assembler) with synthetic SSE transcripts, exactly the way the client's
//! read loop does, so the event-ordering and terminal-batch guarantees are
//! exercised without a live server.

use quill::adapter::wire::StreamChunk;
use quill::{StreamEvent, ToolCallAssembler, ToolInvocation};

/// Replay an SSE transcript through the same decode logic the streaming
/// client uses: text events immediately, tool fragments into the assembler,
/// one terminal batch after `[DONE]` or transport end.
fn replay(lines: &[&str]) -> Vec<StreamEvent> {
    let mut assembler = ToolCallAssembler::new();
    let mut events = Vec::new();

    'transport: for line in lines {
        let Some(data) = line.strip_prefix("data: ") else {
            continue;
        };
        if data.trim() == "[DONE]" {
            break 'transport;
        }
        let chunk: StreamChunk = match serde_json::from_str(data) {
            Ok(chunk) => chunk,
            Err(_) => continue, // malformed chunk: skipped, never fatal
        };
        for choice in chunk.choices {
            if let Some(content) = choice.delta.content {
                if !content.is_empty() {
                    events.push(StreamEvent::Text(content));
                }
            }
            if let Some(calls) = choice.delta.tool_calls {
                assembler.apply(&calls);
            }
        }
    }

    let batch = assembler.finish();
    if !batch.is_empty() {
        events.push(StreamEvent::ToolInvocations(batch));
    }
    events
}

#[test]
fn two_tool_calls_yield_one_ordered_terminal_batch() {
    let events = replay(&[
        r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"id":"a","function":{"name":"f","arguments":""}}]}}]}"#,
        r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"x\":"}}]}}]}"#,
        r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"1}"}}]}}]}"#,
        r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"id":"b","function":{"name":"g","arguments":""}}]}}]}"#,
        r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{}"}}]}}]}"#,
        "data: [DONE]",
    ]);

    assert_eq!(
        events,
        vec![StreamEvent::ToolInvocations(vec![
            ToolInvocation::new("a", "f", r#"{"x":1}"#),
            ToolInvocation::new("b", "g", "{}"),
        ])]
    );
}

#[test]
fn pure_text_stream_emits_text_events_and_no_batch() {
    let events = replay(&[
        r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#,
        r#"data: {"choices":[{"delta":{"content":"lo"}}]}"#,
        "data: [DONE]",
    ]);

    assert_eq!(
        events,
        vec![
            StreamEvent::Text("Hel".to_string()),
            StreamEvent::Text("lo".to_string()),
        ]
    );
}

#[test]
fn dropped_done_marker_does_not_lose_open_tool_call() {
    // Transport closes with a call still accumulating and no [DONE].
    let events = replay(&[
        r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"id":"a","function":{"name":"f","arguments":""}}]}}]}"#,
        r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"pa"}}]}}]}"#,
    ]);

    assert_eq!(events.len(), 1);
    match &events[0] {
        StreamEvent::ToolInvocations(batch) => {
            assert_eq!(batch.len(), 1);
            assert_eq!(batch[0].id, "a");
            assert_eq!(batch[0].name, "f");
            // The unterminated fragment collapses to the empty object.
            assert_eq!(batch[0].arguments, "{}");
        }
        other => panic!("Expected terminal batch, got {other:?}"),
    }
}

#[test]
fn text_and_tool_fragments_interleave_with_batch_last() {
    let events = replay(&[
        r#"data: {"choices":[{"delta":{"content":"Running "}}]}"#,
        r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"id":"a","function":{"name":"ls","arguments":""}}]}}]}"#,
        r#"data: {"choices":[{"delta":{"content":"the listing"}}]}"#,
        r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{}"}}]}}]}"#,
        "data: [DONE]",
    ]);

    assert_eq!(events.len(), 3);
    assert_eq!(events[0], StreamEvent::Text("Running ".to_string()));
    assert_eq!(events[1], StreamEvent::Text("the listing".to_string()));
    assert!(matches!(events[2], StreamEvent::ToolInvocations(_)));
}

#[test]
fn malformed_chunks_are_skipped_not_fatal() {
    let events = replay(&[
        r#"data: {"choices":[{"delta":{"content":"ok "}}]}"#,
        "data: {definitely not json",
        ": comment line",
        "",
        r#"data: {"choices":[{"delta":{"content":"still ok"}}]}"#,
        "data: [DONE]",
    ]);

    assert_eq!(
        events,
        vec![
            StreamEvent::Text("ok ".to_string()),
            StreamEvent::Text("still ok".to_string()),
        ]
    );
}

#[test]
fn empty_stream_terminates_with_no_events() {
    assert!(replay(&["data: [DONE]"]).is_empty());
    assert!(replay(&[]).is_empty());
}

#[test]
fn deltas_after_done_marker_are_ignored() {
    let events = replay(&[
        r#"data: {"choices":[{"delta":{"content":"before"}}]}"#,
        "data: [DONE]",
        r#"data: {"choices":[{"delta":{"content":"after"}}]}"#,
    ]);
    assert_eq!(events, vec![StreamEvent::Text("before".to_string())]);
}
