//! Regression tests for querent-agent: stream aggregation, invoke extraction,
//! strategy dispatch, and the query processor failure boundary.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use indexmap::IndexMap;
use querent_agent::{
    Assistant, AssistantFactory, EventStream, QueryProcessor, ResponseStrategy, StateSnapshot,
    StreamEvent, StreamMode, TokenChunk,
};
use querent_core::{ConversationMessage, QuerentError, QuerentResult, StepInfo, ToolCall};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Replays a fixed script. Failures are stored as strings and surfaced as
/// upstream errors.
#[derive(Default)]
struct ScriptedAssistant {
    events: Vec<Result<StreamEvent, String>>,
    invoke_result: Option<Result<serde_json::Value, String>>,
    seen_conversation: Arc<Mutex<Vec<ConversationMessage>>>,
    seen_modes: Arc<Mutex<Vec<StreamMode>>>,
}

#[async_trait]
impl Assistant for ScriptedAssistant {
    async fn invoke(&self, conversation: &[ConversationMessage]) -> QuerentResult<serde_json::Value> {
        *self.seen_conversation.lock().unwrap() = conversation.to_vec();
        match self.invoke_result.clone() {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(QuerentError::Upstream(message)),
            None => Err(QuerentError::Upstream("invoke not scripted".into())),
        }
    }

    fn stream(&self, conversation: &[ConversationMessage], modes: &[StreamMode]) -> EventStream {
        *self.seen_conversation.lock().unwrap() = conversation.to_vec();
        *self.seen_modes.lock().unwrap() = modes.to_vec();
        let items: Vec<QuerentResult<StreamEvent>> = self
            .events
            .iter()
            .cloned()
            .map(|item| item.map_err(QuerentError::Upstream))
            .collect();
        Box::pin(futures_util::stream::iter(items))
    }
}

fn processor_for(
    strategy: ResponseStrategy,
    make: impl Fn() -> ScriptedAssistant + Send + Sync + 'static,
) -> QueryProcessor {
    let factory = move || -> QuerentResult<Box<dyn Assistant>> { Ok(Box::new(make())) };
    QueryProcessor::new(Arc::new(factory), strategy)
}

fn answer_update(step: &str, text: &str) -> StreamEvent {
    StreamEvent::step_update(step, vec![ConversationMessage::assistant(text)])
}

fn token(text: &str) -> StreamEvent {
    StreamEvent::Token(TokenChunk::text(text))
}

// --- Stream strategy ---

#[tokio::test]
async fn test_stream_hello_scenario() {
    let processor = processor_for(ResponseStrategy::Stream, || ScriptedAssistant {
        events: vec![
            Ok(token("Hel")),
            Ok(token("lo")),
            Ok(answer_update("answer", "Hello!")),
        ],
        ..Default::default()
    });

    let result = processor.process("Say hello").await;

    assert_eq!(result.error, None);
    assert_eq!(result.response, "Hello!");
    assert_eq!(result.stream_modes.len(), 2);
    assert_eq!(result.stream_modes[0].mode, "token");
    assert_eq!(
        result.stream_modes[0].steps,
        vec![StepInfo::new("Token", "Hel"), StepInfo::new("Token", "lo")]
    );
    assert_eq!(result.stream_modes[1].mode, "step-update");
    assert_eq!(result.stream_modes[1].steps, vec![StepInfo::new("answer", "Hello!")]);
}

#[tokio::test]
async fn test_stream_requests_all_modes_with_two_message_conversation() {
    let conversation = Arc::new(Mutex::new(Vec::new()));
    let modes = Arc::new(Mutex::new(Vec::new()));
    let (c, m) = (conversation.clone(), modes.clone());
    let processor = processor_for(ResponseStrategy::Stream, move || ScriptedAssistant {
        seen_conversation: c.clone(),
        seen_modes: m.clone(),
        ..Default::default()
    });

    let result = processor.process("What time is it?").await;

    assert_eq!(result.response, "");
    assert!(result.stream_modes.is_empty());
    assert!(result.error.is_none());
    assert_eq!(*modes.lock().unwrap(), StreamMode::ALL.to_vec());
    let conversation = conversation.lock().unwrap();
    assert_eq!(conversation.len(), 2);
    assert_eq!(conversation[1].content, "What time is it?");
}

#[tokio::test]
async fn test_stream_later_tool_step_overwrites_with_later_answer_only() {
    let call = ToolCall {
        id: "call_1".into(),
        name: "get_current_datetime".into(),
        arguments: serde_json::json!({}),
    };
    let processor = processor_for(ResponseStrategy::Stream, move || ScriptedAssistant {
        events: vec![
            Ok(answer_update("model", "draft")),
            Ok(StreamEvent::Custom(serde_json::json!("checking the clock"))),
            Ok(StreamEvent::step_update(
                "model",
                vec![ConversationMessage::assistant_with_tool_calls("", vec![call.clone()])],
            )),
            Ok(StreamEvent::step_update(
                "tools",
                vec![ConversationMessage::tool("call_1", "get_current_datetime", "2026-10-16 12:00:00")],
            )),
            Ok(token("It")),
            Ok(answer_update("model", "It is noon.")),
        ],
        ..Default::default()
    });

    let result = processor.process("time?").await;

    assert_eq!(result.response, "It is noon.");
    let modes: Vec<_> = result.stream_modes.iter().map(|m| m.mode.as_str()).collect();
    assert_eq!(modes, ["token", "step-update", "custom"]);
    assert_eq!(result.stream_modes[1].steps.len(), 4);
    assert_eq!(
        result.stream_modes[1].steps[2].message,
        "Tool Result: 2026-10-16 12:00:00"
    );
    assert_eq!(
        result.stream_modes[2].steps,
        vec![StepInfo::new("", "checking the clock")]
    );
}

#[tokio::test]
async fn test_stream_multi_step_payload_respects_payload_order() {
    let mut payload = IndexMap::new();
    payload.insert(
        "second".to_string(),
        StateSnapshot::with_messages(vec![ConversationMessage::assistant("from second")]),
    );
    payload.insert(
        "first".to_string(),
        StateSnapshot::with_messages(vec![ConversationMessage::assistant("from first")]),
    );
    let event = StreamEvent::StepUpdate(payload);
    let processor = processor_for(ResponseStrategy::Stream, move || ScriptedAssistant {
        events: vec![Ok(event.clone())],
        ..Default::default()
    });

    let result = processor.process("q").await;

    assert_eq!(result.response, "from first");
    assert_eq!(result.stream_modes[0].steps[0].step, "second");
    assert_eq!(result.stream_modes[0].steps[1].step, "first");
}

#[tokio::test]
async fn test_stream_failure_discards_partial_trace() {
    let processor = processor_for(ResponseStrategy::Stream, || ScriptedAssistant {
        events: vec![
            Ok(token("partial")),
            Ok(answer_update("model", "almost")),
            Err("rate limited by provider".into()),
            Ok(token("never seen")),
        ],
        ..Default::default()
    });

    let result = processor.process("q").await;

    assert_eq!(result.error.as_deref(), Some("rate limited by provider"));
    assert_eq!(result.response, "");
    assert!(result.stream_modes.is_empty());
}

#[tokio::test]
async fn test_stream_never_exposes_empty_modes() {
    let processor = processor_for(ResponseStrategy::Stream, || ScriptedAssistant {
        events: vec![
            Ok(StreamEvent::Token(TokenChunk::default())),
            Ok(StreamEvent::step_update("model", vec![])),
            Ok(StreamEvent::Custom(serde_json::json!({"stage": "done"}))),
        ],
        ..Default::default()
    });

    let result = processor.process("q").await;

    assert_eq!(result.stream_modes.len(), 1);
    assert_eq!(result.stream_modes[0].mode, "custom");
    assert!(result.stream_modes.iter().all(|m| !m.steps.is_empty()));
}

// --- Invoke strategy ---

#[tokio::test]
async fn test_invoke_output_scenario() {
    let processor = processor_for(ResponseStrategy::Invoke, || ScriptedAssistant {
        invoke_result: Some(Ok(serde_json::json!({"output": "42"}))),
        ..Default::default()
    });

    let result = processor.process("meaning of life").await;

    assert_eq!(result.response, "42");
    assert!(result.stream_modes.is_empty());
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_invoke_uses_last_message_content() {
    let processor = processor_for(ResponseStrategy::Invoke, || ScriptedAssistant {
        invoke_result: Some(Ok(serde_json::json!({
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "q"},
                {"role": "assistant", "content": "final answer"}
            ]
        }))),
        ..Default::default()
    });

    let result = processor.process("q").await;
    assert_eq!(result.response, "final answer");
}

#[tokio::test]
async fn test_invoke_failure_is_reported() {
    let processor = processor_for(ResponseStrategy::Invoke, || ScriptedAssistant {
        invoke_result: Some(Err("upstream 500".into())),
        ..Default::default()
    });

    let result = processor.process("q").await;
    assert_eq!(result.error.as_deref(), Some("upstream 500"));
    assert_eq!(result.response, "");
}

// --- Processor ---

struct FailingFactory;

impl AssistantFactory for FailingFactory {
    fn build(&self) -> QuerentResult<Box<dyn Assistant>> {
        Err(QuerentError::Config("missing credential".into()))
    }
}

#[tokio::test]
async fn test_construction_failure_scenario() {
    for strategy in [ResponseStrategy::Stream, ResponseStrategy::Invoke] {
        let processor = QueryProcessor::new(Arc::new(FailingFactory), strategy);
        let result = processor.process("anything").await;

        assert_eq!(result.response, "");
        assert!(result.stream_modes.is_empty());
        assert_eq!(result.error.as_deref(), Some("missing credential"));
    }
}

#[tokio::test]
async fn test_fresh_assistant_per_request() {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = builds.clone();
    let factory = move || -> QuerentResult<Box<dyn Assistant>> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedAssistant {
            invoke_result: Some(Ok(serde_json::json!({"output": "ok"}))),
            ..Default::default()
        }))
    };
    let processor = QueryProcessor::new(Arc::new(factory), ResponseStrategy::Invoke);

    processor.process("one").await;
    processor.process("two").await;
    processor.process("three").await;

    assert_eq!(builds.load(Ordering::SeqCst), 3);
}
