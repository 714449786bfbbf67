use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use surecall::{
    ChatMessage, Describe, DescriptorBuilder, Engine, FieldKind, InvokeRequest, ModelHandle,
    ModelInvoker, ProgressTracker, Result, SENTINEL_STRING, SchemaDescriptor, StatusReporter,
    SurecallError,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct TradeSignal {
    signal: String,
    confidence: f64,
    reasoning: String,
}

impl Describe for TradeSignal {
    fn descriptor() -> SchemaDescriptor {
        DescriptorBuilder::new("TradeSignal")
            .field(
                "signal",
                FieldKind::Union(vec![json!("bullish"), json!("bearish"), json!("neutral")]),
            )
            .field("confidence", FieldKind::Float)
            .field("reasoning", FieldKind::String)
            .build()
    }
}

fn synthesized_signal() -> TradeSignal {
    TradeSignal {
        signal: "bullish".to_string(),
        confidence: 0.0,
        reasoning: SENTINEL_STRING.to_string(),
    }
}

fn prompt() -> Vec<ChatMessage> {
    vec![ChatMessage::user("Assess AAPL")]
}

/// Counts calls and always fails with the configured error kind.
struct FailingInvoker {
    calls: Arc<AtomicUsize>,
    make_error: fn() -> SurecallError,
}

#[async_trait]
impl ModelInvoker for FailingInvoker {
    async fn invoke_structured(
        &self,
        _handle: &ModelHandle,
        _messages: &[ChatMessage],
        _schema: &SchemaDescriptor,
    ) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.make_error)())
    }

    async fn invoke_text(&self, _handle: &ModelHandle, _messages: &[ChatMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.make_error)())
    }
}

/// Returns a fixed structured value; records which method was used.
struct FixedInvoker {
    calls: Arc<AtomicUsize>,
    structured_value: Value,
    text_response: String,
}

#[async_trait]
impl ModelInvoker for FixedInvoker {
    async fn invoke_structured(
        &self,
        _handle: &ModelHandle,
        _messages: &[ChatMessage],
        _schema: &SchemaDescriptor,
    ) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.structured_value.clone())
    }

    async fn invoke_text(&self, _handle: &ModelHandle, _messages: &[ChatMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text_response.clone())
    }
}

#[tokio::test]
async fn retry_bound_is_exact_then_default_is_synthesized() {
    let calls = Arc::new(AtomicUsize::new(0));
    let reporter = Arc::new(ProgressTracker::new());
    let engine = Engine::new(FailingInvoker {
        calls: calls.clone(),
        make_error: || SurecallError::TransientCallFailure("connection reset".into()),
    })
    .reporter(reporter.clone());

    let result: TradeSignal = engine
        .invoke(
            InvokeRequest::new(prompt(), "gpt-4o", "OpenAI")
                .max_retries(3)
                .agent("valuation")
                .entity("AAPL"),
        )
        .await
        .expect("exhaustion must fall back to the synthesized default");

    assert_eq!(result, synthesized_signal());
    assert_eq!(calls.load(Ordering::SeqCst), 3, "exactly max_retries attempts");
    assert_eq!(
        reporter.status("valuation", Some("AAPL")),
        Some("Error - retry 3/3".to_string())
    );
}

#[tokio::test]
async fn each_failed_attempt_reports_status() {
    // A reporter that records every update, not only the latest.
    #[derive(Default)]
    struct RecordingReporter {
        events: std::sync::Mutex<Vec<String>>,
    }
    impl StatusReporter for RecordingReporter {
        fn report(&self, _component_id: &str, _entity_id: Option<&str>, message: &str) {
            self.events.lock().unwrap().push(message.to_string());
        }
    }

    let reporter = Arc::new(RecordingReporter::default());
    let engine = Engine::new(FailingInvoker {
        calls: Arc::new(AtomicUsize::new(0)),
        make_error: || SurecallError::TransientCallFailure("boom".into()),
    })
    .reporter(reporter.clone());

    let _: TradeSignal = engine
        .invoke(
            InvokeRequest::new(prompt(), "gpt-4o", "OpenAI")
                .max_retries(3)
                .agent("valuation"),
        )
        .await
        .unwrap();

    let events = reporter.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec!["Error - retry 1/3", "Error - retry 2/3", "Error - retry 3/3"]
    );
}

#[tokio::test]
async fn no_status_reported_without_agent_id() {
    let reporter = Arc::new(ProgressTracker::new());
    let engine = Engine::new(FailingInvoker {
        calls: Arc::new(AtomicUsize::new(0)),
        make_error: || SurecallError::TransientCallFailure("boom".into()),
    })
    .reporter(reporter.clone());

    let _: TradeSignal = engine
        .invoke(InvokeRequest::new(prompt(), "gpt-4o", "OpenAI"))
        .await
        .unwrap();

    assert!(reporter.snapshot().is_empty());
}

#[tokio::test]
async fn invalid_provider_consumes_zero_attempts() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = Engine::new(FailingInvoker {
        calls: calls.clone(),
        make_error: || SurecallError::TransientCallFailure("unreachable".into()),
    });

    let result: TradeSignal = engine
        .invoke(InvokeRequest::new(prompt(), "gpt-4o", "Bloomberg"))
        .await
        .unwrap();

    assert_eq!(result, synthesized_signal());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_model_consumes_zero_attempts() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = Engine::new(FailingInvoker {
        calls: calls.clone(),
        make_error: || SurecallError::TransientCallFailure("unreachable".into()),
    });

    let result: TradeSignal = engine
        .invoke(InvokeRequest::new(prompt(), "gpt-99-turbo", "OpenAI"))
        .await
        .unwrap();

    assert_eq!(result, synthesized_signal());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn structured_success_on_first_attempt_performs_no_retries() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = Engine::new(FixedInvoker {
        calls: calls.clone(),
        structured_value: json!({
            "signal": "bearish",
            "confidence": 72.5,
            "reasoning": "overvalued on every metric"
        }),
        text_response: String::new(),
    });

    let result: TradeSignal = engine
        .invoke(InvokeRequest::new(prompt(), "gpt-4o", "OpenAI"))
        .await
        .unwrap();

    assert_eq!(
        result,
        TradeSignal {
            signal: "bearish".to_string(),
            confidence: 72.5,
            reasoning: "overvalued on every metric".to_string(),
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn text_path_extracts_fenced_json() {
    // deepseek-chat has no native structured output, forcing extraction.
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = Engine::new(FixedInvoker {
        calls: calls.clone(),
        structured_value: Value::Null,
        text_response: "Reasoning first.\n```json\n{\"signal\":\"neutral\",\"confidence\":55.0,\"reasoning\":\"mixed picture\"}\n```"
            .to_string(),
    });

    let result: TradeSignal = engine
        .invoke(InvokeRequest::new(prompt(), "deepseek-chat", "DeepSeek"))
        .await
        .unwrap();

    assert_eq!(result.signal, "neutral");
    assert_eq!(result.confidence, 55.0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn text_path_without_fence_retries_then_defaults() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = Engine::new(FixedInvoker {
        calls: calls.clone(),
        structured_value: Value::Null,
        text_response: "I could not produce JSON, sorry.".to_string(),
    });

    let result: TradeSignal = engine
        .invoke(InvokeRequest::new(prompt(), "deepseek-chat", "DeepSeek").max_retries(2))
        .await
        .unwrap();

    assert_eq!(result, synthesized_signal());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn structured_type_mismatch_is_retried() {
    // Shape-valid JSON that does not match the schema type.
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = Engine::new(FixedInvoker {
        calls: calls.clone(),
        structured_value: json!({"signal": "bullish", "confidence": "high"}),
        text_response: String::new(),
    });

    let result: TradeSignal = engine
        .invoke(InvokeRequest::new(prompt(), "gpt-4o", "OpenAI").max_retries(3))
        .await
        .unwrap();

    assert_eq!(result, synthesized_signal());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn factory_takes_precedence_over_field_synthesis_on_exhaustion() {
    let engine = Engine::new(FailingInvoker {
        calls: Arc::new(AtomicUsize::new(0)),
        make_error: || SurecallError::TransientCallFailure("down".into()),
    });

    let result: TradeSignal = engine
        .invoke(
            InvokeRequest::new(prompt(), "gpt-4o", "OpenAI").default_factory(|| {
                Ok(TradeSignal {
                    signal: "neutral".to_string(),
                    confidence: 0.0,
                    reasoning: "No data available".to_string(),
                })
            }),
        )
        .await
        .unwrap();

    assert_eq!(result.signal, "neutral");
    assert_eq!(result.reasoning, "No data available");
}

#[tokio::test]
async fn non_retryable_attempt_failure_short_circuits_to_default() {
    // e.g. missing credentials discovered inside the invoker.
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = Engine::new(FailingInvoker {
        calls: calls.clone(),
        make_error: || SurecallError::ModelUnavailable("OPENAI_API_KEY is not set".into()),
    });

    let result: TradeSignal = engine
        .invoke(InvokeRequest::new(prompt(), "gpt-4o", "OpenAI").max_retries(5))
        .await
        .unwrap();

    assert_eq!(result, synthesized_signal());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_max_retries_skips_the_attempt_loop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = Engine::new(FixedInvoker {
        calls: calls.clone(),
        structured_value: json!({"signal": "bearish", "confidence": 1.0, "reasoning": "x"}),
        text_response: String::new(),
    });

    let result: TradeSignal = engine
        .invoke(InvokeRequest::new(prompt(), "gpt-4o", "OpenAI").max_retries(0))
        .await
        .unwrap();

    assert_eq!(result, synthesized_signal());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn validation_failure_counts_as_attempt_failure() {
    #[derive(Serialize, Deserialize, Debug)]
    struct BoundedSignal {
        confidence: f64,
    }
    impl Describe for BoundedSignal {
        fn descriptor() -> SchemaDescriptor {
            DescriptorBuilder::new("BoundedSignal")
                .field("confidence", FieldKind::Float)
                .build()
        }
        fn validate(&self) -> Result<()> {
            if !(0.0..=100.0).contains(&self.confidence) {
                return Err(SurecallError::ConstructionFailure(format!(
                    "confidence out of range: {}",
                    self.confidence
                )));
            }
            Ok(())
        }
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let engine = Engine::new(FixedInvoker {
        calls: calls.clone(),
        structured_value: json!({"confidence": 250.0}),
        text_response: String::new(),
    });

    let result: BoundedSignal = engine
        .invoke(InvokeRequest::new(prompt(), "gpt-4o", "OpenAI").max_retries(2))
        .await
        .unwrap();

    // Out-of-range responses are absorbed; the synthesized default passes
    // validation (confidence = 0.0).
    assert_eq!(result.confidence, 0.0);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
