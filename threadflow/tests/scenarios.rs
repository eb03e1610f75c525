//! Workspace-level integration tests exercising representative end-to-end
//! compositions: sequencing, racing, aggregation, bounded loops, routing,
//! and tool dispatch.

use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use threadflow::prelude::*;
use tokio_util::sync::CancellationToken;

fn tagging(tag: &'static str) -> BoxedHandler {
    Arc::new(handler_fn(move |tc: ThreadContext, _next| async move {
        Ok(tc.with_messages([Message::new(Role::Assistant, tag)]))
    }))
}

struct LoggingMiddleware {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn process<'a>(
        &'a self,
        tc: ThreadContext,
        next: Next<'a>,
    ) -> Result<ThreadContext, ThreadError> {
        self.log.lock().unwrap().push(format!("{}-in", self.label));
        let out = next.run(tc).await?;
        self.log.lock().unwrap().push(
            out.messages()
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default(),
        );
        self.log.lock().unwrap().push(format!("{}-out", self.label));
        Ok(out)
    }
}

#[tokio::test]
async fn scenario_1_sequence_plus_middleware_ordering() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let h1: BoxedHandler = Arc::new(handler_fn(|tc: ThreadContext, _next| async move {
        Ok(tc.with_messages([Message::new(Role::Assistant, "a")]))
    }));
    let h2: BoxedHandler = Arc::new(handler_fn(|tc: ThreadContext, _next| async move {
        Ok(tc.with_messages([Message::new(Role::Assistant, "b")]))
    }));

    let seq = Sequence::new("s", vec![h1, h2])
        .use_middleware(Arc::new(LoggingMiddleware { label: "M", log: Arc::clone(&log) }));

    let tc = ThreadContext::new(CancellationToken::new());
    let out = seq.handle_thread(tc, None).await.unwrap();

    let contents: Vec<&str> = out.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["a", "b"]);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["M-in", "a", "M-out", "M-in", "b", "M-out"]
    );
}

#[tokio::test]
async fn scenario_2_first_race_fast_wins_slow_observed_cancelled() {
    let slow_cancelled = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let slow_cancelled_clone = Arc::clone(&slow_cancelled);

    let slow: BoxedHandler = Arc::new(handler_fn(move |tc: ThreadContext, _next| {
        let flag = Arc::clone(&slow_cancelled_clone);
        async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(100)) => {
                    Ok(tc.with_messages([Message::new(Role::Assistant, "slow")]))
                }
                _ = tc.cancellation().cancelled() => {
                    flag.store(true, std::sync::atomic::Ordering::SeqCst);
                    Err(ThreadError::Cancelled)
                }
            }
        }
    }));
    let fast: BoxedHandler = Arc::new(handler_fn(|tc: ThreadContext, _next| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(tc.with_messages([Message::new(Role::Assistant, "fast")]))
    }));

    let first = First::new("f", vec![slow, fast]);
    let tc = ThreadContext::new(CancellationToken::new());
    let out = first.handle_thread(tc, None).await.unwrap();

    assert_eq!(out.messages().last().unwrap().content, "fast");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(slow_cancelled.load(std::sync::atomic::Ordering::SeqCst));
}

#[tokio::test]
async fn scenario_3_must_aggregation_merges_metadata() {
    let setter = |key: &'static str, value: serde_json::Value| -> BoxedHandler {
        Arc::new(handler_fn(move |mut tc: ThreadContext, _next| {
            let value = value.clone();
            async move {
                tc.set_key_value(key, value);
                Ok(tc)
            }
        }))
    };

    let must = Must::new("m", vec![setter("k1", json!("v1")), setter("k2", json!("v2"))]);
    let tc = ThreadContext::new(CancellationToken::new());
    let out = must.handle_thread(tc, None).await.unwrap();

    assert_eq!(out.metadata().get("k1"), Some(&json!("v1")));
    assert_eq!(out.metadata().get("k2"), Some(&json!("v2")));
}

#[tokio::test]
async fn scenario_4_for_with_continue_fn_runs_exactly_twice() {
    let count = Arc::new(std::sync::atomic::AtomicU64::new(0));
    let count_clone = Arc::clone(&count);
    let handler: BoxedHandler = Arc::new(handler_fn(move |tc: ThreadContext, _next| {
        let count = Arc::clone(&count_clone);
        async move {
            count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(tc)
        }
    }));

    let for_loop = For::new("loop", 5, handler).with_continue(Arc::new(|_tc, i| i < 2));
    let tc = ThreadContext::new(CancellationToken::new());
    for_loop.handle_thread(tc, None).await.unwrap();

    assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[tokio::test]
async fn scenario_5_switch_default_only_when_no_case_matches() {
    let m_ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let q_ran = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let flagging = |flag: Arc<std::sync::atomic::AtomicBool>| -> BoxedHandler {
        Arc::new(handler_fn(move |tc: ThreadContext, _next| {
            let flag = Arc::clone(&flag);
            async move {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(tc)
            }
        }))
    };

    let math_case = Case::new(
        Arc::new(MetadataEquals::new("type", json!("math"))),
        flagging(Arc::clone(&m_ran)),
    );
    let q_case = Case::new(
        Arc::new(MetadataEquals::new("type", json!("q"))),
        flagging(Arc::clone(&q_ran)),
    );

    let switch = Switch::new("r", vec![math_case, q_case], Some(tagging("default")));
    let mut tc = ThreadContext::new(CancellationToken::new());
    tc.set_key_value("type", json!("unknown"));

    let out = switch.handle_thread(tc, None).await.unwrap();
    assert_eq!(out.messages().last().unwrap().content, "default");
    assert!(!m_ran.load(std::sync::atomic::Ordering::SeqCst));
    assert!(!q_ran.load(std::sync::atomic::Ordering::SeqCst));
}

#[tokio::test]
async fn scenario_6_tool_dispatch_mixed_unknown_and_error_and_success() {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(threadflow::tool::builtin::AddTool)).unwrap();

    let ctx = ThreadContext::new(CancellationToken::new());
    let calls = vec![
        ToolCall {
            id: "1".to_string(),
            function: ToolFunction::new("unknown", json!({})),
        },
        ToolCall {
            id: "2".to_string(),
            function: ToolFunction::new("add", json!({"a": 3, "b": 4})),
        },
    ];

    let results = dispatch(&ctx, &registry, calls).await.unwrap();
    let unknown_result = results[0].function.result.as_ref().unwrap().as_str().unwrap();
    assert!(unknown_result.contains("unknown tool"));
    assert!(unknown_result.contains("add"));
    assert_eq!(results[1].function.result, Some(json!({"sum": 7.0})));
}

#[tokio::test]
async fn policy_derived_handler_end_to_end() {
    let generator = Arc::new(MockGenerator::fixed(
        "mock",
        Response::text(r#"{"valid":true,"reason":"fine","violation":""}"#),
    ));
    let policy = Policy::new(generator, "gate", "stay on topic");
    let tc = ThreadContext::new(CancellationToken::new());
    let out = policy.handle_thread(tc, Some(tagging("passed"))).await.unwrap();
    assert_eq!(out.messages().last().unwrap().content, "passed");
}
