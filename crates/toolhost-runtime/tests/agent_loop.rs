//! Executor and agent behaviour against scripted model replies

use async_trait::async_trait;
use mockall::mock;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use toolhost_core::{Agent, Context, Error};
use toolhost_llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Role, StopReason, TokenUsage,
};
use toolhost_mcp::{FnResource, MCPClientManager, MCPConfig, McpServer, StreamMCPClient};
use toolhost_runtime::{
    AgentExecutor, AgentRuntime, ExecutorConfig, ExecutorEventHandler, ToolAgent,
};
use toolhost_tools::ToolRegistry;
use toolhost_tools::builtin::{add_numbers, multiply_numbers};
use toolhost_weather::station;

/// Replays canned responses and records every request it receives
#[derive(Default)]
struct ScriptedProvider {
    replies: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<CompletionResponse>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> toolhost_llm::Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LLMError::UnexpectedResponse("script exhausted".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

mock! {
    Provider {}

    #[async_trait]
    impl LLMProvider for Provider {
        async fn complete(&self, request: CompletionRequest) -> toolhost_llm::Result<CompletionResponse>;
        fn name(&self) -> &str;
    }
}

fn usage() -> TokenUsage {
    TokenUsage {
        input_tokens: 10,
        output_tokens: 5,
    }
}

fn tool_call(calls: &[(&str, &str, Value)]) -> CompletionResponse {
    let blocks = calls
        .iter()
        .map(|(id, name, input)| ContentBlock::ToolUse {
            id: (*id).to_string(),
            name: (*name).to_string(),
            input: input.clone(),
        })
        .collect();
    CompletionResponse {
        message: Message::blocks(Role::Assistant, blocks),
        stop_reason: StopReason::ToolUse,
        usage: usage(),
    }
}

fn answer(text: &str) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: usage(),
    }
}

fn calculator_registry() -> Arc<ToolRegistry> {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(add_numbers())).unwrap();
    registry.register(Arc::new(multiply_numbers())).unwrap();
    Arc::new(registry)
}

fn executor(provider: Arc<dyn LLMProvider>, registry: Arc<ToolRegistry>) -> AgentExecutor {
    AgentExecutor::builder()
        .provider(provider)
        .tool_registry(registry)
        .model("test-model")
        .max_iterations(4)
        .build()
        .unwrap()
}

/// Tool result blocks of the last user message in a request
fn tool_results(request: &CompletionRequest) -> Vec<(String, String, bool)> {
    let Some(MessageContent::Blocks(blocks)) = &request.messages.last().unwrap().content else {
        panic!("expected tool results");
    };
    blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Some((tool_use_id.clone(), content.clone(), is_error.unwrap_or(false))),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_direct_answer_without_tools() {
    let provider = ScriptedProvider::new(vec![answer("Hello!")]);
    let outcome = executor(provider.clone(), calculator_registry())
        .run("Say hello")
        .await
        .unwrap();

    assert_eq!(outcome.text, "Hello!");
    assert_eq!(outcome.iterations, 1);
    assert!(outcome.tool_calls.is_empty());
    assert_eq!(outcome.messages.len(), 2);

    let request = &provider.requests()[0];
    assert_eq!(request.model, "test-model");
    let names: Vec<&str> = request
        .tools
        .as_ref()
        .unwrap()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["add_numbers", "multiply_numbers"]);
}

#[tokio::test]
async fn test_tool_round_trip() {
    let provider = ScriptedProvider::new(vec![
        tool_call(&[
            ("t1", "add_numbers", json!({"a": 3, "b": 4})),
            ("t2", "multiply_numbers", json!({"a": 6, "b": 7})),
        ]),
        answer("3 + 4 = 7 and 6 × 7 = 42"),
    ]);
    let outcome = executor(provider.clone(), calculator_registry())
        .run("Compute both")
        .await
        .unwrap();

    assert_eq!(outcome.text, "3 + 4 = 7 and 6 × 7 = 42");
    assert_eq!(outcome.tool_calls, vec!["add_numbers", "multiply_numbers"]);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.usage.total(), 30);

    let requests = provider.requests();
    assert_eq!(
        tool_results(&requests[1]),
        vec![
            ("t1".to_string(), "7".to_string(), false),
            ("t2".to_string(), "42".to_string(), false),
        ]
    );
}

#[tokio::test]
async fn test_unknown_tool_and_tool_error_go_back_to_model() {
    let provider = ScriptedProvider::new(vec![
        tool_call(&[
            ("t1", "get_stock_price", json!({"symbol": "ACME"})),
            ("t2", "add_numbers", json!({"a": "three"})),
            ("t3", "multiply_numbers", json!({"a": i64::MAX, "b": 2})),
        ]),
        answer("Sorry, I could not do that."),
    ]);
    let outcome = executor(provider.clone(), calculator_registry())
        .run("Try things")
        .await
        .unwrap();
    assert_eq!(outcome.text, "Sorry, I could not do that.");

    let results = tool_results(&provider.requests()[1]);
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|(_, _, is_error)| *is_error));
    assert!(results[0].1.contains("Tool not found: get_stock_price"));
    assert!(results[1].1.contains("Invalid parameters"));
    assert!(results[2].1.contains("multiply_numbers"));
}

#[tokio::test]
async fn test_max_iterations() {
    let replies = (0..4)
        .map(|i| {
            let id = format!("t{i}");
            tool_call(&[(id.as_str(), "add_numbers", json!({"a": 1, "b": 1}))])
        })
        .collect();
    let provider = ScriptedProvider::new(replies);
    let err = executor(provider.clone(), calculator_registry())
        .run("Loop forever")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MaxIterations(4)));
    assert_eq!(provider.requests().len(), 4);
}

#[tokio::test]
async fn test_max_tokens_returns_partial_text() {
    let provider = ScriptedProvider::new(vec![CompletionResponse {
        message: Message::assistant("The answer is"),
        stop_reason: StopReason::MaxTokens,
        usage: usage(),
    }]);
    let outcome = executor(provider, calculator_registry())
        .run("Explain")
        .await
        .unwrap();
    assert_eq!(outcome.text, "The answer is");
    assert_eq!(outcome.stop_reason, StopReason::MaxTokens);
}

#[tokio::test]
async fn test_truncated_tool_call_is_not_left_dangling() {
    let provider = ScriptedProvider::new(vec![
        CompletionResponse {
            message: Message::blocks(
                Role::Assistant,
                vec![
                    ContentBlock::Text {
                        text: "Let me add those.".to_string(),
                    },
                    ContentBlock::ToolUse {
                        id: "t1".to_string(),
                        name: "add_numbers".to_string(),
                        input: json!({"a": 1}),
                    },
                ],
            ),
            stop_reason: StopReason::MaxTokens,
            usage: usage(),
        },
        CompletionResponse {
            message: Message::blocks(
                Role::Assistant,
                vec![ContentBlock::ToolUse {
                    id: "t2".to_string(),
                    name: "add_numbers".to_string(),
                    input: json!({}),
                }],
            ),
            stop_reason: StopReason::MaxTokens,
            usage: usage(),
        },
        answer("3"),
    ]);
    let agent = ToolAgent::new(executor(provider.clone(), calculator_registry()), "calc");

    let first = agent.run("1+2?").await.unwrap();
    assert_eq!(first.text, "Let me add those.");
    assert_eq!(first.stop_reason, StopReason::MaxTokens);
    let second = agent.run("Try again").await.unwrap();
    assert_eq!(second.text, "");
    assert_eq!(agent.run("Once more").await.unwrap().text, "3");

    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert!(request.messages.iter().all(|m| !m.has_tool_uses()));
    }
    // user, assistant text, user, user
    assert_eq!(requests[2].messages.len(), 4);
}

#[tokio::test]
async fn test_provider_error_propagates() {
    let mut provider = MockProvider::new();
    provider
        .expect_complete()
        .times(1)
        .returning(|_| Err(LLMError::RateLimitExceeded("slow down".to_string())));
    provider.expect_name().return_const("mock".to_string());

    let err = executor(Arc::new(provider), calculator_registry())
        .run("Hi")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Llm(msg) if msg.contains("slow down")));
}

#[tokio::test]
async fn test_system_prompt_and_temperature_are_sent() {
    let mut provider = MockProvider::new();
    provider
        .expect_complete()
        .withf(|request| {
            request.system.as_deref() == Some("Be brief.")
                && request.temperature == Some(0.2)
                && request.max_tokens == 256
        })
        .times(1)
        .returning(|_| Ok(answer("ok")));

    let executor = AgentExecutor::builder()
        .provider(Arc::new(provider))
        .config(ExecutorConfig {
            system_prompt: Some("Be brief.".to_string()),
            temperature: Some(0.2),
            max_tokens: 256,
            ..ExecutorConfig::default()
        })
        .build()
        .unwrap();
    assert_eq!(executor.run("hi").await.unwrap().text, "ok");
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

#[async_trait]
impl ExecutorEventHandler for Recorder {
    async fn on_tool_start(&self, _id: &str, name: &str, _input: &Value) {
        self.events.lock().unwrap().push(format!("start {name}"));
    }

    async fn on_tool_done(
        &self,
        _id: &str,
        name: &str,
        result: Result<&Value, &str>,
        _duration_ms: u64,
    ) {
        let status = if result.is_ok() { "ok" } else { "err" };
        self.events.lock().unwrap().push(format!("done {name} {status}"));
    }

    async fn on_complete(&self, result: &str) {
        self.events.lock().unwrap().push(format!("complete {result}"));
    }
}

#[tokio::test]
async fn test_event_handler_sees_tool_calls() {
    let provider = ScriptedProvider::new(vec![
        tool_call(&[("t1", "add_numbers", json!({"a": 1, "b": 2}))]),
        answer("3"),
    ]);
    let recorder = Arc::new(Recorder::default());
    let executor = executor(provider, calculator_registry()).with_event_handler(recorder.clone());
    executor.run("1+2").await.unwrap();

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["start add_numbers", "done add_numbers ok", "complete 3"]
    );
}

#[tokio::test]
async fn test_tool_agent_keeps_history_and_fills_context() {
    let provider = ScriptedProvider::new(vec![
        tool_call(&[("t1", "add_numbers", json!({"a": 2, "b": 2}))]),
        answer("4"),
        answer("Still 4"),
    ]);
    let agent = ToolAgent::new(executor(provider.clone(), calculator_registry()), "calc");

    let mut context = Context::new().with_session_id("s-1");
    let first = agent.process("2+2?".to_string(), &mut context).await.unwrap();
    assert_eq!(first, "4");
    assert_eq!(context.tool_calls(), vec!["add_numbers"]);
    assert_eq!(context.iterations(), Some(2));
    assert_eq!(context.usage().unwrap().input_tokens, 20);

    let second = agent.process("And again?".to_string(), &mut context).await.unwrap();
    assert_eq!(second, "Still 4");
    assert!(context.tool_calls().is_empty());
    assert_eq!(context.session_id(), Some("s-1"));

    // second request carries the first exchange
    let requests = provider.requests();
    assert_eq!(requests[2].messages.len(), 5);
    assert_eq!(agent.history().await.len(), 6);
    assert_eq!(agent.name(), "calc");
}

#[tokio::test]
async fn test_agent_with_mcp_tools() {
    let server = McpServer::builder("weather")
        .tools(station::station_tools())
        .resource(Arc::new(FnResource::new(
            station::CITIES_RESOURCE_URI,
            "cities",
            || async { Ok(station::cities_listing()) },
        )))
        .build()
        .unwrap();
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        let (r, w) = tokio::io::split(server_io);
        server.serve(r, w).await
    });
    let (r, w) = tokio::io::split(client_io);

    let manager = Arc::new(MCPClientManager::new(
        Arc::new(MCPConfig::default()),
        "weather-agent",
    ));
    manager
        .add_client("weather", Arc::new(StreamMCPClient::new(r, w)))
        .await
        .unwrap();

    let provider = ScriptedProvider::new(vec![
        tool_call(&[("t1", "get_weather", json!({"city": "Sapporo"}))]),
        answer("It is raining in Sapporo."),
    ]);
    let runtime = AgentRuntime::builder()
        .provider(provider.clone())
        .tool_registry(calculator_registry())
        .build()
        .unwrap();

    let mut agent = runtime
        .create_tool_agent_with_manager(
            ExecutorConfig::default(),
            "weather-agent",
            Arc::clone(&manager),
        )
        .await
        .unwrap();
    assert_eq!(
        agent.executor().tools().names(),
        vec!["add_numbers", "get_forecast", "get_weather", "multiply_numbers"]
    );

    let mut context = Context::new();
    let reply = agent
        .process("Weather in Sapporo?".to_string(), &mut context)
        .await
        .unwrap();
    assert_eq!(reply, "It is raining in Sapporo.");

    let results = tool_results(&provider.requests()[1]);
    assert_eq!(results[0].1, station::current_report("Sapporo"));

    agent.shutdown().await.unwrap();
    assert!(!manager.has_connections().await);
}

#[tokio::test]
async fn test_runtime_without_mcp_config() {
    let provider = ScriptedProvider::new(vec![answer("hi")]);
    let runtime = AgentRuntime::builder()
        .provider(provider)
        .tool_registry(calculator_registry())
        .build()
        .unwrap();

    let agent = runtime
        .create_tool_agent_with_mcp(runtime.default_executor_config(), "plain")
        .await
        .unwrap();
    assert!(agent.mcp_manager().is_none());
    assert_eq!(agent.executor().tools().len(), 2);
}

#[tokio::test]
async fn test_runtime_event_handler_reaches_agents() {
    let provider = ScriptedProvider::new(vec![
        tool_call(&[("t1", "multiply_numbers", json!({"a": 2, "b": 4}))]),
        answer("8"),
    ]);
    let recorder = Arc::new(Recorder::default());
    let runtime = AgentRuntime::builder()
        .provider(provider)
        .tool_registry(calculator_registry())
        .event_handler(recorder.clone())
        .build()
        .unwrap();

    let agent = runtime.create_tool_agent(runtime.default_executor_config(), "calc");
    agent.run("2*4").await.unwrap();

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["start multiply_numbers", "done multiply_numbers ok", "complete 8"]
    );
}
