//! In-memory port implementations for unit and router tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use pawtale::{
    ChatMessage, CompletionOptions, CompletionResponse, GenerationError, ModerationVerdict,
    PersistenceError, PimsGateway, StoryLlm, StoryStore, UpstreamError, UpstreamErrorKind,
    XanoStoryPayload,
};

use crate::config::AppConfig;
use crate::AppState;

/// `n` whitespace-separated words
pub fn words(n: usize) -> String {
    vec!["woof"; n].join(" ")
}

pub struct FakeLlm {
    content: Option<String>,
    fail: bool,
    moderation: Result<bool, ()>,
    completions: Mutex<Vec<(Vec<ChatMessage>, CompletionOptions)>>,
}

impl FakeLlm {
    pub fn with_content(content: Option<String>) -> Self {
        Self {
            content,
            fail: false,
            moderation: Ok(false),
            completions: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(content: impl Into<String>) -> Self {
        Self::with_content(Some(content.into()))
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_content(None)
        }
    }

    /// `Ok(flagged)` for a verdict, `Err(())` for an unreachable endpoint
    pub fn moderation(mut self, verdict: Result<bool, ()>) -> Self {
        self.moderation = verdict;
        self
    }

    pub fn completions(&self) -> Vec<(Vec<ChatMessage>, CompletionOptions)> {
        self.completions.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoryLlm for FakeLlm {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, GenerationError> {
        self.completions
            .lock()
            .unwrap()
            .push((messages.to_vec(), options.clone()));
        if self.fail {
            return Err(GenerationError::Provider("API error (401): bad key".to_string()));
        }
        Ok(CompletionResponse {
            content: self.content.clone(),
            model: "fake-model".to_string(),
            ..Default::default()
        })
    }

    async fn moderate(&self, _text: &str) -> Result<ModerationVerdict, GenerationError> {
        match self.moderation {
            Ok(flagged) => Ok(ModerationVerdict {
                flagged,
                categories: if flagged { vec!["violence".to_string()] } else { vec![] },
            }),
            Err(()) => Err(GenerationError::Provider("moderation unavailable".to_string())),
        }
    }

    fn model_id(&self) -> &str {
        "fake-model"
    }
}

pub struct FakePims {
    patients: Result<Value, UpstreamErrorKind>,
    detail: Option<Value>,
}

impl FakePims {
    /// Serves `body` from the list endpoint; the by-id endpoint 404s
    pub fn listing(body: Value) -> Self {
        Self {
            patients: Ok(body),
            detail: None,
        }
    }

    pub fn failing(kind: UpstreamErrorKind) -> Self {
        Self {
            patients: Err(kind),
            detail: None,
        }
    }

    pub fn with_detail(mut self, body: Value) -> Self {
        self.detail = Some(body);
        self
    }
}

#[async_trait]
impl PimsGateway for FakePims {
    async fn fetch_patients(&self) -> Result<Value, UpstreamError> {
        self.patients
            .clone()
            .map_err(|kind| UpstreamError::new(kind, "fake upstream failure"))
    }

    async fn fetch_patient(&self, _id: &str) -> Result<Value, UpstreamError> {
        match (&self.detail, &self.patients) {
            (Some(body), _) => Ok(body.clone()),
            (None, Err(kind)) => Err(UpstreamError::new(*kind, "fake upstream failure")),
            (None, Ok(_)) => Err(UpstreamError::new(UpstreamErrorKind::NotFound, "404 Not Found")),
        }
    }
}

pub struct FakeStore {
    configured: bool,
    result: Result<String, ()>,
    saves: Mutex<Vec<XanoStoryPayload>>,
}

impl FakeStore {
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            result: Err(()),
            saves: Mutex::new(Vec::new()),
        }
    }

    pub fn saving(id: &str) -> Self {
        Self {
            configured: true,
            result: Ok(id.to_string()),
            ..Self::unconfigured()
        }
    }

    pub fn broken() -> Self {
        Self {
            configured: true,
            ..Self::unconfigured()
        }
    }

    pub fn saves(&self) -> Vec<XanoStoryPayload> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoryStore for FakeStore {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn save_story(&self, payload: &XanoStoryPayload) -> Result<String, PersistenceError> {
        self.saves.lock().unwrap().push(payload.clone());
        self.result
            .clone()
            .map_err(|_| PersistenceError::Request("500 Internal Server Error".to_string()))
    }
}

pub fn test_config(overrides: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("OPENAI_API_KEY".to_string(), "sk-test".to_string());
    vars.insert("APP_ENV".to_string(), "test".to_string());
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    AppConfig::from_map(&vars).unwrap()
}

pub fn test_state(config: AppConfig, llm: FakeLlm, pims: FakePims, store: FakeStore) -> AppState {
    AppState::new(config, Arc::new(llm), Arc::new(pims), Arc::new(store)).unwrap()
}

/// Serve `router` on an ephemeral local port; returns its base URL (`/v1` root)
pub async fn spawn_upstream(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

/// Base URL of a local port nothing listens on
pub async fn closed_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/v1", addr)
}
