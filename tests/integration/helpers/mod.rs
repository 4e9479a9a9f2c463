// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use chatgen::application::use_cases::browse_chat_apps::BrowseChatAppsUseCase;
use chatgen::application::use_cases::generate_chat_app::GenerateChatAppUseCase;
use chatgen::domain::models::generation::{GenerationError, GenerationEvent};
use chatgen::domain::repositories::prompt_resource_repository::PromptResourceRepository;
use chatgen::domain::services::llm_service::{CompletionRequest, CompletionService, DeltaStream};
use chatgen::infrastructure::repositories::chat_app_repo_impl::ChatAppRepositoryImpl;
use chatgen::presentation::routes;
use futures::{stream, StreamExt};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEMPLATE: &str = "Build a single-file chat application.";
pub const EXAMPLE: &str = "<html><head><title>Reference</title></head><body></body></html>";

/// 创建已迁移的内存数据库
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(db)
}

/// 按脚本回放的补全服务
///
/// 缓冲模式返回 `buffered`，流式模式依次产出 `deltas`，并记录收到的请求
pub struct ScriptedCompletion {
    buffered: Result<String, GenerationError>,
    deltas: Vec<Result<String, GenerationError>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

#[allow(dead_code)]
impl ScriptedCompletion {
    pub fn buffered(response: impl Into<String>) -> Self {
        Self {
            buffered: Ok(response.into()),
            deltas: Vec::new(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: GenerationError) -> Self {
        Self {
            buffered: Err(err.clone()),
            deltas: vec![Err(err)],
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn streaming(deltas: &[&str]) -> Self {
        Self::streaming_results(deltas.iter().map(|d| Ok(d.to_string())).collect())
    }

    pub fn streaming_results(deltas: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            buffered: Err(GenerationError::Internal("not scripted".to_string())),
            deltas,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn record(&self, request: &CompletionRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        self.record(request);
        self.buffered.clone()
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<DeltaStream, GenerationError> {
        self.record(request);
        Ok(stream::iter(self.deltas.clone()).boxed())
    }
}

/// 内存中的提示资源
pub struct StaticResources {
    pub template: Option<String>,
    pub example: Option<String>,
}

#[allow(dead_code)]
impl StaticResources {
    pub fn new() -> Self {
        Self {
            template: Some(TEMPLATE.to_string()),
            example: Some(EXAMPLE.to_string()),
        }
    }

    pub fn without_example() -> Self {
        Self {
            template: Some(TEMPLATE.to_string()),
            example: None,
        }
    }
}

#[async_trait]
impl PromptResourceRepository for StaticResources {
    async fn read_template(&self) -> Result<String, GenerationError> {
        self.template
            .clone()
            .ok_or_else(|| GenerationError::NotFound("Prompt file not found".to_string()))
    }

    async fn read_reference_example(&self) -> Result<String, GenerationError> {
        self.example
            .clone()
            .ok_or_else(|| GenerationError::NotFound("Example HTML file not found".to_string()))
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub repo: Arc<ChatAppRepositoryImpl>,
    pub generate: Arc<GenerateChatAppUseCase>,
    pub completion: Arc<ScriptedCompletion>,
}

pub async fn create_test_app(completion: ScriptedCompletion) -> TestApp {
    create_test_app_with_resources(completion, StaticResources::new()).await
}

pub async fn create_test_app_with_resources(
    completion: ScriptedCompletion,
    resources: StaticResources,
) -> TestApp {
    let db = setup_db().await;
    let repo = Arc::new(ChatAppRepositoryImpl::new(db.clone()));
    let completion = Arc::new(completion);

    let generate = Arc::new(GenerateChatAppUseCase::new(
        repo.clone(),
        Arc::new(resources),
        completion.clone(),
    ));
    let browse = Arc::new(BrowseChatAppsUseCase::new(repo.clone()));

    let server = TestServer::new(routes::app(generate.clone(), browse)).unwrap();

    TestApp {
        server,
        db,
        repo,
        generate,
        completion,
    }
}

/// 解析 SSE 响应体中的全部 `data:` 帧
#[allow(dead_code)]
pub fn parse_sse_frames(body: &str) -> Vec<GenerationEvent> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}
