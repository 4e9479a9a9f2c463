// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Context;
use chatgen::application::use_cases::browse_chat_apps::BrowseChatAppsUseCase;
use chatgen::application::use_cases::generate_chat_app::GenerateChatAppUseCase;
use chatgen::config::settings::Settings;
use chatgen::domain::services::llm_service::OpenAiCompletionService;
use chatgen::infrastructure::database::connection;
use chatgen::infrastructure::metrics;
use chatgen::infrastructure::repositories::chat_app_repo_impl::ChatAppRepositoryImpl;
use chatgen::infrastructure::resources::LocalPromptResources;
use chatgen::presentation::routes;
use chatgen::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use migration::{Migrator, MigratorTrait};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting chatgen...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    metrics::init_metrics(&settings.metrics);

    // 3. Completion client; a missing API key stops startup here
    let completion = Arc::new(
        OpenAiCompletionService::new(&settings.llm)
            .context("Completion service is not configured")?,
    );
    info!(
        "Completion client ready (model={}, timeout={}s)",
        settings.llm.model, settings.llm.timeout_secs
    );

    // 4. Connect to database and bootstrap the schema
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 5. Wire use cases
    let repository = Arc::new(ChatAppRepositoryImpl::new(db.clone()));
    let resources = Arc::new(LocalPromptResources::from_settings(&settings.resources));
    let generate = Arc::new(GenerateChatAppUseCase::new(
        repository.clone(),
        resources,
        completion,
    ));
    let browse = Arc::new(BrowseChatAppsUseCase::new(repository));

    // 6. Start HTTP server
    let app = routes::app(generate, browse);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
