// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::browse_chat_apps::BrowseChatAppsUseCase;
use crate::application::use_cases::generate_chat_app::GenerateChatAppUseCase;
use crate::presentation::handlers::{chat_app_handler, session_handler};
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 返回值
///
/// 返回未注入依赖的路由，调用方通过 `Extension` 层提供用例
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version))
        .route("/login", post(session_handler::login))
        .route("/logout", get(session_handler::logout));

    let app_routes = Router::new()
        .route(
            "/generate-chat-app",
            get(chat_app_handler::generate_chat_app),
        )
        .route(
            "/generate-chat-app/stream",
            get(chat_app_handler::stream_chat_app),
        )
        .route("/apps", get(chat_app_handler::list_chat_apps))
        .route("/apps/{id}", get(chat_app_handler::get_chat_app));

    Router::new().merge(public_routes).merge(app_routes)
}

/// 创建注入了用例和请求追踪的完整应用
pub fn app(
    generate: Arc<GenerateChatAppUseCase>,
    browse: Arc<BrowseChatAppsUseCase>,
) -> Router {
    routes().layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(Extension(generate))
            .layer(Extension(browse)),
    )
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
