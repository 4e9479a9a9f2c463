// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::Form,
    http::header,
    response::{IntoResponse, Redirect},
};
use tracing::info;
use validator::Validate;

use crate::{
    application::dto::login_request::LoginRequestDto,
    domain::models::{chat_app::UserIdentity, generation::GenerationError},
    presentation::{
        errors::AppError,
        extractors::owner::{clear_owner_cookie, owner_cookie},
    },
};

/// 记录所有者标签
///
/// 只把由表单身份生成的标签写入 cookie，然后重定向到首页；不做任何认证
pub async fn login(Form(payload): Form<LoginRequestDto>) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let identity = UserIdentity::from(payload);
    let owner = identity
        .to_owner()
        .ok_or_else(|| GenerationError::InvalidInput("Name is required".to_string()))?;

    info!("Owner label set for {}", owner);
    Ok((
        [(header::SET_COOKIE, owner_cookie(&owner))],
        Redirect::to("/"),
    ))
}

/// 清除所有者标签
pub async fn logout() -> impl IntoResponse {
    ([(header::SET_COOKIE, clear_owner_cookie())], Redirect::to("/"))
}
