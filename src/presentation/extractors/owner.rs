// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::domain::models::chat_app::Owner;

/// 保存所有者标签的 cookie 名
pub const OWNER_COOKIE: &str = "user";

/// 请求携带的所有者标签
///
/// 未设置 cookie 时为 `None`（匿名）。标签未经验证，只用于划分存储的应用。
#[derive(Debug, Clone)]
pub struct OwnerCookie(pub Option<Owner>);

impl<S> FromRequestParts<S> for OwnerCookie
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OwnerCookie(owner_from_headers(&parts.headers)))
    }
}

/// 从 `Cookie` 请求头中读取所有者标签
pub fn owner_from_headers(headers: &HeaderMap) -> Option<Owner> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == OWNER_COOKIE)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .and_then(|label| Owner::from_label(label.into_owned()))
}

/// 写入所有者标签的 `Set-Cookie` 值
pub fn owner_cookie(owner: &Owner) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        OWNER_COOKIE,
        urlencoding::encode(owner.as_str())
    )
}

/// 清除所有者标签的 `Set-Cookie` 值
pub fn clear_owner_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0", OWNER_COOKIE)
}
