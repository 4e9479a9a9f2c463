// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::models::chat_app::UserIdentity;

/// 登录表单
///
/// 只用来给存储的应用打上所有者标签，不做任何认证
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct LoginRequestDto {
    #[validate(length(min = 1, max = 64))]
    pub first: String,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub last: String,
}

impl From<LoginRequestDto> for UserIdentity {
    fn from(dto: LoginRequestDto) -> Self {
        UserIdentity::new(dto.first, dto.last)
    }
}
