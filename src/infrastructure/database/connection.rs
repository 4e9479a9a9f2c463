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

use crate::config::settings::DatabaseSettings;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::info;

/// 聊天应用存储所使用的数据库后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// SQLite，`in_memory` 表示库只存在于连接内部
    Sqlite { in_memory: bool },
    /// PostgreSQL
    Postgres,
}

impl StoreBackend {
    /// 根据连接 URL 的 scheme 判断后端
    ///
    /// 错误信息只包含 scheme，不回显可能带密码的完整 URL
    pub fn from_url(url: &str) -> Result<Self, DbErr> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme {
            "sqlite" => Ok(Self::Sqlite {
                in_memory: url.contains(":memory:") || url.contains("mode=memory"),
            }),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(DbErr::Custom(format!(
                "Unsupported database scheme for chat app store: '{}'",
                other
            ))),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Sqlite { in_memory: true } => "sqlite (in-memory)",
            Self::Sqlite { in_memory: false } => "sqlite",
            Self::Postgres => "postgres",
        }
    }
}

/// 根据配置生成连接选项
///
/// 内存 SQLite 库随连接一起消失，所以固定为单个常驻连接，
/// 并忽略配置中的连接数和回收时间
pub fn connect_options(settings: &DatabaseSettings, backend: StoreBackend) -> ConnectOptions {
    let mut opt = ConnectOptions::new(settings.url.to_owned());

    if let Some(timeout) = settings.connect_timeout {
        opt.connect_timeout(Duration::from_secs(timeout));
        opt.acquire_timeout(Duration::from_secs(timeout));
    }

    if backend == (StoreBackend::Sqlite { in_memory: true }) {
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        return opt;
    }

    if let Some(max) = settings.max_connections {
        opt.max_connections(max);
    }
    if let Some(min) = settings.min_connections {
        opt.min_connections(min);
    }
    if let Some(idle) = settings.idle_timeout {
        opt.idle_timeout(Duration::from_secs(idle));
    }

    opt.max_lifetime(Duration::from_secs(3600)).sqlx_logging(true);
    opt
}

/// 创建聊天应用存储的连接池
///
/// 仓库的每个操作都从池中借用一个连接并在操作结束后归还，
/// 不会有跨操作持有的连接或事务
pub async fn create_pool(settings: &DatabaseSettings) -> Result<DatabaseConnection, DbErr> {
    let backend = StoreBackend::from_url(&settings.url)?;
    let opt = connect_options(settings, backend);

    info!(
        backend = backend.name(),
        max_connections = ?opt.get_max_connections(),
        "Connecting chat app store"
    );

    Database::connect(opt).await
}
