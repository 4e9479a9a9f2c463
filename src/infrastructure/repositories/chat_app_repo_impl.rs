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

use crate::domain::models::chat_app::{ChatApp, ChatAppId, ChatAppSummary, NewChatApp, Owner};
use crate::domain::repositories::chat_app_repository::{ChatAppRepository, RepositoryError};
use crate::infrastructure::database::entities::chat_app as chat_app_entity;
use crate::infrastructure::metrics;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use std::sync::Arc;
use tracing::{debug, info};

/// 聊天应用仓库实现
pub struct ChatAppRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl ChatAppRepositoryImpl {
    /// 创建新的聊天应用仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_id_by_digest(&self, digest: &str) -> Result<ChatAppId, RepositoryError> {
        chat_app_entity::Entity::find()
            .filter(chat_app_entity::Column::ContentHash.eq(digest))
            .one(self.db.as_ref())
            .await?
            .map(|m| m.id)
            .ok_or(RepositoryError::NotFound)
    }

    /// 内容已存在时返回已有行的标识符
    async fn existing(&self, digest: &str) -> Result<ChatAppId, RepositoryError> {
        let id = self.find_id_by_digest(digest).await?;
        debug!("Content {} already stored as chat app {}", digest, id);
        metrics::record_deduplicated();
        Ok(id)
    }

    async fn summaries(
        &self,
        query: Select<chat_app_entity::Entity>,
    ) -> Result<Vec<ChatAppSummary>, RepositoryError> {
        let models = query
            .order_by_desc(chat_app_entity::Column::CreatedAt)
            .order_by_desc(chat_app_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(models
            .into_iter()
            .map(|m| ChatAppSummary::new(m.id, m.title, m.created_at, &m.html_content))
            .collect())
    }
}

impl From<chat_app_entity::Model> for ChatApp {
    fn from(m: chat_app_entity::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            content: m.html_content,
            provenance: m.prompt_used,
            created_at: m.created_at,
            content_digest: m.content_hash,
            owner: m.owner.and_then(Owner::from_label),
        }
    }
}

#[async_trait]
impl ChatAppRepository for ChatAppRepositoryImpl {
    async fn save(&self, app: NewChatApp) -> Result<ChatAppId, RepositoryError> {
        let digest = app.content_digest().to_string();
        let active_model = chat_app_entity::ActiveModel {
            id: NotSet,
            title: Set(app.title),
            html_content: Set(app.content),
            prompt_used: Set(app.provenance),
            created_at: Set(Utc::now()),
            content_hash: Set(digest.clone()),
            owner: Set(app.owner.map(|o| o.as_str().to_string())),
        };

        // Insert-or-detect-conflict happens in one statement; never check-then-insert
        let result = chat_app_entity::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(chat_app_entity::Column::ContentHash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await;

        match result {
            Ok(inserted) => {
                info!("Stored chat app {} ({})", inserted.last_insert_id, digest);
                Ok(inserted.last_insert_id)
            }
            Err(DbErr::RecordNotInserted) => self.existing(&digest).await,
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                self.existing(&digest).await
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: ChatAppId) -> Result<Option<ChatApp>, RepositoryError> {
        let model = chat_app_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(ChatApp::from))
    }

    async fn list_by_owner(&self, owner: &Owner) -> Result<Vec<ChatAppSummary>, RepositoryError> {
        self.summaries(
            chat_app_entity::Entity::find()
                .filter(chat_app_entity::Column::Owner.eq(owner.as_str())),
        )
        .await
    }

    async fn list_all(&self) -> Result<Vec<ChatAppSummary>, RepositoryError> {
        self.summaries(chat_app_entity::Entity::find()).await
    }
}
