// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

use crate::m20250801_000001_create_chat_apps::ChatApps;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Per-owner listing, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_chat_apps_owner_created_at")
                    .table(ChatApps::Table)
                    .col(ChatApps::Owner)
                    .col(ChatApps::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_chat_apps_owner_created_at")
                    .table(ChatApps::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
