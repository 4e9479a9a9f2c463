// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 创建聊天应用表
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    /// 应用数据库迁移
    ///
    /// # 参数
    ///
    /// * `manager` - 数据库模式管理器
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 迁移成功
    /// * `Err(DbErr)` - 迁移失败
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChatApps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatApps::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatApps::Title).string().not_null())
                    .col(ColumnDef::new(ChatApps::HtmlContent).text().not_null())
                    .col(ColumnDef::new(ChatApps::PromptUsed).text().not_null())
                    .col(
                        ColumnDef::new(ChatApps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // Dedup key; the unique constraint is what makes concurrent inserts safe
                    .col(
                        ColumnDef::new(ChatApps::ContentHash)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ChatApps::Owner).string().null())
                    .to_owned(),
            )
            .await
    }

    /// 回滚数据库迁移
    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChatApps::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum ChatApps {
    Table,
    Id,
    Title,
    HtmlContent,
    PromptUsed,
    CreatedAt,
    ContentHash,
    Owner,
}
