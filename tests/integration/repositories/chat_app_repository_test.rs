// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::setup_db;
use chatgen::domain::models::chat_app::{content_digest, NewChatApp, Owner, PREVIEW_CHARS};
use chatgen::domain::repositories::chat_app_repository::ChatAppRepository;
use chatgen::infrastructure::repositories::chat_app_repo_impl::ChatAppRepositoryImpl;
use sea_orm::{EntityTrait, PaginatorTrait};
use std::sync::Arc;

fn owner(label: &str) -> Option<Owner> {
    Owner::from_label(label)
}

/// 测试保存与读取
///
/// 验证保存后能按标识符取回完整记录，包括指纹和所有者
#[tokio::test]
async fn test_save_and_find_by_id() {
    let repo = ChatAppRepositoryImpl::new(setup_db().await);
    let content = "<html><head><title>Neon</title></head></html>";

    let id = repo
        .save(NewChatApp::new("Neon", content, "prompt text", owner("Ada Lovelace")))
        .await
        .unwrap();

    let app = repo.find_by_id(id).await.unwrap().expect("stored app");
    assert_eq!(app.id, id);
    assert_eq!(app.title, "Neon");
    assert_eq!(app.content, content);
    assert_eq!(app.provenance, "prompt text");
    assert_eq!(app.content_digest, content_digest(content));
    assert_eq!(app.owner, owner("Ada Lovelace"));

    assert!(repo.find_by_id(id + 1000).await.unwrap().is_none());
}

/// 测试内容去重
///
/// 相同内容保存两次返回同一个标识符，且只存在一行；
/// 第一次保存的标题、出处和所有者保持不变
#[tokio::test]
async fn test_identical_content_is_deduplicated() {
    let db = setup_db().await;
    let repo = ChatAppRepositoryImpl::new(db.clone());
    let content = "<html><body>same</body></html>";

    let first = repo
        .save(NewChatApp::new("First", content, "first prompt", owner("ada")))
        .await
        .unwrap();
    let second = repo
        .save(NewChatApp::new("Second", content, "second prompt", owner("bob")))
        .await
        .unwrap();

    assert_eq!(first, second);

    use chatgen::infrastructure::database::entities::chat_app as chat_app_entity;
    let rows = chat_app_entity::Entity::find()
        .count(db.as_ref())
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let stored = repo.find_by_id(first).await.unwrap().unwrap();
    assert_eq!(stored.title, "First");
    assert_eq!(stored.provenance, "first prompt");
    assert_eq!(stored.owner, owner("ada"));
}

/// 测试不同内容获得不同标识符
#[tokio::test]
async fn test_distinct_content_gets_distinct_ids() {
    let repo = ChatAppRepositoryImpl::new(setup_db().await);

    let a = repo
        .save(NewChatApp::new("A", "<html>a</html>", "p", None))
        .await
        .unwrap();
    let b = repo
        .save(NewChatApp::new("B", "<html>b</html>", "p", None))
        .await
        .unwrap();

    assert_ne!(a, b);
}

/// 测试并发保存相同内容
///
/// 多个并发保存必须收敛到同一个标识符
#[tokio::test]
async fn test_concurrent_saves_of_same_content_converge() {
    let repo = Arc::new(ChatAppRepositoryImpl::new(setup_db().await));
    let content = "<html><body>race</body></html>";

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.save(NewChatApp::new(format!("T{}", i), content, "p", None))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }

    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(repo.list_all().await.unwrap().len(), 1);
}

/// 测试按所有者列出
///
/// 只返回该所有者的应用，并按创建时间倒序排列
#[tokio::test]
async fn test_list_by_owner_is_filtered_and_newest_first() {
    let repo = ChatAppRepositoryImpl::new(setup_db().await);

    let older = repo
        .save(NewChatApp::new("Older", "<html>1</html>", "p", owner("ada")))
        .await
        .unwrap();
    repo.save(NewChatApp::new("Other", "<html>2</html>", "p", owner("bob")))
        .await
        .unwrap();
    repo.save(NewChatApp::new("Anon", "<html>3</html>", "p", None))
        .await
        .unwrap();
    let newer = repo
        .save(NewChatApp::new("Newer", "<html>4</html>", "p", owner("ada")))
        .await
        .unwrap();

    let mine = repo
        .list_by_owner(&Owner::from_label("ada").unwrap())
        .await
        .unwrap();
    let ids: Vec<_> = mine.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![newer, older]);

    let all = repo.list_all().await.unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all.first().map(|s| s.id), Some(newer));

    let nobody = repo
        .list_by_owner(&Owner::from_label("carol").unwrap())
        .await
        .unwrap();
    assert!(nobody.is_empty());
}

/// 测试列表预览
///
/// 短内容原样返回，达到长度上限的内容截断并追加省略标记
#[tokio::test]
async fn test_summaries_carry_preview() {
    let repo = ChatAppRepositoryImpl::new(setup_db().await);
    let long = format!("<html>{}</html>", "x".repeat(PREVIEW_CHARS * 2));

    let short_id = repo
        .save(NewChatApp::new("Short", "<html></html>", "p", None))
        .await
        .unwrap();
    let long_id = repo
        .save(NewChatApp::new("Long", long.clone(), "p", None))
        .await
        .unwrap();

    let all = repo.list_all().await.unwrap();
    let short = all.iter().find(|s| s.id == short_id).unwrap();
    let long_summary = all.iter().find(|s| s.id == long_id).unwrap();

    assert_eq!(short.preview, "<html></html>");
    assert_eq!(
        long_summary.preview,
        format!("{}...", &long[..PREVIEW_CHARS])
    );
}
