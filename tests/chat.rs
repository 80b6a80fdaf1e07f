mod common;

use docchat::models::{IngestionEvent, Sender};
use serde_json::Value;

#[tokio::test]
async fn first_message_is_published_with_the_whole_log() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = app.token_for("alice", "pw123").await;
    let chat_id = app.create_chat(&token).await;

    let response = app.post_message(&token, chat_id, "user", "Hi").await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let messages = body["item"]["messages"].as_array().unwrap();
    assert_eq!(1, messages.len());
    assert_eq!(messages[0]["id"], "msg0");
    assert_eq!(messages[0]["sender"], "user");
    assert_eq!(messages[0]["text"], "Hi");
    assert_eq!(body["item"]["unread"], false);

    let events = app.publisher.events();
    assert_eq!(1, events.len());
    match &events[0] {
        IngestionEvent::ChatAssistant(event) => {
            assert_eq!(event.chat_id as i64, chat_id);
            assert_eq!(1, event.messages.len());
            assert_eq!(event.messages[0].id, "msg0");
            assert_eq!(event.messages[0].sender, Sender::User);
            assert_eq!(event.messages[0].text, "Hi");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn new_chat_starts_empty_and_read() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = app.token_for("alice", "pw123").await;
    let chat_id = app.create_chat(&token).await;

    let body: Value = app
        .client
        .get(app.url(&format!("/chats/{chat_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["item"]["messages"], serde_json::json!([]));
    assert_eq!(body["item"]["unread"], false);
}

#[tokio::test]
async fn sequential_appends_keep_order() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = app.token_for("alice", "pw123").await;
    let chat_id = app.create_chat(&token).await;

    const N: usize = 5;
    for i in 0..N {
        let response = app
            .post_message(&token, chat_id, "user", &format!("message {i}"))
            .await;
        assert_eq!(200, response.status().as_u16());
    }

    let messages = docchat::db::chat::read_log(&app.db_pool, chat_id as i32)
        .await
        .unwrap();
    assert_eq!(N, messages.len());
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.id, format!("msg{i}"));
        assert_eq!(message.text, format!("message {i}"));
    }
    for pair in messages.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[tokio::test]
async fn concurrent_appends_both_survive() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = app.token_for("alice", "pw123").await;
    let chat_id = app.create_chat(&token).await;
    app.post_message(&token, chat_id, "user", "before").await;

    let (first, second) = tokio::join!(
        app.post_message(&token, chat_id, "user", "left"),
        app.post_message(&token, chat_id, "assistant", "right"),
    );
    assert_eq!(200, first.status().as_u16());
    assert_eq!(200, second.status().as_u16());

    let messages = docchat::db::chat::read_log(&app.db_pool, chat_id as i32)
        .await
        .unwrap();
    assert_eq!(3, messages.len());
    let mut ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(3, ids.len());
    assert!(messages.iter().any(|m| m.text == "left"));
    assert!(messages.iter().any(|m| m.text == "right"));
    assert_eq!(3, app.publisher.events().len());
}

#[tokio::test]
async fn assistant_reply_marks_chat_unread() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = app.token_for("alice", "pw123").await;
    let chat_id = app.create_chat(&token).await;

    let unread = |token: String| {
        let request = app
            .client
            .get(app.url(&format!("/chats/{chat_id}/unread")))
            .bearer_auth(token);
        async move {
            let body: Value = request.send().await.unwrap().json().await.unwrap();
            body["item"]["unread"].as_bool().unwrap()
        }
    };

    app.post_message(&token, chat_id, "user", "question").await;
    assert!(!unread(token.clone()).await);

    app.post_message(&token, chat_id, "assistant", "answer").await;
    assert!(unread(token.clone()).await);

    let response = app
        .client
        .post(app.url(&format!("/chats/{chat_id}/mark-as-read")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    assert!(!unread(token.clone()).await);
}

#[tokio::test]
async fn unknown_sender_is_rejected_without_append() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = app.token_for("alice", "pw123").await;
    let chat_id = app.create_chat(&token).await;

    let response = app.post_message(&token, chat_id, "moderator", "hi").await;
    assert_eq!(400, response.status().as_u16());

    let messages = docchat::db::chat::read_log(&app.db_pool, chat_id as i32)
        .await
        .unwrap();
    assert!(messages.is_empty());
    assert!(app.publisher.events().is_empty());
}

#[tokio::test]
async fn foreign_and_missing_chats_are_indistinguishable() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let alice = app.token_for("alice", "pw123").await;
    let bob = app.token_for("bob", "pw456").await;
    let chat_id = app.create_chat(&alice).await;
    let missing_id = chat_id + 1000;

    let foreign = app.post_message(&bob, chat_id, "user", "hi").await;
    let missing = app.post_message(&bob, missing_id, "user", "hi").await;
    assert_eq!(403, foreign.status().as_u16());
    assert_eq!(403, missing.status().as_u16());
    assert_eq!(foreign.text().await.unwrap(), missing.text().await.unwrap());

    for path in [
        format!("/chats/{chat_id}"),
        format!("/chats/{missing_id}"),
        format!("/chats/{chat_id}/unread"),
    ] {
        let response = app
            .client
            .get(app.url(&path))
            .bearer_auth(&bob)
            .send()
            .await
            .unwrap();
        assert_eq!(403, response.status().as_u16(), "{path}");
    }
    assert!(app.publisher.events().is_empty());
}

#[tokio::test]
async fn malformed_chat_id_is_bad_request() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = app.token_for("alice", "pw123").await;

    let response = app
        .client
        .get(app.url("/chats/abc"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn deleted_chat_is_gone() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = app.token_for("alice", "pw123").await;
    let chat_id = app.create_chat(&token).await;
    app.post_message(&token, chat_id, "user", "hi").await;

    let response = app
        .client
        .delete(app.url(&format!("/chats/{chat_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    let response = app
        .client
        .get(app.url(&format!("/chats/{chat_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn corrupt_log_is_left_untouched_by_append() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = app.token_for("alice", "pw123").await;
    let chat_id = app.create_chat(&token).await;
    sqlx::query(r#"UPDATE chats SET messages = '{"broken":true}'::jsonb WHERE id = $1"#)
        .bind(chat_id as i32)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app.post_message(&token, chat_id, "user", "hi").await;
    assert_eq!(500, response.status().as_u16());

    let (messages, next_seq): (Value, i32) =
        sqlx::query_as(r#"SELECT messages, next_message_seq FROM chats WHERE id = $1"#)
            .bind(chat_id as i32)
            .fetch_one(&app.db_pool)
            .await
            .unwrap();
    assert_eq!(messages, serde_json::json!({"broken": true}));
    assert_eq!(0, next_seq);
    assert!(app.publisher.events().is_empty());
}

#[tokio::test]
async fn log_with_malformed_entries_is_left_untouched_by_append() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = app.token_for("alice", "pw123").await;
    let chat_id = app.create_chat(&token).await;
    sqlx::query(r#"UPDATE chats SET messages = '[{"id":"msg0"}]'::jsonb WHERE id = $1"#)
        .bind(chat_id as i32)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app.post_message(&token, chat_id, "user", "hi").await;
    assert_eq!(500, response.status().as_u16());

    let messages: Value = sqlx::query_scalar(r#"SELECT messages FROM chats WHERE id = $1"#)
        .bind(chat_id as i32)
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(messages, serde_json::json!([{"id": "msg0"}]));
}

#[tokio::test]
async fn nul_in_message_text_is_rejected_without_append() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let token = app.token_for("alice", "pw123").await;
    let chat_id = app.create_chat(&token).await;

    let response = app.post_message(&token, chat_id, "user", "a\u{0}b").await;
    assert_eq!(400, response.status().as_u16());

    let messages = docchat::db::chat::read_log(&app.db_pool, chat_id as i32)
        .await
        .unwrap();
    assert!(messages.is_empty());
    assert!(app.publisher.events().is_empty());
}
