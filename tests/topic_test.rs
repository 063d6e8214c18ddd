mod common;

use serde_json::Value;

#[tokio::test]
async fn new_topic_is_pending_and_hidden() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let (_user_id, user_token) = common::create_test_user(&app, "author").await;
    let topic_id = common::create_test_topic(&app, &user_token, category_id, "Pending topic").await;

    // Not in the public listing
    let resp = app.client.get(app.url("/topics")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 0);

    // Anonymous fetch: indistinguishable from missing
    let resp = app
        .client
        .get(app.url(&format!("/topics/{}", topic_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Another user: same 404
    let (_other_id, other_token) = common::create_test_user(&app, "other").await;
    let resp = app
        .client
        .get(app.url(&format!("/topics/{}", topic_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Owner sees their own pending topic
    let resp = app
        .client
        .get(app.url(&format!("/topics/{}", topic_id)))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["is_approved"], false);

    // Admin sees it too
    let resp = app
        .client
        .get(app.url(&format!("/topics/{}", topic_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn approved_topic_is_public() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let (_user_id, user_token) = common::create_test_user(&app, "author").await;
    let topic_id = common::create_test_topic(&app, &user_token, category_id, "Visible soon").await;
    common::approve_topic(&app, &admin_token, topic_id).await;

    let resp = app
        .client
        .get(app.url(&format!("/topics/{}", topic_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["is_approved"], true);

    let resp = app.client.get(app.url("/topics")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], topic_id);
}

#[tokio::test]
async fn editing_resets_approval() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let (_user_id, user_token) = common::create_test_user(&app, "author").await;
    let topic_id = common::create_test_topic(&app, &user_token, category_id, "First draft").await;
    common::approve_topic(&app, &admin_token, topic_id).await;

    let resp = app
        .client
        .put(app.url(&format!("/topics/{}", topic_id)))
        .bearer_auth(&user_token)
        .json(&serde_json::json!({
            "title": "Second draft",
            "content": "Revised body"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["is_approved"], false);

    // Back to hidden for everyone but the owner
    let resp = app
        .client
        .get(app.url(&format!("/topics/{}", topic_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn only_owner_can_edit() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let (_user_id, user_token) = common::create_test_user(&app, "author").await;
    let topic_id = common::create_test_topic(&app, &user_token, category_id, "Mine").await;

    let (_other_id, other_token) = common::create_test_user(&app, "intruder").await;
    let resp = app
        .client
        .put(app.url(&format!("/topics/{}", topic_id)))
        .bearer_auth(&other_token)
        .json(&serde_json::json!({
            "title": "Hijacked",
            "content": "Nope"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Admins moderate, they do not edit
    let resp = app
        .client
        .put(app.url(&format!("/topics/{}", topic_id)))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "title": "Admin edit",
            "content": "Also nope"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn owner_or_admin_can_delete() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let (_user_id, user_token) = common::create_test_user(&app, "author").await;
    let topic_id = common::create_test_topic(&app, &user_token, category_id, "Doomed").await;

    let (_other_id, other_token) = common::create_test_user(&app, "stranger").await;
    let resp = app
        .client
        .delete(app.url(&format!("/topics/{}", topic_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .delete(app.url(&format!("/topics/{}", topic_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/topics/{}", topic_id)))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn views_count_only_for_non_owners() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let (_user_id, user_token) = common::create_test_user(&app, "author").await;
    let topic_id = common::create_test_topic(&app, &user_token, category_id, "Counted").await;
    common::approve_topic(&app, &admin_token, topic_id).await;

    // Owner refreshing their own topic does not inflate the counter
    for _ in 0..2 {
        let resp = app
            .client
            .get(app.url(&format!("/topics/{}", topic_id)))
            .bearer_auth(&user_token)
            .send()
            .await
            .unwrap();
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["view_count"], 0);
    }

    // Anonymous view counts
    let resp = app
        .client
        .get(app.url(&format!("/topics/{}", topic_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["view_count"], 1);

    // Another authenticated user counts too
    let (_other_id, other_token) = common::create_test_user(&app, "reader").await;
    let resp = app
        .client
        .get(app.url(&format!("/topics/{}", topic_id)))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["view_count"], 2);
}

#[tokio::test]
async fn pinned_topics_list_first() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let (_user_id, user_token) = common::create_test_user(&app, "author").await;
    let older = common::create_test_topic(&app, &user_token, category_id, "Older").await;
    let newer = common::create_test_topic(&app, &user_token, category_id, "Newer").await;
    common::approve_topic(&app, &admin_token, older).await;
    common::approve_topic(&app, &admin_token, newer).await;

    // Without pins the newer topic leads
    let resp = app.client.get(app.url("/topics")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"][0]["id"], newer);

    let resp = app
        .client
        .post(app.url(&format!("/topics/{}/pin", older)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app.client.get(app.url("/topics")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"][0]["id"], older);
    assert_eq!(body["data"]["items"][0]["is_pinned"], true);

    // Unpin restores activity order
    let resp = app
        .client
        .post(app.url(&format!("/topics/{}/unpin", older)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app.client.get(app.url("/topics")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"][0]["id"], newer);
}

#[tokio::test]
async fn approved_reply_bumps_topic_activity() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let (_user_id, user_token) = common::create_test_user(&app, "author").await;
    let first = common::create_test_topic(&app, &user_token, category_id, "First").await;
    let second = common::create_test_topic(&app, &user_token, category_id, "Second").await;
    common::approve_topic(&app, &admin_token, first).await;
    common::approve_topic(&app, &admin_token, second).await;

    // A pending reply on the older topic changes nothing
    let reply_id = common::create_test_reply(&app, &user_token, first, "Bump").await;
    let resp = app.client.get(app.url("/topics")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"][0]["id"], second);

    // Once approved it counts as activity
    let resp = app
        .client
        .post(app.url(&format!("/moderation/replies/{}/approve", reply_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app.client.get(app.url("/topics")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"][0]["id"], first);
    assert_eq!(body["data"]["items"][0]["reply_count"], 1);
}

#[tokio::test]
async fn lock_and_pin_require_admin() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let (_user_id, user_token) = common::create_test_user(&app, "author").await;
    let topic_id = common::create_test_topic(&app, &user_token, category_id, "Mine").await;

    for action in ["lock", "unlock", "pin", "unpin"] {
        let resp = app
            .client
            .post(app.url(&format!("/topics/{}/{}", topic_id, action)))
            .bearer_auth(&user_token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 403, "{} should be admin-only", action);
    }
}

#[tokio::test]
async fn create_topic_in_unknown_category_fails() {
    let app = common::spawn_app().await;
    let (_user_id, user_token) = common::create_test_user(&app, "lost").await;

    let resp = app
        .client
        .post(app.url("/topics"))
        .bearer_auth(&user_token)
        .json(&serde_json::json!({
            "category_id": 999999,
            "title": "Orphan",
            "content": "No home"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
