mod common;

use serde_json::Value;

#[tokio::test]
async fn list_counts_only_approved_topics() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let (_user_id, user_token) = common::create_test_user(&app, "author").await;
    let topic_id = common::create_test_topic(&app, &user_token, category_id, "Hello").await;

    // Pending topic does not count
    let resp = app
        .client
        .get(app.url(&format!("/categories/{}", category_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["topic_count"], 0);

    common::approve_topic(&app, &admin_token, topic_id).await;

    let resp = app
        .client
        .get(app.url(&format!("/categories/{}", category_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["topic_count"], 1);
}

#[tokio::test]
async fn category_mutations_are_admin_only() {
    let app = common::spawn_app().await;
    let (_user_id, user_token) = common::create_test_user(&app, "pleb").await;

    let resp = app
        .client
        .post(app.url("/categories"))
        .bearer_auth(&user_token)
        .json(&serde_json::json!({
            "name": "Nope",
            "description": ""
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let resp = app
        .client
        .delete(app.url(&format!("/categories/{}", category_id)))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn update_category() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let resp = app
        .client
        .put(app.url(&format!("/categories/{}", category_id)))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({
            "name": "Renamed",
            "description": "Updated description",
            "sort_order": 5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Renamed");
    assert_eq!(body["data"]["sort_order"], 5);
}

#[tokio::test]
async fn delete_empty_category_removes_it() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let resp = app
        .client
        .delete(app.url(&format!("/categories/{}", category_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/categories/{}", category_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn delete_category_with_topics_deactivates_it() {
    let app = common::spawn_app().await;
    let (_admin_id, admin_token) = common::create_test_admin(&app).await;
    let category_id = common::create_test_category(&app, &admin_token).await;

    let (_user_id, user_token) = common::create_test_user(&app, "writer").await;
    common::create_test_topic(&app, &user_token, category_id, "Keeps the category alive").await;

    let resp = app
        .client
        .delete(app.url(&format!("/categories/{}", category_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Still fetchable by id, but inactive and gone from the public list
    let resp = app
        .client
        .get(app.url(&format!("/categories/{}", category_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["is_active"], false);

    let resp = app.client.get(app.url("/categories")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    let listed = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["id"] == category_id);
    assert!(!listed);
}
