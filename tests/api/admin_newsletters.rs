use serde_json::{json, Value};

use crate::helpers::{newsletter_body, TestApp, ADMIN_TOKEN};

#[tokio::test]
async fn admin_routes_reject_requests_without_the_admin_token() {
    let test_app = TestApp::spawn_app().await;

    let anonymous = test_app.get("/admin/newsletters").await;
    let wrong_token = test_app
        .api_client
        .get(format!("{}/admin/newsletters", test_app.address))
        .bearer_auth("guess")
        .send()
        .await
        .unwrap();

    assert_eq!(anonymous.status().as_u16(), 403);
    assert_eq!(wrong_token.status().as_u16(), 403);
}

#[tokio::test]
async fn login_sets_a_cookie_that_opens_the_admin_routes() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .get(&format!("/admin/login?token={}", ADMIN_TOKEN))
        .await;

    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(
        response.headers().get("Location").unwrap(),
        "/admin/newsletters"
    );
    let cookie = response
        .headers()
        .get("Set-Cookie")
        .expect("Login did not set the admin cookie.")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with(&format!("admin_token={}", ADMIN_TOKEN)));
    assert!(cookie.contains("HttpOnly"));

    let response = test_app
        .api_client
        .get(format!("{}/admin/newsletters", test_app.address))
        .header("Cookie", format!("admin_token={}", ADMIN_TOKEN))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn login_with_a_wrong_token_is_forbidden() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.get("/admin/login?token=guess").await;

    assert_eq!(response.status().as_u16(), 403);
    assert!(response.headers().get("Set-Cookie").is_none());
}

#[tokio::test]
async fn created_newsletters_start_as_drafts() {
    let test_app = TestApp::spawn_app().await;

    let newsletter_id = test_app.create_newsletter(newsletter_body("cache")).await;
    let response = test_app
        .admin_get(&format!("/newsletters/{}", newsletter_id))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["newsletter"]["status"], "draft");
    assert_eq!(body["newsletter"]["target"], "cache");
    assert_eq!(body["newsletter"]["subject"]["nl"], "Voorjaarsupdate");
    assert_eq!(body["newsletter"]["sent_count"], 0);
    assert_eq!(body["target_subscribers"], 0);
}

#[tokio::test]
async fn create_newsletter_returns_400_for_invalid_bodies() {
    let test_app = TestApp::spawn_app().await;
    let test_cases = vec![
        (
            json!({ "body": { "en": "<p>x</p>", "nl": "<p>x</p>" } }),
            "missing subject",
        ),
        (
            json!({
                "subject": { "en": "Hi", "nl": "" },
                "body": { "en": "<p>x</p>", "nl": "<p>x</p>" },
            }),
            "empty dutch subject",
        ),
        (
            json!({
                "subject": { "en": "Hi", "nl": "Hoi" },
                "body": { "en": "  ", "nl": "<p>x</p>" },
            }),
            "blank english body",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.admin_post("/newsletters", Some(invalid_body)).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
    }
}

#[tokio::test]
async fn newsletters_are_listed_newest_first() {
    let test_app = TestApp::spawn_app().await;

    let first = test_app.create_newsletter(newsletter_body("all")).await;
    let second = test_app.create_newsletter(newsletter_body("perch")).await;

    let body: Value = test_app
        .admin_get("/newsletters")
        .await
        .json()
        .await
        .unwrap();
    let ids: Vec<i64> = body["newsletters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|newsletter| newsletter["id"].as_i64().unwrap())
        .collect();

    assert_eq!(ids, vec![second, first]);
    assert_eq!(body["confirmed_subscribers"], 0);
}

#[tokio::test]
async fn drafts_can_be_edited_until_they_are_scheduled() {
    let test_app = TestApp::spawn_app().await;
    let newsletter_id = test_app.create_newsletter(newsletter_body("all")).await;
    let route = format!("/newsletters/{}", newsletter_id);

    let update = test_app.admin_put(&route, newsletter_body("perch")).await;
    assert_eq!(update.status().as_u16(), 200);

    let schedule = test_app
        .admin_post(&format!("{}/schedule", route), None)
        .await;
    assert_eq!(schedule.status().as_u16(), 200);

    let late_update = test_app.admin_put(&route, newsletter_body("cache")).await;
    assert_eq!(late_update.status().as_u16(), 409);

    let second_schedule = test_app
        .admin_post(&format!("{}/schedule", route), None)
        .await;
    assert_eq!(second_schedule.status().as_u16(), 409);

    let body: Value = test_app.admin_get(&route).await.json().await.unwrap();
    assert_eq!(body["newsletter"]["status"], "scheduled");
    assert_eq!(body["newsletter"]["target"], "perch");
    assert!(body["newsletter"]["scheduled_at"].is_string());
}

#[tokio::test]
async fn only_drafts_can_be_deleted() {
    let test_app = TestApp::spawn_app().await;
    let draft = test_app.create_newsletter(newsletter_body("all")).await;
    let scheduled = test_app.create_newsletter(newsletter_body("all")).await;

    test_app
        .admin_post(&format!("/newsletters/{}/schedule", scheduled), None)
        .await;

    let delete_draft = test_app
        .admin_delete(&format!("/newsletters/{}", draft))
        .await;
    let delete_scheduled = test_app
        .admin_delete(&format!("/newsletters/{}", scheduled))
        .await;

    assert_eq!(delete_draft.status().as_u16(), 204);
    assert_eq!(delete_scheduled.status().as_u16(), 409);
    assert_eq!(
        test_app
            .admin_get(&format!("/newsletters/{}", draft))
            .await
            .status()
            .as_u16(),
        404
    );
}

#[tokio::test]
async fn missing_newsletters_return_404() {
    let test_app = TestApp::spawn_app().await;

    assert_eq!(
        test_app.admin_get("/newsletters/42").await.status().as_u16(),
        404
    );
    assert_eq!(
        test_app
            .admin_put("/newsletters/42", newsletter_body("all"))
            .await
            .status()
            .as_u16(),
        404
    );
    assert_eq!(
        test_app
            .admin_post("/newsletters/42/schedule", None)
            .await
            .status()
            .as_u16(),
        404
    );
    assert_eq!(
        test_app
            .admin_delete("/newsletters/42")
            .await
            .status()
            .as_u16(),
        404
    );
}

#[tokio::test]
async fn preview_renders_the_requested_language() {
    let test_app = TestApp::spawn_app().await;
    let newsletter_id = test_app.create_newsletter(newsletter_body("all")).await;

    let body: Value = test_app
        .admin_get(&format!("/newsletters/{}/preview?lang=nl", newsletter_id))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["language"], "nl");
    assert_eq!(body["subject"], "Voorjaarsupdate");
    let html = body["html"].as_str().unwrap();
    assert!(html.contains("<p>Wat we bouwden</p>"));
    assert!(html.contains("Afmelden"));
}
