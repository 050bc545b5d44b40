use serde_json::{json, Value};

use crate::helpers::{newsletter_body, TestApp};

async fn send(test_app: &TestApp, newsletter_id: i64) -> reqwest::Response {
    test_app
        .admin_post(&format!("/newsletters/{}/send", newsletter_id), None)
        .await
}

#[tokio::test]
async fn newsletters_are_not_delivered_to_unconfirmed_subscribers() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .create_unconfirmed_subscriber(json!({ "email": "pending@example.com" }))
        .await;
    let newsletter_id = test_app.create_newsletter(newsletter_body("all")).await;
    test_app.mock_email_api(200).await;

    let response = send(&test_app, newsletter_id).await;

    assert_eq!(response.status().as_u16(), 200);
    let report: Value = response.json().await.unwrap();
    assert_eq!(report["recipients"], 0);
    assert_eq!(report["delivered"], 0);
    assert!(test_app.newsletter_deliveries().await.is_empty());
}

#[tokio::test]
async fn targeted_newsletters_only_reach_interested_subscribers() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .create_confirmed_subscriber(json!({ "email": "perch@example.com", "interests": "perch" }))
        .await;
    test_app
        .create_confirmed_subscriber(json!({ "email": "cache@example.com", "interests": "cache" }))
        .await;
    let newsletter_id = test_app.create_newsletter(newsletter_body("perch")).await;
    test_app.mock_email_api(200).await;

    let report: Value = send(&test_app, newsletter_id).await.json().await.unwrap();

    assert_eq!(report["delivered"], 1);
    let deliveries = test_app.newsletter_deliveries().await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, "perch@example.com");

    let body: Value = test_app
        .admin_get(&format!("/newsletters/{}", newsletter_id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["newsletter"]["status"], "sent");
    assert_eq!(body["newsletter"]["sent_count"], 1);
}

#[tokio::test]
async fn subscribers_interested_in_everything_get_targeted_newsletters() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .create_confirmed_subscriber(json!({ "email": "all@example.com" }))
        .await;
    test_app
        .create_confirmed_subscriber(json!({ "email": "cache@example.com", "interests": "cache" }))
        .await;
    let newsletter_id = test_app.create_newsletter(newsletter_body("perch")).await;
    test_app.mock_email_api(200).await;

    let report: Value = send(&test_app, newsletter_id).await.json().await.unwrap();

    assert_eq!(report["recipients"], 1);
    assert_eq!(
        test_app.newsletter_deliveries().await,
        vec![("all@example.com".to_string(), "Spring update".to_string())]
    );
}

#[tokio::test]
async fn each_subscriber_receives_their_own_language() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .create_confirmed_subscriber(json!({ "email": "ann@example.com", "language": "en" }))
        .await;
    test_app
        .create_confirmed_subscriber(json!({ "email": "joost@example.nl", "language": "nl" }))
        .await;
    let newsletter_id = test_app.create_newsletter(newsletter_body("all")).await;
    test_app.mock_email_api(200).await;

    send(&test_app, newsletter_id).await;

    let mut deliveries = test_app.newsletter_deliveries().await;
    deliveries.sort();
    assert_eq!(
        deliveries,
        vec![
            ("ann@example.com".to_string(), "Spring update".to_string()),
            ("joost@example.nl".to_string(), "Voorjaarsupdate".to_string()),
        ]
    );
}

#[tokio::test]
async fn a_newsletter_is_marked_sent_even_when_every_delivery_fails() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .create_confirmed_subscriber(json!({ "email": "ann@example.com" }))
        .await;
    let newsletter_id = test_app.create_newsletter(newsletter_body("all")).await;
    test_app.mock_email_api(500).await;

    let response = send(&test_app, newsletter_id).await;

    assert_eq!(response.status().as_u16(), 200);
    let report: Value = response.json().await.unwrap();
    assert_eq!(report["recipients"], 1);
    assert_eq!(report["delivered"], 0);

    let body: Value = test_app
        .admin_get(&format!("/newsletters/{}", newsletter_id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["newsletter"]["status"], "sent");
    assert_eq!(body["newsletter"]["sent_count"], 0);
    assert!(body["newsletter"]["sent_at"].is_string());
}

#[tokio::test]
async fn scheduled_newsletters_can_be_sent() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .create_confirmed_subscriber(json!({ "email": "ann@example.com" }))
        .await;
    let newsletter_id = test_app.create_newsletter(newsletter_body("all")).await;
    test_app
        .admin_post(&format!("/newsletters/{}/schedule", newsletter_id), None)
        .await;
    test_app.mock_email_api(200).await;

    let report: Value = send(&test_app, newsletter_id).await.json().await.unwrap();

    assert_eq!(report["delivered"], 1);
}

#[tokio::test]
async fn a_sent_newsletter_cannot_be_sent_again() {
    let test_app = TestApp::spawn_app().await;
    let newsletter_id = test_app.create_newsletter(newsletter_body("all")).await;

    assert_eq!(send(&test_app, newsletter_id).await.status().as_u16(), 200);
    assert_eq!(send(&test_app, newsletter_id).await.status().as_u16(), 400);
}

#[tokio::test]
async fn sending_a_missing_newsletter_returns_404() {
    let test_app = TestApp::spawn_app().await;

    assert_eq!(send(&test_app, 42).await.status().as_u16(), 404);
}

#[tokio::test]
async fn newsletter_emails_carry_a_working_unsubscribe_link() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .create_confirmed_subscriber(json!({ "email": "ann@example.com" }))
        .await;
    let newsletter_id = test_app.create_newsletter(newsletter_body("all")).await;
    test_app.mock_email_api(200).await;

    send(&test_app, newsletter_id).await;

    let received_requests = test_app.email_server.received_requests().await.unwrap();
    let links = test_app.get_email_links(received_requests.last().unwrap());
    assert_eq!(links.html.path(), "/unsubscribe");

    let response = test_app.api_client.get(links.html).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}
