use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::TestApp;

fn set_cookie(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("Set-Cookie")
        .expect("The language cookie was not set.")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn switching_language_sets_a_year_long_cookie_and_goes_back() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .api_client
        .get(format!("{}/lang/nl", test_app.address))
        .header("Referer", "https://siskin.example/perch")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(
        response.headers().get("Location").unwrap(),
        "https://siskin.example/perch"
    );
    let cookie = set_cookie(&response);
    assert!(cookie.starts_with("lang=nl"));
    assert!(cookie.contains("Max-Age=31536000"));
}

#[tokio::test]
async fn unknown_language_falls_back_to_english_and_home() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.get("/lang/de").await;

    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(response.headers().get("Location").unwrap(), "/");
    assert!(set_cookie(&response).starts_with("lang=en"));
}

#[tokio::test]
async fn the_language_cookie_drives_the_confirmation_email() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(path("/mail/send"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let switched = test_app.get("/lang/nl").await;
    let cookie = set_cookie(&switched);
    let pair = cookie.split(';').next().unwrap();

    test_app
        .api_client
        .post(format!("{}/subscriptions", test_app.address))
        .header("Cookie", pair)
        .header("Accept-Language", "en-GB")
        .json(&json!({ "email": "joost@example.nl" }))
        .send()
        .await
        .unwrap();

    let received_requests = test_app.email_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&received_requests[0].body).unwrap();
    assert!(body["subject"]
        .as_str()
        .unwrap()
        .starts_with("Bevestig je aanmelding"));
}
