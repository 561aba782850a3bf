//! Smoke tests for the web UI's HTTP surface.

use axum_test::TestServer;

use concierge::web_server;

#[tokio::test]
async fn test_index_page_renders() {
    let server = TestServer::new(web_server::app().unwrap()).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("Chatbot"));
    assert!(body.contains("chat-form"));
    assert!(body.contains("contact-form"));
}

#[tokio::test]
async fn test_static_assets_served() {
    let server = TestServer::new(web_server::app().unwrap()).unwrap();
    let response = server.get("/static/app.js").await;
    response.assert_status_ok();
    assert!(response.text().contains("WebSocket"));
}
