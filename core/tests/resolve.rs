//! End-to-end: submit a URL against a local upstream and inspect what gets rendered.

use tempfile::tempdir;
use vidfetch::{
    CoreClient, MediaCategory, RenderCommand, RequestConfig, ResolveContext, Session,
    SessionState, StatusKind,
};
use vidfetch_testserver::{Canned, TestServer};

fn client(config: RequestConfig) -> CoreClient {
    CoreClient::with_context(
        ResolveContext::new_with_locale(config, vec!["en".to_string()]).unwrap(),
    )
}

fn client_for(server: &TestServer) -> CoreClient {
    client(RequestConfig {
        api_base: server.url("api?url="),
        ..Default::default()
    })
}

fn last_status(commands: &[RenderCommand]) -> Option<(StatusKind, &str)> {
    commands.iter().rev().find_map(|c| match c {
        RenderCommand::SetStatus { kind, text } => Some((*kind, text.as_str())),
        _ => None,
    })
}

#[tokio::test]
async fn renders_wrapped_payload() {
    let server = TestServer::start(Canned::json(
        r#"{"ok": true, "result": {"title": "T", "play": "https://cdn.test/v.mp4"}}"#,
    ));
    let mut session = Session::new();
    let commands = client_for(&server)
        .run(&mut session, "https://www.tiktok.com/@u/video/1")
        .await;

    assert_eq!(server.hits(), 1);
    assert_eq!(session.state(), SessionState::Rendered);
    let result = session.current().unwrap();
    assert_eq!(result.title.as_deref(), Some("T"));
    assert_eq!(result.downloads.len(), 1);
    assert_eq!(result.downloads[0].label, "Without watermark");
    assert!(commands.contains(&RenderCommand::SetPreview {
        src: "https://cdn.test/v.mp4".to_string()
    }));
}

#[tokio::test]
async fn server_error_only_sets_status() {
    let server = TestServer::start(Canned::text(500, "boom"));
    let mut session = Session::new();
    let commands = client_for(&server)
        .run(&mut session, "https://www.tiktok.com/@u/video/1")
        .await;

    assert_eq!(
        commands,
        vec![
            RenderCommand::ClearResults,
            RenderCommand::HideStatus,
            RenderCommand::status(StatusKind::Info, "Contacting API..."),
            RenderCommand::status(StatusKind::Error, "Error: HTTP 500"),
        ]
    );
    assert!(session.current().is_none());
    assert_eq!(session.state(), SessionState::Errored);
}

#[tokio::test]
async fn invalid_input_never_hits_upstream() {
    let server = TestServer::start(Canned::json("{}"));
    let mut session = Session::new();
    let commands = client_for(&server).run(&mut session, "not a url").await;

    assert_eq!(
        commands,
        vec![RenderCommand::status(StatusKind::Error, "Invalid URL format.")]
    );
    assert_eq!(server.hits(), 0);
}

#[tokio::test]
async fn json_served_as_text_is_accepted() {
    let server = TestServer::start(Canned::text(200, r#"{"title": "plain"}"#));
    let mut session = Session::new();
    client_for(&server)
        .run(&mut session, "https://x.test/v/1")
        .await;

    assert_eq!(session.state(), SessionState::Rendered);
    assert_eq!(session.current().unwrap().title.as_deref(), Some("plain"));
}

#[tokio::test]
async fn html_body_is_a_parse_error() {
    let server = TestServer::start(Canned::new(
        200,
        "text/html",
        b"<html><body>nope</body></html>",
    ));
    let mut session = Session::new();
    let commands = client_for(&server)
        .run(&mut session, "https://x.test/v/1")
        .await;

    assert_eq!(
        last_status(&commands),
        Some((StatusKind::Error, "Error: Upstream returned non-JSON response"))
    );
}

#[tokio::test]
async fn sends_key_and_encoded_target() {
    let server = TestServer::start(Canned::json("{}"));
    let client = client(RequestConfig {
        api_base: server.url("api?url="),
        api_key: Some("Bearer secret".to_string()),
        ..Default::default()
    });
    client
        .run(&mut Session::new(), "https://x.test/v/1?a=b")
        .await;

    let head = server.requests()[0].to_lowercase();
    assert!(head.starts_with("get /api?url=https%3a%2f%2fx.test%2fv%2f1%3fa%3db http/1.1"));
    assert!(head.contains("authorization: bearer secret"));
    assert!(head.contains("accept: application/json"));
}

#[tokio::test]
async fn target_is_encoded_as_typed() {
    let server = TestServer::start(Canned::json("{}"));
    client_for(&server)
        .run(&mut Session::new(), "  https://X.Test  ")
        .await;

    let requests = server.requests();
    let request_line = requests[0].lines().next().unwrap();
    assert_eq!(request_line, "GET /api?url=https%3A%2F%2FX.Test HTTP/1.1");
}

#[tokio::test]
async fn no_authorization_without_key() {
    let server = TestServer::start(Canned::json("{}"));
    client_for(&server)
        .run(&mut Session::new(), "https://x.test/v/1")
        .await;
    assert!(!server.requests()[0].to_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn cors_rejection_suggests_proxy() {
    let server = TestServer::start(Canned::text(403, "blocked by CORS policy"));
    let mut session = Session::new();
    let commands = client_for(&server)
        .run(&mut session, "https://x.test/v/1")
        .await;

    assert_eq!(
        last_status(&commands),
        Some((
            StatusKind::Error,
            "Error: Request blocked (CORS). Use a server-side proxy, or enable the CORS proxy for testing."
        ))
    );
}

#[tokio::test]
async fn proxy_prefix_is_applied() {
    let server = TestServer::start(Canned::json("{}"));
    let client = client(RequestConfig {
        api_base: "https://api.test/?url=".to_string(),
        cors_proxy: server.url("proxy?u="),
        use_cors_proxy: true,
        ..Default::default()
    });
    client
        .run(&mut Session::new(), "https://x.test/v/1")
        .await;

    let head = server.requests()[0].to_lowercase();
    assert!(head.starts_with("get /proxy?u=https://api.test/?url=https%3a%2f%2fx.test%2fv%2f1 "));
}

#[tokio::test]
async fn save_writes_selected_media() {
    let server = TestServer::start(Canned::bytes(b"not really an mp4".to_vec()));
    let media = server.url("media/clip.mp4");
    let dir = tempdir().unwrap();

    let client = client(RequestConfig::default());
    let mut session = Session::new();
    let outcome: Result<_, vidfetch::ResolveError> = Ok(vidfetch::serde_json::json!({
        "title": "My clip",
        "play": media,
    }));
    let ticket = match session.submit("https://x.test/v/1") {
        vidfetch::Submission::Started { ticket, .. } => ticket,
        _ => panic!("submission did not start"),
    };
    session.complete(ticket, outcome);

    let (commands, path) = client
        .save(&mut session, MediaCategory::Video, dir.path())
        .await;
    let path = path.expect("saved");
    assert_eq!(path, dir.path().join("My_clip.mp4"));
    assert_eq!(std::fs::read(&path).unwrap(), b"not really an mp4");
    assert_eq!(
        last_status(&commands),
        Some((
            StatusKind::Success,
            format!("Saved to {}", path.display()).as_str()
        ))
    );

    let (commands, path) = client
        .save(&mut session, MediaCategory::Audio, dir.path())
        .await;
    assert!(path.is_none());
    assert_eq!(
        commands,
        vec![RenderCommand::status(StatusKind::Error, "Download URL not available.")]
    );
}
