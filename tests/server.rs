//! 启动控制器与 HTTP 接口的端到端测试（真实 socket）

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use base64::Engine;
use serde_json::Value;

use frameserver::application::SpeechSynthesizerPort;
use frameserver::config::StaticFilesConfig;
use frameserver::infrastructure::adapters::{
    FakeSpeechClient, HttpSpeechClient, HttpSpeechClientConfig,
};
use frameserver::infrastructure::events::{EventPublisher, ServerEvent};
use frameserver::infrastructure::http::{
    AppState, HttpServer, ServerConfig, ServerPhase, StateSettings,
};
use frameserver::infrastructure::memory::InMemoryFileRegistry;
use frameserver::infrastructure::realtime::{EventSocketServer, RealtimeOptions};

const STUB_AUDIO: &[u8] = b"ID3-stub-audio";
const STUB_MARKS: &str = concat!(
    r#"{"time":6,"type":"word","start":0,"end":3,"value":"Hi."}"#,
    "\n",
    r#"{"time":0,"type":"sentence","start":0,"end":3,"value":"Hi."}"#,
    "\n",
);

/// Polly 兼容网关桩：mp3 返回固定音频，json 返回两行标记，文本 "fail" 返回远程错误
async fn stub_speech(Json(body): Json<Value>) -> axum::response::Response {
    if body["Text"] == "fail" {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-amzn-ErrorType",
            HeaderValue::from_static("TextLengthExceededException:http://internal/"),
        );
        return (
            StatusCode::BAD_REQUEST,
            headers,
            r#"{"message":"Maximum text length has been exceeded"}"#,
        )
            .into_response();
    }

    match body["OutputFormat"].as_str() {
        Some("mp3") => ([("content-type", "audio/mpeg")], STUB_AUDIO).into_response(),
        Some("json") => {
            assert_eq!(body["SpeechMarkTypes"], serde_json::json!(["word", "sentence"]));
            ([("content-type", "application/x-json-stream")], STUB_MARKS).into_response()
        }
        _ => StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    }
}

async fn spawn_stub_gateway() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/v1/speech", post(stub_speech));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn build_server(
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    scratch_dir: &Path,
    port: u16,
    static_files: Option<StaticFilesConfig>,
) -> HttpServer {
    build_server_in("frameencoder", synthesizer, scratch_dir, port, static_files)
}

fn build_server_in(
    namespace: &str,
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    scratch_dir: &Path,
    port: u16,
    static_files: Option<StaticFilesConfig>,
) -> HttpServer {
    let state = AppState::new(
        InMemoryFileRegistry::new().arc(),
        synthesizer.clone(),
        EventPublisher::new().arc(),
        StateSettings {
            download_namespace: namespace.to_string(),
            download_delay: Duration::from_millis(1),
            scratch_dir: scratch_dir.to_path_buf(),
        },
    );
    let options = RealtimeOptions {
        video_dir: scratch_dir.to_path_buf(),
        frame_dir: scratch_dir.join("frames"),
        keep_frames: false,
        allow_arbitrary_arguments: false,
        synthesizer,
    };
    let mut config = ServerConfig::new("127.0.0.1", port);
    config.static_files = static_files;
    HttpServer::new(config, state, options, EventSocketServer::factory())
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn fake() -> Arc<dyn SpeechSynthesizerPort> {
    Arc::new(FakeSpeechClient::with_defaults())
}

#[tokio::test]
async fn test_bind_conflict_moves_to_higher_port() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let busy_port = occupied.local_addr().unwrap().port();
    let dir = tempfile::tempdir().unwrap();

    let mut server = build_server(fake(), dir.path(), busy_port, None);
    assert_eq!(server.phase(), ServerPhase::Idle);
    assert!(server.local_addr().is_none());

    let mut ready = Vec::new();
    let addr = server.start(|addr| ready.push(addr)).await.unwrap();

    assert_eq!(ready, vec![addr]);
    assert!(addr.port() > busy_port);
    assert_eq!(server.port(), Some(addr.port()));

    // 新端口上确实在服务
    let response = client()
        .get(format!("http://{}/api/ping", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    server.close().await.unwrap();
    assert_eq!(server.phase(), ServerPhase::Closed);
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_close_without_start() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = build_server(fake(), dir.path(), 0, None);
    assert!(server.close().await.is_err());
}

#[tokio::test]
async fn test_publish_then_download() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip123.mp4");
    std::fs::write(&path, b"0123456789").unwrap();

    let mut server = build_server(fake(), dir.path(), 0, None);
    let mut events = server.state().event_publisher.subscribe();
    let addr = server.start(|_| {}).await.unwrap();
    assert!(matches!(
        events.receiver.recv().await.unwrap(),
        ServerEvent::Listening { .. }
    ));

    let published = server.add_file(&path).await.unwrap();
    assert_eq!(published.download_path, "/frameencoder/downloads/clip123.mp4");
    assert_eq!(published.size_in_bytes, 10);
    assert_eq!(
        events.receiver.recv().await.unwrap(),
        ServerEvent::FileAdded {
            id: "clip123.mp4".to_string(),
            download_path: published.download_path.clone(),
            size: 10,
        }
    );

    let client = client();
    let response = client
        .get(format!("http://{}{}", addr, published.download_path))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"0123456789");

    let response = client
        .get(format!("http://{}/frameencoder/downloads/missing.mp4", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(response.text().await.unwrap().contains("missing.mp4"));

    // 发布不存在的文件不会留下记录
    assert!(server.add_file(dir.path().join("nope.mp4")).await.is_err());
    let response = client
        .get(format!("http://{}/frameencoder/downloads/nope.mp4", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_download_routes_follow_state_namespace() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("take2.webm");
    std::fs::write(&path, b"webm").unwrap();

    let mut server = build_server_in("clips", fake(), dir.path(), 0, None);
    let addr = server.start(|_| {}).await.unwrap();

    let published = server.add_file(&path).await.unwrap();
    assert_eq!(published.download_path, "/clips/downloads/take2.webm");

    let client = client();
    let response = client
        .get(format!("http://{}{}", addr, published.download_path))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"webm");

    let response = client
        .get(format!("http://{}/clips/downloads/", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert_eq!(response.text().await.unwrap(), "no file: ");

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_speech_through_remote_gateway() {
    let gateway = spawn_stub_gateway().await;
    let synthesizer: Arc<dyn SpeechSynthesizerPort> = Arc::new(
        HttpSpeechClient::new(HttpSpeechClientConfig::new(format!("http://{}", gateway))).unwrap(),
    );
    let dir = tempfile::tempdir().unwrap();

    let mut server = build_server(synthesizer, dir.path(), 0, None);
    let addr = server.start(|_| {}).await.unwrap();
    let client = client();

    let json: Value = client
        .post(format!("http://{}/api/v1/speech", addr))
        .json(&serde_json::json!({ "text": "Hi.", "voiceId": "Joanna" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let expected_audio = base64::engine::general_purpose::STANDARD.encode(STUB_AUDIO);
    assert_eq!(json["audioData"]["fileContent"], expected_audio.as_str());
    let marks = json["markData"].as_array().unwrap();
    assert_eq!(marks.len(), 2);
    assert_eq!(marks[0]["type"], "word");
    assert_eq!(marks[1]["type"], "sentence");

    // 远程错误以错误码回传
    let response = client
        .post(format!("http://{}/api/v1/speech", addr))
        .form(&[("text", "fail"), ("voiceId", "Joanna")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "TextLengthExceededException");

    // 两次请求都没有留下临时文件
    let leftovers: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("mp3"))
        .collect();
    assert!(leftovers.is_empty(), "leftover temp files: {:?}", leftovers);

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_preflight_and_static_mounts() {
    let dir = tempfile::tempdir().unwrap();
    let base_dir = dir.path().join("public");
    let dist_dir = dir.path().join("dist");
    std::fs::create_dir_all(&base_dir).unwrap();
    std::fs::create_dir_all(&dist_dir).unwrap();
    std::fs::write(base_dir.join("hello.txt"), "hello").unwrap();
    std::fs::write(dist_dir.join("app.js"), "console.log(1)").unwrap();

    let static_files = StaticFilesConfig {
        enabled: true,
        base_dir,
        dist_dir,
        dist_path: "/ffmpegserver".to_string(),
    };
    let mut server = build_server(fake(), dir.path(), 0, Some(static_files));
    let addr = server.start(|_| {}).await.unwrap();
    let client = client();

    let response = client
        .request(reqwest::Method::OPTIONS, format!("http://{}/anything", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(response.headers()["access-control-max-age"], "86400");
    assert_eq!(response.text().await.unwrap(), "{}");

    let body = client
        .get(format!("http://{}/hello.txt", addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "hello");

    let body = client
        .get(format!("http://{}/ffmpegserver/app.js", addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "console.log(1)");

    server.close().await.unwrap();
}
