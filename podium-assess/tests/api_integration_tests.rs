//! Integration tests for the HTTP API surface

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

use helpers::{stub_stages, test_state, StubAudio, StubNarrative, StubReport, StubVisual};
use podium_assess::services::Stages;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn put_chunk(upload_id: &str, index: u32, bytes: &'static [u8]) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/upload/chunk/{}/{}", upload_id, index))
        .body(Body::from(bytes))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_module() {
    let (state, _dir) = test_state(stub_stages()).await;
    let app = podium_assess::build_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "podium-assess");
}

#[tokio::test]
async fn init_rejects_bad_file_type_with_400() {
    let (state, _dir) = test_state(stub_stages()).await;
    let app = podium_assess::build_router(state);

    let response = app
        .oneshot(post_json(
            "/upload/init",
            json!({"filename": "deck.pdf", "file_size": 1024, "total_chunks": 1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn init_rejects_oversized_file_with_400() {
    let (state, _dir) = test_state(stub_stages()).await;
    let max = state.config.max_file_size;
    let app = podium_assess::build_router(state);

    let response = app
        .oneshot(post_json(
            "/upload/init",
            json!({"filename": "talk.mp4", "file_size": max + 1, "total_chunks": 100}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chunk_upload_to_unknown_session_is_404() {
    let (state, _dir) = test_state(stub_stages()).await;
    let app = podium_assess::build_router(state);

    let response = app
        .oneshot(put_chunk(&uuid::Uuid::new_v4().to_string(), 0, b"data"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_of_unknown_assessment_is_404() {
    let (state, _dir) = test_state(stub_stages()).await;
    let app = podium_assess::build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/assessment/status/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_of_unknown_session_is_404() {
    let (state, _dir) = test_state(stub_stages()).await;
    let app = podium_assess::build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/upload/cancel/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn incomplete_completion_lists_missing_chunks() {
    let (state, _dir) = test_state(stub_stages()).await;
    let app = podium_assess::build_router(state);

    let response = app
        .clone()
        .oneshot(post_json(
            "/upload/init",
            json!({"filename": "talk.mp4", "file_size": 6, "total_chunks": 3}),
        ))
        .await
        .unwrap();
    let upload_id = body_json(response).await["upload_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(put_chunk(&upload_id, 1, b"B!"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_json(
            &format!("/upload/complete/{}", upload_id),
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INCOMPLETE_UPLOAD");
    assert_eq!(json["error"]["details"]["missing_chunks"], json!([0, 2]));
}

#[tokio::test]
async fn full_upload_and_assessment_flow() {
    let (state, _dir) = test_state(stub_stages()).await;
    let app = podium_assess::build_router(state);

    // Init
    let response = app
        .clone()
        .oneshot(post_json(
            "/upload/init",
            json!({"filename": "talk.mp4", "file_size": 3, "total_chunks": 3}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let init = body_json(response).await;
    let upload_id = init["upload_id"].as_str().unwrap().to_string();
    assert!(init["recommended_chunk_size"].as_u64().unwrap() > 0);

    // Chunks out of order: 1, 0, 2 with payloads B, A, C
    for (index, payload) in [(1u32, b"B" as &'static [u8]), (0, b"A"), (2, b"C")] {
        let response = app
            .clone()
            .oneshot(put_chunk(&upload_id, index, payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_chunks"], 3);
    }

    // Complete
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/upload/complete/{}", upload_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let completed = body_json(response).await;
    let assessment_id = completed["assessment_id"].as_str().unwrap().to_string();

    // Poll status until terminal
    let mut last = json!(null);
    for _ in 0..1000 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/assessment/status/{}", assessment_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        last = body_json(response).await;
        if last["status"] == "COMPLETED" || last["status"] == "FAILED" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(last["status"], "COMPLETED");
    assert_eq!(last["progress"], 100);

    // Report
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/assessment/report/{}", assessment_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["assessment_id"].as_str().unwrap(), assessment_id);
    assert_eq!(report["buckets"].as_array().unwrap().len(), 3);
    assert_eq!(report["report_text"], "Stub coaching report");
}

#[tokio::test]
async fn report_while_processing_returns_202() {
    // Slow stages keep the assessment in flight while we ask for the report
    let stages = Stages {
        audio: Arc::new(StubAudio {
            delay: Duration::from_millis(500),
            ..StubAudio::default()
        }),
        visual: Arc::new(StubVisual::default()),
        narrative: Arc::new(StubNarrative::default()),
        report: Arc::new(StubReport::default()),
    };
    let (state, _dir) = test_state(stages).await;
    let app = podium_assess::build_router(state);

    let response = app
        .clone()
        .oneshot(post_json(
            "/upload/init",
            json!({"filename": "talk.mp4", "file_size": 1, "total_chunks": 1}),
        ))
        .await
        .unwrap();
    let upload_id = body_json(response).await["upload_id"]
        .as_str()
        .unwrap()
        .to_string();

    app.clone()
        .oneshot(put_chunk(&upload_id, 0, b"x"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/upload/complete/{}", upload_id),
            json!({}),
        ))
        .await
        .unwrap();
    let assessment_id = body_json(response).await["assessment_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/assessment/report/{}", assessment_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Assessment still processing");
}

#[tokio::test]
async fn report_of_failed_assessment_returns_500_with_detail() {
    let stages = Stages {
        audio: Arc::new(StubAudio {
            fail: Some("transcription backend offline".to_string()),
            ..StubAudio::default()
        }),
        visual: Arc::new(StubVisual::default()),
        narrative: Arc::new(StubNarrative::default()),
        report: Arc::new(StubReport::default()),
    };
    let (state, _dir) = test_state(stages).await;
    let db = state.db.clone();
    let app = podium_assess::build_router(state);

    let response = app
        .clone()
        .oneshot(post_json(
            "/upload/init",
            json!({"filename": "talk.mp4", "file_size": 1, "total_chunks": 1}),
        ))
        .await
        .unwrap();
    let upload_id = body_json(response).await["upload_id"]
        .as_str()
        .unwrap()
        .to_string();

    app.clone()
        .oneshot(put_chunk(&upload_id, 0, b"x"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/upload/complete/{}", upload_id),
            json!({}),
        ))
        .await
        .unwrap();
    let assessment_id: uuid::Uuid = body_json(response).await["assessment_id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    // Wait for the run to fail
    for _ in 0..1000 {
        let status = podium_assess::db::assessments::load_status(&db, assessment_id)
            .await
            .unwrap()
            .unwrap();
        if status.state.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/assessment/report/{}", assessment_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("transcription backend offline"));
}
