
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use async_trait::async_trait;
use quizsmith::server;
use quizsmith::{DocumentStore, QuizStore, StoreError};
use serde_json::{json, Map, Value};

use crate::test_utils::{answer_key, create_test_service, create_test_service_with, test_generator_config};

/// Backend whose every call fails, as an unreachable disk or database would.
#[derive(Debug)]
struct OfflineStore;

fn offline() -> StoreError {
    StoreError::Io(io::Error::new(io::ErrorKind::Other, "disk offline"))
}

#[async_trait]
impl DocumentStore for OfflineStore {
    async fn upsert(&self, _id: &str, _document: Value) -> Result<(), StoreError> {
        Err(offline())
    }

    async fn fetch(&self, _ids: &[&str]) -> Result<HashMap<String, Value>, StoreError> {
        Err(offline())
    }

    async fn update(&self, _id: &str, _fields: Map<String, Value>) -> Result<(), StoreError> {
        Err(offline())
    }
}

macro_rules! test_app {
    ($service:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($service.clone()))
                .configure(server::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn health_is_ok() {
    let (service, _handle) = create_test_service();
    let app = test_app!(service);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn generate_then_submit_over_http() {
    let (service, _handle) = create_test_service();
    let app = test_app!(service);

    let req = test::TestRequest::post()
        .uri("/generate-quiz")
        .set_json(json!({"topic": "Photosynthesis", "difficulty": "easy", "user_id": "u-42"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    let quiz_id = body["quiz_id"].as_str().unwrap().to_string();
    assert!(!quiz_id.is_empty());
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 5);
    for q in questions {
        assert!(q["correct_answer"].is_null());
        assert!(!q["id"].as_str().unwrap().is_empty());
        assert_eq!(q["options"].as_array().unwrap().len(), 4);
    }

    let responses = answer_key(&service, &quiz_id).await;
    let req = test::TestRequest::post()
        .uri("/submit-quiz")
        .set_json(json!({"user_id": "u-42", "quiz_id": quiz_id, "responses": responses}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"score": 5, "total": 5}));
}

#[actix_web::test]
async fn unknown_quiz_is_404() {
    let (service, _handle) = create_test_service();
    let app = test_app!(service);

    let req = test::TestRequest::post()
        .uri("/submit-quiz")
        .set_json(json!({"user_id": "u", "quiz_id": "missing", "responses": {}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("missing"));
}

#[actix_web::test]
async fn generation_failure_is_500_with_detail() {
    let (service, handle) = create_test_service();
    handle.push_error("quota exhausted");
    let app = test_app!(service);

    let req = test::TestRequest::post()
        .uri("/generate-quiz")
        .set_json(json!({"topic": "Rust", "difficulty": "easy", "user_id": "u"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("quota exhausted"));
}

#[actix_web::test]
async fn validation_failures_are_400() {
    let (service, _handle) = create_test_service();
    let app = test_app!(service);

    let req = test::TestRequest::post()
        .uri("/generate-quiz")
        .set_json(json!({"topic": "Rust", "difficulty": "legendary", "user_id": "u"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/generate-quiz")
        .set_json(json!({"topic": "Rust"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].is_string());
}

#[actix_web::test]
async fn store_failure_is_500_with_detail() {
    let (service, _handle) =
        create_test_service_with(test_generator_config(), QuizStore::new(Arc::new(OfflineStore)));
    let app = test_app!(service);

    let req = test::TestRequest::post()
        .uri("/generate-quiz")
        .set_json(json!({"topic": "Photosynthesis", "difficulty": "easy", "user_id": "u"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("disk offline"));

    let req = test::TestRequest::post()
        .uri("/submit-quiz")
        .set_json(json!({"user_id": "u", "quiz_id": "any", "responses": {}}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("disk offline"));
}
