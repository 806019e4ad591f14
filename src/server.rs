//! HTTP surface.

use crate::clients::FlexibleClient;
use crate::error::QuizError;
use crate::model::{QuizRequest, QuizSubmission};
use crate::service::QuizService;
use actix_web::{get, post, web, HttpResponse, Responder};

/// Service type held in actix app data.
pub type AppService = QuizService<FlexibleClient>;

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

#[post("/generate-quiz")]
pub async fn generate_quiz(
    service: web::Data<AppService>,
    request: web::Json<QuizRequest>,
) -> Result<HttpResponse, QuizError> {
    let response = service.generate_quiz(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/submit-quiz")]
pub async fn submit_quiz(
    service: web::Data<AppService>,
    submission: web::Json<QuizSubmission>,
) -> Result<HttpResponse, QuizError> {
    let report = service.submit_quiz(&submission).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Register routes and the JSON body error mapping.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| QuizError::Validation(err.to_string()).into()),
    )
    .service(health)
    .service(generate_quiz)
    .service(submit_quiz);
}
