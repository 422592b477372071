mod error;
mod state;

pub use error::{error_response, ErrorBody};
pub use state::AppState;

use crate::domain::error::{AppError, IngestionFailure, Result};
use crate::domain::settings::AdminSettings;
use crate::domain::synthesis::{AnswerSet, ContextHandle, SourceDocument, SynthesisOutcome};
use crate::domain::user::UserSession;
use crate::infrastructure::config::ServerConfig;
use crate::infrastructure::pdf;
use crate::infrastructure::storage::is_pdf_filename;
use actix_cors::Cors;
use actix_web::{
    delete, dev::Server, get, http::header, post, put, web, App, HttpRequest, HttpResponse,
    HttpServer,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

static STORY_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[A-Z][A-Z0-9_]*-\d+$").expect("story key pattern compiles"));

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JiraRequest {
    #[validate(url(message = "jiraBaseUrl must be an absolute URL"))]
    pub jira_base_url: String,
    #[validate(regex(path = *STORY_KEY, message = "storyNumber must look like ABC-123"))]
    pub story_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswersRequest {
    #[serde(default)]
    pub answers: AnswerSet,
    #[serde(default)]
    pub context_id: Option<String>,
}

fn validated<T: Validate>(request: &T) -> Result<()> {
    request
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))
}

/// Token from an `Authorization` value; the scheme is matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn request_token(http: &HttpRequest) -> Result<&str> {
    http.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))
}

fn authorize(http: &HttpRequest, data: &AppState) -> Result<UserSession> {
    data.auth.authenticate(request_token(http)?)
}

fn respond(data: &AppState, source: &str, result: Result<HttpResponse>) -> HttpResponse {
    match result {
        Ok(response) => response,
        Err(err) => {
            match &err {
                AppError::Unauthorized(_) | AppError::ValidationError(_) | AppError::NotFound(_) => {
                    data.activity.warn(source, &err.to_string())
                }
                _ => data.activity.error(source, &err.to_string()),
            }
            error_response(&err)
        }
    }
}

async fn synthesize(
    data: &AppState,
    session: &UserSession,
    source: SourceDocument,
) -> Result<HttpResponse> {
    let settings = data.settings.snapshot();
    let config = data.llm.llm_config(&settings.gemini_api_key);
    let outcome = data
        .synthesis
        .generate(&config, source, &session.username, settings.synthesis_settings())
        .await?;

    match &outcome {
        SynthesisOutcome::Completed(suite) => data.activity.info(
            "Synthesis",
            &format!(
                "Generated {} test cases for {}",
                suite.test_cases.len(),
                session.username
            ),
        ),
        SynthesisOutcome::NeedsClarification(request) => data.activity.info(
            "Synthesis",
            &format!(
                "Asked {} for {} clarifications (context {})",
                session.username,
                request.follow_up_questions.len(),
                request.context_id
            ),
        ),
    }
    Ok(HttpResponse::Ok().json(outcome))
}

#[post("/auth/login")]
async fn login(data: web::Data<AppState>, req: web::Json<LoginRequest>) -> HttpResponse {
    let result = validated(&*req).and_then(|_| data.auth.login(&req.username, &req.password));
    match result {
        Ok(token) => {
            data.activity
                .info("Auth", &format!("User {} logged in", req.username));
            HttpResponse::Ok().json(LoginResponse {
                success: true,
                token,
            })
        }
        Err(err) => {
            data.activity.warn(
                "Auth",
                &format!("Failed login attempt for user {}", req.username),
            );
            error_response(&err)
        }
    }
}

#[post("/auth/logout")]
async fn logout(http: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let result = authorize(&http, &data).and_then(|session| {
        data.auth.logout(request_token(&http)?);
        data.activity
            .info("Auth", &format!("User {} logged out", session.username));
        Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
    });
    respond(&data, "Auth", result)
}

async fn process_upload(
    http: &HttpRequest,
    data: &AppState,
    filename: &str,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let session = authorize(http, data)?;
    if !is_pdf_filename(filename) {
        return Err(IngestionFailure::UnsupportedFileType(filename.to_string()).into());
    }

    let stored = data.uploads.save(filename, &body).await?;
    data.activity.info(
        "Upload",
        &format!("Stored {} ({} bytes)", stored.display(), body.len()),
    );

    let text = tokio::task::spawn_blocking(move || pdf::extract_text(&body))
        .await
        .map_err(|e| AppError::Internal(format!("PDF extraction worker failed: {}", e)))??;
    data.activity.info(
        "PDF",
        &format!(
            "Extracted {} characters from {}",
            text.chars().count(),
            filename
        ),
    );

    synthesize(data, &session, SourceDocument::new(text)).await
}

#[post("/testcases/upload")]
async fn upload_document(
    http: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> HttpResponse {
    let result = process_upload(&http, &data, &query.filename, body).await;
    respond(&data, "Upload", result)
}

async fn process_jira(
    http: &HttpRequest,
    data: &AppState,
    req: &JiraRequest,
) -> Result<HttpResponse> {
    let session = authorize(http, data)?;
    validated(req)?;

    let token = data.settings.snapshot().jira_token;
    let story = data
        .jira
        .fetch_story(&req.jira_base_url, &req.story_number, &token)
        .await?;
    data.activity
        .info("Jira", &format!("Fetched story {}", req.story_number));

    synthesize(data, &session, SourceDocument::new(story)).await
}

#[post("/testcases/jira")]
async fn generate_from_jira(
    http: HttpRequest,
    data: web::Data<AppState>,
    req: web::Json<JiraRequest>,
) -> HttpResponse {
    let result = process_jira(&http, &data, &req).await;
    respond(&data, "Jira", result)
}

async fn process_answers(
    http: &HttpRequest,
    data: &AppState,
    req: AnswersRequest,
) -> Result<HttpResponse> {
    let session = authorize(http, data)?;
    let settings = data.settings.snapshot();
    let config = data.llm.llm_config(&settings.gemini_api_key);
    let context_id = req
        .context_id
        .filter(|id| !id.trim().is_empty())
        .map(ContextHandle::from);

    let suite = data
        .synthesis
        .refine(
            &config,
            &session.username,
            context_id.as_ref(),
            &req.answers,
            settings.synthesis_settings(),
        )
        .await?;
    data.activity.info(
        "Synthesis",
        &format!(
            "Refined {} test cases for {}",
            suite.test_cases.len(),
            session.username
        ),
    );
    Ok(HttpResponse::Ok().json(suite))
}

#[post("/testcases/answers")]
async fn submit_answers(
    http: HttpRequest,
    data: web::Data<AppState>,
    req: web::Json<AnswersRequest>,
) -> HttpResponse {
    let result = process_answers(&http, &data, req.into_inner()).await;
    respond(&data, "Synthesis", result)
}

#[get("/admin/users")]
async fn list_users(http: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let result = authorize(&http, &data).map(|_| HttpResponse::Ok().json(data.auth.list_users()));
    respond(&data, "Admin", result)
}

#[get("/admin/logs")]
async fn get_logs(http: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let result = authorize(&http, &data).map(|_| HttpResponse::Ok().json(data.activity.snapshot()));
    respond(&data, "Admin", result)
}

#[delete("/admin/logs")]
async fn clear_logs(http: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let result = authorize(&http, &data).map(|session| {
        data.activity.clear();
        data.activity
            .info("Admin", &format!("Logs cleared by {}", session.username));
        HttpResponse::Ok().json(SuccessResponse { success: true })
    });
    respond(&data, "Admin", result)
}

#[get("/admin/settings")]
async fn get_settings(http: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let result = authorize(&http, &data).map(|_| HttpResponse::Ok().json(data.settings.snapshot()));
    respond(&data, "Admin", result)
}

#[put("/admin/settings")]
async fn update_settings(
    http: HttpRequest,
    data: web::Data<AppState>,
    req: web::Json<AdminSettings>,
) -> HttpResponse {
    let result = authorize(&http, &data).and_then(|session| {
        data.settings.replace(req.into_inner())?;
        data.activity
            .info("Admin", &format!("Settings updated by {}", session.username));
        Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
    });
    respond(&data, "Admin", result)
}

/// Registers every route plus extractor limits and error shapes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            let response = error_response(&AppError::ValidationError(err.to_string()));
            actix_web::error::InternalError::from_response(err, response).into()
        }))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            let response = error_response(&AppError::ValidationError(err.to_string()));
            actix_web::error::InternalError::from_response(err, response).into()
        }))
        .service(login)
        .service(logout)
        .service(upload_document)
        .service(generate_from_jira)
        .service(submit_answers)
        .service(list_users)
        .service(get_logs)
        .service(clear_logs)
        .service(get_settings)
        .service(update_settings);
}

fn cors_for(origins: &[String]) -> Cors {
    let cors = if origins.iter().any(|origin| origin == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };
    cors.allow_any_method().allow_any_header().max_age(3600)
}

pub fn start_server(state: Arc<AppState>, config: &ServerConfig) -> std::io::Result<Server> {
    let data = web::Data::from(state);
    let origins = config.allowed_origins.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors_for(&origins))
            .app_data(data.clone())
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}
