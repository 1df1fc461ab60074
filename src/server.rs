use crate::error::LexirankError;
use crate::query::{QueryService, WordsParams};
use actix_cors::Cors;
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{get, middleware, web, App, HttpResponse, HttpServer, ResponseError};
use serde_json::json;
use tracing::{info, warn};

pub const SERVICE_NAME: &str = "lexirank word api";

impl ResponseError for LexirankError {
    fn status_code(&self) -> StatusCode {
        match self {
            LexirankError::Validation { .. } => StatusCode::BAD_REQUEST,
            LexirankError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if !self.is_client_error() {
            warn!(error = %self, "request failed");
        }
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }
}

fn blocking_error(err: BlockingError) -> LexirankError {
    LexirankError::storage(format!("query worker failed: {err}"))
}

#[get("/")]
async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok", "message": SERVICE_NAME }))
}

#[get("/words")]
async fn get_words(
    service: web::Data<QueryService>,
    params: web::Query<WordsParams>,
) -> Result<HttpResponse, LexirankError> {
    let service = service.get_ref().clone();
    let params = params.into_inner();
    let words = web::block(move || service.list_words(&params))
        .await
        .map_err(blocking_error)??;
    Ok(HttpResponse::Ok().json(words))
}

#[get("/api/puzzle/{level}")]
async fn get_puzzle(
    service: web::Data<QueryService>,
    level: web::Path<i64>,
) -> Result<HttpResponse, LexirankError> {
    let service = service.get_ref().clone();
    let level = level.into_inner();
    let puzzle = web::block(move || service.build_puzzle(level))
        .await
        .map_err(blocking_error)??;
    Ok(HttpResponse::Ok().json(puzzle))
}

/// Storage failures come back as an `error` payload so the endpoint never
/// takes the service down with it.
#[get("/stats")]
async fn get_stats(service: web::Data<QueryService>) -> HttpResponse {
    let service = service.get_ref().clone();
    let stats = web::block(move || service.stats())
        .await
        .map_err(blocking_error)
        .and_then(|result| result);
    match stats {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            warn!(error = %e, "stats query failed");
            HttpResponse::Ok().json(json!({ "error": e.to_string() }))
        }
    }
}

/// Register every route plus extractor configs that turn malformed
/// parameters into validation errors.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| LexirankError::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| LexirankError::validation(err.to_string()).into()),
    )
    .service(root)
    .service(get_words)
    .service(get_puzzle)
    .service(get_stats);
}

/// Whether `origin` is allowed by `pattern`. A pattern may hold one `*`
/// standing for a single non-empty host label run, e.g. `https://*.vercel.app`.
pub fn origin_matches(pattern: &str, origin: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match pattern.split_once('*') {
        None => pattern == origin,
        Some((prefix, suffix)) => {
            origin.len() > prefix.len() + suffix.len()
                && origin.starts_with(prefix)
                && origin.ends_with(suffix)
                && !origin[prefix.len()..origin.len() - suffix.len()].contains('/')
        }
    }
}

pub fn cors(allowed_origins: &[String]) -> Cors {
    let origins = allowed_origins.to_vec();
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            origin
                .to_str()
                .map(|o| origins.iter().any(|pattern| origin_matches(pattern, o)))
                .unwrap_or(false)
        })
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl From<&crate::config::Config> for ServerSettings {
    fn from(cfg: &crate::config::Config) -> Self {
        Self {
            bind_address: cfg.bind_address.clone(),
            port: cfg.port,
            allowed_origins: cfg.allowed_origins.clone(),
        }
    }
}

pub async fn serve(service: QueryService, settings: ServerSettings) -> std::io::Result<()> {
    let data = web::Data::new(service);
    let origins = settings.allowed_origins.clone();
    info!(
        address = %settings.bind_address,
        port = settings.port,
        origins = ?settings.allowed_origins,
        "starting {SERVICE_NAME}"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            .wrap(middleware::Logger::default())
            .app_data(data.clone())
            .configure(routes)
    })
    .bind((settings.bind_address.clone(), settings.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{CefrLevel, LevelCount, WordRecord};
    use crate::store::{MemoryStore, WordQuery, WordStore};
    use actix_web::test;
    use serde_json::Value;

    struct BrokenStore;

    impl WordStore for BrokenStore {
        fn words(&self, _query: &WordQuery) -> crate::error::Result<Vec<WordRecord>> {
            Err(LexirankError::storage("no such table: words"))
        }

        fn total_words(&self) -> crate::error::Result<u64> {
            Err(LexirankError::storage("no such table: words"))
        }

        fn words_by_level(&self) -> crate::error::Result<Vec<LevelCount>> {
            Err(LexirankError::storage("no such table: words"))
        }
    }

    fn cat() -> WordRecord {
        WordRecord::new("cat", Some(5.0), Some(CefrLevel::A1))
    }

    fn fixture_service() -> QueryService {
        QueryService::from_store(MemoryStore::new(vec![
            cat(),
            WordRecord::new("act", Some(5.0), Some(CefrLevel::A1)),
            WordRecord::new("dog", Some(4.0), Some(CefrLevel::A1)),
        ]))
    }

    macro_rules! app {
        ($service:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($service))
                    .configure(routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_root() {
        let app = app!(fixture_service());
        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
    }

    #[actix_web::test]
    async fn test_words() {
        let app = app!(fixture_service());
        let uri = format!("/words?level={}&limit=10", cat().level());
        let req = test::TestRequest::get().uri(&uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let words: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|w| w["word"].as_str().unwrap())
            .collect();
        assert_eq!(words, vec!["act", "cat"]);
        assert_eq!(body[0]["cefr"], "A1");
    }

    #[actix_web::test]
    async fn test_words_defaults_to_level_one() {
        let app = app!(fixture_service());
        let req = test::TestRequest::get().uri("/words").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn test_words_rejects_bad_parameters() {
        let app = app!(fixture_service());
        for uri in ["/words?level=0", "/words?limit=501", "/words?min_len=2", "/words?level=abc"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[actix_web::test]
    async fn test_puzzle() {
        let app = app!(fixture_service());
        let uri = format!("/api/puzzle/{}", cat().level());
        let req = test::TestRequest::get().uri(&uri).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["letters"], json!(["A", "C", "T"]));
        assert_eq!(body["words"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_puzzle_status_codes() {
        let app = app!(fixture_service());
        let cases = [
            ("/api/puzzle/51", StatusCode::BAD_REQUEST),
            ("/api/puzzle/zero", StatusCode::BAD_REQUEST),
            ("/api/puzzle/50", StatusCode::NOT_FOUND),
        ];
        for (uri, status) in cases {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), status, "{uri}");
            let body: Value = test::read_body_json(resp).await;
            assert!(body["detail"].is_string());
        }
    }

    #[actix_web::test]
    async fn test_storage_failure_is_500_for_words() {
        let app = app!(QueryService::from_store(BrokenStore));
        let req = test::TestRequest::get().uri("/words").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_stats() {
        let app = app!(fixture_service());
        let req = test::TestRequest::get().uri("/stats").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_words"], 3);
        assert!(body["words_by_level"].is_array());
    }

    #[actix_web::test]
    async fn test_stats_error_payload() {
        let app = app!(QueryService::from_store(BrokenStore));
        let req = test::TestRequest::get().uri("/stats").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("no such table"));
    }

    #[actix_web::test]
    async fn test_cors_allows_wildcard_origin() {
        let origins = vec!["https://*.vercel.app".to_string()];
        let app = test::init_service(
            App::new()
                .wrap(cors(&origins))
                .app_data(web::Data::new(fixture_service()))
                .configure(routes),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Origin", "https://preview-42.vercel.app"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("https://preview-42.vercel.app")
        );
    }

    #[::core::prelude::v1::test]
    fn test_origin_matches() {
        assert!(origin_matches("http://localhost:5173", "http://localhost:5173"));
        assert!(!origin_matches("http://localhost:5173", "http://localhost:3000"));
        assert!(origin_matches("https://*.vercel.app", "https://my-game.vercel.app"));
        assert!(!origin_matches("https://*.vercel.app", "https://.vercel.app"));
        assert!(!origin_matches("https://*.vercel.app", "https://evil.com/x.vercel.app"));
        assert!(!origin_matches("https://*.vercel.app", "http://my-game.vercel.app"));
        assert!(origin_matches("*", "https://anything.example"));
    }
}
