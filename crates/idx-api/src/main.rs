//! IDX 시장 데이터 게이트웨이 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 종목 검색, 심볼 해석, 과거 데이터 조회 엔드포인트를 제공합니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use idx_api::metrics::setup_metrics_recorder;
use idx_api::middleware::{
    api_key_middleware, metrics_layer, rate_limit_middleware, ApiKeyState, RateLimitState,
};
use idx_api::openapi::swagger_ui_router;
use idx_api::routes::create_api_router;
use idx_api::state::AppState;
use idx_core::config::{AppConfig, SecurityConfig};
use idx_core::logging::{init_logging, LogConfig};
use idx_upstream::client::InvestingClient;

/// CORS 미들웨어 구성.
///
/// `security.cors_origins`가 설정되어 있으면 해당 origin만 허용합니다.
/// 비어 있으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let allow_origin = if security.cors_origins.is_empty() {
        warn!("cors_origins not set, allowing any origin (development mode)");
        AllowOrigin::any()
    } else {
        let origins: Vec<_> = security
            .cors_origins
            .iter()
            .filter_map(|s| s.trim().parse().ok())
            .collect();

        if origins.is_empty() {
            warn!("cors_origins contains no valid origins, allowing any");
            AllowOrigin::any()
        } else {
            info!("CORS configured with {} allowed origins", origins.len());
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let config = state.config.clone();

    // 메트릭 라우터 (별도 상태, Rate Limit 제외)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    // API 라우터 (Rate Limit 조건부 적용)
    let mut api_router = create_api_router().with_state(state);

    if config.rate_limit.enabled {
        let rate_limit_state = RateLimitState::new(config.rate_limit.clone());

        // IP별 버킷 맵이 무한히 커지지 않도록 주기적으로 유휴 버킷 정리
        rate_limit_state
            .limiter()
            .spawn_cleanup_task(Duration::from_secs(60), Duration::from_secs(600));

        api_router = api_router.layer(middleware::from_fn_with_state(
            rate_limit_state,
            rate_limit_middleware,
        ));
        info!(
            requests_per_minute = config.rate_limit.requests_per_minute,
            burst_size = config.rate_limit.burst_size,
            "Rate limiting enabled"
        );
    } else {
        info!("Rate limiting DISABLED");
    }

    if config.security.require_api_key {
        if config.security.api_key.is_empty() {
            warn!("require_api_key is set but api_key is empty, skipping API key check");
        } else {
            let api_key_state = ApiKeyState::new(config.security.api_key.clone());
            api_router = api_router.layer(middleware::from_fn_with_state(
                api_key_state,
                api_key_middleware,
            ));
            info!("API key authentication enabled");
        }
    }

    Router::new()
        .merge(metrics_router)
        .merge(api_router)
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer(&config.security))
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI` 환경변수가 설정된 경우
/// OpenAPI JSON 스펙을 stdout으로 출력하고 종료합니다.
fn handle_export_openapi() -> Result<(), Box<dyn std::error::Error>> {
    use idx_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if export_flag || export_env {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec)?;
        println!("{}", json);
        std::process::exit(0);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // OpenAPI 내보내기 처리 (서버 시작 전)
    handle_export_openapi()?;

    // 설정 로드 (기본값 → config/default.toml → IDX__ 환경변수)
    let config = AppConfig::load_default()?;

    // tracing 초기화
    init_logging(LogConfig::from_app_config(&config.logging))?;

    info!("Starting IDX Gate API server...");

    // Prometheus 메트릭 레코더 설정
    let metrics_handle = setup_metrics_recorder();
    info!("Prometheus metrics recorder initialized");

    // 업스트림 클라이언트 및 애플리케이션 상태 생성
    let provider = Arc::new(InvestingClient::new(&config.upstream)?);
    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, provider));

    info!(
        version = %state.version,
        market = state.resolver.market(),
        cache_enabled = state.config.cache.enabled,
        "Application state initialized"
    );

    // 라우터 생성
    let app = create_router(state, metrics_handle);

    // 서버 시작
    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료를 시작합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
