use actix_web::{web, App, HttpResponse, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feed_service::db::{PgCommentStore, PgPostStore, PgSignalProvider};
use feed_service::handlers::{get_feed, FeedHandlerState};
use feed_service::search::ElasticsearchIndex;
use feed_service::services::NullAuthorStore;
use feed_service::{openapi, Config, EnrichmentPolicy, FeedPipeline, RankingWeights};

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "feed-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn metrics_endpoint() -> HttpResponse {
    let encoder = prometheus::TextEncoder::new();
    match encoder.encode_to_string(&prometheus::gather()) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn openapi_json(
    doc: web::Data<utoipa::openapi::OpenApi>,
) -> actix_web::Result<HttpResponse> {
    let body = serde_json::to_string(&*doc).map_err(|e| {
        tracing::error!("OpenAPI serialization failed: {}", e);
        actix_web::error::ErrorInternalServerError("OpenAPI serialization error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting feed-service v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);

    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    let index = match ElasticsearchIndex::new(
        &config.search.url,
        &config.search.post_index,
        config.ranking.freshness_scale_hours,
    ) {
        Ok(index) => index,
        Err(e) => {
            tracing::error!("Search client creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create search client: {}", e);
            std::process::exit(1);
        }
    };

    // Author profiles are a stub boundary in the surrounding system; the
    // pipeline treats "no provider" exactly like "no match".
    let pipeline = Arc::new(FeedPipeline::new(
        Arc::new(PgSignalProvider::new(pool.clone())),
        Arc::new(index),
        Arc::new(PgPostStore::new(pool.clone())),
        Arc::new(NullAuthorStore),
        Arc::new(PgCommentStore::new(pool)),
        RankingWeights::from(&config.ranking),
        EnrichmentPolicy::from(&config.enrichment),
    ));

    let state = web::Data::new(FeedHandlerState {
        pipeline,
        max_page_size: config.ranking.max_page_size,
    });
    let openapi_doc = web::Data::new(openapi::doc());

    let port = config.app.port;
    info!("Listening on 0.0.0.0:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(openapi_doc.clone())
            .service(web::scope("/api/v1").service(get_feed))
            .route("/health", web::get().to(health))
            .route("/metrics", web::get().to(metrics_endpoint))
            .route("/api-docs/openapi.json", web::get().to(openapi_json))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
