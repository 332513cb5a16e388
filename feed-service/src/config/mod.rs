use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub ranking: RankingConfig,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub url: String,
    pub post_index: String,
}

/// Scoring weights consumed by the candidate ranker. Read once at startup;
/// hot reload is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    pub tag_boost: f64,
    pub follow_boost: f64,
    pub freshness_scale_hours: f64,
    pub max_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    pub timeout_ms: u64,
    /// Retry a failed batch lookup once before degrading to an empty map.
    /// The source system never retried; kept configurable rather than
    /// hard-coding either behavior.
    pub retry_once: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            app: AppConfig {
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                port: std::env::var("APP_PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
                log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
            },
            search: SearchConfig {
                url: std::env::var("SEARCH_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:9200".to_string()),
                post_index: std::env::var("SEARCH_POST_INDEX")
                    .unwrap_or_else(|_| "posts".to_string()),
            },
            ranking: RankingConfig {
                tag_boost: std::env::var("RANKING_TAG_BOOST")
                    .unwrap_or_else(|_| "0.5".to_string())
                    .parse()?,
                follow_boost: std::env::var("RANKING_FOLLOW_BOOST")
                    .unwrap_or_else(|_| "1.0".to_string())
                    .parse()?,
                freshness_scale_hours: std::env::var("RANKING_FRESHNESS_SCALE_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()?,
                max_page_size: std::env::var("FEED_MAX_PAGE_SIZE")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()?,
            },
            enrichment: EnrichmentConfig {
                timeout_ms: std::env::var("ENRICHMENT_TIMEOUT_MS")
                    .unwrap_or_else(|_| "800".to_string())
                    .parse()?,
                retry_once: std::env::var("ENRICHMENT_RETRY_ONCE")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()?,
            },
        })
    }
}
