use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder, Paths};

/// Minimal OpenAPI specification for Feed Service.
pub fn doc() -> OpenApi {
    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Feed Service API")
                .version("1.0.0")
                .description(Some(
                    "Personalized feed ranking and enrichment endpoints.",
                ))
                .build(),
        )
        .paths(Paths::new())
        .build()
}
