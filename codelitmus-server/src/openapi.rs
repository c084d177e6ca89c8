//! OpenAPI specification for CodeLitmus server.

use utoipa::OpenApi;

use codelitmus_core::{DetailedFeedback, MetricsExplanation, ScoreResult, Verdict};

use crate::routes::{AnalyzeUpload, ErrorResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::index,
        crate::routes::analyze,
        crate::routes::openapi_json
    ),
    components(
        schemas(
            AnalyzeUpload,
            ErrorResponse,
            ScoreResult,
            DetailedFeedback,
            MetricsExplanation,
            Verdict
        )
    ),
    tags(
        (name = "analysis", description = "Code analysis"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the CodeLitmus server.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn openapi_includes_expected_paths() {
        let doc = ApiDoc::openapi();
        let paths = doc.paths.paths;

        assert!(paths.contains_key("/"));
        assert!(paths.contains_key("/analyze/"));
        assert!(paths.contains_key("/openapi.json"));
    }

    #[test]
    fn openapi_registers_result_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;

        for name in ["ScoreResult", "DetailedFeedback", "Verdict", "ErrorResponse"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
