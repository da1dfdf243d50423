use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness probe. Always reports the same status.
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "okkkk" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_healthz_status_is_fixed() {
        let Json(body) = healthz().await;
        assert_eq!(body.status, "okkkk");
    }
}
