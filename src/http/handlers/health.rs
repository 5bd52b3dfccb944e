use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

/// Gateway liveness. Does not call the upstream.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn test_timestamp_is_rfc3339() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        let stamp = body["timestamp"].as_str().unwrap();
        assert!(stamp.ends_with('Z'), "{stamp}");
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }
}
