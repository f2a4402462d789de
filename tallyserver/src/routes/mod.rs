pub mod health;
pub mod receive_election;
pub mod ts_resp;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new().merge(health::router()).merge(receive_election::router()).merge(ts_resp::router()).with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            listen: "127.0.0.1:0".into(),
            bb_api_url: "http://127.0.0.1:1".into(),
            data_dir: dir.to_path_buf(),
            grace_period_seconds: 1,
        }
    }

    #[tokio::test]
    async fn health_check_responds_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::new(test_config(dir.path())).expect("state");
        let app = router(state);

        let response =
            app.oneshot(Request::builder().uri("/").body(Body::empty()).expect("request")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn receive_election_accepts_and_spawns() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::new(test_config(dir.path())).expect("state");
        let app = router(state);

        let body = serde_json::json!({ "electionid": "election-1" });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/receive-election")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).expect("json")))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
