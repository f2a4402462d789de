pub mod health;
pub mod keys;
pub mod load;

use axum::routing::post;
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(keys::router())
        .route("/elections/load-file", post(load::load_file))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::state::AppState;

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            listen: "127.0.0.1:0".into(),
            bb_api_url: "http://127.0.0.1:1".into(),
            vs_api_url: "http://127.0.0.1:2".into(),
            ts_api_url: "http://127.0.0.1:3".into(),
            data_dir: dir.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn health_check_responds_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::new(test_config(dir.path()));
        let app = router(state);

        let response =
            app.oneshot(Request::builder().uri("/").body(Body::empty()).expect("request")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn load_file_rejects_when_keys_not_ready() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::new(test_config(dir.path()));
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/elections/load-file?name=election-1.json")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
