pub mod ballots;
pub mod elections;
pub mod health;
pub mod keys;
pub mod results;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(elections::router())
        .merge(keys::router())
        .merge(ballots::router())
        .merge(results::router())
        .with_state(state)
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
            self_url: "http://127.0.0.1:0".into(),
            vs_api_url: "http://127.0.0.1:1".into(),
            ts_api_url: "http://127.0.0.1:2".into(),
            ra_api_url: "http://127.0.0.1:3".into(),
            data_dir: dir.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn health_check_responds_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::new(test_config(dir.path())).expect("state");
        let app = router(state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn election_result_404_before_tally() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::new(test_config(dir.path())).expect("state");
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/election-result?election_id=missing")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
