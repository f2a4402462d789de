pub mod ballot0list;
pub mod health;
pub mod receive_ballot;
pub mod vs_resp;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(ballot0list::router())
        .merge(receive_ballot::router())
        .merge(vs_resp::router())
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
            bb_api_url: "http://127.0.0.1:1".into(),
            data_dir: dir.to_path_buf(),
            schedule_votes_low: 4,
            schedule_votes_high: 8,
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
    async fn receive_ballot_rejects_unknown_election() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::new(test_config(dir.path())).expect("state");
        let app = router(state);

        let body = serde_json::json!({
            "voter_id": "voter-1",
            "election_id": "no-such-election",
            "public_key": cryptocore::el_gamal::SecretKey::random(&mut rand::rngs::OsRng).public_key(),
            "ctv": [],
            "ctlv": {"c0": cryptocore::group::Point::identity(), "c1": cryptocore::group::Point::identity()},
            "ctlid": {"c0": cryptocore::group::Point::identity(), "c1": cryptocore::group::Point::identity()},
            "proof": "{}",
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/receive-ballot")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).expect("json")))
                    .expect("request"),
            )
            .await
            .expect("response");
        // §8: a submission for an election VS has no window for (here,
        // because it was never registered via `/ballot0list`) is rejected
        // with the "Ballot rejected" sentinel, not an HTTP error -- a
        // coercer watching the wire must not learn anything from the status
        // code alone.
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(value["image"], "Ballot rejected");
    }
}
