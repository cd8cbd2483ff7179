//! Integration tests for the modes API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::util::ServiceExt;

    use visual_lab::api::public::modes::ModesResponse;

    use crate::test_utils::{body_to_string, empty_request, test_app};

    /// Tests that every mode is listed with its welcome text
    #[tokio::test]
    async fn it_lists_modes() {
        let app = test_app(vec![], 9);

        let response = app.oneshot(empty_request("GET", "/api/modes")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_to_string(response.into_body()).await;
        let resp: ModesResponse = serde_json::from_str(&body).unwrap();
        let ids: Vec<String> = resp.modes.iter().map(|m| m.id.to_string()).collect();
        assert_eq!(ids, vec!["IDENTITY_SCAN", "PROJECT_DESIGN", "BRAINSTORMING"]);
        assert!(resp.modes.iter().all(|m| !m.welcome.is_empty()));
    }
}
