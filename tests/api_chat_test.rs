//! Integration tests for the chat API endpoint

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use mockito::Matcher;
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    use insmart_qa::ai::chat::normalize::{FALLBACK_FOLLOWUPS_EN, FALLBACK_FOLLOWUPS_ZH};

    use crate::test_utils::{COMPLETION_PATH, body_to_json, completion_body, test_app};

    fn chat_request(body: Value) -> Request<Body> {
        Request::builder()
            .uri("/api/chat")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Tests a well-formed model answer is relayed as-is
    #[tokio::test]
    async fn it_answers_with_structured_reply() {
        let mut server = mockito::Server::new_async().await;
        let content = json!({
            "reply": "IN-SMART supports schools with STEAM and AI learning design.",
            "followups": ["How do I join?", "Who can participate?", "What support is offered?"]
        })
        .to_string();
        let mock = server
            .mock("POST", COMPLETION_PATH)
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "2025-01-01-preview".into(),
            ))
            .match_header("api-key", "test-api-key")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""model":"gpt-4.1-nano""#.to_string()),
                Matcher::Regex(r#"\{"role":"system","content":"You are the official"#.to_string()),
                Matcher::Regex(r#"\{"role":"user","content":"What is IN-SMART\?"\}\]"#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(&content))
            .expect(1)
            .create_async()
            .await;

        let app = test_app(&server.url());
        let response = app
            .oneshot(chat_request(json!({"message": "  What is IN-SMART?  "})))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_to_json(response.into_body()).await;
        assert_eq!(
            body,
            json!({
                "reply": "IN-SMART supports schools with STEAM and AI learning design.",
                "followups": ["How do I join?", "Who can participate?", "What support is offered?"],
                "history": [
                    {"role": "user", "content": "What is IN-SMART?"},
                    {"role": "assistant", "content": "IN-SMART supports schools with STEAM and AI learning design."}
                ]
            })
        );
    }

    /// Tests the caller's history is forwarded upstream and returned
    /// with exactly one new turn appended
    #[tokio::test]
    async fn it_round_trips_history() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", COMPLETION_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::Regex(
                r#"\{"role":"assistant","content":"a1"\},\{"note":"kept"\},\{"role":"user","content":"q2"\}"#
                    .to_string(),
            ))
            .with_status(200)
            .with_body(completion_body("Plain answer"))
            .expect(1)
            .create_async()
            .await;

        let history = json!([
            {"role": "user", "content": "q1"},
            {"role": "assistant", "content": "a1"},
            {"note": "kept"}
        ]);
        let app = test_app(&server.url());
        let response = app
            .oneshot(chat_request(json!({"message": "q2", "history": history})))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_to_json(response.into_body()).await;
        let returned = body["history"].as_array().unwrap();
        assert_eq!(returned.len(), 5);
        assert_eq!(&returned[..3], history.as_array().unwrap().as_slice());
        assert_eq!(returned[3], json!({"role": "user", "content": "q2"}));
        assert_eq!(returned[4], json!({"role": "assistant", "content": "Plain answer"}));
    }

    /// Tests JSON wrapped in prose is still extracted
    #[tokio::test]
    async fn it_extracts_embedded_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", COMPLETION_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(completion_body(
                r#"Sure! {"reply":"Hi","followups":["a","b","c"]} Thanks"#,
            ))
            .create_async()
            .await;

        let app = test_app(&server.url());
        let response = app
            .oneshot(chat_request(json!({"message": "hello"})))
            .await
            .unwrap();

        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["reply"], "Hi");
        assert_eq!(body["followups"], json!(["a", "b", "c"]));
    }

    /// Tests free text answers get language matched fallback followups
    #[tokio::test]
    async fn it_falls_back_for_free_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", COMPLETION_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(completion_body("IN-SMART 是香港大學的教育計劃。"))
            .create_async()
            .await;

        let app = test_app(&server.url());
        let response = app
            .oneshot(chat_request(json!({"message": "IN-SMART 是甚麼？"})))
            .await
            .unwrap();
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["reply"], "IN-SMART 是香港大學的教育計劃。");
        assert_eq!(body["followups"], json!(FALLBACK_FOLLOWUPS_ZH));

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", COMPLETION_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(completion_body("IN-SMART is an HKU project."))
            .create_async()
            .await;

        let app = test_app(&server.url());
        let response = app
            .oneshot(chat_request(json!({"message": "What is IN-SMART?"})))
            .await
            .unwrap();
        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["followups"], json!(FALLBACK_FOLLOWUPS_EN));
    }

    /// Tests blank or missing messages are rejected before calling upstream
    #[tokio::test]
    async fn it_returns_400_without_calling_upstream() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(completion_body("unused"))
            .expect(0)
            .create_async()
            .await;

        let app = test_app(&server.url());
        let bodies = [
            json!({"message": ""}).to_string(),
            json!({"message": "   \n"}).to_string(),
            json!({"history": []}).to_string(),
            json!({"message": 42}).to_string(),
            "not json at all".to_string(),
        ];

        for body in bodies {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/api/chat")
                        .method("POST")
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                body_to_json(response.into_body()).await,
                json!({"error": "message is required"})
            );
        }

        mock.assert_async().await;
    }

    /// Tests a valid JSON body is ignored unless it's declared as JSON
    #[tokio::test]
    async fn it_returns_400_for_non_json_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_body(completion_body("unused"))
            .expect(0)
            .create_async()
            .await;

        let app = test_app(&server.url());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/chat")
                    .method("POST")
                    .header("content-type", "text/plain")
                    .body(Body::from(json!({"message": "hi"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_to_json(response.into_body()).await,
            json!({"error": "message is required"})
        );
    }

    /// Tests upstream error statuses are passed through with their body
    #[tokio::test]
    async fn it_propagates_upstream_errors() {
        for (status, upstream_body) in [(429, "Too many requests"), (500, "Internal failure")] {
            let mut server = mockito::Server::new_async().await;
            let mock = server
                .mock("POST", COMPLETION_PATH)
                .match_query(Matcher::Any)
                .with_status(status)
                .with_body(upstream_body)
                .expect(1)
                .create_async()
                .await;

            let app = test_app(&server.url());
            let response = app
                .oneshot(chat_request(json!({"message": "hello"})))
                .await
                .unwrap();

            mock.assert_async().await;
            assert_eq!(response.status().as_u16(), status as u16);
            assert_eq!(
                body_to_json(response.into_body()).await,
                json!({"error": "upstream_error", "status": status, "body": upstream_body})
            );
        }
    }

    /// Tests a transport failure is reported as a 500
    #[tokio::test]
    async fn it_returns_500_when_upstream_is_unreachable() {
        // Nothing listens on port 9 locally
        let app = test_app("http://127.0.0.1:9");
        let response = app
            .oneshot(chat_request(json!({"message": "hello"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_to_json(response.into_body()).await;
        assert!(body["error"].as_str().unwrap().starts_with("request failed: "));
    }

    /// Tests a success status with a body that isn't a completion
    #[tokio::test]
    async fn it_returns_502_for_invalid_upstream_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", COMPLETION_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"unexpected": "shape"}"#)
            .create_async()
            .await;

        let app = test_app(&server.url());
        let response = app
            .oneshot(chat_request(json!({"message": "hello"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_to_json(response.into_body()).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("invalid upstream response: ")
        );
    }
}
