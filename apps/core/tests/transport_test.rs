use campusfind_core::model::{EntityFilter, EntityType, SuggestionKind};
use campusfind_core::source::{ResultSource, SourceError, SuggestionSource};
use campusfind_core::transport::HttpSearchClient;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn results_request_carries_query_type_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "salle b"))
        .and(query_param("type", "room"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "r-12",
                "entityType": "room",
                "title": "Salle B12",
                "description": "Building B, floor 1",
                "category": "Rooms",
                "relevance": 0.92,
                "metadata": {"code": "B-012", "capacity": 30},
                "isFavorite": true
            }],
            "userRole": "teacher"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpSearchClient::new(&server.uri()).unwrap();
    let response = client
        .fetch_results("salle b", EntityFilter::Only(EntityType::Room), 20)
        .await
        .unwrap();

    assert_eq!(response.user_role.as_deref(), Some("teacher"));
    assert_eq!(response.results.len(), 1);
    let entry = &response.results[0];
    assert_eq!(entry.entity_type, EntityType::Room);
    assert_eq!(entry.metadata.code.as_deref(), Some("B-012"));
    assert!(entry.is_favorite);
}

#[tokio::test]
async fn suggestions_without_partial_omit_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search/suggestions"))
        .and(query_param_is_missing("q"))
        .and(query_param("role", "student"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "suggestions": [
                {"id": "s1", "text": "Algebra I", "kind": "popular", "category": "Courses", "count": 12},
                {"id": "s2", "text": "Salle B12", "kind": "recent"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpSearchClient::new(&server.uri()).unwrap();
    let response = client.fetch_suggestions(None, Some("student")).await.unwrap();

    assert_eq!(response.suggestions.len(), 2);
    assert_eq!(response.suggestions[0].kind, SuggestionKind::Popular);
    assert_eq!(response.suggestions[0].count, Some(12));
    assert!(response.user_role.is_none());
}

#[tokio::test]
async fn error_status_maps_to_status_error_with_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"message": "index rebuilding"})),
        )
        .mount(&server)
        .await;

    let client = HttpSearchClient::new(&server.uri()).unwrap();
    let error = client
        .fetch_results("salle", EntityFilter::All, 20)
        .await
        .unwrap_err();

    assert_eq!(
        error,
        SourceError::Status {
            status: 503,
            message: "index rebuilding".into(),
        }
    );
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = HttpSearchClient::new(&server.uri()).unwrap();
    let error = client
        .fetch_results("salle", EntityFilter::All, 20)
        .await
        .unwrap_err();

    assert!(matches!(error, SourceError::Decode(_)), "{error:?}");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let client = HttpSearchClient::new("http://127.0.0.1:1").unwrap();
    let error = client.fetch_suggestions(Some("sa"), None).await.unwrap_err();

    assert!(matches!(error, SourceError::Transport(_)), "{error:?}");
}

#[tokio::test]
async fn numeric_metadata_code_does_not_fail_the_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "c-101",
                "entityType": "course",
                "title": "Algebra I",
                "relevance": 0.8,
                "metadata": {"code": 101}
            }]
        })))
        .mount(&server)
        .await;

    let client = HttpSearchClient::new(&server.uri()).unwrap();
    let response = client
        .fetch_results("algebra", EntityFilter::All, 20)
        .await
        .unwrap();

    assert_eq!(response.results[0].metadata.code.as_deref(), Some("101"));
}
