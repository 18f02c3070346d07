//! HTTP contract tests for the Elasticsearch adapter.

use chrono::Utc;
use docvault_core::{BoolQuery, Error, SearchDocument, SearchIndex};
use docvault_search::{ElasticsearchConfig, ElasticsearchIndex};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn index_for(server: &MockServer) -> ElasticsearchIndex {
    ElasticsearchIndex::new(ElasticsearchConfig::new(server.uri())).unwrap()
}

fn sample(tenant: Uuid) -> SearchDocument {
    SearchDocument {
        document_id: Uuid::new_v4(),
        tenant_id: tenant,
        folder_id: None,
        name: "report.docx".to_string(),
        text: "quarterly numbers".to_string(),
        mime_type: "text/plain".to_string(),
        file_size: 17,
        indexed_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_upsert_puts_by_id_with_refresh() {
    let server = MockServer::start().await;
    let doc = sample(Uuid::new_v4());

    Mock::given(method("PUT"))
        .and(path(format!("/documents/_doc/{}", doc.document_id)))
        .and(query_param("refresh", "true"))
        .and(body_partial_json(json!({
            "document_id": doc.document_id,
            "text": "quarterly numbers"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "result": "created" })))
        .expect(1)
        .mount(&server)
        .await;

    index_for(&server).upsert(&doc).await.unwrap();
}

#[tokio::test]
async fn test_query_sends_bool_body_and_parses_hits() {
    let server = MockServer::start().await;
    let tenant = Uuid::new_v4();
    let hit_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/documents/_search"))
        .and(body_partial_json(json!({
            "size": 1000,
            "query": { "bool": {
                "must": [ { "term": { "tenant_id": tenant.to_string() } } ],
                "minimum_should_match": 1
            }}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {
                "total": { "value": 1 },
                "hits": [
                    { "_id": hit_id, "_score": 3.5, "_source": { "document_id": hit_id, "name": "x" } }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let hits = index_for(&server)
        .query(&BoolQuery::documents(tenant, None, "numbers"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document_id, hit_id);
    assert_eq!(hits[0].score, 3.5);
}

#[tokio::test]
async fn test_query_error_is_dependency_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents/_search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("cluster red"))
        .mount(&server)
        .await;

    let err = index_for(&server)
        .query(&BoolQuery::documents(Uuid::new_v4(), None, "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DependencyUnavailable(_)));
    assert!(err.to_string().contains("cluster red"));
}

#[tokio::test]
async fn test_delete_missing_is_ok() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("DELETE"))
        .and(path(format!("/documents/_doc/{}", id)))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    index_for(&server).delete(id).await.unwrap();
}

#[tokio::test]
async fn test_ensure_index_creates_when_missing() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/documents"))
        .and(body_partial_json(json!({
            "mappings": { "properties": { "document_id": { "type": "keyword" } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;

    index_for(&server).ensure_index().await.unwrap();
}

#[tokio::test]
async fn test_ensure_index_skips_existing() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    index_for(&server).ensure_index().await.unwrap();
}

#[tokio::test]
async fn test_basic_auth_sent_when_configured() {
    let server = MockServer::start().await;
    let mut config = ElasticsearchConfig::new(server.uri());
    config.username = Some("elastic".to_string());
    config.password = Some("secret".to_string());
    let doc = sample(Uuid::new_v4());

    Mock::given(method("PUT"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    ElasticsearchIndex::new(config).unwrap().upsert(&doc).await.unwrap();
}
