//! HTTP wire protocol against a mock search server

use mockito::{Matcher, Server};
use search_index_sync::search::dispatch::{IndexTransport, SolrHttpTransport};
use search_index_sync::{EntityId, IndexCommand, SearchConfig, SearchError, SearchSync};
use std::time::Duration;

mod common;
use common::{Entity, Question, select_body};

fn config_for(server: &Server) -> SearchConfig {
    let address = server.socket_address();
    SearchConfig::builder()
        .host(address.ip().to_string())
        .port(address.port())
        .credentials("admin", "secret")
        .request_timeout_secs(2)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_upsert_posts_xml_with_commit_and_basic_auth() {
    let mut server = Server::new_async().await;
    let question = Question::new(7, "Borrowing & lifetimes");
    let expected = IndexCommand::upsert_for(&question).unwrap().to_xml();

    let mock = server
        .mock("POST", "/solr/update")
        .match_query(Matcher::UrlEncoded("commit".into(), "true".into()))
        .match_header("authorization", "Basic YWRtaW46c2VjcmV0")
        .match_header("content-type", "text/xml; charset=utf-8")
        .match_body(Matcher::Exact(expected))
        .with_status(200)
        .create_async()
        .await;

    let transport = SolrHttpTransport::new(&config_for(&server)).unwrap();
    let body = IndexCommand::upsert_for(&question).unwrap().to_xml();
    assert!(body.contains("<field name=\"title\">Borrowing &amp; lifetimes</field>"));
    transport.post_update(body).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_body_is_id_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/solr/update")
        .match_query(Matcher::UrlEncoded("commit".into(), "true".into()))
        .match_body("<delete><query>id:42</query></delete>")
        .with_status(200)
        .create_async()
        .await;

    let transport = SolrHttpTransport::new(&config_for(&server)).unwrap();
    transport
        .post_update(IndexCommand::delete(EntityId::from(42_u64)).to_xml())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_select_sends_json_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/solr/select")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("wt".into(), "json".into()),
            Matcher::UrlEncoded("q".into(), "title:rust async".into()),
        ]))
        .match_header("authorization", "Basic YWRtaW46c2VjcmV0")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(select_body(&[(1, "Question")]))
        .create_async()
        .await;

    let transport = SolrHttpTransport::new(&config_for(&server)).unwrap();
    let body = transport.select("title:rust async", None).await.unwrap();
    assert!(body.contains("\"entry_type\":\"Question\""));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_maps_to_http_status() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/solr/update")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("core reloading")
        .create_async()
        .await;

    let transport = SolrHttpTransport::new(&config_for(&server)).unwrap();
    let err = transport
        .post_update(IndexCommand::delete(EntityId::from(1_u64)).to_xml())
        .await
        .unwrap_err();

    match err {
        SearchError::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "core reloading");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_credentials_without_user() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/solr/select")
        .match_query(Matcher::Any)
        .match_header("authorization", Matcher::Missing)
        .with_body(select_body(&[]))
        .create_async()
        .await;

    let address = server.socket_address();
    let config = SearchConfig::builder()
        .host(address.ip().to_string())
        .port(address.port())
        .build()
        .unwrap();
    let transport = SolrHttpTransport::new(&config).unwrap();
    transport.select("*:*", Some(0)).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_failed_delivery_never_reaches_caller() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/solr/update")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let sync: SearchSync<Entity> = SearchSync::start(config_for(&server)).unwrap();
    let question = Question::new(3, "Will this fail?");

    let outcome = sync.coordinator().after_save(&question, true);
    assert!(outcome.dispatched().is_some());

    tokio::time::timeout(Duration::from_secs(5), sync.channel().wait_idle())
        .await
        .unwrap();
    let stats = sync.shutdown().await;
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.sent, 0);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_end_to_end_query_over_http() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/solr/select")
        .match_query(Matcher::UrlEncoded("q".into(), "rust".into()))
        .with_body(select_body(&[(1, "Question"), (2, "Question")]))
        .create_async()
        .await;

    let mut sync: SearchSync<Entity> = SearchSync::start(config_for(&server)).unwrap();
    let store = common::MemoryStore::with(vec![Entity::Question(Question::new(2, "Pinning"))]);
    sync.register_entity(&Question::new(0, "sample"), store).unwrap();

    let results = sync.query("rust").await.unwrap();
    assert_eq!(
        results.collection("questions").unwrap(),
        &[Entity::Question(Question::new(2, "Pinning"))]
    );

    sync.shutdown().await;
}
