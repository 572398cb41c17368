//! End-to-end requester workflow against a mock Daemo server.

use std::path::PathBuf;

use daemo_client::{
    ClientConfig, CredentialStore, DaemoClient, DaemoError, Environment, ItemOption, ItemType,
    Layout, NewProject, NewTask, NewTemplateItem, SubType,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credential_file(dir: &TempDir) -> PathBuf {
    let file = dir.path().join("credentials.json");
    std::fs::write(
        &file,
        r#"{"client_id": "c", "access_token": "old", "refresh_token": "r1"}"#,
    )
    .unwrap();
    file
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/oauth2-ng/token/"))
        .and(body_json(json!({
            "grant_type": "refresh_token",
            "client_id": "c",
            "refresh_token": "r1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new",
            "refresh_token": "r2",
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn refreshed_client(server: &MockServer, dir: &TempDir) -> DaemoClient {
    mount_token_endpoint(server).await;
    let config = ClientConfig::new(credential_file(dir), Environment::Custom(server.uri()))
        .refresh_credentials(true);
    DaemoClient::new(config).await.unwrap()
}

#[tokio::test]
async fn test_construction_refreshes_and_saves() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let client = refreshed_client(&server, &dir).await;

    assert_eq!(client.credentials().access_token.as_deref(), Some("new"));
    let saved = CredentialStore::load(client.credential_file()).unwrap();
    assert_eq!(saved.access_token.as_deref(), Some("new"));
    assert_eq!(saved.refresh_token.as_deref(), Some("r2"));
}

#[tokio::test]
async fn test_construction_without_refresh_leaves_file_alone() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let file = credential_file(&dir);
    let before = std::fs::read_to_string(&file).unwrap();

    let client = DaemoClient::new(ClientConfig::new(&file, Environment::Custom(server.uri())))
        .await
        .unwrap();

    assert_eq!(client.credentials().access_token.as_deref(), Some("old"));
    assert_eq!(std::fs::read_to_string(&file).unwrap(), before);
}

#[tokio::test]
async fn test_failed_refresh_aborts_construction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/oauth2-ng/token/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;
    // No resource call may go out with the stale token
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = ClientConfig::new(credential_file(&dir), Environment::Custom(server.uri()))
        .refresh_credentials(true);
    let err = DaemoClient::new(config).await.unwrap_err();
    assert!(matches!(err, DaemoError::Authentication { .. }));
    assert_eq!(err.status_code(), Some(400));
}

#[tokio::test]
async fn test_missing_credential_file() {
    let config = ClientConfig::new("/nonexistent/credentials.json", Environment::Sandbox);
    let err = DaemoClient::new(config).await.unwrap_err();
    assert!(matches!(err, DaemoError::NotFound(_)));

    let config = ClientConfig {
        credential_file: None,
        ..Default::default()
    };
    let err = DaemoClient::new(config).await.unwrap_err();
    assert!(matches!(err, DaemoError::Configuration(_)));
}

#[tokio::test]
async fn test_image_captioning_workflow() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let client = refreshed_client(&server, &dir).await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/"))
        .and(header("authorization", "Bearer new"))
        .and(body_json(json!({
            "name": "Image Captioning Project",
            "price": 0.2,
            "repetition": 1,
            "timeout": 120,
            "template": {"name": "Image Captioning Template", "items": []},
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 17, "template_id": 31})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/template-items/"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 501})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/tasks/"))
        .and(query_param("project_id", "17"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 900})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/17/publish/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let project = client
        .create_project(&NewProject::new(
            "Image Captioning Project",
            0.2,
            "Image Captioning Template",
        ))
        .await
        .unwrap();
    let project_id = project["id"].to_string();
    let template_id = project["template_id"].to_string();

    let image = client
        .create_template_item(
            &NewTemplateItem::new("image", ItemType::Image, &template_id, "")
                .src("{{url}}"),
        )
        .await
        .unwrap();
    let caption = client
        .create_template_item(
            &NewTemplateItem::new("caption", ItemType::Text, &template_id, "Caption the image.")
                .sub_type(SubType::Text)
                .predecessor(&image)
                .required(true)
                .placeholder("add your caption here..."),
        )
        .await
        .unwrap();
    assert_eq!(caption, "501");

    for url in ["https://example.com/1.jpg", "https://example.com/2.jpg"] {
        let task_id = client
            .create_task(&project_id, &NewTask::new(json!({"url": url})))
            .await
            .unwrap();
        assert_eq!(task_id, "900");
    }

    client.publish_project(&project_id).await.unwrap();
}

#[tokio::test]
async fn test_invalid_arguments_send_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let client = refreshed_client(&server, &dir).await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/template-items/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .create_project(&NewProject::new("", 0.2, "t"))
        .await
        .unwrap_err();
    assert!(matches!(err, DaemoError::Validation(_)));

    let err = client
        .create_project(&NewProject::new("p", 0.0, "t"))
        .await
        .unwrap_err();
    assert!(matches!(err, DaemoError::Validation(_)));

    let err = client
        .create_template_item(&NewTemplateItem::new("Q1", ItemType::Radio, "31", "Easy?"))
        .await
        .unwrap_err();
    assert!(matches!(err, DaemoError::Validation(_)));

    let err = client
        .create_template_item(&NewTemplateItem::new("audio", ItemType::Audio, "31", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, DaemoError::Validation(_)));

    // A complete choice item goes through validation
    let item = NewTemplateItem::new("Q1", ItemType::Radio, "31", "Easy?").choices(
        Layout::Row,
        false,
        vec![ItemOption::new("yes", 0), ItemOption::new("no", 1)],
    );
    assert!(item.validate().is_ok());
}

#[tokio::test]
async fn test_get_projects_follows_pages_until_cap() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let client = refreshed_client(&server, &dir).await;

    Mock::given(method("GET"))
        .and(path("/v1/projects/"))
        .and(query_param("account_type", "requester"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "next": format!("{}/v1/projects/page-2/", server.uri()),
            "results": [{"id": 1}, {"id": 2}, {"id": 3}],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/projects/page-2/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 6,
            "next": format!("{}/v1/projects/page-3/", server.uri()),
            "results": [{"id": 4}, {"id": 5}, {"id": 6}],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/projects/page-3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 9, "next": null, "results": [{"id": 7}],
        })))
        .expect(0)
        .mount(&server)
        .await;

    let projects = client.get_projects(Some(4)).await.unwrap();
    let ids: Vec<_> = projects.iter().map(|p| p["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn test_list_endpoints() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let client = refreshed_client(&server, &dir).await;

    let single_page = |ids: &[u64]| {
        let results: Vec<_> = ids.iter().map(|id| json!({"id": id})).collect();
        ResponseTemplate::new(200).set_body_json(json!({
            "count": ids.len(),
            "next": null,
            "results": results,
        }))
    };

    Mock::given(method("GET"))
        .and(path("/v1/projects/17/tasks/"))
        .respond_with(single_page(&[1, 2]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks/1/assignment-results/"))
        .respond_with(single_page(&[10]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/assignments/"))
        .and(query_param("task_id", "1"))
        .respond_with(single_page(&[20, 21, 22]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/templates/"))
        .respond_with(single_page(&[]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/template-items/"))
        .and(query_param("template_id", "31"))
        .respond_with(single_page(&[501, 502]))
        .mount(&server)
        .await;

    assert_eq!(client.get_tasks("17", None).await.unwrap().len(), 2);
    assert_eq!(client.get_task_results("1").await.unwrap().len(), 1);
    assert_eq!(client.get_assignments("1").await.unwrap().len(), 3);
    assert!(client.get_templates().await.unwrap().is_empty());
    assert_eq!(client.get_template_items("31").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_destroy_and_lookup_errors() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let client = refreshed_client(&server, &dir).await;

    Mock::given(method("DELETE"))
        .and(path("/v1/projects/17/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/template-items/501/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/tasks/900/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/template-items/501/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 501, "type": "image"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/assignments/404/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let item = client.get_template_item("501").await.unwrap();
    assert_eq!(item["type"], "image");

    client.destroy_project("17").await.unwrap();
    client.destroy_template_item("501").await.unwrap();

    let err = client.destroy_task("900").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));

    let err = client.get_assignment("404").await.unwrap_err();
    match err {
        DaemoError::Api {
            status_code, url, ..
        } => {
            assert_eq!(status_code, 404);
            assert!(url.ends_with("/v1/assignments/404/"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_configured_timeout_applies_to_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/projects/12/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 12}))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = ClientConfig {
        timeout_secs: Some(1),
        ..ClientConfig::new(credential_file(&dir), Environment::Custom(server.uri()))
    };
    let client = DaemoClient::new(config).await.unwrap();

    let err = client.get_project("12").await.unwrap_err();
    assert!(matches!(err, DaemoError::Network(ref e) if e.is_timeout()));
}
