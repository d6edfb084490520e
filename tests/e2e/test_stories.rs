use crate::e2e::helpers;

use helpers::assertions::{assert_error_body, assert_story_response};
use helpers::upstream_mock::{MockReply, DEFAULT_STORY};
use helpers::{TestContext, TEST_API_KEYS};
use hyper::StatusCode;
use nightmare_tales_backend::domain::story::{content_hash, THEMES};
use pretty_assertions::assert_eq;
use serde_json::Value;
use test_context::test_context;
use uuid::Uuid;

const GENERATE_STORY: &str = "/functions/v1/generate-story";

fn theme_of(story: &Value) -> &str {
    story.get("theme").and_then(|v| v.as_str()).unwrap()
}

fn id_of(story: &Value) -> &str {
    story.get("id").and_then(|v| v.as_str()).unwrap()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_and_persist_a_story(ctx: &TestContext) {
    let response = ctx.client.post_empty(GENERATE_STORY).await.unwrap();

    response.assert_status(StatusCode::OK);
    let story = response.json_body();
    assert_story_response(story, None);

    assert!(Uuid::parse_str(id_of(story)).is_ok());
    assert_eq!(story["title"], "The Cellar Voice");
    assert_eq!(story["content"], DEFAULT_STORY);
    assert!(THEMES.contains(&theme_of(story)));
    assert!(story.get("created_at").is_some());

    assert_eq!(ctx.fixtures.count_stories().await.unwrap(), 1);

    let stored_hash: String =
        sqlx::query_scalar("SELECT content_hash FROM stories WHERE id = $1")
            .bind(Uuid::parse_str(id_of(story)).unwrap())
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(stored_hash, content_hash(DEFAULT_STORY));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_call_upstream_with_story_then_title_parameters(ctx: &TestContext) {
    ctx.client
        .post_empty(GENERATE_STORY)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let story_requests = ctx.upstream.story_requests();
    assert_eq!(story_requests.len(), 1);
    let story_request = &story_requests[0];
    assert_eq!(story_request.body["model"], "gpt-4o-mini");
    assert_eq!(story_request.body["max_tokens"], 800);
    let temperature = story_request.body["temperature"].as_f64().unwrap();
    assert!((temperature - 0.9).abs() < 1e-6);
    assert_eq!(story_request.body["messages"][0]["role"], "system");
    assert_eq!(story_request.body["messages"][1]["role"], "user");
    assert!(story_request
        .system_message()
        .unwrap()
        .contains("1200-1500 characters"));
    assert!(story_request
        .user_message()
        .unwrap()
        .contains("Story number: 1."));

    let title_requests = ctx.upstream.title_requests();
    assert_eq!(title_requests.len(), 1);
    assert_eq!(title_requests[0].user_message(), Some(DEFAULT_STORY));
    assert_eq!(title_requests[0].body["max_tokens"], 20);

    let allowed: Vec<String> = TEST_API_KEYS
        .iter()
        .map(|k| format!("Bearer {}", k))
        .collect();
    for request in ctx.upstream.requests() {
        let authorization = request.authorization.expect("Missing authorization");
        assert!(allowed.contains(&authorization));
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_number_the_story_after_existing_ones(ctx: &TestContext) {
    ctx.fixtures.create_stories("cursed object", 3).await.unwrap();

    ctx.client
        .post_empty(GENERATE_STORY)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let story_requests = ctx.upstream.story_requests();
    assert!(story_requests[0]
        .user_message()
        .unwrap()
        .contains("Story number: 4."));
    assert_eq!(ctx.fixtures.count_stories().await.unwrap(), 4);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_unsaved_story_when_content_already_exists(ctx: &TestContext) {
    // Same text modulo case and whitespace fingerprints identically
    let existing = DEFAULT_STORY.to_uppercase().replace(' ', "  ");
    ctx.fixtures
        .create_story("Older", &existing, "haunted house", helpers::now())
        .await
        .unwrap();

    let response = ctx.client.post_empty(GENERATE_STORY).await.unwrap();

    response.assert_status(StatusCode::OK);
    let story = response.json_body();
    assert_story_response(story, None);
    assert!(id_of(story).starts_with("temp-"));
    assert!(id_of(story).len() > "temp-".len());
    assert_eq!(story["title"], "The Cellar Voice");
    assert_eq!(story["content"], DEFAULT_STORY);
    assert!(story.get("created_at").is_none());

    assert_eq!(ctx.fixtures.count_stories().await.unwrap(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_persist_only_one_of_two_identical_concurrent_stories(ctx: &TestContext) {
    let first = ctx.client.clone();
    let second = ctx.client.clone();

    let (a, b) = tokio::join!(
        async move { first.post_empty(GENERATE_STORY).await },
        async move { second.post_empty(GENERATE_STORY).await },
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    a.assert_status(StatusCode::OK);
    b.assert_status(StatusCode::OK);

    let ids = [id_of(a.json_body()), id_of(b.json_body())];
    let persisted = ids.iter().filter(|id| Uuid::parse_str(id).is_ok()).count();
    let ephemeral = ids.iter().filter(|id| id.starts_with("temp-")).count();

    assert_eq!(persisted, 1);
    assert_eq!(ephemeral, 1);
    assert_eq!(ctx.fixtures.count_stories().await.unwrap(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_without_inserting_when_story_call_fails(ctx: &TestContext) {
    ctx.upstream.push_story(MockReply::Status(500));

    let response = ctx.client.post_empty(GENERATE_STORY).await.unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json_body()["error"],
        "Failed to generate story: OpenAI API error: 500"
    );
    assert!(ctx.upstream.title_requests().is_empty());
    assert_eq!(ctx.fixtures.count_stories().await.unwrap(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_without_inserting_when_title_call_fails(ctx: &TestContext) {
    ctx.upstream.push_title(MockReply::Status(503));

    let response = ctx.client.post_empty(GENERATE_STORY).await.unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_error_body(response.json_body(), "Failed to generate story: ");
    assert_eq!(ctx.fixtures.count_stories().await.unwrap(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_a_blank_title(ctx: &TestContext) {
    ctx.upstream.push_title(MockReply::Text("\"\"".to_string()));

    let response = ctx.client.post_empty(GENERATE_STORY).await.unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_error_body(response.json_body(), "Failed to generate story: ");
    assert_eq!(ctx.fixtures.count_stories().await.unwrap(), 0);
}

#[tokio::test]
async fn it_should_fail_when_no_api_keys_are_configured() {
    let ctx = TestContext::with_config(|config| config.openai_api_keys.clear())
        .await
        .unwrap();

    let response = ctx.client.post_empty(GENERATE_STORY).await.unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json_body()["error"],
        "Failed to generate story: No OpenAI API keys configured"
    );
    assert!(ctx.upstream.requests().is_empty());
}

#[tokio::test]
async fn it_should_retry_transient_upstream_failures_when_configured() {
    let ctx = TestContext::with_config(|config| {
        config.upstream.max_retries = 2;
        config.upstream.initial_backoff_ms = 1;
    })
    .await
    .unwrap();
    ctx.upstream.push_story(MockReply::Status(503));

    let response = ctx.client.post_empty(GENERATE_STORY).await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(ctx.upstream.story_requests().len(), 2);
    assert_eq!(ctx.fixtures.count_stories().await.unwrap(), 1);
}

#[tokio::test]
async fn it_should_not_retry_client_errors() {
    let ctx = TestContext::with_config(|config| {
        config.upstream.max_retries = 2;
        config.upstream.initial_backoff_ms = 1;
    })
    .await
    .unwrap();
    ctx.upstream.push_story(MockReply::Status(400));

    let response = ctx.client.post_empty(GENERATE_STORY).await.unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ctx.upstream.story_requests().len(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_retry_by_default(ctx: &TestContext) {
    ctx.upstream.push_story(MockReply::Status(503));

    let response = ctx.client.post_empty(GENERATE_STORY).await.unwrap();

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ctx.upstream.story_requests().len(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_stories_of_one_theme_newest_first(ctx: &TestContext) {
    let a_stories = ctx.fixtures.create_stories("a", 5).await.unwrap();
    ctx.fixtures.create_stories("b", 5).await.unwrap();

    let response = ctx.client.get("/api/stories?theme=a").await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.json_body();
    assert_eq!(body["total_count"], 5);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 5);
    assert_eq!(body["total_pages"], 1);

    let stories = body["stories"].as_array().unwrap();
    for story in stories {
        assert_story_response(story, Some("a"));
    }
    let ids: Vec<&str> = stories.iter().map(id_of).collect();
    let expected: Vec<String> = a_stories.iter().map(|s| s.id.to_string()).collect();
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_page_through_all_themes(ctx: &TestContext) {
    let stories = ctx.fixtures.create_stories("doppelganger", 7).await.unwrap();

    let response = ctx
        .client
        .get("/api/stories?theme=all&page=2")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.json_body();
    assert_eq!(body["total_count"], 7);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["page"], 2);

    let page = body["stories"].as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(id_of(&page[0]), stories[5].id.to_string());
    assert_eq!(id_of(&page[1]), stories[6].id.to_string());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clamp_page_size(ctx: &TestContext) {
    ctx.fixtures.create_stories("time loop terror", 3).await.unwrap();

    let response = ctx
        .client
        .get("/api/stories?per_page=500&page=0")
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.json_body();
    assert_eq!(body["per_page"], 50);
    assert_eq!(body["page"], 1);
    assert_eq!(body["stories"].as_array().unwrap().len(), 3);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_nothing_for_an_empty_archive(ctx: &TestContext) {
    let response = ctx.client.get("/api/stories").await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.json_body();
    assert_eq!(body["total_count"], 0);
    assert_eq!(body["total_pages"], 0);
    assert!(body["stories"].as_array().unwrap().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_a_freshly_generated_story(ctx: &TestContext) {
    let generated = ctx.client.post_empty(GENERATE_STORY).await.unwrap();
    generated.assert_status(StatusCode::OK);
    let generated = generated.json_body();

    let path = format!("/api/stories?theme={}", theme_of(generated).replace(' ', "%20"));
    let response = ctx.client.get(&path).await.unwrap();

    response.assert_status(StatusCode::OK);
    let stories = response.json_body()["stories"].as_array().unwrap().clone();
    assert_eq!(stories.len(), 1);
    assert_eq!(id_of(&stories[0]), id_of(generated));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_the_theme_catalogue(ctx: &TestContext) {
    let response = ctx.client.get("/api/themes").await.unwrap();

    response.assert_status(StatusCode::OK);
    let themes: Vec<&str> = response.json_body()["themes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(themes.len(), 15);
    assert_eq!(themes, THEMES.to_vec());
}
