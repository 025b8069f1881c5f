//! End-to-end command flows over the in-memory store.

use std::sync::Arc;

use bugsmith_commands::CommandRouter;
use bugsmith_llm::{LlmClient, LlmConfig};
use bugsmith_ratelimits::RateLimiter;
use bugsmith_settings::{DEFAULT_BUG_REPORT_TEMPLATE, SettingsService};
use bugsmith_store::{MemoryStore, OrgStore, RateLimitStore};

const TEAM: &str = "T1";
const CHANNEL: &str = "C1";

fn router_with(store: Arc<MemoryStore>, llm: Option<LlmClient>, max_requests: u32) -> CommandRouter {
    let settings = SettingsService::new(store.clone() as Arc<dyn OrgStore>);
    let limiter = RateLimiter::new(
        store as Arc<dyn RateLimitStore>,
        max_requests,
        86_400,
        "openai_api",
    );
    CommandRouter::new(settings, limiter, llm)
}

fn router() -> CommandRouter {
    router_with(Arc::new(MemoryStore::new()), None, 100)
}

async fn send(router: &CommandRouter, text: &str) -> String {
    router.handle_message(text, TEAM, Some(CHANNEL)).await
}

#[tokio::test]
async fn test_bind_then_edit_template_flow() {
    let router = router();

    let reply = send(&router, "use project Mobile app").await;
    assert!(reply.contains("Mobile app"), "unexpected reply: {reply}");

    let template = send(&router, "show bug template").await;
    for line in ["Bug name:", "Steps:", "Actual result:", "Expected:"] {
        assert!(template.contains(line), "template missing {line}: {template}");
    }

    let payload = "Title:\nEnvironment:\nSteps to reproduce:\nExpected outcome:";
    let reply = send(&router, &format!("edit bug template {payload}")).await;
    assert!(reply.contains("updated"), "unexpected reply: {reply}");

    let template = send(&router, "show bug template").await;
    assert_eq!(template, payload);
}

#[tokio::test]
async fn test_jira_url_validation_flow() {
    let router = router();
    send(&router, "use project web").await;

    let reply = send(&router, "set jira url ftp://bad").await;
    assert!(
        reply.contains("http://") || reply.contains("https://"),
        "error should mention the required scheme: {reply}"
    );

    let reply = send(&router, "set jira url https://example.atlassian.net").await;
    assert!(reply.contains("updated"), "unexpected reply: {reply}");

    let reply = send(&router, "show jira query").await;
    assert!(reply.contains("not set"), "unexpected reply: {reply}");
}

#[tokio::test]
async fn test_slack_link_formatting_is_unwrapped() {
    let router = router();
    send(&router, "use project web").await;

    let reply = send(
        &router,
        "set jira url <https://example.atlassian.net|example.atlassian.net>",
    )
    .await;
    assert!(reply.contains("updated"), "unexpected reply: {reply}");

    let status = send(&router, "status").await;
    assert!(
        status.contains("https://example.atlassian.net"),
        "status should show the unwrapped URL: {status}"
    );
}

#[tokio::test]
async fn test_project_scoped_commands_are_gated_on_binding() {
    let router = router();

    for command in [
        "show bug template",
        "create bug report the app crashes",
        "update docs some docs",
        "set jira token abcdef123456",
        "get bugs",
    ] {
        let reply = send(&router, command).await;
        assert!(
            reply.contains("No project is set"),
            "`{command}` should be gated: {reply}"
        );
    }
}

#[tokio::test]
async fn test_welcome_hint_shown_once_per_channel() {
    let router = router();

    let first = send(&router, "list projects").await;
    assert!(first.contains("👋"), "first reply should carry the hint: {first}");

    let second = send(&router, "list projects").await;
    assert!(!second.contains("👋"), "hint must not repeat: {second}");
}

#[tokio::test]
async fn test_list_projects_guidance_and_listing() {
    let router = router();

    let reply = send(&router, "list projects").await;
    assert!(reply.contains("use project Mobile app"), "unexpected reply: {reply}");

    send(&router, "use project zeta").await;
    send(&router, "use project alpha").await;

    let reply = send(&router, "list projects").await;
    let alpha = reply.find("- alpha").expect("alpha listed");
    let zeta = reply.find("- zeta").expect("zeta listed");
    assert!(alpha < zeta, "projects should be sorted: {reply}");
}

#[tokio::test]
async fn test_status_summarizes_configuration() {
    let router = router();
    send(&router, "use project web").await;
    send(&router, "update docs Payment flows live here").await;
    send(&router, "enable docs").await;

    let status = send(&router, "status").await;
    assert!(status.contains("*Project name:* web"), "{status}");
    assert!(status.contains("Payment flows live here"), "{status}");
    assert!(status.contains("*Use project context:* true"), "{status}");
    assert!(status.contains("*Jira token:* not set"), "{status}");
    assert!(status.contains("*Jira defaults:* none"), "{status}");
}

#[tokio::test]
async fn test_jira_defaults_set_show_clear() {
    let router = router();
    send(&router, "use project web").await;

    let reply = send(&router, "set jira defaults project=PROJ-123 type=Bug").await;
    assert!(reply.contains("*project*=PROJ-123"), "{reply}");
    assert!(reply.contains("*type*=Bug"), "{reply}");

    let reply = send(&router, "show jira defaults").await;
    assert!(reply.contains("*project*: PROJ-123"), "{reply}");
    assert!(reply.contains("*type*: Bug"), "{reply}");

    let reply = send(&router, "clear jira default type").await;
    assert!(reply.contains("has been cleared"), "{reply}");

    let reply = send(&router, "show jira defaults").await;
    assert!(!reply.contains("*type*"), "{reply}");
    assert!(reply.contains("*project*: PROJ-123"), "{reply}");

    let reply = send(&router, "clear jira default nothere").await;
    assert!(reply.contains("is not set"), "{reply}");
}

#[tokio::test]
async fn test_defaults_parse_errors_are_reported() {
    let router = router();
    send(&router, "use project web").await;

    let reply = send(&router, "set jira defaults not-a-pair").await;
    assert!(reply.contains("Errors found"), "{reply}");
    assert!(reply.contains("expected field=value"), "{reply}");
}

#[tokio::test]
async fn test_unknown_text_gets_fallback() {
    let router = router();
    let reply = send(&router, "good morning everyone").await;
    assert!(reply.contains("did not understand"), "{reply}");
}

#[tokio::test]
async fn test_invalid_project_name_is_rejected_before_storage() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with(store.clone(), None, 100);

    let reply = send(&router, "use project evil.name").await;
    assert!(reply.contains("Invalid project name"), "{reply}");

    let org = store.org_snapshot(TEAM).await.expect("org from invocation counter");
    assert!(org.projects.is_none(), "no project record may be created");
    assert!(
        org.channel_binding(CHANNEL)
            .and_then(|b| b.project)
            .is_none(),
        "no binding may be written"
    );
}

#[tokio::test]
async fn test_bug_report_generation_with_rate_limit() {
    let server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/chat/completions"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "Bug name: Checkout crash\nSteps:\n1. Open cart"
                    }
                }]
            })),
        )
        .mount(&server)
        .await;

    let llm = LlmClient::new(LlmConfig::new("test-key").with_base_url(server.uri())).unwrap();
    let router = router_with(Arc::new(MemoryStore::new()), Some(llm), 3);
    send(&router, "use project web").await;

    for _ in 0..3 {
        let reply = send(&router, "create bug report checkout crashes on pay").await;
        assert!(reply.contains("Checkout crash"), "{reply}");
    }

    let denied = send(&router, "create bug report checkout crashes on pay").await;
    assert!(denied.contains("reached the daily limit"), "{denied}");
    assert!(denied.contains("try again in"), "{denied}");
}

#[tokio::test]
async fn test_bug_report_without_llm_configured() {
    let router = router();
    send(&router, "use project web").await;

    let reply = send(&router, "create bug report something broke").await;
    assert!(reply.contains("temporarily unavailable"), "{reply}");
}

#[tokio::test]
async fn test_docs_flow_show_update_toggle() {
    let router = router();
    send(&router, "use project web").await;

    let reply = send(&router, "show project").await;
    assert!(reply.contains("documentation is empty"), "{reply}");

    send(&router, "update docs The API gateway handles retries.").await;
    let reply = send(&router, "show project").await;
    assert_eq!(reply, "The API gateway handles retries.");

    let reply = send(&router, "disable docs").await;
    assert!(reply.contains("false"), "{reply}");
}

#[tokio::test]
async fn test_direct_message_context_uses_default_project() {
    let store = Arc::new(MemoryStore::new());
    let router = router_with(store.clone(), None, 100);

    // No channel: project-scoped gate passes and writes land in "default".
    let reply = router
        .handle_message("update docs Notes from a DM", TEAM, None)
        .await;
    assert!(reply.contains("updated"), "{reply}");

    let org = store.org_snapshot(TEAM).await.unwrap();
    assert_eq!(
        org.project("default").unwrap().project_context.as_deref(),
        Some("Notes from a DM")
    );
}

#[tokio::test]
async fn test_resolver_defaults_visible_after_binding() {
    let router = router();
    send(&router, "use project fresh").await;

    // A freshly bound project answers with the stock template.
    let template = send(&router, "show bug template").await;
    assert_eq!(template, DEFAULT_BUG_REPORT_TEMPLATE);
}
