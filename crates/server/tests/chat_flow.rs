//! Chat service flows against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use salto_core::{DocumentId, MessageRole};
use salto_server::ai::canned::CANNED_RESPONSE;
use salto_server::ai::{AiError, AiGateway, CannedGateway, ConversationTurn};
use salto_server::db::{DocumentStore, MemoryStore};
use salto_server::models::{DEFAULT_SESSION_TITLE, DemoDataset};
use salto_server::services::{ChatService, FALLBACK_REPLY};

const TENANT: &str = "Acme";

fn service_with(gateway: Arc<dyn AiGateway>) -> ChatService {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    ChatService::new(store, gateway)
}

fn service() -> ChatService {
    service_with(Arc::new(CannedGateway::new()))
}

/// Gateway double that fails every call.
struct FailingGateway;

#[async_trait]
impl AiGateway for FailingGateway {
    async fn respond(
        &self,
        _query: &str,
        _history: &[ConversationTurn],
        _data_context: &str,
        _instance_name: &str,
    ) -> Result<String, AiError> {
        Err(AiError::Api {
            status: 429,
            message: "quota exceeded".to_string(),
        })
    }

    async fn generate_demo_datasets(&self) -> Result<Vec<DemoDataset>, AiError> {
        Err(AiError::Parse("unavailable".to_string()))
    }
}

/// Gateway double that records the history it was handed.
#[derive(Default)]
struct RecordingGateway {
    seen: Mutex<Vec<Vec<ConversationTurn>>>,
}

#[async_trait]
impl AiGateway for RecordingGateway {
    async fn respond(
        &self,
        _query: &str,
        history: &[ConversationTurn],
        _data_context: &str,
        _instance_name: &str,
    ) -> Result<String, AiError> {
        self.seen.lock().await.push(history.to_vec());
        Ok("recorded".to_string())
    }

    async fn generate_demo_datasets(&self) -> Result<Vec<DemoDataset>, AiError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn created_session_has_defaults_and_assigned_id() {
    let service = service();

    let session = service.create_session(TENANT).await.expect("create");
    assert!(session.id.is_some());
    assert_eq!(session.title, DEFAULT_SESSION_TITLE);
    assert_eq!(session.instance_name, TENANT);
    assert_eq!(session.created_at, session.last_message_at);

    let fetched = service
        .get_session(session.id.expect("assigned"))
        .await
        .expect("get")
        .expect("present");
    assert_eq!(fetched.title, DEFAULT_SESSION_TITLE);
}

#[tokio::test]
async fn absent_session_is_none_not_an_error() {
    let service = service();
    let missing = service.get_session(DocumentId::generate()).await.expect("get");
    assert!(missing.is_none());
}

#[tokio::test]
async fn sessions_are_listed_by_last_activity_descending() {
    let service = service();

    let first = service.create_session(TENANT).await.expect("create");
    let second = service.create_session(TENANT).await.expect("create");
    let third = service.create_session(TENANT).await.expect("create");

    // Touch in an order unrelated to creation; sleeps keep the millisecond
    // timestamps distinct.
    for session in [&second, &first, &third] {
        tokio::time::sleep(Duration::from_millis(5)).await;
        let id = session.id.expect("assigned");
        service
            .append_message(id, MessageRole::User, "ping", TENANT)
            .await
            .expect("append");
    }

    let listed = service.list_sessions(TENANT).await.expect("list");
    let ids: Vec<DocumentId> = listed.iter().filter_map(|s| s.id).collect();
    assert_eq!(
        ids,
        vec![
            third.id.expect("assigned"),
            first.id.expect("assigned"),
            second.id.expect("assigned"),
        ]
    );

    for window in listed.windows(2) {
        assert!(window[0].last_message_at >= window[1].last_message_at);
    }
}

#[tokio::test]
async fn sessions_are_scoped_to_their_tenant() {
    let service = service();
    service.create_session(TENANT).await.expect("create");
    service.create_session("Globex").await.expect("create");

    let acme = service.list_sessions(TENANT).await.expect("list");
    assert_eq!(acme.len(), 1);
    assert!(acme.iter().all(|s| s.instance_name == TENANT));
}

#[tokio::test]
async fn first_user_message_sets_short_title_verbatim() {
    let service = service();
    let session = service.create_session(TENANT).await.expect("create");
    let id = session.id.expect("assigned");

    service
        .append_message(id, MessageRole::User, "Hello", TENANT)
        .await
        .expect("append");

    let renamed = service.get_session(id).await.expect("get").expect("present");
    assert_eq!(renamed.title, "Hello");
}

#[tokio::test]
async fn first_user_message_truncates_long_title() {
    let service = service();
    let session = service.create_session(TENANT).await.expect("create");
    let id = session.id.expect("assigned");

    let content = "This is a longer message for testing xx";
    service
        .append_message(id, MessageRole::User, content, TENANT)
        .await
        .expect("append");

    let renamed = service.get_session(id).await.expect("get").expect("present");
    let expected: String = content.chars().take(27).collect::<String>() + "...";
    assert_eq!(renamed.title, expected);
}

#[tokio::test]
async fn title_is_derived_only_once() {
    let service = service();
    let session = service.create_session(TENANT).await.expect("create");
    let id = session.id.expect("assigned");

    service
        .append_message(id, MessageRole::User, "First question", TENANT)
        .await
        .expect("append");
    service
        .append_message(id, MessageRole::User, "Second question", TENANT)
        .await
        .expect("append");

    let renamed = service.get_session(id).await.expect("get").expect("present");
    assert_eq!(renamed.title, "First question");
}

#[tokio::test]
async fn assistant_messages_never_set_the_title() {
    let service = service();
    let session = service.create_session(TENANT).await.expect("create");
    let id = session.id.expect("assigned");

    service
        .append_message(id, MessageRole::Assistant, "Welcome!", TENANT)
        .await
        .expect("append");

    let fetched = service.get_session(id).await.expect("get").expect("present");
    assert_eq!(fetched.title, DEFAULT_SESSION_TITLE);
}

#[tokio::test]
async fn append_message_advances_last_activity() {
    let service = service();
    let session = service.create_session(TENANT).await.expect("create");
    let id = session.id.expect("assigned");
    let before = session.last_message_at;

    tokio::time::sleep(Duration::from_millis(5)).await;
    service
        .append_message(id, MessageRole::User, "Hello", TENANT)
        .await
        .expect("append");

    let touched = service.get_session(id).await.expect("get").expect("present");
    assert!(touched.last_message_at >= before);
    assert!(touched.last_message_at >= touched.created_at);
}

#[tokio::test]
async fn messages_are_listed_in_chronological_order() {
    let service = service();
    let session = service.create_session(TENANT).await.expect("create");
    let id = session.id.expect("assigned");

    for content in ["one", "two", "three"] {
        tokio::time::sleep(Duration::from_millis(5)).await;
        service
            .append_message(id, MessageRole::User, content, TENANT)
            .await
            .expect("append");
    }

    let messages = service.list_messages(id).await.expect("list");
    let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn delete_session_cascades_to_messages() {
    let service = service();
    let session = service.create_session(TENANT).await.expect("create");
    let id = session.id.expect("assigned");

    service
        .append_message(id, MessageRole::User, "Hello", TENANT)
        .await
        .expect("append");
    service
        .append_message(id, MessageRole::Assistant, "Hi!", TENANT)
        .await
        .expect("append");

    assert!(service.delete_session(id).await.expect("delete"));
    assert!(service.get_session(id).await.expect("get").is_none());
    assert!(service.list_messages(id).await.expect("list").is_empty());

    // A second delete finds nothing
    assert!(!service.delete_session(id).await.expect("delete"));
}

#[tokio::test]
async fn rename_reports_whether_a_session_was_modified() {
    let service = service();
    let session = service.create_session(TENANT).await.expect("create");
    let id = session.id.expect("assigned");

    assert!(service.rename_session(id, "Renamed").await.expect("rename"));
    assert!(
        !service
            .rename_session(DocumentId::generate(), "Renamed")
            .await
            .expect("rename")
    );
}

#[tokio::test]
async fn process_query_appends_query_and_assistant_reply() {
    let service = service();
    let session = service.create_session(TENANT).await.expect("create");
    let id = session.id.expect("assigned");

    let reply = service
        .process_query(id, "What data do we have?", TENANT)
        .await
        .expect("process");
    assert_eq!(reply.role, MessageRole::Assistant);
    assert_eq!(reply.content, CANNED_RESPONSE);

    let messages = service.list_messages(id).await.expect("list");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].content, "What data do we have?");
    assert_eq!(messages[1].role, MessageRole::Assistant);

    // The query also titles the session
    let titled = service.get_session(id).await.expect("get").expect("present");
    assert_eq!(titled.title, "What data do we have?");
}

#[tokio::test]
async fn gateway_failure_becomes_the_degraded_reply() {
    let service = service_with(Arc::new(FailingGateway));
    let session = service.create_session(TENANT).await.expect("create");
    let id = session.id.expect("assigned");

    let reply = service
        .process_query(id, "Will this fail?", TENANT)
        .await
        .expect("degraded reply is still a success");
    assert_eq!(reply.role, MessageRole::Assistant);
    assert_eq!(reply.content, FALLBACK_REPLY);

    // Exactly two new messages: the query, then the apology, in that order
    let messages = service.list_messages(id).await.expect("list");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].content, "Will this fail?");
    assert_eq!(messages[1].content, FALLBACK_REPLY);
}

#[tokio::test]
async fn history_passed_to_the_gateway_is_capped_at_six_turns() {
    let gateway = Arc::new(RecordingGateway::default());
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let service = ChatService::new(store, Arc::clone(&gateway) as Arc<dyn AiGateway>);

    let session = service.create_session(TENANT).await.expect("create");
    let id = session.id.expect("assigned");

    for n in 0..8 {
        tokio::time::sleep(Duration::from_millis(2)).await;
        service
            .append_message(id, MessageRole::User, &format!("msg {n}"), TENANT)
            .await
            .expect("append");
    }

    tokio::time::sleep(Duration::from_millis(2)).await;
    service
        .process_query(id, "the actual question", TENANT)
        .await
        .expect("process");

    let seen = gateway.seen.lock().await;
    let history = seen.first().expect("gateway was called");
    assert_eq!(history.len(), 6);
    // Chronological, ending with the just-persisted query
    assert_eq!(
        history.last().map(|turn| turn.content.as_str()),
        Some("the actual question")
    );
}
