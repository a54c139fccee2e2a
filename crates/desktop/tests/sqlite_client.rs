//! The same client wired onto a single SQLite database.

use std::sync::Arc;

use docmgmt_auth::{CredentialHasher, PermissionToken, Role, SessionManager};
use docmgmt_desktop::{ClientConfig, DesktopClient, SqliteClient};
use docmgmt_documents::{Document, DocumentAccessService, DocumentError, DocumentStatus};
use docmgmt_infra::SqliteStore;

fn seeded() -> SqliteClient {
    let store = Arc::new(
        SqliteStore::in_memory()
            .unwrap()
            .with_hasher(CredentialHasher::insecure_fast()),
    );

    let alice = store.add_user("alice", "alice@example.com", "alice-pw").unwrap();
    let bob = store.add_user("bob", "bob@example.com", "bob-pw").unwrap();
    let editor = store.add_role(Role::new("editor")).unwrap();
    for token in ["document:create", "document:edit:own", "document:delete:own", "document:list:all"] {
        store.grant_token(editor, PermissionToken::from_static(token)).unwrap();
    }
    let author = store.add_role(Role::new("author")).unwrap();
    store
        .grant_token(author, PermissionToken::from_static("document:create"))
        .unwrap();
    store.assign_role(bob, editor).unwrap();
    store.assign_role(alice, author).unwrap();

    DesktopClient::new(
        SessionManager::with_hasher(store.clone(), store.clone(), CredentialHasher::insecure_fast()),
        DocumentAccessService::new(store),
    )
}

#[test]
fn documents_flow_through_sqlite() {
    let client = seeded();

    client.login("alice", "alice-pw").unwrap();
    let alices = client.create_document("Alice's notes", "a").unwrap();

    client.login("bob", "bob-pw").unwrap();
    let bobs = client.create_document("Bob's plan", "b").unwrap();
    assert_eq!(bobs.status, DocumentStatus::DRAFT);

    let titles: Vec<String> = client.documents().unwrap().into_iter().map(|d| d.title).collect();
    assert_eq!(titles, vec!["Bob's plan", "Alice's notes"]);

    let mut edit = bobs.clone();
    edit.title = "Bob's plan v2".to_string();
    client.update_document(&edit).unwrap();
    assert_eq!(client.document(bobs.id).unwrap().unwrap().title, "Bob's plan v2");

    assert_eq!(client.delete_document(alices.id).unwrap_err(), DocumentError::NotOwner(alices.id));

    client.login("alice", "alice-pw").unwrap();
    let visible = client.documents().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, alices.id);
    assert_eq!(client.document(bobs.id).unwrap(), None);
}

#[test]
fn caller_status_survives_the_round_trip() {
    let client = seeded();
    client.login("bob", "bob-pw").unwrap();
    let doc = client.create_document("Bob's plan", "b").unwrap();

    let mut edit: Document = serde_json::from_value(serde_json::json!({
        "id": doc.id,
        "title": "Bob's plan",
        "content": "b2",
        "owner_id": doc.owner_id,
        "status": "IN REVIEW",
        "created_at": doc.created_at,
        "updated_at": doc.updated_at,
    }))
    .unwrap();
    edit.content = "b3".to_string();
    client.update_document(&edit).unwrap();

    let listed = client.documents().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status.as_str(), "IN REVIEW");
    assert_eq!(listed[0].content, "b3");

    client.login("alice", "alice-pw").unwrap();
    assert!(client.documents().unwrap().is_empty());
}

#[test]
fn opaque_tokens_do_not_block_login() {
    let store = Arc::new(
        SqliteStore::in_memory()
            .unwrap()
            .with_hasher(CredentialHasher::insecure_fast()),
    );
    let carol = store.add_user("carol", "carol@example.com", "carol-pw").unwrap();
    let reporting = store.add_role(Role::new("reporting")).unwrap();
    store.grant_token(reporting, PermissionToken::new("reports")).unwrap();
    store.assign_role(carol, reporting).unwrap();
    let client = DesktopClient::new(
        SessionManager::with_hasher(store.clone(), store.clone(), CredentialHasher::insecure_fast()),
        DocumentAccessService::new(store),
    );

    client.login("carol", "carol-pw").unwrap();

    assert!(client.has_permission("reports"));
    assert!(!client.has_permission("document:create"));
}

#[test]
fn explanation_reads_roles_from_sqlite() {
    let client = seeded();
    client.login("alice", "alice-pw").unwrap();

    let explanation = client.explain("document:list:all").unwrap();

    assert!(!explanation.granted);
    assert_eq!(explanation.principal.unwrap().roles, vec!["author"]);
}

#[test]
fn open_with_in_memory_config_starts_signed_out() {
    let client = SqliteClient::open(&ClientConfig::in_memory()).unwrap();

    assert!(!client.is_authenticated());
    assert!(client.documents().unwrap().is_empty());
    assert!(client.welcome_message().is_none());
}
