// ABOUTME: Integration tests for the file-backed session store
// ABOUTME: Persistence across reopen, change notifications, logout and concurrent writers

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use worksphere_auth::{
    FileSessionStore, SessionChanged, SessionKey, SessionOp, SessionState, SessionStore,
};

async fn open_state(dir: &TempDir) -> (Arc<FileSessionStore>, SessionState) {
    let store = Arc::new(
        FileSessionStore::open(dir.path().join("session.toml"))
            .await
            .unwrap(),
    );
    (store.clone(), SessionState::new(store))
}

#[tokio::test]
async fn test_session_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let (_, state) = open_state(&dir).await;
        state.establish("acme", "at-1", "rt-1").await.unwrap();
    }

    let (_, state) = open_state(&dir).await;
    let session = state.current().await.unwrap().unwrap();
    assert_eq!(session.access_token, "at-1");
    assert_eq!(session.tenant_name.as_deref(), Some("acme"));
}

#[tokio::test]
async fn test_file_uses_well_known_keys() {
    let dir = TempDir::new().unwrap();
    let (store, state) = open_state(&dir).await;
    state.establish("acme", "at-1", "rt-1").await.unwrap();

    let content = std::fs::read_to_string(store.path()).unwrap();
    assert!(content.contains("auth_token = \"at-1\""));
    assert!(content.contains("refresh_token = \"rt-1\""));
    assert!(content.contains("tenant_name = \"acme\""));
    assert!(!content.contains("pending_login"));
}

#[tokio::test]
async fn test_pending_login_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let (_, state) = open_state(&dir).await;
        state.begin_pending_login("acme").await.unwrap();
    }

    let (_, state) = open_state(&dir).await;
    let pending = state.take_pending_login().await.unwrap().unwrap();
    assert_eq!(pending.tenant_name, "acme");

    let (_, state) = open_state(&dir).await;
    assert!(state.pending_login().await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_removes_file_and_notifies() {
    let dir = TempDir::new().unwrap();
    let (store, state) = open_state(&dir).await;
    state.establish("acme", "at-1", "rt-1").await.unwrap();

    let mut rx = state.subscribe();
    state.logout().await.unwrap();

    assert!(!store.path().exists());
    assert_eq!(rx.recv().await.unwrap(), SessionChanged::Cleared);
    assert!(!state.is_authenticated().await);
}

#[tokio::test]
async fn test_batch_emits_one_event_per_change() {
    let dir = TempDir::new().unwrap();
    let (store, _) = open_state(&dir).await;
    let mut rx = store.subscribe();

    store
        .apply(vec![
            SessionOp::Set(SessionKey::AuthToken, "at".to_string()),
            SessionOp::Set(SessionKey::TenantName, "acme".to_string()),
            SessionOp::Remove(SessionKey::PendingLogin),
        ])
        .await
        .unwrap();

    assert_eq!(rx.recv().await.unwrap(), SessionChanged::Set(SessionKey::AuthToken));
    assert_eq!(rx.recv().await.unwrap(), SessionChanged::Set(SessionKey::TenantName));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_concurrent_writers_do_not_lose_updates() {
    let dir = TempDir::new().unwrap();
    let (store, _) = open_state(&dir).await;

    let mut tasks = Vec::new();
    for (key, value) in [
        (SessionKey::AuthToken, "at"),
        (SessionKey::RefreshToken, "rt"),
        (SessionKey::TenantName, "acme"),
    ] {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store.set(key, value.to_string()).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let reopened = FileSessionStore::open(store.path()).await.unwrap();
    assert_eq!(reopened.get(SessionKey::AuthToken).await.unwrap().as_deref(), Some("at"));
    assert_eq!(reopened.get(SessionKey::RefreshToken).await.unwrap().as_deref(), Some("rt"));
    assert_eq!(reopened.get(SessionKey::TenantName).await.unwrap().as_deref(), Some("acme"));
}
