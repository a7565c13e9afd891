mod common;

use common::{FakeBackend, credentials};
use enova_printouts::{PrintoutError, SessionManager};

#[tokio::test]
async fn session_is_unavailable_before_login() {
    let backend = FakeBackend::rendering(b"%PDF".to_vec());
    let sessions = SessionManager::new(backend.clone(), credentials());

    assert!(matches!(
        sessions.session(),
        Err(PrintoutError::NotInitialized)
    ));
    assert!(!sessions.is_initialized());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn initialize_logs_in_once() {
    let backend = FakeBackend::rendering(b"%PDF".to_vec());
    let mut sessions = SessionManager::new(backend.clone(), credentials());

    let first = sessions.initialize().await.unwrap().clone();
    let second = sessions.initialize().await.unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(first.user, "Administrator");
    assert_eq!(first.database, "Demo");
    assert_eq!(
        backend.calls(),
        vec!["load_runtime", "open_database", "login"]
    );
    assert_eq!(sessions.session().unwrap(), &first);
}

#[tokio::test]
async fn rejected_credentials_fail_initialization() {
    let mut backend = FakeBackend::rendering(b"%PDF".to_vec());
    backend.reject_login = true;
    let mut sessions = SessionManager::new(backend.clone(), credentials());

    let err = sessions.initialize().await.unwrap_err();
    match &err {
        PrintoutError::Initialization(msg) => {
            assert!(msg.contains("credentials rejected"), "{msg}");
            assert!(msg.contains("Administrator"), "{msg}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(
        sessions.session(),
        Err(PrintoutError::NotInitialized)
    ));

    // The opened connection is still released on shutdown.
    sessions.dispose().await;
    assert_eq!(backend.count("release_session"), 0);
    assert_eq!(backend.count("close_connection"), 1);
}

#[tokio::test]
async fn unreachable_database_fails_initialization() {
    let mut backend = FakeBackend::rendering(b"%PDF".to_vec());
    backend.fail_open = true;
    let mut sessions = SessionManager::new(backend.clone(), credentials());

    let err = sessions.initialize().await.unwrap_err();
    assert!(matches!(err, PrintoutError::Initialization(ref msg) if msg.contains("'Demo'")));
    assert_eq!(backend.count("login"), 0);

    sessions.dispose().await;
    assert_eq!(backend.count("close_connection"), 0);
}

#[tokio::test]
async fn dispose_releases_session_before_connection_once() {
    let backend = FakeBackend::rendering(b"%PDF".to_vec());
    let mut sessions = SessionManager::new(backend.clone(), credentials());
    sessions.initialize().await.unwrap();

    sessions.dispose().await;
    sessions.dispose().await;

    assert_eq!(
        backend.calls(),
        vec![
            "load_runtime",
            "open_database",
            "login",
            "release_session",
            "close_connection"
        ]
    );
    assert!(!sessions.is_initialized());
}

#[tokio::test]
async fn dispose_without_login_is_a_noop() {
    let backend = FakeBackend::rendering(b"%PDF".to_vec());
    let mut sessions = SessionManager::new(backend.clone(), credentials());

    sessions.dispose().await;

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn failed_session_release_still_closes_connection() {
    let mut backend = FakeBackend::rendering(b"%PDF".to_vec());
    backend.fail_release = true;
    let mut sessions = SessionManager::new(backend.clone(), credentials());
    sessions.initialize().await.unwrap();

    sessions.dispose().await;

    assert_eq!(backend.count("release_session"), 1);
    assert_eq!(backend.count("close_connection"), 1);
}
