mod common;

use common::FakeLauncher;
use playground::{
    Action, MemoryStorage, PhpVersion, Playground, PlaygroundError, ShareClient, ShareError,
    WordPressVersion,
};
use repl_server::config::{HoneypotConfig, ReplConfig};
use repl_server::{create_app, AppState};
use shared::{MemoryShareStore, ShareBackend, ShareStore};
use std::net::SocketAddr;
use std::sync::Arc;
use url::Url;

struct TestServer {
    base_url: String,
    store: Arc<MemoryShareStore>,
}

async fn spawn_server() -> TestServer {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let store = Arc::new(MemoryShareStore::new());
    let config = ReplConfig {
        port: 0,
        app_url: base_url.clone(),
        share_backend: ShareBackend::Memory,
        database: None,
        honeypot: HoneypotConfig {
            enabled: true,
            name_field: "my_name".to_string(),
            valid_from_field: "valid_from".to_string(),
            min_seconds: 0,
            secret: "round-trip-key".to_string(),
        },
    };
    let app = create_app(AppState::new(store.clone() as Arc<dyn ShareStore>, config));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer { base_url, store }
}

fn session(server: &TestServer) -> Playground {
    Playground::new(
        Arc::new(FakeLauncher::default()),
        Arc::new(MemoryStorage::new()),
    )
    .with_share_client(ShareClient::new(&server.base_url).unwrap())
}

#[tokio::test]
async fn test_share_and_reopen() {
    let server = spawn_server().await;

    let mut author = session(&server);
    author
        .mount(&Url::parse(&format!("{}/?plugin=akismet", server.base_url)).unwrap())
        .await;
    author.dispatch(Action::SetCode("<?php echo get_bloginfo('name');".to_string()));
    author.dispatch(Action::SetPhpVersion(PhpVersion::Php82));
    author.dispatch(Action::SetWordPressVersion(WordPressVersion::Release {
        major: 6,
        minor: 5,
    }));
    author.dispatch(Action::SetMultisite(true));

    let share_url = author.share().await.unwrap();
    assert_eq!(server.store.count().await.unwrap(), 1);

    let hash = share_url.path().trim_start_matches("/share/").to_string();
    assert_eq!(hash.len(), 10);

    let stored = server.store.find_by_hash(&hash).await.unwrap().unwrap();
    assert_eq!(stored.code, "<?php echo get_bloginfo('name');");
    assert_eq!(stored.php_version, "8.2");
    assert_eq!(stored.wordpress_version, "6.5");
    assert!(stored.multisite);
    assert_eq!(stored.plugins, vec!["akismet"]);

    let mut visitor = session(&server);
    visitor.mount(&share_url).await;

    let state = visitor.state();
    assert_eq!(state.code, "<?php echo get_bloginfo('name');");
    assert_eq!(state.php_version, PhpVersion::Php82);
    assert_eq!(
        state.wordpress_version,
        WordPressVersion::Release { major: 6, minor: 5 }
    );
    assert!(state.multisite);
    assert_eq!(state.plugins, vec!["akismet"]);
    assert!(state.themes.is_empty());

    // Unchanged code from the opened share is not offered again.
    assert!(!visitor.can_share());
    assert!(matches!(
        visitor.share().await,
        Err(PlaygroundError::Share(ShareError::Unchanged))
    ));
}

#[tokio::test]
async fn test_unknown_share_falls_back_to_defaults() {
    let server = spawn_server().await;

    let mut visitor = session(&server);
    visitor
        .mount(&Url::parse(&format!("{}/share/doesnotexist", server.base_url)).unwrap())
        .await;

    let state = visitor.state();
    assert!(state.ready);
    assert_eq!(state.code, playground::DEFAULT_CODE);
}

#[tokio::test]
async fn test_share_without_honeypot_fields_is_rejected() {
    let server = spawn_server().await;
    let client = ShareClient::new(&server.base_url).unwrap();

    let request = playground::share::ShareRequest {
        code: "<?php echo 1;".to_string(),
        php_version: "8.3".to_string(),
        wordpress_version: "latest".to_string(),
        multisite: false,
        plugins: vec![],
        themes: vec![],
    };
    let result = client.create(&request, &Default::default()).await;

    assert!(matches!(result, Err(ShareError::Rejected)));
    assert_eq!(server.store.count().await.unwrap(), 0);
}
