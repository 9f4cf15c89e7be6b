//! Postgres-backed share store tests. They start a container through
//! testcontainers, so run them with `cargo test -- --ignored` on a host with Docker.

use shared::db::repositories::ShareRepository;
use shared::test_environment::TestEnvironment;
use shared::{DatabaseError, NewShare, ShareBackend, ShareStore, StorageFactory};

fn new_share(code: &str) -> NewShare {
    NewShare {
        code: code.to_string(),
        php_version: "8.4".to_string(),
        wordpress_version: "latest".to_string(),
        multisite: false,
        plugins: vec![],
        themes: vec![],
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_find_share() {
    let env = TestEnvironment::new().await.unwrap();
    let repo = ShareRepository::new(env.db_pool.pool());

    let created = repo
        .create(NewShare {
            plugins: vec!["hello-dolly".to_string(), "akismet".to_string()],
            themes: vec!["twentytwentyfour".to_string()],
            multisite: true,
            ..new_share("test-code")
        })
        .await
        .unwrap();

    assert_eq!(created.hash.len(), 10);
    assert!(!created.id.is_empty());

    let found = repo.find_by_hash(&created.hash).await.unwrap().unwrap();
    assert_eq!(found.code, "test-code");
    assert_eq!(found.php_version, "8.4");
    assert_eq!(found.wordpress_version, "latest");
    assert!(found.multisite);
    assert_eq!(found.plugins, vec!["hello-dolly", "akismet"]);
    assert_eq!(found.themes, vec!["twentytwentyfour"]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_hash_is_a_constraint_violation() {
    let env = TestEnvironment::new().await.unwrap();
    let repo = ShareRepository::new(env.db_pool.pool());

    repo.insert("fixedhash1", &new_share("first")).await.unwrap();
    let err = repo
        .insert("fixedhash1", &new_share("second"))
        .await
        .unwrap_err();

    assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    assert!(repo.hash_exists("fixedhash1").await.unwrap());
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unknown_hash_returns_none() {
    let env = TestEnvironment::new().await.unwrap();
    let repo = ShareRepository::new(env.db_pool.pool());

    assert!(repo.find_by_hash("nope").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_factory_builds_postgres_store() {
    let env = TestEnvironment::new().await.unwrap();
    let config = env.database_config();

    let store = StorageFactory::create(ShareBackend::Postgres, Some(&config))
        .await
        .unwrap();
    let created = store.create(new_share("from-factory")).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(
        store.find_by_hash(&created.hash).await.unwrap().unwrap().code,
        "from-factory"
    );
}
