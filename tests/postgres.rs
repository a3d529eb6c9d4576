//! Tests against a live PostgreSQL instance.
//!
//! Run with `cargo test -- --ignored` after exporting `TEST_DB_USER`,
//! `TEST_DB_PASSWORD` and `TEST_DB_NAME` (plus `TEST_DB_HOST`/`TEST_DB_PORT`
//! when the server is not on `localhost:5432`).

use std::{env, sync::Arc};

use chrono::Utc;

use vault_notes::{
    config::DatabaseConfig,
    repository::{NoteRepository, PgRepository},
};

async fn repository() -> PgRepository {
    let var = |name: &str| env::var(name).unwrap_or_else(|_| panic!("{name} must be set"));

    let config = DatabaseConfig {
        host: env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
        port: env::var("TEST_DB_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5432),
        user: var("TEST_DB_USER"),
        password: var("TEST_DB_PASSWORD"),
        name: var("TEST_DB_NAME"),
        max_connections: Some(8),
    };

    let repo = PgRepository::connect(&config).expect("pool");
    repo.migrate().await.expect("migrations");
    repo
}

fn unique_author(tag: &str) -> String {
    format!("{tag}-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn migration_is_idempotent() {
    let repo = repository().await;
    repo.migrate().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn inserted_note_is_listed_with_server_timestamp() {
    let repo = repository().await;
    let author = unique_author("roundtrip");
    let before = Utc::now() - chrono::Duration::seconds(1);

    repo.insert(&author, "b").await.unwrap();

    let notes = repo.list_recent().await.unwrap();
    let note = notes
        .iter()
        .find(|n| n.author == author)
        .expect("inserted note is listed");
    assert_eq!(note.content, "b");
    assert!(note.created_at >= before);

    assert_eq!(repo.get_by_id(note.id).await.unwrap().len(), 1);

    repo.delete_by_id(note.id).await.unwrap();
    assert!(repo.get_by_id(note.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn listing_is_capped_and_ordered() {
    let repo = repository().await;
    let author = unique_author("cap");
    for i in 0..105 {
        repo.insert(&author, &format!("note {i}")).await.unwrap();
    }

    let notes = repo.list_recent().await.unwrap();
    assert_eq!(notes.len(), 100);
    for pair in notes.windows(2) {
        assert!((pair[0].created_at, pair[0].id) > (pair[1].created_at, pair[1].id));
    }

    loop {
        let leftover: Vec<_> = repo
            .list_recent()
            .await
            .unwrap()
            .into_iter()
            .filter(|n| n.author == author)
            .collect();
        if leftover.is_empty() {
            break;
        }
        for note in leftover {
            repo.delete_by_id(note.id).await.unwrap();
        }
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn unknown_id_reads_empty_and_deletes_cleanly() {
    let repo = repository().await;

    assert!(repo.get_by_id(i64::MAX).await.unwrap().is_empty());
    repo.delete_by_id(i64::MAX).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires a PostgreSQL server"]
async fn concurrent_inserts_share_the_pool() {
    let repo = Arc::new(repository().await);
    let author = unique_author("concurrent");

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let repo = repo.clone();
            let author = author.clone();
            tokio::spawn(async move { repo.insert(&author, &format!("n{i}")).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mine: Vec<_> = repo
        .list_recent()
        .await
        .unwrap()
        .into_iter()
        .filter(|n| n.author == author)
        .collect();
    assert_eq!(mine.len(), 20);

    for note in mine {
        repo.delete_by_id(note.id).await.unwrap();
    }
}
