//! Тесты PgDocumentStore против реальной базы.
//! Запуск: DATABASE_URL=postgres://... cargo test -- --ignored

use serde_json::{json, Map, Value};
use uuid::Uuid;

use ticket_booking::models::{Lookup, OperationReply, TicketBooking};
use ticket_booking::services::BookingRepository;
use ticket_booking::store::{DocumentStore, PgDocumentStore};

async fn store() -> PgDocumentStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
    let store = PgDocumentStore::connect(&url, 2).await.unwrap();
    store.run_migrations().await.unwrap();
    store
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn update_merges_into_jsonb_document() {
    let store = store().await;
    let id = store
        .insert_one(fields(json!({"user_name": "Alice", "seats": 2})))
        .await
        .unwrap();

    assert_eq!(store.update_one(id, fields(json!({"status": "confirmed"}))).await.unwrap(), 1);
    assert_eq!(store.update_one(id, Map::new()).await.unwrap(), 1);

    let doc = store.find_one(id).await.unwrap().unwrap();
    assert_eq!(
        Value::Object(doc.body),
        json!({"user_name": "Alice", "seats": 2, "status": "confirmed"})
    );

    assert_eq!(store.delete_one(id).await.unwrap(), 1);
    assert_eq!(store.delete_one(id).await.unwrap(), 0);
    assert!(store.find_one(id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn repository_round_trip_over_postgres() {
    let store = store().await;
    store.ping().await.unwrap();
    let repo = BookingRepository::new(std::sync::Arc::new(store));

    let created = repo
        .create(&TicketBooking { event: Some(Some("Concert".into())), ..Default::default() })
        .await
        .unwrap();

    assert!(repo.list().await.unwrap().iter().any(|b| b.id == created.id));
    assert_eq!(
        repo.get_by_id(&created.id).await.unwrap(),
        Lookup::Found(created.clone())
    );
    assert_eq!(
        repo.update(&Uuid::new_v4().to_string(), &TicketBooking::default())
            .await
            .unwrap()
            .into_reply(),
        OperationReply::not_found()
    );
    assert!(repo.delete(&created.id).await.unwrap().is_found());
}
