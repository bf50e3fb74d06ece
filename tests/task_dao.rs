use sea_orm::{ConnectionTrait, DatabaseConnection, Set, Value};

use task_service::{
    config::AppConfig,
    db::{
        connection,
        dao::{DaoContext, DaoLayerError, TaskDao, TaskFilter},
        entities::task::{self, Priority},
    },
};

async fn dao() -> (DatabaseConnection, TaskDao) {
    let db = connection::open(&AppConfig::for_tests().database)
        .await
        .expect("open in-memory database");
    let dao = DaoContext::new(&db).task();
    (db, dao)
}

fn new_task(title: &str, priority: Priority) -> task::ActiveModel {
    task::ActiveModel {
        title: Set(title.to_string()),
        description: Set(None),
        completed: Set(false),
        priority: Set(priority),
        ..Default::default()
    }
}

#[tokio::test]
async fn insert_reads_back_storage_defaults() {
    let (_db, dao) = dao().await;

    let created = dao.insert(new_task("first", Priority::Low)).await.unwrap();

    assert_eq!(created.id, 1);
    assert!(!created.completed);
    assert_eq!(created.priority, Priority::Low);
    assert!(created.created_at.ends_with('Z'));
    assert_eq!(created.created_at.len(), "2024-01-01T00:00:00.000Z".len());
    assert_eq!(created.created_at, created.updated_at);
}

#[tokio::test]
async fn update_bumps_updated_at_even_within_a_millisecond() {
    let (_db, dao) = dao().await;
    let created = dao.insert(new_task("t", Priority::Medium)).await.unwrap();

    let first = dao
        .update_columns(
            created.id,
            vec![(task::Column::Completed, Value::from(1_i32))],
        )
        .await
        .unwrap();
    let second = dao
        .update_columns(
            created.id,
            vec![(task::Column::Title, Value::from("renamed"))],
        )
        .await
        .unwrap();

    assert!(first.completed);
    assert_eq!(second.title, "renamed");
    assert_eq!(second.created_at, created.created_at);
    assert!(first.updated_at > created.updated_at);
    assert!(second.updated_at > first.updated_at);
}

#[tokio::test]
async fn missing_rows_report_not_found() {
    let (_db, dao) = dao().await;

    let err = dao
        .update_columns(42, vec![(task::Column::Title, Value::from("x"))])
        .await
        .unwrap_err();
    assert!(matches!(err, DaoLayerError::NotFound { id: 42, .. }));

    let err = dao.delete(42).await.unwrap_err();
    assert!(matches!(err, DaoLayerError::NotFound { id: 42, .. }));

    assert!(dao.find_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn filters_apply_to_page_and_count() {
    let (_db, dao) = dao().await;
    for (title, priority) in [
        ("a", Priority::High),
        ("b", Priority::High),
        ("c", Priority::Low),
    ] {
        dao.insert(new_task(title, priority)).await.unwrap();
    }
    dao.update_columns(1, vec![(task::Column::Completed, Value::from(1_i32))])
        .await
        .unwrap();

    let high = TaskFilter {
        priority: Some(Priority::High),
        ..TaskFilter::default()
    };
    assert_eq!(dao.count(high).await.unwrap(), 2);

    let done_high = TaskFilter {
        completed: Some(true),
        priority: Some(Priority::High),
    };
    let rows = dao.find(done_high, 50, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "a");

    let all = dao.find(TaskFilter::default(), 2, 1).await.unwrap();
    let ids: Vec<i64> = all.iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn storage_constraints_reject_bad_rows() {
    let (db, dao) = dao().await;

    let result = db
        .execute_unprepared("INSERT INTO tasks (title, priority) VALUES ('x', 'urgent')")
        .await;
    assert!(result.is_err());

    let result = db
        .execute_unprepared("INSERT INTO tasks (title) VALUES ('')")
        .await;
    assert!(result.is_err());

    assert_eq!(dao.count(TaskFilter::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn schema_can_be_applied_twice() {
    let (db, dao) = dao().await;
    dao.insert(new_task("kept", Priority::Medium)).await.unwrap();

    connection::initialize(&db).await.unwrap();

    assert_eq!(dao.count(TaskFilter::default()).await.unwrap(), 1);
}
