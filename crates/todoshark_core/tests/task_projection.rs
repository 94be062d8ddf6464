use std::collections::BTreeSet;
use std::sync::Arc;
use todoshark_core::model::task::TaskBucket;
use todoshark_core::{
    project_bucket, DocumentRepository, SqliteDocumentStore, Task, TaskPatch, TaskPriority,
    TaskService,
};

#[test]
fn bucket_projections_partition_store_snapshot_in_priority_order() {
    let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let service = TaskService::new(DocumentRepository::<Task>::new(store));

    // Deterministic spread of buckets and priorities, including completed and
    // taken-out tasks which still belong to their bucket.
    for n in 0..24u8 {
        let bucket = TaskBucket::ALL[usize::from(n % 3)];
        let priority = TaskPriority::new(n % 5 + 1).unwrap();
        let id = service
            .create_task(&format!("task {n}"), None, bucket, priority, 1_000)
            .unwrap();
        if n % 4 == 0 {
            service.update_task(id, &TaskPatch::complete(2_000)).unwrap();
        }
        if n % 7 == 0 {
            service
                .update_task(id, &TaskPatch::take_out(2_000, 90_000).unwrap())
                .unwrap();
        }
    }

    let tasks = service.list_tasks().unwrap();
    let mut seen = BTreeSet::new();
    let mut total = 0;
    for bucket in TaskBucket::ALL {
        let projected = project_bucket(&tasks, bucket);
        assert!(projected.iter().all(|task| task.bucket == bucket));
        assert!(projected
            .windows(2)
            .all(|pair| pair[0].priority <= pair[1].priority));
        for task in &projected {
            assert!(seen.insert(task.id), "task {} projected twice", task.id);
        }
        total += projected.len();
    }
    assert_eq!(total, tasks.len());
    assert_eq!(seen.len(), 24);
}

#[test]
fn editing_a_task_moves_it_between_buckets() {
    let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let service = TaskService::new(DocumentRepository::<Task>::new(store));
    let id = service
        .create_task(
            "Renew passport",
            Some("photos first"),
            TaskBucket::Active,
            TaskPriority::default(),
            1_000,
        )
        .unwrap();
    service.update_task(id, &TaskPatch::complete(2_000)).unwrap();

    service
        .edit_task(
            id,
            "  Renew passport soon ",
            Some("   "),
            TaskBucket::Deferred,
            TaskPriority::HIGHEST,
        )
        .unwrap();

    let tasks = service.list_tasks().unwrap();
    assert!(project_bucket(&tasks, TaskBucket::Active).is_empty());
    let deferred = project_bucket(&tasks, TaskBucket::Deferred);
    assert_eq!(deferred.len(), 1);
    assert_eq!(deferred[0].title, "Renew passport soon");
    assert_eq!(deferred[0].description, None);
    assert_eq!(deferred[0].priority, TaskPriority::HIGHEST);
    assert_eq!(deferred[0].completed_at, Some(2_000));
}

#[test]
fn editing_a_task_with_blank_title_is_rejected() {
    let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let service = TaskService::new(DocumentRepository::<Task>::new(store));
    let id = service
        .create_task("keep", None, TaskBucket::Waiting, TaskPriority::default(), 1_000)
        .unwrap();

    let err = service
        .edit_task(id, " ", None, TaskBucket::Active, TaskPriority::default())
        .unwrap_err();

    assert!(err.is_validation());
    let tasks = service.list_tasks().unwrap();
    assert_eq!(tasks[0].title, "keep");
    assert_eq!(tasks[0].bucket, TaskBucket::Waiting);
}
