//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `todoshark_core` linkage without the Flutter/FFI runtime.
//! - Walk one hunt session over an in-memory store with deterministic output.

use std::process::ExitCode;
use std::sync::Arc;
use todoshark_core::{
    classify_release, hunt_queue, now_epoch_ms, DocumentRepository, GestureAction,
    GestureConfig, GestureContext, HuntCursor, ServiceError, SqliteDocumentStore, Task,
    TaskBucket, TaskPriority, TaskService,
};

fn main() -> ExitCode {
    println!("todoshark_core ping={}", todoshark_core::ping());
    println!("todoshark_core version={}", todoshark_core::core_version());

    match demo_hunt() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("demo hunt failed: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Seeds three active tasks, then resolves one swipe per card.
fn demo_hunt() -> Result<(), ServiceError> {
    let store = Arc::new(SqliteDocumentStore::open_in_memory()?);
    let service = TaskService::new(DocumentRepository::<Task>::new(store));
    let now = now_epoch_ms();

    for (title, priority) in [("Ship release", 1), ("Reply to review", 2), ("Tidy desk", 4)] {
        let priority = TaskPriority::new(priority)?;
        service.create_task(title, None, TaskBucket::Active, priority, now)?;
    }

    let gesture = GestureConfig::default();
    let mut cursor = HuntCursor::new();
    for (dx, dy) in [(150.0, 0.0), (0.0, 150.0), (-150.0, 0.0)] {
        let tasks = service.list_tasks()?;
        let queue = hunt_queue(&tasks, now);
        let Some(label) = cursor.position_label(&queue) else {
            break;
        };
        let Some(GestureAction::Hunt(action)) =
            classify_release(GestureContext::HuntCard, &gesture, dx, dy).action()
        else {
            continue;
        };
        let step = service.apply_hunt_action(&mut cursor, &queue, action, now)?;
        println!("hunt {label} action={} task={}", action.as_str(), step.task_id);
    }

    let remaining = hunt_queue(&service.list_tasks()?, now).len();
    println!("hunt remaining={remaining}");
    Ok(())
}
