use tracing::{debug, info};

use crate::{error::AppError, state::AppState, todos::repo_types::Todo};

pub async fn list(st: &AppState) -> Result<Vec<Todo>, AppError> {
    Ok(st.todos.list().await?)
}

/// `Ok(None)` when the title is blank; nothing is written in that case.
pub async fn create(st: &AppState, title: &str) -> Result<Option<Todo>, AppError> {
    let title = title.trim();
    if title.is_empty() {
        debug!("blank todo title ignored");
        return Ok(None);
    }
    let todo = st.todos.insert(title).await?;
    info!(todo_id = todo.id, "todo created");
    Ok(Some(todo))
}

pub async fn toggle(st: &AppState, id: i64) -> Result<Todo, AppError> {
    let todo = st.todos.toggle(id).await?.ok_or(AppError::NotFound)?;
    info!(todo_id = id, completed = todo.completed, "todo toggled");
    Ok(todo)
}

/// Deleting an id that does not exist succeeds.
pub async fn delete(st: &AppState, id: i64) -> Result<(), AppError> {
    if st.todos.delete(id).await? {
        info!(todo_id = id, "todo deleted");
    } else {
        debug!(todo_id = id, "delete of missing todo ignored");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_list_contains_active_item() {
        let st = AppState::fake();
        let todo = create(&st, "Buy milk").await.unwrap().expect("created");
        assert!(!todo.completed);

        let all = list(&st).await.unwrap();
        let matching: Vec<_> = all.iter().filter(|t| t.title == "Buy milk").collect();
        assert_eq!(matching.len(), 1);
        assert!(!matching[0].completed);
    }

    #[tokio::test]
    async fn blank_title_is_a_noop() {
        let st = AppState::fake();
        assert!(create(&st, "").await.unwrap().is_none());
        assert!(create(&st, "   ").await.unwrap().is_none());
        assert!(list(&st).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let st = AppState::fake();
        for title in ["one", "two", "three"] {
            create(&st, title).await.unwrap();
        }
        let titles: Vec<_> = list(&st).await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn toggle_twice_restores_state() {
        let st = AppState::fake();
        let todo = create(&st, "flip me").await.unwrap().unwrap();
        assert!(toggle(&st, todo.id).await.unwrap().completed);
        assert!(!toggle(&st, todo.id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn toggle_unknown_id_is_not_found() {
        let st = AppState::fake();
        assert!(matches!(toggle(&st, 4242).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn delete_removes_and_is_idempotent() {
        let st = AppState::fake();
        let todo = create(&st, "short lived").await.unwrap().unwrap();
        delete(&st, todo.id).await.unwrap();
        assert!(list(&st).await.unwrap().iter().all(|t| t.id != todo.id));
        delete(&st, todo.id).await.unwrap();
    }
}
