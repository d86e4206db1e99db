use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::todos::repo_types::Todo;

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Every todo, oldest first.
    async fn list(&self) -> anyhow::Result<Vec<Todo>>;
    async fn insert(&self, title: &str) -> anyhow::Result<Todo>;
    /// Flips `completed`; `None` when the id does not exist.
    async fn toggle(&self, id: i64) -> anyhow::Result<Option<Todo>>;
    /// Whether a row was removed.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgTodoStore {
    db: PgPool,
}

impl PgTodoStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn list(&self) -> anyhow::Result<Vec<Todo>> {
        let rows = sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, completed, created_at, updated_at
              FROM todos
             ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list todos")?;
        Ok(rows)
    }

    async fn insert(&self, title: &str) -> anyhow::Result<Todo> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (title)
            VALUES ($1)
            RETURNING id, title, completed, created_at, updated_at
            "#,
        )
        .bind(title)
        .fetch_one(&self.db)
        .await
        .context("insert todo")?;
        Ok(todo)
    }

    async fn toggle(&self, id: i64) -> anyhow::Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
               SET completed = NOT completed,
                   updated_at = NOW()
             WHERE id = $1
            RETURNING id, title, completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("toggle todo")?;
        Ok(todo)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete todo")?;
        Ok(res.rows_affected() > 0)
    }
}
