//! Process-local stores used when no database is configured, and by tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserStore,
        repo_types::{CreateUserOutcome, User},
    },
    sessions::repo::SessionStore,
    todos::{repo::TodoStore, repo_types::Todo},
};

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    todos: BTreeMap<i64, Todo>,
    last_todo_id: i64,
    sessions: HashMap<Vec<u8>, (Uuid, OffsetDateTime)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, email: &str, password_hash: &str) -> anyhow::Result<CreateUserOutcome> {
        // Check and insert under one write lock, the equivalent of a UNIQUE index.
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == email) {
            return Ok(CreateUserOutcome::EmailTaken);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        Ok(CreateUserOutcome::Created(user))
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> anyhow::Result<Vec<Todo>> {
        let inner = self.inner.read().await;
        Ok(inner.todos.values().cloned().collect())
    }

    async fn insert(&self, title: &str) -> anyhow::Result<Todo> {
        let mut inner = self.inner.write().await;
        inner.last_todo_id += 1;
        let now = OffsetDateTime::now_utc();
        let todo = Todo {
            id: inner.last_todo_id,
            title: title.to_string(),
            completed: false,
            created_at: now,
            updated_at: now,
        };
        inner.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn toggle(&self, id: i64) -> anyhow::Result<Option<Todo>> {
        let mut inner = self.inner.write().await;
        Ok(inner.todos.get_mut(&id).map(|todo| {
            todo.completed = !todo.completed;
            todo.updated_at = OffsetDateTime::now_utc();
            todo.clone()
        }))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner.todos.remove(&id).is_some())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert(
        &self,
        token_hash: &[u8],
        user_id: Uuid,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .sessions
            .insert(token_hash.to_vec(), (user_id, expires_at));
        Ok(())
    }

    async fn find_user(
        &self,
        token_hash: &[u8],
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner
            .sessions
            .get(token_hash)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(user_id, _)| *user_id))
    }

    async fn delete(&self, token_hash: &[u8]) -> anyhow::Result<()> {
        self.inner.write().await.sessions.remove(token_hash);
        Ok(())
    }

    async fn delete_expired(&self, now: OffsetDateTime) -> anyhow::Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.sessions.len();
        inner.sessions.retain(|_, (_, expires_at)| *expires_at > now);
        Ok((before - inner.sessions.len()) as u64)
    }
}
