use serde::Deserialize;

/// Body of `POST /todos`.
#[derive(Debug, Deserialize)]
pub struct CreateTodoForm {
    #[serde(default)]
    pub title: String,
}
