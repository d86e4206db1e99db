use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{normalize_email, LoginForm, RegisterForm},
        password::{self, hash_password, verify_against_dummy, verify_password},
        repo_types::{CreateUserOutcome, User},
    },
    error::AppError,
    state::AppState,
};

/// Validates, hashes and stores a new user. The caller starts the session.
pub async fn register(st: &AppState, form: &RegisterForm) -> Result<User, AppError> {
    let email = normalize_email(&form.email);
    let form = RegisterForm {
        email: email.clone(),
        password: form.password.clone(),
        confirm_password: form.confirm_password.clone(),
    };
    form.validate().map_err(AppError::Validation)?;

    if st.users.find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict);
    }

    let plain = form.password;
    let hash = password::blocking(move || hash_password(&plain)).await?;

    match st.users.create(&email, &hash).await? {
        CreateUserOutcome::Created(user) => {
            info!(user_id = %user.id, email = %user.email, "user registered");
            Ok(user)
        }
        CreateUserOutcome::EmailTaken => {
            warn!(%email, "email registered concurrently");
            Err(AppError::Conflict)
        }
    }
}

/// Unknown email and wrong password both yield `AppError::Authentication`.
pub async fn authenticate(st: &AppState, form: &LoginForm) -> Result<User, AppError> {
    let email = normalize_email(&form.email);
    let form = LoginForm {
        email: email.clone(),
        password: form.password.clone(),
    };
    form.validate().map_err(AppError::Validation)?;

    let plain = form.password;
    let Some(user) = st.users.find_by_email(&email).await? else {
        password::blocking(move || {
            verify_against_dummy(&plain);
            Ok(())
        })
        .await?;
        warn!(%email, "login failed");
        return Err(AppError::Authentication);
    };

    let hash = user.password_hash.clone();
    let ok = password::blocking(move || verify_password(&plain, &hash)).await?;
    if !ok {
        warn!(%email, "login failed");
        return Err(AppError::Authentication);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}

pub async fn find_user(st: &AppState, id: Uuid) -> Result<Option<User>, AppError> {
    Ok(st.users.find_by_id(id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form(email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            email: email.into(),
            password: password.into(),
            confirm_password: password.into(),
        }
    }

    fn login_form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() {
        let st = AppState::fake();
        let user = register(&st, &register_form("new@example.com", "password123"))
            .await
            .unwrap();
        assert_eq!(user.email, "new@example.com");
        assert_ne!(user.password_hash, "password123");
        assert!(verify_password("password123", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn second_registration_conflicts_and_keeps_one_row() {
        let st = AppState::fake();
        let first = register(&st, &register_form("dup@example.com", "password123"))
            .await
            .unwrap();
        let second = register(&st, &register_form("dup@example.com", "otherpass99")).await;
        assert!(matches!(second, Err(AppError::Conflict)));

        let stored = st.users.find_by_email("dup@example.com").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert!(verify_password("password123", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn register_rejects_invalid_input_before_touching_store() {
        let st = AppState::fake();
        let err = register(&st, &register_form("nope", "short")).await.unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(!errors.get("email").is_empty());
        assert!(!errors.get("password").is_empty());
        assert!(st.users.find_by_email("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn authenticate_accepts_correct_credentials() {
        let st = AppState::fake();
        let user = register(&st, &register_form("me@example.com", "password123"))
            .await
            .unwrap();
        let found = authenticate(&st, &login_form(" me@example.com ", "password123"))
            .await
            .unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_fail_identically() {
        let st = AppState::fake();
        register(&st, &register_form("me@example.com", "password123"))
            .await
            .unwrap();

        let unknown = authenticate(&st, &login_form("ghost@example.com", "password123"))
            .await
            .unwrap_err();
        let wrong = authenticate(&st, &login_form("me@example.com", "password999"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, AppError::Authentication));
        assert!(matches!(wrong, AppError::Authentication));
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.status(), wrong.status());
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let st = AppState::fake();
        register(&st, &register_form("Case@example.com", "password123"))
            .await
            .unwrap();
        let res = authenticate(&st, &login_form("case@example.com", "password123")).await;
        assert!(matches!(res, Err(AppError::Authentication)));
    }
}
