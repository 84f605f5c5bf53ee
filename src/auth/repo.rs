use std::{collections::HashMap, sync::Arc};

use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use argon2::password_hash;

use super::{
    password::{hash_password, verify_password},
    repo_types::User,
};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed")]
    Hashing(#[from] password_hash::Error),
    #[error("password worker failed")]
    Worker(#[from] tokio::task::JoinError),
}

/// Credential Store: registered identities keyed by exact email.
///
/// Argon2 work runs on the blocking pool with no lock held, so a slow hash
/// never stalls unrelated requests.
#[derive(Clone, Default)]
pub struct CredentialStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<User, CredentialError> {
        if self.users.read().await.contains_key(email) {
            return Err(CredentialError::DuplicateEmail);
        }

        let plain = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&plain)).await??;

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        };

        // Another registration may have won the race while we were hashing.
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(CredentialError::DuplicateEmail);
        }
        users.insert(user.email.clone(), user.clone());
        debug!(user_id = %user.id, "identity stored");
        Ok(user)
    }

    /// Unknown email and wrong password fail with the same error.
    pub async fn verify(&self, email: &str, password: &str) -> Result<User, CredentialError> {
        let user = self
            .users
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or(CredentialError::InvalidCredentials)?;

        let plain = password.to_owned();
        let hash = user.password_hash.clone();
        let ok = tokio::task::spawn_blocking(move || verify_password(&plain, &hash)).await??;

        if ok {
            Ok(user)
        } else {
            Err(CredentialError::InvalidCredentials)
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.id == id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_then_verify() {
        let store = CredentialStore::new();
        let user = store.register("a@x.com", "pw1").await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_ne!(user.password_hash, "pw1");

        let verified = store.verify("a@x.com", "pw1").await.unwrap();
        assert_eq!(verified.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = CredentialStore::new();
        store.register("a@x.com", "pw1").await.unwrap();
        let err = store.register("a@x.com", "other").await.unwrap_err();
        assert!(matches!(err, CredentialError::DuplicateEmail));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_keep_email_unique() {
        let store = CredentialStore::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.register("a@x.com", &format!("pw{i}")).await })
            })
            .collect();

        let mut successes = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(matches!(e, CredentialError::DuplicateEmail)),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(store.users.read().await.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_stored_hash_keeps_error_source() {
        let store = CredentialStore::new();
        let user = User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: "not-a-phc-string".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        store.users.write().await.insert(user.email.clone(), user);

        let err = store.verify("a@x.com", "pw1").await.unwrap_err();
        assert!(matches!(err, CredentialError::Hashing(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn email_match_is_case_sensitive() {
        let store = CredentialStore::new();
        store.register("a@x.com", "pw1").await.unwrap();
        store.register("A@x.com", "pw2").await.unwrap();
        assert!(matches!(
            store.verify("A@X.COM", "pw1").await,
            Err(CredentialError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let store = CredentialStore::new();
        store.register("a@x.com", "pw1").await.unwrap();

        let wrong_pw = store.verify("a@x.com", "nope").await.unwrap_err();
        let unknown = store.verify("b@x.com", "pw1").await.unwrap_err();
        assert!(matches!(wrong_pw, CredentialError::InvalidCredentials));
        assert!(matches!(unknown, CredentialError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn serialized_user_has_no_password_material() {
        let store = CredentialStore::new();
        let user = store.register("a@x.com", "pw1").await.unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains(&user.password_hash));
    }

    #[tokio::test]
    async fn find_by_id_returns_registered_user() {
        let store = CredentialStore::new();
        let user = store.register("a@x.com", "pw1").await.unwrap();
        assert_eq!(store.find_by_id(user.id).await.unwrap().email, "a@x.com");
        assert!(store.find_by_id(Uuid::new_v4()).await.is_none());
    }
}
