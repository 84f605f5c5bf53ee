use crate::auth::{jwt::JwtKeys, repo::CredentialStore};
use crate::config::AppConfig;
use crate::expenses::repo::ExpenseLedger;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: CredentialStore,
    pub expenses: ExpenseLedger,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Arc<AppConfig>) -> Self {
        Self {
            jwt: JwtKeys::from(&config.jwt),
            config,
            users: CredentialStore::new(),
            expenses: ExpenseLedger::new(),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 60,
            },
            server: crate::config::ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
        });
        Self::from_config(config)
    }
}
