//! Shared test helpers for integration tests.

use std::net::IpAddr;
use std::sync::Arc;

use uuid::Uuid;

use medigate_auth::alert::AlertManager;
use medigate_auth::jwt::{TokenIssuer, TokenVerifier};
use medigate_auth::session::{
    DeviceRegistry, LoginContext, SessionManager, SessionStore, SessionTracker,
};
use medigate_cache::CacheManager;
use medigate_core::config::alert::AlertConfig;
use medigate_core::config::auth::AuthConfig;
use medigate_core::config::cache::CacheConfig;
use medigate_core::config::session::SessionConfig;
use medigate_core::types::{AuthIdentity, UserRole};

/// Fully wired security subsystem over the in-memory cache provider.
pub struct TestHarness {
    pub manager: SessionManager,
    pub store: Arc<SessionStore>,
    pub alerts: Arc<AlertManager>,
    pub verifier: Arc<TokenVerifier>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_session_config(SessionConfig::default())
    }

    pub fn with_session_config(session_config: SessionConfig) -> Self {
        let auth_config = AuthConfig::default();
        let cache = Arc::new(
            CacheManager::new(&CacheConfig::default()).expect("memory cache always constructs"),
        );

        let issuer = Arc::new(TokenIssuer::new(&auth_config));
        let verifier = Arc::new(TokenVerifier::new(&auth_config, cache));
        let store = Arc::new(SessionStore::new(session_config.clone()));
        let devices = Arc::new(DeviceRegistry::new(
            session_config.fingerprint_staleness_days,
        ));
        let alerts = Arc::new(AlertManager::new(&AlertConfig::default()));
        let tracker = Arc::new(SessionTracker::new(
            Arc::clone(&store),
            devices,
            Arc::clone(&alerts),
            session_config,
        ));

        let manager = SessionManager::new(
            issuer,
            Arc::clone(&verifier),
            Arc::clone(&store),
            tracker,
            &auth_config,
        );

        Self {
            manager,
            store,
            alerts,
            verifier,
        }
    }
}

pub fn practitioner() -> AuthIdentity {
    AuthIdentity {
        user_id: Uuid::new_v4(),
        email: "doctor@example-practice.test".to_string(),
        role: UserRole::Practitioner,
        tenant_id: Uuid::new_v4(),
    }
}

pub fn browser_login(ip: &str) -> LoginContext {
    let ip: IpAddr = ip.parse().expect("valid test ip");
    LoginContext::new(
        ip,
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Gecko/20100101 Firefox/128.0",
    )
}
