//! Shared Application State

use auth::{AuthError, TokenService};
use data_validator::Validator;
use mailer::Mailer;
use maintenance::StatusChecker;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;
use storage::Repository;
use tracing::info;

use crate::config::Settings;

pub type SharedState = Arc<AppState>;

/// Application state shared across handlers
pub struct AppState {
    pub settings: Settings,
    pub repo: Arc<dyn Repository>,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: TokenService,
    pub checker: StatusChecker,
    pub validator: Validator,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: Instant,
}

impl AppState {
    /// Wire the state from settings; fails when no token secret is set
    pub fn new(
        settings: Settings,
        repo: Arc<dyn Repository>,
        mailer: Arc<dyn Mailer>,
        metrics: Option<PrometheusHandle>,
    ) -> Result<Self, AuthError> {
        let tokens = TokenService::new(&settings.auth.jwt_key, settings.auth.token_ttl_minutes)?;
        let checker = StatusChecker::new(
            Arc::clone(&repo),
            Arc::clone(&mailer),
            settings.maintenance.clone(),
        );
        info!(
            "Application state ready (token ttl {} min, horizon {} days)",
            settings.auth.token_ttl_minutes, settings.maintenance.horizon_days
        );

        Ok(Self {
            settings,
            repo,
            mailer,
            tokens,
            checker,
            validator: Validator::default(),
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        })
    }

    /// Link sent in verification emails
    pub fn verification_link(&self, account_id: i64) -> String {
        format!(
            "{}/verify/{}",
            self.settings.server.frontend_url.trim_end_matches('/'),
            account_id
        )
    }
}
