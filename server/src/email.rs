//! Email dispatch and rate limiting.
//!
//! Mail is queued onto a background task and sent with bounded retries;
//! everything that can be rejected synchronously (rate limit, bad address,
//! build failure) surfaces at enqueue time so callers can refuse to persist
//! whatever triggered the mail. A background task periodically purges
//! expired entries from the rate-limit map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lettre::address::AddressError;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;

use crate::auth::CurrentUser;
use crate::{json_error, AppState};

// -- Configuration ---------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StartTls {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Clone, Debug, clap::Args)]
pub struct SmtpConfig {
    #[arg(long = "smtp-host", env = "PODIUM_SMTP_HOST", default_value = "localhost")]
    pub host: String,
    #[arg(long = "smtp-port", env = "PODIUM_SMTP_PORT", default_value_t = 25)]
    pub port: u16,
    #[arg(long = "smtp-from", env = "PODIUM_SMTP_FROM", default_value = "podium@localhost")]
    pub from: String,
    #[arg(long = "smtp-starttls", env = "PODIUM_SMTP_STARTTLS", default_value = "auto")]
    pub starttls: StartTls,
    /// Use implicit TLS (SMTPS) instead of STARTTLS.
    #[arg(long = "smtp-smtps", env = "PODIUM_SMTP_SMTPS")]
    pub smtps: bool,
    /// Connection timeout in milliseconds.
    #[arg(long = "smtp-timeout", env = "PODIUM_SMTP_TIMEOUT", default_value_t = 10_000)]
    pub timeout: u64,
    #[arg(long = "smtp-user", env = "PODIUM_SMTP_USER")]
    pub user: Option<String>,
    #[arg(long = "smtp-pass", env = "PODIUM_SMTP_PASS")]
    pub pass: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 25,
            from: "podium@localhost".into(),
            starttls: StartTls::Auto,
            smtps: false,
            timeout: 10_000,
            user: None,
            pass: None,
        }
    }
}

// -- Rate limiting ---------------------------------------------------------

static RATE_LIMITS: Lazy<Mutex<HashMap<String, Instant>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static CLEANUP: Lazy<JoinHandle<()>> = Lazy::new(|| {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(CLEANUP_INTERVAL).await;
            let now = Instant::now();
            let mut map = match RATE_LIMITS.lock() {
                Ok(m) => m,
                Err(poison) => poison.into_inner(),
            };
            map.retain(|_, &mut instant| now.duration_since(instant) < RATE_LIMIT);
        }
    })
});
const RATE_LIMIT: Duration = Duration::from_secs(60);
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Access the cleanup task's [`JoinHandle`].
///
/// The task is started on first use and can be aborted during shutdown
/// if necessary.
pub fn cleanup_handle() -> &'static JoinHandle<()> {
    Lazy::force(&CLEANUP)
}

// retry behaviour
const MAX_RETRIES: u32 = 5;
#[cfg(test)]
const RETRY_BASE: Duration = Duration::from_millis(1);
#[cfg(not(test))]
const RETRY_BASE: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("recipient was mailed too recently")]
    RateLimited,
    #[error("smtp: {0}")]
    Smtp(String),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Build(#[from] lettre::error::Error),
    #[error("rate limit lock poisoned")]
    LockPoisoned,
}

pub struct EmailService {
    from: String,
    sender: UnboundedSender<Message>,
}

impl EmailService {
    pub fn new(config: SmtpConfig) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .timeout(Some(Duration::from_millis(config.timeout)));

        let tls_params = TlsParameters::builder(config.host.clone())
            .build()
            .map_err(|e| {
                log::error!("failed to build TLS parameters: {e:?}");
                EmailError::Smtp(e.to_string())
            })?;

        builder = if config.smtps {
            builder.tls(Tls::Wrapper(tls_params))
        } else {
            match config.starttls {
                StartTls::Always => builder.tls(Tls::Required(tls_params)),
                StartTls::Auto => builder.tls(Tls::Opportunistic(tls_params)),
                StartTls::Never => builder.tls(Tls::None),
            }
        };

        if let (Some(user), Some(pass)) = (config.user.as_ref(), config.pass.as_ref()) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let transport = builder.build();
        Ok(Self::new_with_transport(config.from, transport))
    }

    fn new_with_transport(from: String, transport: AsyncSmtpTransport<Tokio1Executor>) -> Self {
        // Start periodic cleanup once
        cleanup_handle();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let mailer = transport.clone();
                send_with_retry(|| {
                    let mailer = mailer.clone();
                    let msg = msg.clone();
                    async move {
                        mailer
                            .send(msg)
                            .await
                            .map(|_| ())
                            .map_err(|e| e.to_string())
                    }
                })
                .await;
            }
        });
        Self { from, sender: tx }
    }

    fn allowed(to: &str) -> Result<bool, EmailError> {
        let mut map = RATE_LIMITS.lock().map_err(|_| EmailError::LockPoisoned)?;
        let now = Instant::now();
        let allowed = match map.get(to) {
            Some(last) if now.duration_since(*last) < RATE_LIMIT => false,
            _ => {
                map.insert(to.to_string(), now);
                true
            }
        };
        Ok(allowed)
    }

    fn queue_mail(&self, email: Message) {
        if self.sender.send(email).is_err() {
            log::warn!("email queue disconnected");
        }
    }

    fn send_mail(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        if !Self::allowed(to)? {
            return Err(EmailError::RateLimited);
        }

        let email = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .body(body.to_string())?;

        self.queue_mail(email);
        Ok(())
    }

    pub fn send_confirmation_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        self.send_mail(
            to,
            "Confirm your account",
            &format!(
                "Welcome to podium!\n\n\
                 Confirm your account by posting this code to /api/users/confirm:\n\n\
                 {code}\n\n\
                 The code expires in 24 hours."
            ),
        )
    }

    pub fn send_recovery_code(&self, to: &str, code: &str) -> Result<(), EmailError> {
        self.send_mail(
            to,
            "Recover your account",
            &format!(
                "An account recovery was requested for this address.\n\n\
                 Post this code together with a new password to\n\
                 /api/users/recover/confirm:\n\n\
                 {code}\n\n\
                 The code expires in one hour. If you did not request this,\n\
                 ignore this message."
            ),
        )
    }

    pub fn send_test(&self, to: &str) -> Result<(), EmailError> {
        self.send_mail(to, "Test email", "Podium test message")
    }

    pub fn from_address(&self) -> &str {
        &self.from
    }
}

async fn send_with_retry<F, Fut, E>(mut send: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let mut delay = RETRY_BASE;
    for _ in 0..MAX_RETRIES {
        match send().await {
            Ok(_) => return,
            Err(e) => {
                log::warn!(
                    "failed to send email: {e}; retrying in {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }
    log::warn!("giving up after {MAX_RETRIES} attempts");
}

// -- Admin diagnostics -----------------------------------------------------

#[derive(Debug, Serialize)]
pub struct RedactedSmtpConfig {
    pub host: String,
    pub port: u16,
    pub from: String,
    pub smtps: bool,
    pub user: Option<String>,
    pub pass: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MailTestParams {
    pub to: String,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct MailTestResponse {
    pub queued: bool,
}

/// SMTP settings with the password redacted.
pub async fn mail_config_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Response {
    if !user.role.is_admin() {
        return json_error(StatusCode::FORBIDDEN, "administrator role required");
    }
    let cfg = &state.smtp;
    Json(RedactedSmtpConfig {
        host: cfg.host.clone(),
        port: cfg.port,
        from: cfg.from.clone(),
        smtps: cfg.smtps,
        user: cfg.user.clone(),
        pass: cfg.pass.as_ref().map(|_| "***".to_string()),
    })
    .into_response()
}

/// Queue a test mail to the given address, or to the configured sender when
/// none is given. Replies with whether the mail was accepted for delivery.
pub async fn mail_test_handler(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    query: Option<Query<MailTestParams>>,
    body: Option<Json<MailTestParams>>,
) -> Response {
    if !user.role.is_admin() {
        return json_error(StatusCode::FORBIDDEN, "administrator role required");
    }
    let to = query
        .map(|Query(p)| p.to)
        .or_else(|| body.map(|Json(p)| p.to))
        .unwrap_or_else(|| state.email.from_address().to_string());
    let queued = match state.email.send_test(&to) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("test mail to {to} not queued: {e}");
            false
        }
    };
    Json(MailTestResponse { queued }).into_response()
}

// -- Tests -----------------------------------------------------------------

#[cfg(test)]
pub(crate) fn clear_rate_limits() {
    let mut map = match RATE_LIMITS.lock() {
        Ok(guard) => guard,
        Err(poison) => {
            RATE_LIMITS.clear_poison();
            poison.into_inner()
        }
    };
    map.clear();
}
