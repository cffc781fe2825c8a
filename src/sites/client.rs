//! Page fetching behind a trait, with a wreq-based default implementation.
//!
//! Each adapter owns one fetcher, and each fetcher owns at most one session.
//! The session is created on first use, reused for every later request, and
//! dropped by `release()`.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Desktop user agents; one is picked at random per session.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36 Edg/129.0.0.0",
];

/// Transport-level failures. None of these are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("browser session unavailable: {0}")]
    SessionInit(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("rate limited (503)")]
    RateLimited,

    #[error("request failed with status: {0}")]
    Status(u16),
}

/// Fetches raw page markup. Enables mocking for tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`; `Ok(None)` means the page came back empty.
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError>;

    /// Releases the held session, if any.
    async fn release(&self);
}

/// Transport settings shared by every fetcher in a run.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub proxy: Option<String>,
    pub delay_ms: u64,
    pub delay_jitter_ms: u64,
    pub timeout_secs: u64,
}

impl From<&Config> for FetchSettings {
    fn from(config: &Config) -> Self {
        Self {
            proxy: config.proxy.clone(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
            timeout_secs: config.timeout_secs,
        }
    }
}

enum SessionState {
    Idle,
    Open { client: Client, user_agent: &'static str },
    Failed(String),
}

/// HTTP fetcher with browser impersonation and request pacing.
pub struct HttpFetcher {
    label: String,
    settings: FetchSettings,
    state: Mutex<SessionState>,
    last_navigation: Mutex<Option<Instant>>,
}

impl HttpFetcher {
    /// Creates a fetcher; no session is opened until the first fetch.
    pub fn new(label: impl Into<String>, settings: FetchSettings) -> Self {
        Self {
            label: label.into(),
            settings,
            state: Mutex::new(SessionState::Idle),
            last_navigation: Mutex::new(None),
        }
    }

    /// Returns true while a session is held.
    pub async fn has_session(&self) -> bool {
        matches!(*self.state.lock().await, SessionState::Open { .. })
    }

    /// Returns the open session, creating it on first use.
    ///
    /// A session that failed to open stays failed for the rest of the run.
    async fn session(&self) -> Result<(Client, &'static str), FetchError> {
        let mut state = self.state.lock().await;

        match &*state {
            SessionState::Open { client, user_agent } => return Ok((client.clone(), *user_agent)),
            SessionState::Failed(reason) => return Err(FetchError::SessionInit(reason.clone())),
            SessionState::Idle => {}
        }

        match self.open_session() {
            Ok(client) => {
                let user_agent = pick_user_agent();
                debug!("[{}] Opened session", self.label);
                *state = SessionState::Open { client: client.clone(), user_agent };
                Ok((client, user_agent))
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                warn!("[{}] Could not open session, skipping site for this run: {}", self.label, reason);
                *state = SessionState::Failed(reason.clone());
                Err(FetchError::SessionInit(reason))
            }
        }
    }

    fn open_session(&self) -> Result<Client> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(self.settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &self.settings.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        builder.build().context("Failed to build HTTP client")
    }

    /// Waits out the pacing gap before a navigation.
    ///
    /// Navigations on one fetcher are spaced by `delay_ms` plus jitter even
    /// when several fetches are in flight; the lock is held while waiting so
    /// callers queue behind each other.
    async fn delay(&self) {
        if self.settings.delay_ms == 0 && self.settings.delay_jitter_ms == 0 {
            return;
        }

        let jitter = if self.settings.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.settings.delay_jitter_ms)
        } else {
            0
        };

        let gap = Duration::from_millis(self.settings.delay_ms + jitter);
        let mut last_navigation = self.last_navigation.lock().await;

        match *last_navigation {
            Some(previous) => {
                let ready = previous + gap;
                let now = Instant::now();
                if ready > now {
                    debug!("[{}] Delaying {}ms", self.label, (ready - now).as_millis());
                    tokio::time::sleep_until(ready).await;
                }
            }
            None => {
                debug!("[{}] Delaying {}ms", self.label, gap.as_millis());
                tokio::time::sleep(gap).await;
            }
        }

        *last_navigation = Some(Instant::now());
    }
}

fn pick_user_agent() -> &'static str {
    USER_AGENTS[rand::rng().random_range(0..USER_AGENTS.len())]
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        let (client, user_agent) = self.session().await?;

        self.delay().await;

        debug!("[{}] GET {}", self.label, url);

        let response = client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("User-Agent", user_agent)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", "en-CA,en;q=0.9")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        debug!("[{}] Response status: {}", self.label, status);

        if status == 503 {
            warn!("[{}] Rate limited (503). Consider increasing the delay or using a proxy.", self.label);
            return Err(FetchError::RateLimited);
        }

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| FetchError::Transport(e.to_string()))?;

        if body.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(body))
    }

    async fn release(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, SessionState::Open { .. }) {
            debug!("[{}] Closing session", self.label);
            *state = SessionState::Idle;
        }
    }
}
