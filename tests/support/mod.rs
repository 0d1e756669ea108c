// ABOUTME: Test support utilities.
// ABOUTME: Tracing setup and an in-memory engine that records and scripts image calls.

use async_trait::async_trait;
use hubsync::config::Config;
use hubsync::runtime::{ImageError, ImageOps};
use hubsync::types::ImageReference;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("hubsync=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Settings for a run against the mock engine.
#[allow(dead_code)]
pub fn test_config(images: &[&str]) -> Config {
    let content = serde_json::json!({ "hubsync": images }).to_string();
    Config {
        username: "tester".to_string(),
        password: "secret".to_string(),
        content,
        retry_count: 0,
        retry_delay: Duration::from_millis(1),
        ..Config::default()
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Pull(String),
    Tag(String, String),
    Push(String),
}

/// Engine double: records every call, fails on demand and tracks how many
/// calls overlap.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockEngine {
    calls: Mutex<Vec<Call>>,
    failing_pulls: HashSet<String>,
    failing_pushes: HashSet<String>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    cancel_after_pulls: Option<(usize, CancellationToken)>,
}

#[allow(dead_code)]
impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pull of `image` (full name) fails.
    pub fn fail_pull(mut self, image: &str) -> Self {
        self.failing_pulls.insert(image.to_string());
        self
    }

    /// Every push of `image` (full name) fails.
    pub fn fail_push(mut self, image: &str) -> Self {
        self.failing_pushes.insert(image.to_string());
        self
    }

    /// Pulls and pushes take this long.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Cancel `token` once `pulls` pulls have started.
    pub fn cancel_after_pulls(mut self, pulls: usize, token: CancellationToken) -> Self {
        self.cancel_after_pulls = Some((pulls, token));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn pulls(&self) -> usize {
        self.count(|call| matches!(call, Call::Pull(_)))
    }

    pub fn pushes(&self) -> usize {
        self.count(|call| matches!(call, Call::Push(_)))
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    async fn network_call(&self, call: Call) {
        let pulls_started = {
            let mut calls = self.calls.lock();
            calls.push(call);
            calls.iter().filter(|c| matches!(c, Call::Pull(_))).count()
        };

        if let Some((threshold, token)) = &self.cancel_after_pulls {
            if pulls_started >= *threshold {
                token.cancel();
            }
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ImageOps for MockEngine {
    async fn pull_image(&self, reference: &ImageReference) -> Result<(), ImageError> {
        let name = reference.full_name().to_string();
        self.network_call(Call::Pull(name.clone())).await;
        if self.failing_pulls.contains(&name) {
            return Err(ImageError::PullFailed(format!("{name}: manifest unknown")));
        }
        Ok(())
    }

    async fn tag_image(
        &self,
        source: &ImageReference,
        target: &ImageReference,
    ) -> Result<(), ImageError> {
        self.calls.lock().push(Call::Tag(
            source.full_name().to_string(),
            target.full_name().to_string(),
        ));
        Ok(())
    }

    async fn push_image(&self, reference: &ImageReference) -> Result<(), ImageError> {
        let name = reference.full_name().to_string();
        self.network_call(Call::Push(name.clone())).await;
        if self.failing_pushes.contains(&name) {
            return Err(ImageError::PushFailed(format!("{name}: denied")));
        }
        Ok(())
    }
}
