//! Duplicate-submission gate.
//!
//! Every rendered form carries a `form_id` nonce. While a submission for a
//! nonce is in flight, further submissions with the same nonce are turned
//! away. Entries expire after [`IN_FLIGHT_TTL`] so a submission whose request
//! was dropped mid-way cannot block its form forever.

use std::future::Future;
use std::time::Duration;

use moka::future::Cache;

/// How long a nonce stays claimed if it is never released.
pub const IN_FLIGHT_TTL: Duration = Duration::from_secs(30);

/// Tracks the form nonces currently being submitted.
#[derive(Clone)]
pub struct SubmitGate {
    in_flight: Cache<String, ()>,
}

impl Default for SubmitGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitGate {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(IN_FLIGHT_TTL)
    }

    /// Gate with a custom expiry for unreleased nonces.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        let in_flight = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();
        Self { in_flight }
    }

    /// Claim `form_id`. Returns `false` if it is already claimed.
    pub async fn acquire(&self, form_id: &str) -> bool {
        self.in_flight
            .entry(form_id.to_string())
            .or_insert(())
            .await
            .is_fresh()
    }

    /// Release `form_id` so the form may be submitted again.
    pub async fn release(&self, form_id: &str) {
        self.in_flight.invalidate(form_id).await;
    }

    /// Run `submit` unless another submission of the same form is in flight.
    ///
    /// Forms posted without a nonce are always admitted. Returns `None` for a
    /// rejected duplicate; the nonce is released once `submit` completes,
    /// whatever its result.
    pub async fn run<F, T>(&self, form_id: Option<&str>, submit: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let Some(form_id) = form_id.filter(|id| !id.is_empty()) else {
            return Some(submit.await);
        };

        if !self.acquire(form_id).await {
            tracing::info!(form_id, "Duplicate form submission rejected");
            return None;
        }

        let output = submit.await;
        self.release(form_id).await;
        Some(output)
    }
}
