//! Throttle exercise command.

use callvault::{
    CallVaultConfig, CallVaultResult, Clock, SharedThrottle, ThrottleConfig, ThrottleError,
    ThrottleErrorKind, TokioClock,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// One admitted request.
#[derive(Debug, Clone, Serialize)]
pub struct Admission {
    /// One-based request number
    pub request: u32,
    /// Milliseconds since the first request was issued
    pub admitted_at_ms: u64,
}

/// Admit `requests` requests on `scope` and report when each got through.
pub async fn run_throttle(
    config: &CallVaultConfig,
    scope: &str,
    requests: u32,
    profile: Option<&str>,
) -> CallVaultResult<Vec<Admission>> {
    let limits = match profile {
        Some(name) => config
            .throttle_profile(name)
            .ok_or_else(|| ThrottleError::new(ThrottleErrorKind::UnknownProfile(name.to_string())))?,
        None => ThrottleConfig::default(),
    };

    let clock = Arc::new(TokioClock::new());
    let throttle = SharedThrottle::with_clock(limits, clock.clone());
    let start = clock.now_ms();

    let mut admissions = Vec::with_capacity(requests as usize);
    for request in 1..=requests {
        throttle.throttle_within(scope).await?;
        let admitted_at_ms = clock.now_ms() - start;
        info!(request, admitted_at_ms, scope, "Request admitted");
        admissions.push(Admission {
            request,
            admitted_at_ms,
        });
    }
    Ok(admissions)
}
