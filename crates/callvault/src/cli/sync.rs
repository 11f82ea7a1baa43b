//! Meeting sync command.

use callvault::{
    CallVaultConfig, CallVaultResult, ConfigError, DateRange, HttpMeetingsClient, MeetingSync,
    SharedThrottle, SyncReport, ThrottleError, ThrottleErrorKind,
};
use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashSet;
use tracing::{debug, instrument};

const TOKEN_VAR: &str = "CALLVAULT_API_TOKEN";

/// List a user's recordings through the HTTP client.
///
/// The bearer token is read from `CALLVAULT_API_TOKEN`, which may also come
/// from a `.env` file.
#[instrument(skip(config))]
pub async fn run_sync(
    config: &CallVaultConfig,
    base_url: &str,
    user: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    profile: &str,
) -> CallVaultResult<SyncReport> {
    let token = std::env::var(TOKEN_VAR)
        .map_err(|_| ConfigError::new(format!("{} is not set", TOKEN_VAR)))?;
    let limits = config
        .throttle_profile(profile)
        .ok_or_else(|| ThrottleError::new(ThrottleErrorKind::UnknownProfile(profile.to_string())))?;

    let today = Utc::now().date_naive();
    let to = to.unwrap_or(today);
    let from = from.unwrap_or(to - Duration::days(30));
    if from > to {
        return Err(ConfigError::new(format!("--from {} is after --to {}", from, to)).into());
    }
    debug!(%from, %to, "Syncing date range");

    let sync = MeetingSync::new(
        HttpMeetingsClient::new(base_url, token),
        SharedThrottle::new(limits),
    );
    let report = sync
        .sync(user, DateRange::new(from, to), &HashSet::new())
        .await?;
    Ok(report)
}
