//! # League Stats
//!
//! Statistics for Fantasy Premier League classic mini-leagues.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (members, gameweeks, chips, records, snapshots)
//! - **fetch**: Upstream API client and the `LeagueSource` abstraction
//! - **cache**: TTL and capacity bounded snapshot cache
//! - **pipeline**: Membership and detail fetching, assembly, load lifecycle
//! - **calculate**: Records, per-manager statistics, head-to-head, trends
//! - **config**: Configuration loading and validation
//! - **api**: REST API endpoints

pub mod api;
pub mod cache;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod pipeline;

pub use models::*;

use std::time::Duration;

/// Parse a cache lifetime such as "90s", "5m" or "1h". A bare number is
/// taken as seconds. Returns `None` for malformed or overflowing input.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
