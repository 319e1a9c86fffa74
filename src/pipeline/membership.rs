//! Standings pagination.

use std::sync::Arc;

use tracing::{debug, info};

use crate::fetch::{FetchError, LeagueSource};
use crate::models::{LeagueId, LeagueMember};

/// Every member of a league, in standings order.
#[derive(Debug, Clone)]
pub struct Membership {
    pub league_name: String,
    pub members: Vec<LeagueMember>,
}

/// Pages through a league's standings until the source reports no next page.
pub struct MembershipFetcher {
    source: Arc<dyn LeagueSource>,
}

impl MembershipFetcher {
    pub fn new(source: Arc<dyn LeagueSource>) -> Self {
        Self { source }
    }

    /// Fetch all pages sequentially. Any page failure aborts the whole fetch.
    pub async fn fetch_all_members(&self, league_id: LeagueId) -> Result<Membership, FetchError> {
        let mut members = Vec::new();
        let mut league_name = None;
        let mut page = 1u32;

        loop {
            let result = self.source.fetch_standings_page(league_id, page).await?;
            debug!(
                "League {}: page {} returned {} members (has_next: {})",
                league_id,
                page,
                result.members.len(),
                result.has_next
            );

            if page == 1 {
                league_name = result.league_name;
            }
            members.extend(result.members);

            if !result.has_next {
                break;
            }
            page += 1;
        }

        let league_name = league_name.unwrap_or_else(|| format!("League {}", league_id));
        info!(
            "League {} ({}): {} members across {} pages",
            league_id,
            league_name,
            members.len(),
            page
        );

        Ok(Membership {
            league_name,
            members,
        })
    }
}
