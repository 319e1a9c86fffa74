use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate;
use crate::models::{
    EntryId, HeadToHeadRecord, LeagueId, LeagueMember, LeagueStatisticsSnapshot,
    ManagerStatistics, PointsTrend,
};
use crate::pipeline::{run_tracked, LoadState, NoProgress};

fn league_id(raw: u64) -> Result<LeagueId, ApiError> {
    let id = LeagueId::new(raw);
    if !id.is_valid() {
        return Err(ApiError::BadRequest("League id must be non-zero".to_string()));
    }
    Ok(id)
}

async fn cached_snapshot(
    state: &AppState,
    league_id: LeagueId,
) -> Result<Arc<LeagueStatisticsSnapshot>, ApiError> {
    state
        .assembler
        .cached(league_id)
        .await
        .ok_or_else(|| {
            ApiError::NotFound(format!("No statistics loaded for league {}", league_id))
        })
}

// ── Stats ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    #[serde(default)]
    pub refresh: bool,
}

pub async fn stats(
    State(state): State<AppState>,
    Path(raw): Path<u64>,
    Query(params): Query<StatsParams>,
) -> Result<Json<Arc<LeagueStatisticsSnapshot>>, ApiError> {
    let league_id = league_id(raw)?;

    // A background refresh already owns the lifecycle state; run untracked.
    let snapshot = if state.tracker.begin(league_id) {
        // Detached from the request; a client disconnect must not strand `Loading`.
        let assembler = state.assembler.clone();
        let tracker = state.tracker.clone();
        let force_refresh = params.refresh;
        let task = tokio::spawn(async move {
            run_tracked(&assembler, &tracker, league_id, force_refresh).await
        });
        match task.await {
            Ok(result) => result?,
            Err(e) => {
                state.tracker.fail(league_id, "load task did not complete");
                return Err(ApiError::Internal(format!(
                    "Load for league {} did not complete: {}",
                    league_id, e
                )));
            }
        }
    } else {
        state
            .assembler
            .fetch_league_statistics(league_id, params.refresh, &NoProgress)
            .await?
    };

    Ok(Json(snapshot))
}

// ── Refresh ──────────────────────────────────────────────────────

pub async fn refresh(
    State(state): State<AppState>,
    Path(raw): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let league_id = league_id(raw)?;

    if !state.tracker.begin(league_id) {
        return Err(ApiError::Conflict(format!(
            "League {} is already loading",
            league_id
        )));
    }

    info!("Starting background refresh for league {}", league_id);
    let assembler = state.assembler.clone();
    let tracker = state.tracker.clone();
    tokio::spawn(async move {
        if let Err(e) = run_tracked(&assembler, &tracker, league_id, true).await {
            warn!("Background refresh for league {} failed: {}", league_id, e);
        }
    });

    Ok((StatusCode::ACCEPTED, Json(state.tracker.state(league_id))))
}

// ── Status ───────────────────────────────────────────────────────

pub async fn status(
    State(state): State<AppState>,
    Path(raw): Path<u64>,
) -> Result<Json<LoadState>, ApiError> {
    let league_id = league_id(raw)?;
    Ok(Json(state.tracker.state(league_id)))
}

// ── Head-to-head ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HeadToHeadParams {
    pub a: u64,
    pub b: u64,
}

pub async fn head_to_head(
    State(state): State<AppState>,
    Path(raw): Path<u64>,
    Query(params): Query<HeadToHeadParams>,
) -> Result<Json<HeadToHeadRecord>, ApiError> {
    let league_id = league_id(raw)?;
    if params.a == params.b {
        return Err(ApiError::BadRequest(
            "Cannot compare a manager with themselves".to_string(),
        ));
    }

    let snapshot = cached_snapshot(&state, league_id).await?;
    let find = |raw: u64| {
        snapshot
            .member(EntryId::new(raw))
            .ok_or_else(|| {
                ApiError::NotFound(format!("Entry {} not in league {}", raw, league_id))
            })
    };

    Ok(Json(calculate::head_to_head(find(params.a)?, find(params.b)?)))
}

// ── Manager ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ManagerDetail {
    pub member: LeagueMember,
    pub statistics: ManagerStatistics,
    pub trend: PointsTrend,
}

pub async fn manager(
    State(state): State<AppState>,
    Path((raw_league, raw_entry)): Path<(u64, u64)>,
) -> Result<Json<ManagerDetail>, ApiError> {
    let league_id = league_id(raw_league)?;
    let entry_id = EntryId::new(raw_entry);

    let snapshot = cached_snapshot(&state, league_id).await?;
    let member = snapshot.member(entry_id).ok_or_else(|| {
        ApiError::NotFound(format!("Entry {} not in league {}", entry_id, league_id))
    })?;

    let statistics = snapshot
        .manager_statistics_for(entry_id)
        .cloned()
        .unwrap_or_else(|| calculate::manager_statistics(member));

    Ok(Json(ManagerDetail {
        member: member.clone(),
        statistics,
        trend: calculate::points_trend(member),
    }))
}

// ── Cache ────────────────────────────────────────────────────────

pub async fn clear_cache(
    State(state): State<AppState>,
    Path(raw): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let league_id = league_id(raw)?;
    let removed = state.assembler.invalidate(league_id).await;
    state.tracker.reset(league_id);
    info!("Cleared cache for league {} (entry present: {})", league_id, removed);
    Ok(StatusCode::NO_CONTENT)
}
