//! Session bootstrap: fetch-or-create the profile document and reconcile it
//! against the static catalog.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use tracing::{error, info};

use crate::models::profile::{DailyTask, ProfileDocument, ProfilePatch};
use crate::models::roadmap::RoadmapItem;
use crate::persistence::{normalize_username, ProfileStore, StoreError};

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub username_key: String,
    pub document: ProfileDocument,
    pub created: bool,
    /// Catalog items appended to an existing roadmap during this login.
    pub added_items: usize,
}

/// Fetches the user's profile, creating it from the catalog on first login.
///
/// Existing profiles only ever gain data here: missing catalog ids and
/// missing fixed daily tasks are appended, and daily completion flags are
/// cleared once per calendar day. Only the fields that changed are written.
pub async fn login(
    store: &dyn ProfileStore,
    catalog: &[RoadmapItem],
    fixed_tasks: &[DailyTask],
    username: &str,
    today: NaiveDate,
) -> Result<LoginOutcome, StoreError> {
    let username_key = normalize_username(username)?;

    let Some(mut document) = store.fetch(&username_key).await? else {
        let document = ProfileDocument {
            roadmap: catalog.to_vec(),
            daily_tasks: fixed_tasks.to_vec(),
            homework_tasks: Vec::new(),
            lingua_session: None,
            last_active: Utc::now(),
            last_reset_date: Some(today),
        };
        store.create(&username_key, &document).await?;
        info!("Created profile for {username_key} with {} roadmap items", document.roadmap.len());
        return Ok(LoginOutcome {
            username_key,
            document,
            created: true,
            added_items: 0,
        });
    };

    let mut patch = ProfilePatch::default();

    let added_items = merge_roadmap(&mut document.roadmap, catalog);
    if added_items > 0 {
        info!("Synced {added_items} new roadmap items into {username_key}");
        patch.roadmap = Some(document.roadmap.clone());
    }

    let added_tasks = reconcile_fixed_tasks(&mut document.daily_tasks, fixed_tasks);
    let reset = reset_daily_if_new_day(
        &mut document.daily_tasks,
        &mut document.last_reset_date,
        today,
    );
    if added_tasks > 0 || reset {
        patch.daily_tasks = Some(document.daily_tasks.clone());
    }
    if reset {
        patch.last_reset_date = Some(today);
    }

    if !patch.is_empty() {
        store.merge(&username_key, &patch, Utc::now()).await?;
    }

    Ok(LoginOutcome {
        username_key,
        document,
        created: false,
        added_items,
    })
}

/// Best-effort write. Errors are logged and dropped.
pub async fn save_profile(store: &dyn ProfileStore, username_key: &str, patch: ProfilePatch) {
    if let Err(e) = store.merge(username_key, &patch, Utc::now()).await {
        error!("Failed to save profile for {username_key}: {e}");
    }
}

/// Appends catalog items whose id is not already stored. Never touches
/// existing items. Returns the number appended.
pub fn merge_roadmap(stored: &mut Vec<RoadmapItem>, catalog: &[RoadmapItem]) -> usize {
    let mut known: HashSet<String> = stored.iter().map(|item| item.id.clone()).collect();
    let before = stored.len();
    for item in catalog {
        if known.insert(item.id.clone()) {
            stored.push(item.clone());
        }
    }
    stored.len() - before
}

/// Appends fixed tasks whose text is absent. Returns the number appended.
pub fn reconcile_fixed_tasks(tasks: &mut Vec<DailyTask>, fixed: &[DailyTask]) -> usize {
    let before = tasks.len();
    for seed in fixed {
        if !tasks.iter().any(|t| t.text == seed.text) {
            tasks.push(seed.clone());
        }
    }
    tasks.len() - before
}

/// Clears daily completion flags when the last reset was on an earlier day.
/// Homework is not affected.
pub fn reset_daily_if_new_day(
    daily_tasks: &mut [DailyTask],
    last_reset_date: &mut Option<NaiveDate>,
    today: NaiveDate,
) -> bool {
    if *last_reset_date == Some(today) {
        return false;
    }
    for task in daily_tasks.iter_mut() {
        task.completed = false;
    }
    *last_reset_date = Some(today);
    true
}
