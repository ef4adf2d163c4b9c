//! JSON-blob persisted store for CRM collections.
//!
//! The store lives at `~/.intellicrm/` with one pretty-printed JSON blob per
//! logical collection: `customers.json`, `sales.json`, `remarks.json`,
//! `tasks.json`, plus `ids.json` holding the next-integer counters per
//! entity type. A blob is seeded from fixture data only when its file is
//! absent, so reopening the store never overwrites live data.
//!
//! Goals and milestones are part of the in-memory store but are not
//! persisted; they reseed from fixtures on every open. This matches the
//! persisted layout the dashboard always had.
//!
//! All writes are atomic (temp file + rename). A corrupt blob degrades to an
//! empty collection with a logged warning rather than failing open.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fixtures;
use crate::types::{Customer, Goal, Milestone, Remark, Sale, Task};
use crate::util::atomic_write_str;

const CUSTOMERS_KEY: &str = "customers";
const SALES_KEY: &str = "sales";
const REMARKS_KEY: &str = "remarks";
const TASKS_KEY: &str = "tasks";
const IDS_KEY: &str = "ids";

const DEFAULT_DATA_DIR: &str = ".intellicrm";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create data directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write {key}: {source}")]
    Write {
        key: &'static str,
        source: std::io::Error,
    },

    #[error("Failed to serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        source: serde_json::Error,
    },
}

/// Next-integer id counters, one per entity type. Seeded to one past the
/// highest numeric id present in the corresponding collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdCounters {
    pub customer: u64,
    pub sale: u64,
    pub remark: u64,
    pub task: u64,
    #[serde(default = "default_counter")]
    pub goal: u64,
    #[serde(default = "default_counter")]
    pub milestone: u64,
}

fn default_counter() -> u64 {
    1
}

/// The process-wide store. Constructed once at session start and handed to
/// the record API; nothing in this crate reaches for global state.
pub struct CrmDb {
    dir: PathBuf,
    pub(crate) customers: Vec<Customer>,
    pub(crate) sales: Vec<Sale>,
    pub(crate) remarks: Vec<Remark>,
    pub(crate) tasks: Vec<Task>,
    pub(crate) goals: Vec<Goal>,
    pub(crate) milestones: Vec<Milestone>,
    pub(crate) ids: IdCounters,
}

impl CrmDb {
    /// Open (or create and seed) the store at `~/.intellicrm/`.
    pub fn open() -> Result<Self, StoreError> {
        let home = dirs::home_dir().ok_or(StoreError::HomeDirNotFound)?;
        Self::open_at(home.join(DEFAULT_DATA_DIR))
    }

    /// Open (or create and seed) the store at an explicit directory.
    pub fn open_at(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(StoreError::CreateDir)?;

        let customers =
            load_or_seed(&dir, CUSTOMERS_KEY, fixtures::seed_customers)?;
        let sales = load_or_seed(&dir, SALES_KEY, fixtures::seed_sales)?;
        let remarks = load_or_seed(&dir, REMARKS_KEY, fixtures::seed_remarks)?;
        let tasks = load_or_seed(&dir, TASKS_KEY, fixtures::seed_tasks)?;
        let goals = fixtures::seed_goals();
        let milestones = fixtures::seed_milestones();

        let ids = match load_blob::<IdCounters>(&dir, IDS_KEY) {
            Some(ids) => ids,
            None => {
                let ids = IdCounters {
                    customer: next_counter(&customers, |c| &c.id, ""),
                    sale: next_counter(&sales, |s| &s.id, "s"),
                    remark: next_counter(&remarks, |r| &r.id, "r"),
                    task: next_counter(&tasks, |t| &t.id, "t"),
                    goal: next_counter(&goals, |g| &g.id, "g"),
                    milestone: next_counter(&milestones, |m| &m.id, "m"),
                };
                save_blob(&dir, IDS_KEY, &ids)?;
                ids
            }
        };

        Ok(CrmDb {
            dir,
            customers,
            sales,
            remarks,
            tasks,
            goals,
            milestones,
            ids,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    // -- id allocation (post-increment, persisted with the next save) --

    pub(crate) fn next_customer_id(&mut self) -> String {
        let id = self.ids.customer;
        self.ids.customer += 1;
        id.to_string()
    }

    pub(crate) fn next_sale_id(&mut self) -> String {
        let id = self.ids.sale;
        self.ids.sale += 1;
        format!("s{id}")
    }

    pub(crate) fn next_remark_id(&mut self) -> String {
        let id = self.ids.remark;
        self.ids.remark += 1;
        format!("r{id}")
    }

    pub(crate) fn next_task_id(&mut self) -> String {
        let id = self.ids.task;
        self.ids.task += 1;
        format!("t{id}")
    }

    pub(crate) fn next_goal_id(&mut self) -> String {
        let id = self.ids.goal;
        self.ids.goal += 1;
        format!("g{id}")
    }

    pub(crate) fn next_milestone_id(&mut self) -> String {
        let id = self.ids.milestone;
        self.ids.milestone += 1;
        format!("m{id}")
    }

    // -- per-collection persistence --

    pub(crate) fn save_customers(&self) -> Result<(), StoreError> {
        save_blob(&self.dir, CUSTOMERS_KEY, &self.customers)
    }

    pub(crate) fn save_sales(&self) -> Result<(), StoreError> {
        save_blob(&self.dir, SALES_KEY, &self.sales)
    }

    pub(crate) fn save_remarks(&self) -> Result<(), StoreError> {
        save_blob(&self.dir, REMARKS_KEY, &self.remarks)
    }

    pub(crate) fn save_tasks(&self) -> Result<(), StoreError> {
        save_blob(&self.dir, TASKS_KEY, &self.tasks)
    }

    pub(crate) fn save_ids(&self) -> Result<(), StoreError> {
        save_blob(&self.dir, IDS_KEY, &self.ids)
    }
}

fn blob_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

/// One past the highest numeric id in a collection, given the id prefix
/// ("" for customers, "s" for sales, ...). Non-numeric ids are ignored.
fn next_counter<T>(items: &[T], id_of: impl Fn(&T) -> &str, prefix: &str) -> u64 {
    items
        .iter()
        .filter_map(|item| id_of(item).strip_prefix(prefix)?.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

fn load_blob<T: DeserializeOwned>(dir: &Path, key: &'static str) -> Option<T> {
    let path = blob_path(dir, key);
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

fn save_blob<T: Serialize>(dir: &Path, key: &'static str, value: &T) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|source| StoreError::Serialize { key, source })?;
    atomic_write_str(&blob_path(dir, key), &content)
        .map_err(|source| StoreError::Write { key, source })
}

/// Seed-if-absent: an existing file is loaded (empty on parse failure, so a
/// bad blob never resurrects fixture data); a missing file is written from
/// the fixture seed.
fn load_or_seed<T: DeserializeOwned + Serialize>(
    dir: &Path,
    key: &'static str,
    seed: fn() -> Vec<T>,
) -> Result<Vec<T>, StoreError> {
    if blob_path(dir, key).exists() {
        return Ok(load_blob(dir, key).unwrap_or_default());
    }
    let seeded = seed();
    save_blob(dir, key, &seeded)?;
    log::info!("Seeded {} with {} fixture records", key, seeded.len());
    Ok(seeded)
}
