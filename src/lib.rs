//! IntelliCRM: customer intelligence for field sales reps.
//!
//! A JSON-blob-backed CRM store plus a pure aggregation engine. The store
//! (`store`, `records`) owns persistence and the record API; `analytics`
//! holds the dashboard math (filter/sort, monthly grouping, KPIs, insight
//! buckets) as pure functions over borrowed slices; `insights` builds AI
//! prompts behind the `InsightProvider` trait; `import` parses bulk CSV.

pub mod analytics;
pub mod fixtures;
pub mod import;
pub mod insights;
pub mod records;
pub mod store;
pub mod types;
pub mod util;

pub use analytics::{CustomerFilters, InsightBuckets, Kpis, MonthlyPerformance, SortField, SortOrder};
pub use insights::{InsightProvider, InsightRequest, ResponseKind};
pub use records::{Crm, CrmError};
pub use store::{CrmDb, StoreError};
pub use types::{Customer, Goal, Milestone, Remark, Sale, Sentiment, Task, Tier};
