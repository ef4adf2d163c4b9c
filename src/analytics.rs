//! The aggregation engine: pure functions over customer and sale collections
//! producing the filtered/sorted views, monthly trend tables, KPI summaries,
//! and attention buckets every dashboard widget consumes.
//!
//! Nothing here touches the store or can fail; empty inputs yield empty
//! outputs. Callers pass `now` where a reference time matters so results
//! stay reproducible.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::types::{Customer, Sale, Task, Tier};
use crate::util::parse_ts;

/// Customer-list sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Contact,
    State,
    District,
    Tier,
    SalesThisMonth,
    Avg6MoSales,
    OutstandingBalance,
    DaysSinceLastOrder,
    LastUpdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Filter and sort parameters for the customer table.
///
/// Note the inherited sort convention: string columns compare ascending by
/// default while numeric and date columns compare descending, and
/// `SortOrder::Asc` flips whichever default applies. The UI depends on this
/// inversion, so it is preserved rather than normalized.
#[derive(Debug, Clone)]
pub struct CustomerFilters {
    pub tier: Option<Tier>,
    pub state: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for CustomerFilters {
    fn default() -> Self {
        CustomerFilters {
            tier: None,
            state: None,
            sort_by: SortField::LastUpdated,
            sort_order: SortOrder::Desc,
        }
    }
}

/// One row of the monthly performance table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPerformance {
    /// Short month + 2-digit year, e.g. "Jan 24".
    pub month: String,
    pub total_sales: f64,
    pub order_count: usize,
    /// Month-over-month change in percent; 0 for the first group or when
    /// the previous month summed to 0.
    pub percent_change: f64,
}

/// Dashboard KPI summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_customers: usize,
    pub active_customers: usize,
    pub total_sales: f64,
    /// Sum of outstanding balances over ALL customers — a current-state
    /// snapshot, deliberately not restricted by the date range.
    pub total_outstanding: f64,
}

/// Attention-prioritization buckets. Independently computed; a customer may
/// appear in several at once.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightBuckets {
    pub no_sales_this_month: Vec<Customer>,
    pub sales_below_average: Vec<Customer>,
    pub inactive_over_60_days: Vec<Customer>,
    pub churn_risk: Vec<Customer>,
    pub engagement_opportunity: Vec<Customer>,
}

/// Per-state sales total for the state chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSales {
    pub state: String,
    pub total_sales: f64,
}

/// Tier → customer count for the distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCount {
    pub tier: Tier,
    pub count: usize,
}

/// Incomplete tasks split by due date relative to "today".
#[derive(Debug, Clone, Default)]
pub struct TaskBuckets {
    pub overdue: Vec<Task>,
    pub due_today: Vec<Task>,
    pub upcoming: Vec<Task>,
}

/// Single-customer drill-down: monthly table plus the period total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPerformance {
    pub months: Vec<MonthlyPerformance>,
    pub total_sales: f64,
}

/// Filter by search term and tier/state, then sort. Returns a new vector;
/// the input is never mutated.
///
/// The search term matches case-insensitively as a substring against name,
/// contact, state, and district (OR across fields); an empty term matches
/// everything. Tier and state filters are exact-equality when set.
pub fn filter_and_sort_customers(
    customers: &[Customer],
    search_term: &str,
    filters: &CustomerFilters,
) -> Vec<Customer> {
    let needle = search_term.to_lowercase();

    let mut matched: Vec<Customer> = customers
        .iter()
        .filter(|c| {
            let search_hit = needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.contact.to_lowercase().contains(&needle)
                || c.state.to_lowercase().contains(&needle)
                || c.district.to_lowercase().contains(&needle);
            let tier_hit = filters.tier.map_or(true, |t| c.tier == t);
            let state_hit = filters
                .state
                .as_deref()
                .map_or(true, |s| c.state == s);
            search_hit && tier_hit && state_hit
        })
        .cloned()
        .collect();

    matched.sort_by(|a, b| {
        let cmp = default_comparison(a, b, filters.sort_by);
        match filters.sort_order {
            SortOrder::Asc => cmp.reverse(),
            SortOrder::Desc => cmp,
        }
    });
    matched
}

/// The per-column default ordering: strings ascending, numbers descending,
/// `last_updated` as dates descending. `SortOrder::Asc` reverses this.
fn default_comparison(a: &Customer, b: &Customer, field: SortField) -> std::cmp::Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Contact => a.contact.cmp(&b.contact),
        SortField::State => a.state.cmp(&b.state),
        SortField::District => a.district.cmp(&b.district),
        SortField::Tier => a.tier.as_str().cmp(b.tier.as_str()),
        SortField::SalesThisMonth => desc_f64(a.sales_this_month, b.sales_this_month),
        SortField::Avg6MoSales => desc_f64(a.avg_6mo_sales, b.avg_6mo_sales),
        SortField::OutstandingBalance => desc_f64(a.outstanding_balance, b.outstanding_balance),
        SortField::DaysSinceLastOrder => b.days_since_last_order.cmp(&a.days_since_last_order),
        SortField::LastUpdated => ts_or_epoch(&b.last_updated).cmp(&ts_or_epoch(&a.last_updated)),
    }
}

fn desc_f64(a: f64, b: f64) -> std::cmp::Ordering {
    b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
}

fn ts_or_epoch(ts: &str) -> DateTime<Utc> {
    parse_ts(ts).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Inclusive day-range bounds: start-of-day on `start` through the last
/// millisecond of `end`, in UTC.
fn range_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let lo = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).expect("valid time"));
    let hi = Utc.from_utc_datetime(&end.and_hms_milli_opt(23, 59, 59, 999).expect("valid time"));
    (lo, hi)
}

/// Retain sales whose date falls within the inclusive day range. Sales with
/// unparseable dates are dropped.
pub fn filter_sales_by_date(sales: &[Sale], start: NaiveDate, end: NaiveDate) -> Vec<Sale> {
    let (lo, hi) = range_bounds(start, end);
    sales
        .iter()
        .filter(|sale| {
            parse_ts(&sale.date).is_some_and(|date| date >= lo && date <= hi)
        })
        .cloned()
        .collect()
}

/// Group in-range sales by calendar month, chronologically ascending, with
/// per-group sums, order counts, and month-over-month percent change.
///
/// Table consumers wanting most-recent-first reverse the result themselves;
/// that is presentation, not aggregation.
pub fn aggregate_monthly(
    sales: &[Sale],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<MonthlyPerformance> {
    let (lo, hi) = range_bounds(start, end);

    let mut groups: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for sale in sales {
        let Some(date) = parse_ts(&sale.date) else {
            continue;
        };
        if date < lo || date > hi {
            continue;
        }
        let entry = groups.entry((date.year(), date.month())).or_insert((0.0, 0));
        entry.0 += sale.amount;
        entry.1 += 1;
    }

    let mut rows = Vec::with_capacity(groups.len());
    let mut prev_sales = 0.0_f64;
    for (i, (&(year, month), &(total_sales, order_count))) in groups.iter().enumerate() {
        let label = NaiveDate::from_ymd_opt(year, month, 1)
            .expect("valid first-of-month")
            .format("%b %y")
            .to_string();
        let percent_change = if i > 0 && prev_sales > 0.0 {
            (total_sales - prev_sales) / prev_sales * 100.0
        } else {
            0.0
        };
        prev_sales = total_sales;
        rows.push(MonthlyPerformance {
            month: label,
            total_sales,
            order_count,
            percent_change,
        });
    }
    rows
}

/// Dashboard KPIs. `date_filtered_sales` is the output of
/// [`filter_sales_by_date`]; customer counts and outstanding totals ignore
/// the date range on purpose.
pub fn compute_kpis(customers: &[Customer], date_filtered_sales: &[Sale]) -> Kpis {
    let active: HashSet<&str> = date_filtered_sales
        .iter()
        .map(|s| s.customer_id.as_str())
        .collect();
    Kpis {
        total_customers: customers.len(),
        active_customers: active.len(),
        total_sales: date_filtered_sales.iter().map(|s| s.amount).sum(),
        total_outstanding: customers.iter().map(|c| c.outstanding_balance).sum(),
    }
}

/// Partition customers into the five attention buckets. Buckets overlap;
/// no deduplication happens across them. Dead-tier customers are excluded
/// from every bucket except `sales_below_average`.
pub fn actionable_insight_buckets(customers: &[Customer]) -> InsightBuckets {
    let mut buckets = InsightBuckets::default();
    for c in customers {
        if c.sales_this_month == 0.0 && c.tier != Tier::Dead {
            buckets.no_sales_this_month.push(c.clone());
        }
        if c.sales_this_month > 0.0 && c.sales_this_month < c.avg_6mo_sales {
            buckets.sales_below_average.push(c.clone());
        }
        if c.days_since_last_order > 60 && c.tier != Tier::Dead {
            buckets.inactive_over_60_days.push(c.clone());
        }
        if c.tier != Tier::Dead && c.sales_this_month < c.avg_6mo_sales * 0.5 {
            buckets.churn_risk.push(c.clone());
        }
        if matches!(c.tier, Tier::Gold | Tier::Silver)
            && c.days_since_last_order > 30
            && c.days_since_last_order <= 60
        {
            buckets.engagement_opportunity.push(c.clone());
        }
    }
    buckets
}

/// Sum in-range sales per customer state, largest first, top 10. Sales whose
/// customer no longer exists contribute nothing (orphans are tolerated).
pub fn sales_by_state(customers: &[Customer], sales_in_range: &[Sale]) -> Vec<StateSales> {
    let state_of: HashMap<&str, &str> = customers
        .iter()
        .map(|c| (c.id.as_str(), c.state.as_str()))
        .collect();

    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for sale in sales_in_range {
        if let Some(state) = state_of.get(sale.customer_id.as_str()) {
            *totals.entry(state).or_insert(0.0) += sale.amount;
        }
    }

    let mut rows: Vec<StateSales> = totals
        .into_iter()
        .filter(|&(_, total)| total > 0.0)
        .map(|(state, total_sales)| StateSales {
            state: state.to_string(),
            total_sales,
        })
        .collect();
    rows.sort_by(|a, b| desc_f64(a.total_sales, b.total_sales));
    rows.truncate(10);
    rows
}

/// Customer counts per tier in display order; empty tiers are dropped.
pub fn tier_distribution(customers: &[Customer]) -> Vec<TierCount> {
    Tier::all()
        .into_iter()
        .map(|tier| TierCount {
            tier,
            count: customers.iter().filter(|c| c.tier == tier).count(),
        })
        .filter(|tc| tc.count > 0)
        .collect()
}

/// Split incomplete tasks into overdue / due today / upcoming relative to
/// `now`. Completed tasks and tasks with unparseable due dates land nowhere.
pub fn partition_tasks(tasks: &[Task], now: DateTime<Utc>) -> TaskBuckets {
    let today = now.date_naive();
    let (today_start, today_end) = range_bounds(today, today);

    let mut buckets = TaskBuckets::default();
    for task in tasks {
        if task.completed {
            continue;
        }
        let Some(due) = parse_ts(&task.due_date) else {
            continue;
        };
        if due < today_start {
            buckets.overdue.push(task.clone());
        } else if due <= today_end {
            buckets.due_today.push(task.clone());
        } else {
            buckets.upcoming.push(task.clone());
        }
    }
    buckets
}

/// Drill-down for a single customer: monthly table over the range plus the
/// period total. `sales` should already be that customer's sales.
pub fn customer_performance(
    sales: &[Sale],
    start: NaiveDate,
    end: NaiveDate,
) -> CustomerPerformance {
    let in_range = filter_sales_by_date(sales, start, end);
    CustomerPerformance {
        months: aggregate_monthly(&in_range, start, end),
        total_sales: in_range.iter().map(|s| s.amount).sum(),
    }
}
