//! Dashboard binary: opens the store and prints the book of business.

use chrono::{Datelike, NaiveDate, Utc};
use intellicrm::analytics::{
    actionable_insight_buckets, aggregate_monthly, compute_kpis, filter_sales_by_date,
    partition_tasks, sales_by_state, tier_distribution,
};
use intellicrm::records::Crm;
use intellicrm::store::CrmDb;
use intellicrm::util::format_inr;

fn main() {
    env_logger::init();

    let db = match CrmDb::open() {
        Ok(db) => db,
        Err(err) => {
            eprintln!("Failed to open CRM store: {err}");
            std::process::exit(1);
        }
    };
    let crm = Crm::new(db);
    let customers = crm.customers();
    let sales = crm.all_sales();
    let tasks = crm.tasks();

    // Default dashboard window: first of the current month through today.
    let now = Utc::now();
    let today = now.date_naive();
    let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .unwrap_or(today);

    let in_range = filter_sales_by_date(&sales, month_start, today);
    let kpis = compute_kpis(&customers, &in_range);
    println!(
        "{} customers  |  {} active  |  ₹{} sales ({} orders)  |  ₹{} outstanding",
        kpis.total_customers,
        kpis.active_customers,
        format_inr(kpis.total_sales),
        in_range.len(),
        format_inr(kpis.total_outstanding),
    );

    // Trailing six months, latest first.
    let window_start = month_start
        .checked_sub_months(chrono::Months::new(5))
        .unwrap_or(month_start);
    let mut monthly = aggregate_monthly(&sales, window_start, today);
    monthly.reverse();
    if !monthly.is_empty() {
        println!("\nMonthly performance:");
        for row in &monthly {
            println!(
                "  {:>6}  ₹{:>12}  {:>3} orders  {:+.1}%",
                row.month,
                format_inr(row.total_sales),
                row.order_count,
                row.percent_change,
            );
        }
    }

    let buckets = actionable_insight_buckets(&customers);
    println!(
        "\nActionable insights: {} no sales this month, {} below average, {} inactive 60+ days, \
         {} churn risks, {} engagement opportunities",
        buckets.no_sales_this_month.len(),
        buckets.sales_below_average.len(),
        buckets.inactive_over_60_days.len(),
        buckets.churn_risk.len(),
        buckets.engagement_opportunity.len(),
    );

    let by_state = sales_by_state(&customers, &in_range);
    if !by_state.is_empty() {
        println!("\nTop states this month:");
        for row in &by_state {
            println!("  {:<20} ₹{}", row.state, format_inr(row.total_sales));
        }
    }

    println!("\nTier distribution:");
    for row in tier_distribution(&customers) {
        println!("  {:<8} {}", row.tier.as_str(), row.count);
    }

    let task_buckets = partition_tasks(&tasks, now);
    println!(
        "\nTasks: {} overdue, {} due today, {} upcoming",
        task_buckets.overdue.len(),
        task_buckets.due_today.len(),
        task_buckets.upcoming.len(),
    );
    for task in task_buckets.overdue.iter().chain(&task_buckets.due_today) {
        let who = task.customer_name.as_deref().unwrap_or(&task.customer_id);
        println!("  [{}] {}", who, task.task);
    }
}
