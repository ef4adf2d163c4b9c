//! Fixture data used to seed an empty store. Dates are relative to the
//! current time so the seeded dashboard always has live-looking activity.

use chrono::{Duration, SecondsFormat, Utc};

use crate::types::{
    Customer, Goal, GoalStatus, Milestone, Remark, Sale, Sentiment, Task, Tier,
};

fn days_from_now(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn avatar(seed: u64) -> String {
    format!("https://i.pravatar.cc/150?u={seed}")
}

pub fn seed_customers() -> Vec<Customer> {
    let customer = |id: u64,
                    name: &str,
                    contact: &str,
                    alternate: Option<&str>,
                    tier: Tier,
                    state: &str,
                    district: &str,
                    sales_this_month: f64,
                    avg_6mo_sales: f64,
                    outstanding_balance: f64,
                    days_since_last_order: i64,
                    updated_days_ago: i64| Customer {
        id: id.to_string(),
        name: name.to_string(),
        contact: contact.to_string(),
        alternate_contact: alternate.map(str::to_string),
        avatar: avatar(id),
        tier,
        state: state.to_string(),
        district: district.to_string(),
        sales_this_month,
        avg_6mo_sales,
        outstanding_balance,
        days_since_last_order,
        last_updated: days_from_now(-updated_days_ago),
    };

    vec![
        customer(1, "Rohan Sharma", "9876543210", Some("8877665544"), Tier::Gold, "Maharashtra", "Mumbai", 15000.0, 25000.0, 5000.0, 10, 2),
        customer(2, "Priya Patel", "9876543211", None, Tier::Silver, "Gujarat", "Ahmedabad", 8000.0, 12000.0, 1200.0, 25, 5),
        customer(3, "Amit Singh", "9876543212", None, Tier::Bronze, "Uttar Pradesh", "Lucknow", 0.0, 5000.0, 8000.0, 45, 10),
        customer(4, "Sunita Rao", "9876543213", Some("7766554433"), Tier::Gold, "Karnataka", "Bengaluru Urban", 30000.0, 45000.0, 0.0, 5, 1),
        customer(5, "Vikram Reddy", "9876543214", None, Tier::Silver, "Telangana", "Hyderabad", 12000.0, 10000.0, 3000.0, 15, 3),
        customer(6, "Anjali Gupta", "9876543215", None, Tier::Dead, "Delhi", "New Delhi", 0.0, 2000.0, 500.0, 120, 90),
    ]
}

pub fn seed_sales() -> Vec<Sale> {
    let sale = |id: u64, customer_id: u64, amount: f64, days_ago: i64| Sale {
        id: format!("s{id}"),
        customer_id: customer_id.to_string(),
        amount,
        date: days_from_now(-days_ago),
    };

    vec![
        sale(1, 1, 15000.0, 10),
        sale(2, 1, 25000.0, 40),
        sale(3, 1, 35000.0, 70),
        sale(4, 2, 8000.0, 25),
        sale(5, 4, 30000.0, 5),
    ]
}

pub fn seed_remarks() -> Vec<Remark> {
    let remark = |id: u64,
                  customer_id: u64,
                  text: &str,
                  days_ago: i64,
                  user: &str,
                  sentiment: Sentiment| Remark {
        id: format!("r{id}"),
        customer_id: customer_id.to_string(),
        remark: text.to_string(),
        timestamp: days_from_now(-days_ago),
        user: user.to_string(),
        sentiment: Some(sentiment),
    };

    vec![
        remark(1, 1, "Followed up about new product line. Seemed interested.", 11, "Sales Team", Sentiment::Positive),
        remark(2, 3, "Called to check on outstanding balance. Promised to pay by end of week.", 2, "Accounts", Sentiment::Neutral),
        remark(3, 1, "He was very happy with the last delivery, great feedback!", 30, "Sales Team", Sentiment::Positive),
        remark(4, 2, "Customer is complaining about the product quality. Needs immediate attention.", 5, "Support", Sentiment::Negative),
    ]
}

pub fn seed_tasks() -> Vec<Task> {
    let task = |id: u64,
                customer_id: u64,
                customer_name: &str,
                text: &str,
                due_in_days: i64,
                completed: bool| Task {
        id: format!("t{id}"),
        customer_id: customer_id.to_string(),
        customer_name: Some(customer_name.to_string()),
        task: text.to_string(),
        due_date: days_from_now(due_in_days),
        completed,
    };

    vec![
        // One overdue, one due today, one upcoming, one already done.
        task(1, 3, "Amit Singh", "Follow up on overdue payment of ₹8000", -2, false),
        task(2, 1, "Rohan Sharma", "Send quote for new product line", 0, false),
        task(3, 4, "Sunita Rao", "Schedule Q3 business review meeting", 5, false),
        task(4, 2, "Priya Patel", "Send welcome kit", -10, true),
    ]
}

pub fn seed_goals() -> Vec<Goal> {
    let goal = |id: u64,
                customer_id: u64,
                title: &str,
                target: f64,
                current: f64,
                deadline_in_days: i64,
                status: GoalStatus| Goal {
        id: format!("g{id}"),
        customer_id: customer_id.to_string(),
        title: title.to_string(),
        target_amount: target,
        current_amount: current,
        deadline: days_from_now(deadline_in_days),
        status,
    };

    vec![
        goal(1, 1, "Q3 Sales Push", 75000.0, 40000.0, 60, GoalStatus::InProgress),
        goal(2, 4, "Achieve Premier Partner Status", 150000.0, 30000.0, 90, GoalStatus::InProgress),
        goal(3, 4, "Q2 Onboarding Sales", 45000.0, 50000.0, -30, GoalStatus::Achieved),
    ]
}

pub fn seed_milestones() -> Vec<Milestone> {
    let milestone = |id: u64,
                     goal_id: u64,
                     description: &str,
                     target_in_days: i64,
                     completed: bool| Milestone {
        id: format!("m{id}"),
        goal_id: format!("g{goal_id}"),
        description: description.to_string(),
        target_date: days_from_now(target_in_days),
        completed,
    };

    vec![
        milestone(1, 1, "Initial pitch for new product line", -10, true),
        milestone(2, 1, "Send follow-up quote", 0, false),
        milestone(3, 1, "Finalize order", 30, false),
        milestone(4, 2, "Business review meeting", 5, true),
        milestone(5, 2, "Secure volume discount agreement", 45, false),
    ]
}
