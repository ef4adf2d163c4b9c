//! Record API: CRUD over the store's entities.
//!
//! `Crm` owns the store and is handed to consumers explicitly — there is no
//! module-global state. Every mutation persists the touched collections
//! before returning. New records go to the FRONT of their collection so the
//! freshest entries list first.
//!
//! Derived customer metrics (`sales_this_month`, `days_since_last_order`)
//! are recomputed from the full sale history in one place,
//! [`recompute_metrics`], invoked after every sale event. The outstanding
//! balance is event-driven (bills minus payments) and is never reconciled
//! against sales.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use thiserror::Error;

use crate::store::{CrmDb, StoreError};
use crate::types::{
    Customer, CustomerDraft, CustomerForm, CustomerUpdate, Goal, GoalStatus, Milestone, Remark,
    Sale, Sentiment, Task,
};
use crate::util::{format_inr, parse_ts};

/// User attributed to auto-generated remarks (payments, bills).
const SYSTEM_REMARK_USER: &str = "Sales Team";

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Goal not found: {0}")]
    GoalNotFound(String),

    #[error("Milestone not found: {0}")]
    MilestoneNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Crm {
    db: CrmDb,
}

impl Crm {
    pub fn new(db: CrmDb) -> Self {
        Crm { db }
    }

    pub fn into_db(self) -> CrmDb {
        self.db
    }

    // -- customers --

    /// All customers, insertion order (newest first).
    pub fn customers(&self) -> Vec<Customer> {
        self.db.customers.clone()
    }

    pub fn customer(&self, id: &str) -> Result<Customer, CrmError> {
        self.db
            .customers
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| CrmError::CustomerNotFound(id.to_string()))
    }

    pub fn add_customer(&mut self, form: CustomerForm) -> Result<Customer, CrmError> {
        let id = self.db.next_customer_id();
        let customer = Customer {
            id,
            name: form.name,
            contact: form.contact,
            alternate_contact: form.alternate_contact.filter(|s| !s.is_empty()),
            // The avatar seed uses the already-bumped counter value.
            avatar: format!("https://i.pravatar.cc/150?u={}", self.db.ids.customer),
            tier: form.tier,
            state: form.state,
            district: form.district,
            sales_this_month: 0.0,
            avg_6mo_sales: 0.0,
            outstanding_balance: 0.0,
            days_since_last_order: 0,
            last_updated: now_ts(),
        };
        self.db.customers.insert(0, customer.clone());
        self.db.save_customers()?;
        self.db.save_ids()?;
        log::info!("Added customer {} ({})", customer.name, customer.id);
        Ok(customer)
    }

    pub fn update_customer(
        &mut self,
        id: &str,
        update: CustomerUpdate,
    ) -> Result<Customer, CrmError> {
        let customer = self
            .db
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CrmError::CustomerNotFound(id.to_string()))?;

        if let Some(name) = update.name {
            customer.name = name;
        }
        if let Some(contact) = update.contact {
            customer.contact = contact;
        }
        if let Some(alternate) = update.alternate_contact {
            customer.alternate_contact = if alternate.is_empty() {
                None
            } else {
                Some(alternate)
            };
        }
        if let Some(state) = update.state {
            customer.state = state;
        }
        if let Some(district) = update.district {
            customer.district = district;
        }
        if let Some(tier) = update.tier {
            customer.tier = tier;
        }
        customer.last_updated = now_ts();

        let updated = customer.clone();
        self.db.save_customers()?;
        Ok(updated)
    }

    /// Remove a customer record. Related sales, remarks, and tasks are NOT
    /// cascade-deleted; orphans are accepted and tolerated by every reader.
    /// Returns whether a record was removed.
    pub fn delete_customer(&mut self, id: &str) -> Result<bool, CrmError> {
        let before = self.db.customers.len();
        self.db.customers.retain(|c| c.id != id);
        let removed = self.db.customers.len() < before;
        self.db.save_customers()?;
        if removed {
            log::info!("Deleted customer {id} (related records retained)");
        }
        Ok(removed)
    }

    pub fn bulk_add_customers(
        &mut self,
        drafts: Vec<CustomerDraft>,
    ) -> Result<Vec<Customer>, CrmError> {
        let mut added = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = self.db.next_customer_id();
            let customer = Customer {
                id,
                name: draft.name,
                contact: draft.contact,
                alternate_contact: draft.alternate_contact.filter(|s| !s.is_empty()),
                avatar: format!("https://i.pravatar.cc/150?u={}", self.db.ids.customer),
                tier: draft.tier,
                state: draft.state,
                district: draft.district,
                sales_this_month: draft.sales_this_month,
                avg_6mo_sales: draft.avg_6mo_sales,
                outstanding_balance: draft.outstanding_balance,
                days_since_last_order: draft.days_since_last_order,
                last_updated: now_ts(),
            };
            self.db.customers.insert(0, customer.clone());
            added.push(customer);
        }
        self.db.save_customers()?;
        self.db.save_ids()?;
        log::info!("Bulk-imported {} customers", added.len());
        Ok(added)
    }

    // -- sales --

    pub fn all_sales(&self) -> Vec<Sale> {
        self.db.sales.clone()
    }

    /// A customer's sales, most recent first.
    pub fn sales_for_customer(&self, customer_id: &str) -> Vec<Sale> {
        let mut sales: Vec<Sale> = self
            .db
            .sales
            .iter()
            .filter(|s| s.customer_id == customer_id)
            .cloned()
            .collect();
        sales.sort_by(|a, b| ts_key(&b.date).cmp(&ts_key(&a.date)));
        sales
    }

    /// Record a sale and recompute the customer's derived metrics from the
    /// full sale history. The customer id is an unvalidated foreign key: a
    /// sale against an unknown id is still recorded.
    pub fn add_sale(&mut self, customer_id: &str, amount: f64, date: &str) -> Result<Sale, CrmError> {
        let sale = Sale {
            id: self.db.next_sale_id(),
            customer_id: customer_id.to_string(),
            amount,
            date: date.to_string(),
        };
        self.db.sales.insert(0, sale.clone());
        self.db.save_sales()?;
        self.db.save_ids()?;

        let now = Utc::now();
        if let Some(idx) = self.db.customers.iter().position(|c| c.id == customer_id) {
            let customer = &mut self.db.customers[idx];
            recompute_metrics(customer, &self.db.sales, now);
            customer.last_updated = now.to_rfc3339_opts(SecondsFormat::Millis, true);
            self.db.save_customers()?;
        }
        Ok(sale)
    }

    // -- remarks --

    /// A customer's remarks, most recent first.
    pub fn remarks_for_customer(&self, customer_id: &str) -> Vec<Remark> {
        let mut remarks: Vec<Remark> = self
            .db
            .remarks
            .iter()
            .filter(|r| r.customer_id == customer_id)
            .cloned()
            .collect();
        remarks.sort_by(|a, b| ts_key(&b.timestamp).cmp(&ts_key(&a.timestamp)));
        remarks
    }

    /// Append a remark. Sentiment, when present, comes from the insight
    /// adapter; the record API stores it opaquely and never depends on it.
    pub fn add_remark(
        &mut self,
        customer_id: &str,
        text: &str,
        sentiment: Option<Sentiment>,
    ) -> Result<Remark, CrmError> {
        let remark = Remark {
            id: self.db.next_remark_id(),
            customer_id: customer_id.to_string(),
            remark: text.to_string(),
            timestamp: now_ts(),
            user: SYSTEM_REMARK_USER.to_string(),
            sentiment,
        };
        self.db.remarks.insert(0, remark.clone());
        self.db.save_remarks()?;
        self.db.save_ids()?;
        Ok(remark)
    }

    // -- payments and bills --

    /// Record a payment: reduces the outstanding balance and appends an
    /// automatic remark. The balance may go negative (overpayment).
    pub fn add_payment(
        &mut self,
        customer_id: &str,
        amount: f64,
        date: &str,
    ) -> Result<Customer, CrmError> {
        let customer = self
            .db
            .customers
            .iter_mut()
            .find(|c| c.id == customer_id)
            .ok_or_else(|| CrmError::CustomerNotFound(customer_id.to_string()))?;
        customer.outstanding_balance -= amount;
        customer.last_updated = now_ts();
        let updated = customer.clone();
        self.db.save_customers()?;

        let date_label = parse_ts(date)
            .map(|d| d.format("%d %b %Y").to_string())
            .unwrap_or_else(|| date.to_string());
        self.add_remark(
            customer_id,
            &format!(
                "Payment of ₹{} recorded for {}.",
                format_inr(amount),
                date_label
            ),
            None,
        )?;
        Ok(updated)
    }

    /// Record a bill: raises the outstanding balance and appends an
    /// automatic remark.
    pub fn add_bill(&mut self, customer_id: &str, amount: f64) -> Result<Customer, CrmError> {
        let customer = self
            .db
            .customers
            .iter_mut()
            .find(|c| c.id == customer_id)
            .ok_or_else(|| CrmError::CustomerNotFound(customer_id.to_string()))?;
        customer.outstanding_balance += amount;
        customer.last_updated = now_ts();
        let updated = customer.clone();
        self.db.save_customers()?;

        self.add_remark(
            customer_id,
            &format!("Bill of ₹{} added.", format_inr(amount)),
            None,
        )?;
        Ok(updated)
    }

    // -- tasks --

    /// All tasks, due date ascending.
    pub fn tasks(&self) -> Vec<Task> {
        let mut tasks = self.db.tasks.clone();
        tasks.sort_by(|a, b| ts_key(&a.due_date).cmp(&ts_key(&b.due_date)));
        tasks
    }

    /// A customer's tasks, due date ascending.
    pub fn tasks_for_customer(&self, customer_id: &str) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .db
            .tasks
            .iter()
            .filter(|t| t.customer_id == customer_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| ts_key(&a.due_date).cmp(&ts_key(&b.due_date)));
        tasks
    }

    pub fn add_task(
        &mut self,
        customer_id: &str,
        customer_name: Option<String>,
        text: &str,
        due_date: &str,
    ) -> Result<Task, CrmError> {
        let task = Task {
            id: self.db.next_task_id(),
            customer_id: customer_id.to_string(),
            customer_name,
            task: text.to_string(),
            due_date: due_date.to_string(),
            completed: false,
        };
        self.db.tasks.insert(0, task.clone());
        self.db.save_tasks()?;
        self.db.save_ids()?;
        Ok(task)
    }

    pub fn toggle_task_complete(&mut self, task_id: &str) -> Result<Task, CrmError> {
        let task = self
            .db
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| CrmError::TaskNotFound(task_id.to_string()))?;
        task.completed = !task.completed;
        let updated = task.clone();
        self.db.save_tasks()?;
        Ok(updated)
    }

    // -- goals and milestones (session-scoped, not persisted) --

    /// A customer's goals together with the milestones of those goals.
    pub fn goals_for_customer(&self, customer_id: &str) -> (Vec<Goal>, Vec<Milestone>) {
        let goals: Vec<Goal> = self
            .db
            .goals
            .iter()
            .filter(|g| g.customer_id == customer_id)
            .cloned()
            .collect();
        let milestones: Vec<Milestone> = self
            .db
            .milestones
            .iter()
            .filter(|m| goals.iter().any(|g| g.id == m.goal_id))
            .cloned()
            .collect();
        (goals, milestones)
    }

    pub fn add_goal(
        &mut self,
        customer_id: &str,
        title: &str,
        target_amount: f64,
        deadline: &str,
    ) -> Result<Goal, CrmError> {
        let goal = Goal {
            id: self.db.next_goal_id(),
            customer_id: customer_id.to_string(),
            title: title.to_string(),
            target_amount,
            current_amount: 0.0,
            deadline: deadline.to_string(),
            status: GoalStatus::InProgress,
        };
        self.db.goals.insert(0, goal.clone());
        self.db.save_ids()?;
        Ok(goal)
    }

    /// Delete a goal and its milestones. Unlike customer deletion, this DOES
    /// cascade: milestones are meaningless without their parent goal.
    pub fn delete_goal(&mut self, goal_id: &str) -> Result<(), CrmError> {
        let before = self.db.goals.len();
        self.db.goals.retain(|g| g.id != goal_id);
        if self.db.goals.len() == before {
            return Err(CrmError::GoalNotFound(goal_id.to_string()));
        }
        self.db.milestones.retain(|m| m.goal_id != goal_id);
        Ok(())
    }

    pub fn add_milestone(
        &mut self,
        goal_id: &str,
        description: &str,
        target_date: &str,
    ) -> Result<Milestone, CrmError> {
        if !self.db.goals.iter().any(|g| g.id == goal_id) {
            return Err(CrmError::GoalNotFound(goal_id.to_string()));
        }
        let milestone = Milestone {
            id: self.db.next_milestone_id(),
            goal_id: goal_id.to_string(),
            description: description.to_string(),
            target_date: target_date.to_string(),
            completed: false,
        };
        self.db.milestones.push(milestone.clone());
        self.db.save_ids()?;
        Ok(milestone)
    }

    pub fn toggle_milestone_complete(&mut self, milestone_id: &str) -> Result<Milestone, CrmError> {
        let milestone = self
            .db
            .milestones
            .iter_mut()
            .find(|m| m.id == milestone_id)
            .ok_or_else(|| CrmError::MilestoneNotFound(milestone_id.to_string()))?;
        milestone.completed = !milestone.completed;
        Ok(milestone.clone())
    }
}

/// The consolidated derived-metric recompute (one write path, invoked after
/// every sale event): `sales_this_month` is the sum of this customer's
/// sales in the current UTC calendar month, `days_since_last_order` is the
/// whole-day distance to the most recent sale (clamped at 0 for
/// future-dated sales). Customers with no sale history keep their existing
/// `days_since_last_order`.
pub(crate) fn recompute_metrics(customer: &mut Customer, sales: &[Sale], now: DateTime<Utc>) {
    let history: Vec<(DateTime<Utc>, f64)> = sales
        .iter()
        .filter(|s| s.customer_id == customer.id)
        .filter_map(|s| parse_ts(&s.date).map(|d| (d, s.amount)))
        .collect();

    customer.sales_this_month = history
        .iter()
        .filter(|(d, _)| d.year() == now.year() && d.month() == now.month())
        .map(|(_, amount)| amount)
        .sum();

    if let Some((most_recent, _)) = history.iter().max_by_key(|(d, _)| *d) {
        customer.days_since_last_order = (now - *most_recent).num_days().max(0);
    }
}

fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn ts_key(ts: &str) -> DateTime<Utc> {
    parse_ts(ts).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CrmDb;
    use chrono::{Duration, TimeZone};

    fn crm() -> (tempfile::TempDir, Crm) {
        let tmp = tempfile::tempdir().unwrap();
        let crm = Crm::new(CrmDb::open_at(tmp.path()).unwrap());
        (tmp, crm)
    }

    fn form(name: &str) -> CustomerForm {
        CustomerForm {
            name: name.to_string(),
            contact: "9000000000".to_string(),
            alternate_contact: None,
            state: "Kerala".to_string(),
            district: "Kochi".to_string(),
            tier: crate::types::Tier::Silver,
        }
    }

    #[test]
    fn add_customer_zeroes_metrics_and_inserts_at_front() {
        let (_tmp, mut crm) = crm();
        let added = crm.add_customer(form("New Trader")).unwrap();
        assert_eq!(added.sales_this_month, 0.0);
        assert_eq!(added.outstanding_balance, 0.0);
        assert_eq!(crm.customers()[0].id, added.id);

        let next = crm.add_customer(form("Newer Trader")).unwrap();
        let a: u64 = added.id.parse().unwrap();
        let b: u64 = next.id.parse().unwrap();
        assert_eq!(b, a + 1);
    }

    #[test]
    fn update_customer_is_partial_and_bumps_last_updated() {
        let (_tmp, mut crm) = crm();
        let added = crm.add_customer(form("Original")).unwrap();
        let updated = crm
            .update_customer(
                &added.id,
                CustomerUpdate {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.contact, added.contact);
        assert!(updated.last_updated >= added.last_updated);

        assert!(matches!(
            crm.update_customer("nope", CustomerUpdate::default()),
            Err(CrmError::CustomerNotFound(_))
        ));
    }

    #[test]
    fn delete_customer_orphans_related_records() {
        let (_tmp, mut crm) = crm();
        let added = crm.add_customer(form("Doomed")).unwrap();
        crm.add_sale(&added.id, 500.0, "2024-01-15T10:00:00Z").unwrap();
        crm.add_remark(&added.id, "note", None).unwrap();
        crm.add_task(&added.id, None, "call", "2024-02-01T10:00:00Z")
            .unwrap();

        assert!(crm.delete_customer(&added.id).unwrap());
        assert!(crm.customer(&added.id).is_err());
        // No cascade: children survive as orphans.
        assert_eq!(crm.sales_for_customer(&added.id).len(), 1);
        assert_eq!(crm.remarks_for_customer(&added.id).len(), 1);
        assert_eq!(crm.tasks_for_customer(&added.id).len(), 1);

        assert!(!crm.delete_customer("nope").unwrap());
    }

    #[test]
    fn add_sale_recomputes_metrics_from_history() {
        let (_tmp, mut crm) = crm();
        let added = crm.add_customer(form("Buyer")).unwrap();

        let today = Utc::now().to_rfc3339();
        crm.add_sale(&added.id, 1200.0, &today).unwrap();
        let after = crm.customer(&added.id).unwrap();
        assert_eq!(after.sales_this_month, 1200.0);
        assert_eq!(after.days_since_last_order, 0);
    }

    #[test]
    fn add_sale_tolerates_unknown_customer() {
        let (_tmp, mut crm) = crm();
        let sale = crm.add_sale("ghost", 100.0, "2024-01-15T10:00:00Z").unwrap();
        assert_eq!(sale.customer_id, "ghost");
        assert_eq!(crm.sales_for_customer("ghost").len(), 1);
    }

    #[test]
    fn recompute_counts_only_current_month_and_floors_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let mut c = Customer {
            id: "1".to_string(),
            name: "X".to_string(),
            contact: String::new(),
            alternate_contact: None,
            avatar: String::new(),
            tier: crate::types::Tier::Gold,
            state: String::new(),
            district: String::new(),
            sales_this_month: 999.0,
            avg_6mo_sales: 0.0,
            outstanding_balance: 0.0,
            days_since_last_order: 999,
            last_updated: String::new(),
        };
        let sales = vec![
            Sale {
                id: "s1".to_string(),
                customer_id: "1".to_string(),
                amount: 100.0,
                date: "2024-03-05T12:00:00Z".to_string(),
            },
            Sale {
                id: "s2".to_string(),
                customer_id: "1".to_string(),
                amount: 50.0,
                date: "2024-03-10T18:30:00Z".to_string(),
            },
            Sale {
                id: "s3".to_string(),
                customer_id: "1".to_string(),
                amount: 400.0,
                date: "2024-02-20T12:00:00Z".to_string(),
            },
            // Another customer's sale must not count.
            Sale {
                id: "s4".to_string(),
                customer_id: "2".to_string(),
                amount: 1000.0,
                date: "2024-03-12T12:00:00Z".to_string(),
            },
        ];
        recompute_metrics(&mut c, &sales, now);
        assert_eq!(c.sales_this_month, 150.0);
        // Most recent sale 2024-03-10T18:30 → 4 days and change → floors to 4.
        assert_eq!(c.days_since_last_order, 4);

        // Future-dated most recent sale clamps to 0.
        let future = vec![Sale {
            id: "s5".to_string(),
            customer_id: "1".to_string(),
            amount: 10.0,
            date: (now + Duration::days(2)).to_rfc3339(),
        }];
        recompute_metrics(&mut c, &future, now);
        assert_eq!(c.days_since_last_order, 0);
    }

    #[test]
    fn recompute_keeps_days_when_no_history() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let mut c = Customer {
            id: "1".to_string(),
            name: "X".to_string(),
            contact: String::new(),
            alternate_contact: None,
            avatar: String::new(),
            tier: crate::types::Tier::Gold,
            state: String::new(),
            district: String::new(),
            sales_this_month: 500.0,
            avg_6mo_sales: 0.0,
            outstanding_balance: 0.0,
            days_since_last_order: 42,
            last_updated: String::new(),
        };
        recompute_metrics(&mut c, &[], now);
        assert_eq!(c.sales_this_month, 0.0);
        assert_eq!(c.days_since_last_order, 42);
    }

    #[test]
    fn payment_and_bill_adjust_balance_and_leave_remarks() {
        let (_tmp, mut crm) = crm();
        let added = crm.add_customer(form("Payer")).unwrap();

        let after_bill = crm.add_bill(&added.id, 8000.0).unwrap();
        assert_eq!(after_bill.outstanding_balance, 8000.0);

        let after_payment = crm
            .add_payment(&added.id, 10000.0, "2024-03-01T00:00:00Z")
            .unwrap();
        // Overpayment drives the balance negative; that is allowed.
        assert_eq!(after_payment.outstanding_balance, -2000.0);

        let remarks = crm.remarks_for_customer(&added.id);
        assert_eq!(remarks.len(), 2);
        assert!(remarks.iter().any(|r| r.remark.contains("Bill of ₹8,000")));
        assert!(remarks
            .iter()
            .any(|r| r.remark.contains("Payment of ₹10,000")));
        assert!(remarks.iter().all(|r| r.sentiment.is_none()));

        assert!(matches!(
            crm.add_payment("nope", 1.0, "2024-03-01T00:00:00Z"),
            Err(CrmError::CustomerNotFound(_))
        ));
        assert!(matches!(
            crm.add_bill("nope", 1.0),
            Err(CrmError::CustomerNotFound(_))
        ));
    }

    #[test]
    fn bulk_add_assigns_sequential_ids_front_first() {
        let (_tmp, mut crm) = crm();
        let draft = |name: &str| CustomerDraft {
            name: name.to_string(),
            contact: "1".to_string(),
            alternate_contact: None,
            state: "S".to_string(),
            district: "D".to_string(),
            tier: crate::types::Tier::Bronze,
            sales_this_month: 5000.0,
            avg_6mo_sales: 8000.0,
            outstanding_balance: 2500.0,
            days_since_last_order: 30,
        };
        let added = crm
            .bulk_add_customers(vec![draft("First"), draft("Second")])
            .unwrap();
        assert_eq!(added.len(), 2);
        let a: u64 = added[0].id.parse().unwrap();
        let b: u64 = added[1].id.parse().unwrap();
        assert_eq!(b, a + 1);
        // Imported metrics are carried, not zeroed.
        assert_eq!(added[0].sales_this_month, 5000.0);
        // Each insert unshifts, so the last import lists first.
        assert_eq!(crm.customers()[0].name, "Second");
        assert_eq!(crm.customers()[1].name, "First");
    }

    #[test]
    fn tasks_sort_by_due_date_and_toggle_flips() {
        let (_tmp, mut crm) = crm();
        let c = crm.add_customer(form("Tasked")).unwrap();
        crm.add_task(&c.id, None, "later", "2030-06-01T00:00:00Z")
            .unwrap();
        let early = crm
            .add_task(&c.id, None, "sooner", "2030-01-01T00:00:00Z")
            .unwrap();

        let tasks = crm.tasks_for_customer(&c.id);
        assert_eq!(tasks[0].id, early.id);

        let toggled = crm.toggle_task_complete(&early.id).unwrap();
        assert!(toggled.completed);
        let toggled_back = crm.toggle_task_complete(&early.id).unwrap();
        assert!(!toggled_back.completed);

        assert!(matches!(
            crm.toggle_task_complete("nope"),
            Err(CrmError::TaskNotFound(_))
        ));
    }

    #[test]
    fn goal_lifecycle_with_milestone_cascade() {
        let (_tmp, mut crm) = crm();
        let c = crm.add_customer(form("Goaled")).unwrap();
        let goal = crm
            .add_goal(&c.id, "Q4 Push", 50000.0, "2030-12-31T00:00:00Z")
            .unwrap();
        assert_eq!(goal.status, GoalStatus::InProgress);
        assert_eq!(goal.current_amount, 0.0);

        let milestone = crm
            .add_milestone(&goal.id, "First order", "2030-10-01T00:00:00Z")
            .unwrap();
        let toggled = crm.toggle_milestone_complete(&milestone.id).unwrap();
        assert!(toggled.completed);

        let (goals, milestones) = crm.goals_for_customer(&c.id);
        assert_eq!(goals.len(), 1);
        assert_eq!(milestones.len(), 1);

        crm.delete_goal(&goal.id).unwrap();
        let (goals, milestones) = crm.goals_for_customer(&c.id);
        assert!(goals.is_empty());
        assert!(milestones.is_empty(), "milestones cascade with their goal");

        assert!(matches!(
            crm.delete_goal(&goal.id),
            Err(CrmError::GoalNotFound(_))
        ));
        assert!(matches!(
            crm.add_milestone("nope", "x", "2030-01-01T00:00:00Z"),
            Err(CrmError::GoalNotFound(_))
        ));
    }

    #[test]
    fn mutations_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let sale_id;
        let customer_id;
        {
            let mut crm = Crm::new(CrmDb::open_at(tmp.path()).unwrap());
            let c = crm.add_customer(form("Durable")).unwrap();
            customer_id = c.id.clone();
            sale_id = crm
                .add_sale(&c.id, 777.0, "2024-05-05T00:00:00Z")
                .unwrap()
                .id;
        }
        let crm = Crm::new(CrmDb::open_at(tmp.path()).unwrap());
        assert!(crm.customer(&customer_id).is_ok());
        assert!(crm.all_sales().iter().any(|s| s.id == sale_id));
    }
}
