//! AI insight adapter.
//!
//! Prompts are built here from entity data; the model call itself sits
//! behind [`InsightProvider`] so the crate never speaks to a network.
//! Provider and parse failures degrade to placeholder text or `None` (with
//! a `log::warn!`) rather than surfacing to callers, except
//! [`summarize_notes`], which propagates its error.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::types::{Customer, Remark, Sale, Sentiment, Task, Tier};
use crate::util::{format_inr, parse_ts};

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Insight provider error: {0}")]
    Provider(String),

    #[error("Malformed insight response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Whether the caller expects freeform markdown or a JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Freeform,
    Json,
}

#[derive(Debug, Clone)]
pub struct InsightRequest {
    pub prompt: String,
    pub kind: ResponseKind,
}

/// The model boundary. Implementations live outside this crate; tests use a
/// scripted stub.
pub trait InsightProvider {
    fn generate(&self, req: &InsightRequest) -> Result<String, InsightError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSuggestion {
    pub task: String,
    pub due_date: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesSummary {
    pub summary: String,
    #[serde(default)]
    pub action_items: Vec<TaskSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactTimeSuggestion {
    pub suggestion: String,
    pub reasoning: String,
}

const REVIEW_PLACEHOLDER: &str = "### Analysis Error\nCould not generate an AI-powered review at this time. Please check your API configuration and try again.";
const SUMMARY_PLACEHOLDER: &str = "### Analysis Error\nCould not generate AI-powered analytics insights. Please check your API configuration and try again.";
const FORECAST_PLACEHOLDER: &str =
    "### Forecast Error\nCould not generate sales forecast. Please check API configuration.";

/// Markdown performance review for one customer. Embeds the 5 most recent
/// sales and 3 most recent remarks.
pub fn performance_review(
    provider: &dyn InsightProvider,
    customer: &Customer,
    sales: &[Sale],
    remarks: &[Remark],
) -> String {
    let sales_summary = if sales.is_empty() {
        "No recent sales.".to_string()
    } else {
        let lines: Vec<String> = sales
            .iter()
            .take(5)
            .map(|s| format!("₹{} on {}", format_inr(s.amount), date_label(&s.date)))
            .collect();
        format!("Recent sales: {}.", lines.join(", "))
    };
    let remarks_summary = if remarks.is_empty() {
        "No recent remarks.".to_string()
    } else {
        let lines: Vec<String> = remarks
            .iter()
            .take(3)
            .map(|r| format!("\"{}\" on {}", r.remark, date_label(&r.timestamp)))
            .collect();
        format!("Recent remarks: {}.", lines.join("; "))
    };

    let prompt = format!(
        "Analyze the following customer for a B2B sales representative and provide a concise \
         performance review in markdown format.\n\
         The review should be brief (2-3 short paragraphs), insightful, and suggest a next action.\n\n\
         **Customer Data:**\n\
         - Name: {}\n\
         - Tier: {}\n\
         - Location: {}, {}\n\
         - Sales This Month: ₹{}\n\
         - Average 6-Month Sales: ₹{}\n\
         - Outstanding Balance: ₹{}\n\
         - Days Since Last Order: {}\n\n\
         **Sales History:**\n{}\n\n\
         **Interaction Remarks:**\n{}\n\n\
         **Analysis Guidelines:**\n\
         - Start with a bold summary heading.\n\
         - Evaluate their current performance against their average.\n\
         - Mention any risks (e.g., high outstanding balance, long time since last order).\n\
         - Conclude with a clear, actionable recommendation for the sales rep.",
        customer.name,
        customer.tier.as_str(),
        customer.district,
        customer.state,
        format_inr(customer.sales_this_month),
        format_inr(customer.avg_6mo_sales),
        format_inr(customer.outstanding_balance),
        customer.days_since_last_order,
        sales_summary,
        remarks_summary,
    );

    freeform(provider, prompt, REVIEW_PLACEHOLDER)
}

/// Markdown book-of-business summary for a manager.
pub fn analytics_summary(
    provider: &dyn InsightProvider,
    customers: &[Customer],
    tasks: &[Task],
) -> String {
    let now = Utc::now();
    let total_outstanding: f64 = customers.iter().map(|c| c.outstanding_balance).sum();
    let total_sales_this_month: f64 = customers.iter().map(|c| c.sales_this_month).sum();
    let active = customers.iter().filter(|c| c.sales_this_month > 0.0).count();
    let overdue = tasks
        .iter()
        .filter(|t| !t.completed && parse_ts(&t.due_date).is_some_and(|d| d < now))
        .count();
    let tier_counts: Vec<String> = Tier::all()
        .iter()
        .filter_map(|tier| {
            let n = customers.iter().filter(|c| c.tier == *tier).count();
            (n > 0).then(|| format!("{}: {n}", tier.as_str()))
        })
        .collect();

    let prompt = format!(
        "Analyze the following overall CRM data and provide a concise summary for a sales \
         manager in markdown format.\n\
         The summary should highlight key trends, potential issues, and strategic recommendations. \
         Format it with sections for \"Key Highlights\", \"Areas for Attention\", and \"Recommendations\".\n\n\
         **Overall CRM Data:**\n\
         - Total Customers: {}\n\
         - Active Customers (This Month): {}\n\
         - Total Sales This Month: ₹{}\n\
         - Total Outstanding Balance: ₹{}\n\
         - Overdue Tasks: {}\n\
         - Tier Distribution: {{{}}}",
        customers.len(),
        active,
        format_inr(total_sales_this_month),
        format_inr(total_outstanding),
        overdue,
        tier_counts.join(", "),
    );

    freeform(provider, prompt, SUMMARY_PLACEHOLDER)
}

/// Next-quarter forecast from the 50 most recent transactions.
pub fn sales_forecast(provider: &dyn InsightProvider, sales: &[Sale]) -> String {
    let mut recent: Vec<&Sale> = sales.iter().collect();
    recent.sort_by(|a, b| ts_or_epoch(&b.date).cmp(&ts_or_epoch(&a.date)));
    recent.truncate(50);
    let history: Vec<String> = recent
        .iter()
        .map(|s| format!("₹{} on {}", format_inr(s.amount), date_label(&s.date)))
        .collect();

    let prompt = format!(
        "You are a sales analyst AI. Analyze the following historical sales data and provide a \
         concise sales forecast for the next business quarter.\n\
         The data contains sale amounts and dates. Today's date is {}.\n\
         Present your forecast in markdown format.\n\
         Include a \"Key Trends\" section identifying patterns (e.g., seasonality, growth/decline).\n\
         Include a \"Next Quarter Forecast\" section with a projected sales range and your reasoning.\n\
         Conclude with \"Recommendations\" suggesting 1-2 actions to improve sales.\n\n\
         **Historical Sales Data (last 50 transactions):**\n{}",
        Utc::now().format("%Y-%m-%d"),
        history.join("\n"),
    );

    freeform(provider, prompt, FORECAST_PLACEHOLDER)
}

/// Classify a remark's sentiment. `None` on provider failure, malformed
/// JSON, or an out-of-enum label.
pub fn analyze_remark_sentiment(provider: &dyn InsightProvider, text: &str) -> Option<Sentiment> {
    #[derive(Deserialize)]
    struct Response {
        sentiment: Sentiment,
    }

    let prompt = format!(
        "Analyze the sentiment of the following CRM remark.\n\
         Classify it as 'Positive', 'Neutral', 'Negative', or 'Mixed'.\n\
         Respond ONLY with a JSON object containing the \"sentiment\" key.\n\n\
         **Remark:**\n\"{text}\"\n\n\
         **Your Response (JSON):**"
    );
    json::<Response>(provider, prompt, "sentiment").map(|r| r.sentiment)
}

/// Detect an actionable task in a remark. `None` when the provider fails,
/// the JSON is malformed, or either field is missing (the model answers `{}`
/// when it finds nothing).
pub fn task_from_remark(provider: &dyn InsightProvider, text: &str) -> Option<TaskSuggestion> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Response {
        task: Option<String>,
        due_date: Option<String>,
    }

    let prompt = format!(
        "You are an intelligent assistant that detects actionable tasks from text. Analyze the \
         following remark from a CRM.\n\
         If you detect a clear task with an implied or explicit due date, respond with a JSON \
         object containing 'task' and 'dueDate'. The dueDate must be a full ISO 8601 string.\n\
         Use today's date, {}, as a reference for relative dates like \"next week\" or \"tomorrow\".\n\
         If no actionable task is found, respond with an empty JSON object {{}}.\n\n\
         **Remark:**\n\"{text}\"\n\n\
         **Your Response (JSON):**",
        Utc::now().to_rfc3339(),
    );
    let response = json::<Response>(provider, prompt, "task suggestion")?;
    match (response.task, response.due_date) {
        (Some(task), Some(due_date)) => Some(TaskSuggestion { task, due_date }),
        _ => None,
    }
}

/// Summarize meeting notes into markdown plus action items. Unlike the
/// other adapter functions this propagates failure; callers show the error.
pub fn summarize_notes(
    provider: &dyn InsightProvider,
    notes: &str,
) -> Result<NotesSummary, InsightError> {
    let prompt = format!(
        "You are an intelligent assistant for a CRM. Analyze the following meeting or call notes.\n\
         1. Provide a concise summary of the conversation in markdown format.\n\
         2. Extract any clear, actionable tasks for the sales representative.\n\
         3. For each task, suggest a due date. Use today's date, {}, as a reference for relative dates.\n\n\
         Respond with a JSON object containing \"summary\" and \"actionItems\" (a list of \
         {{task, dueDate}} objects).\n\n\
         **Notes:**\n\"{notes}\"\n\n\
         **Your Response (JSON):**",
        Utc::now().to_rfc3339(),
    );
    let raw = provider.generate(&InsightRequest {
        prompt,
        kind: ResponseKind::Json,
    })?;
    Ok(serde_json::from_str(raw.trim())?)
}

/// Suggest when to reach a customer, from interaction timestamps. With
/// fewer than 3 remarks there is no pattern to read, so a canned answer is
/// returned without calling the provider.
pub fn best_contact_time(
    provider: &dyn InsightProvider,
    remarks: &[Remark],
) -> Option<ContactTimeSuggestion> {
    if remarks.len() < 3 {
        return Some(ContactTimeSuggestion {
            suggestion: "Anytime".to_string(),
            reasoning: "Not enough interaction data to provide a specific suggestion.".to_string(),
        });
    }

    let history: Vec<String> = remarks
        .iter()
        .map(|r| {
            let when = parse_ts(&r.timestamp)
                .map(|d| d.format("%A %I:%M %p").to_string())
                .unwrap_or_else(|| r.timestamp.clone());
            format!("- Remark left on {when}")
        })
        .collect();

    let prompt = format!(
        "You are a CRM assistant AI. Analyze the following customer interaction timestamps to \
         identify a pattern for the best time to contact them.\n\
         Today's date is {}.\n\
         Based on the pattern, provide a concise suggestion (e.g., \"Weekday Mornings\") and a \
         brief reasoning.\n\
         Respond with a JSON object containing \"suggestion\" and \"reasoning\".\n\n\
         **Interaction History:**\n{}",
        Utc::now().format("%Y-%m-%d"),
        history.join("\n"),
    );
    json::<ContactTimeSuggestion>(provider, prompt, "contact time")
}

/// Natural-language search: the provider maps a query to matching customer
/// ids. Empty on any failure.
pub fn interpret_search(
    provider: &dyn InsightProvider,
    query: &str,
    customers: &[Customer],
) -> Vec<String> {
    let roster = match serde_json::to_string(customers) {
        Ok(json) => json,
        Err(err) => {
            log::warn!("Failed to serialize customers for search: {err}");
            return Vec::new();
        }
    };

    let prompt = format!(
        "You are an intelligent search API for a CRM. Your task is to interpret a natural \
         language query and find matching customers from a provided JSON list.\n\
         Respond ONLY with a JSON array of strings, where each string is the 'id' of a matching \
         customer. Do not provide any explanation or other text.\n\
         If no customers match, return an empty array [].\n\n\
         **User Query:**\n\"{query}\"\n\n\
         **Customer List (JSON):**\n{roster}\n\n\
         **Your Response (JSON array of IDs only):**"
    );
    json::<Vec<String>>(provider, prompt, "search").unwrap_or_default()
}

fn freeform(provider: &dyn InsightProvider, prompt: String, placeholder: &str) -> String {
    match provider.generate(&InsightRequest {
        prompt,
        kind: ResponseKind::Freeform,
    }) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("Insight provider failed: {err}");
            placeholder.to_string()
        }
    }
}

fn json<T: serde::de::DeserializeOwned>(
    provider: &dyn InsightProvider,
    prompt: String,
    what: &str,
) -> Option<T> {
    let raw = match provider.generate(&InsightRequest {
        prompt,
        kind: ResponseKind::Json,
    }) {
        Ok(raw) => raw,
        Err(err) => {
            log::warn!("Insight provider failed ({what}): {err}");
            return None;
        }
    };
    match serde_json::from_str(raw.trim()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            log::warn!("Malformed {what} response: {err}");
            None
        }
    }
}

fn date_label(ts: &str) -> String {
    parse_ts(ts)
        .map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn ts_or_epoch(ts: &str) -> chrono::DateTime<Utc> {
    parse_ts(ts).unwrap_or(chrono::DateTime::<Utc>::UNIX_EPOCH)
}
