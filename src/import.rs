//! CSV bulk import.
//!
//! Header-keyed so column order does not matter. Missing required headers
//! is the only fatal error; bad rows are skipped or patched with defaults
//! so one sloppy line never sinks a whole import.

use csv::ReaderBuilder;
use thiserror::Error;

use crate::types::{CustomerDraft, Tier};

/// Header row for the downloadable template, with one example line.
pub const TEMPLATE_HEADERS: &str =
    "name,contact,alternateContact,state,district,tier,salesThisMonth,avg6MoSales,outstandingBalance,daysSinceLastOrder";
pub const TEMPLATE_EXAMPLE: &str =
    "Amit Kumar,9988776655,8877665544,Maharashtra,Pune,Silver,5000,8000,2500,30";

const REQUIRED_HEADERS: [&str; 5] = ["name", "contact", "state", "district", "tier"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV headers are missing required columns ({0})")]
    MissingHeaders(String),

    #[error("Unreadable CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result of a parse: importable drafts plus the count of rows skipped for
/// having fewer fields than the header row.
#[derive(Debug)]
pub struct CsvImport {
    pub drafts: Vec<CustomerDraft>,
    pub skipped: usize,
}

/// Parse customer rows out of CSV text.
///
/// Field defaults paper over gaps: missing name becomes "Unnamed", missing
/// contact "0000000000", missing state/district "Unknown", an unrecognized
/// tier label becomes Bronze, and non-numeric metrics become 0.
pub fn parse_customers_csv(text: &str) -> Result<CsvImport, ImportError> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.trim().as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingHeaders(missing.join(", ")));
    }

    let field = |record: &csv::StringRecord, name: &str| -> String {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| record.get(i))
            .unwrap_or("")
            .to_string()
    };

    let mut drafts = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                log::warn!("Skipping unreadable CSV row: {err}");
                skipped += 1;
                continue;
            }
        };
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue; // blank line
        }
        if record.len() < headers.len() {
            skipped += 1;
            continue;
        }

        let or_default = |value: String, fallback: &str| {
            if value.is_empty() {
                fallback.to_string()
            } else {
                value
            }
        };
        let number = |name: &str| field(&record, name).parse::<f64>().unwrap_or(0.0);

        let alternate = field(&record, "alternateContact");
        drafts.push(CustomerDraft {
            name: or_default(field(&record, "name"), "Unnamed"),
            contact: or_default(field(&record, "contact"), "0000000000"),
            alternate_contact: (!alternate.is_empty()).then_some(alternate),
            state: or_default(field(&record, "state"), "Unknown"),
            district: or_default(field(&record, "district"), "Unknown"),
            tier: Tier::parse(&field(&record, "tier")).unwrap_or(Tier::Bronze),
            sales_this_month: number("salesThisMonth"),
            avg_6mo_sales: number("avg6MoSales"),
            outstanding_balance: number("outstandingBalance"),
            days_since_last_order: field(&record, "daysSinceLastOrder")
                .parse::<i64>()
                .unwrap_or(0),
        });
    }

    Ok(CsvImport { drafts, skipped })
}
