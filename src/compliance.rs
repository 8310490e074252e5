//! Client compliance scoring.
//!
//! A client's standing is judged by five independent checks, each worth
//! a fixed number of points out of 100: TIN (25), NIS (20), VAT (15),
//! business registration (10) and filing history (30).  The score is the
//! share of points earned, and the status bucket follows from the score:
//! 80 and above is compliant, 50 and above is at risk, anything lower is
//! non-compliant.
//!
//! Missing fields never cause an error.  Each absent identifier maps to a
//! fixed branch; an absent VAT number still earns half its weight since
//! many entities are below the VAT registration threshold.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const TIN_WEIGHT: f64 = 25.0;
pub const NIS_WEIGHT: f64 = 20.0;
pub const VAT_WEIGHT: f64 = 15.0;
pub const BUSINESS_REGISTRATION_WEIGHT: f64 = 10.0;
pub const FILINGS_WEIGHT: f64 = 30.0;

/// Points lost per overdue filing.
const OVERDUE_PENALTY: f64 = 10.0;
/// Open filings due within this many days count as pending.
const PENDING_WINDOW_DAYS: i64 = 7;

const COMPLIANT_THRESHOLD: u32 = 80;
const AT_RISK_THRESHOLD: u32 = 50;

/// Where a client's filing currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Draft,
    Pending,
    Submitted,
    Approved,
    Rejected,
}

impl FilingStatus {
    /// Submitted and approved filings no longer count against the client.
    pub fn is_closed(self) -> bool {
        matches!(self, FilingStatus::Submitted | FilingStatus::Approved)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingRecord {
    pub name: String,
    pub due_date: NaiveDate,
    pub status: FilingStatus,
}

/// The registration details and filing history of one client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceClient {
    pub tin: Option<String>,
    pub nis_number: Option<String>,
    pub vat_number: Option<String>,
    pub business_registration: Option<String>,
    pub filings: Vec<FilingRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckStatus {
    Compliant,
    Warning,
    NonCompliant,
    Unknown,
}

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub name: String,
    pub status: CheckStatus,
    /// Maximum points this check can contribute.
    pub weight: f64,
    /// Points actually awarded.
    pub earned: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl ComplianceCheck {
    fn new(name: &str, status: CheckStatus, weight: f64, earned: f64, details: String) -> Self {
        Self {
            name: name.to_string(),
            status,
            weight,
            earned,
            details: Some(details),
            due_date: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    Compliant,
    AtRisk,
    NonCompliant,
}

impl ComplianceStatus {
    pub fn from_score(score: u32) -> Self {
        if score >= COMPLIANT_THRESHOLD {
            ComplianceStatus::Compliant
        } else if score >= AT_RISK_THRESHOLD {
            ComplianceStatus::AtRisk
        } else {
            ComplianceStatus::NonCompliant
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientComplianceResult {
    /// 0 to 100.
    pub score: u32,
    pub status: ComplianceStatus,
    pub checks: Vec<ComplianceCheck>,
    pub summary: String,
}

fn has_min_len(value: Option<&str>, min: usize) -> bool {
    value.is_some_and(|v| v.chars().count() >= min)
}

fn identifier_check(
    name: &str,
    valid: bool,
    weight: f64,
    missing: (CheckStatus, f64),
    details: (&str, &str),
) -> ComplianceCheck {
    if valid {
        ComplianceCheck::new(name, CheckStatus::Compliant, weight, weight, details.0.into())
    } else {
        ComplianceCheck::new(name, missing.0, weight, missing.1, details.1.into())
    }
}

fn filings_check(filings: &[FilingRecord], today: NaiveDate) -> ComplianceCheck {
    const NAME: &str = "Filings";
    if filings.is_empty() {
        return ComplianceCheck::new(
            NAME,
            CheckStatus::Unknown,
            FILINGS_WEIGHT,
            FILINGS_WEIGHT * 0.5,
            "No filings tracked".into(),
        );
    }

    let open = filings.iter().filter(|f| !f.status.is_closed());
    let mut overdue: Vec<NaiveDate> = Vec::new();
    let mut pending: Vec<NaiveDate> = Vec::new();
    for filing in open {
        let days = (filing.due_date - today).num_days();
        if days < 0 {
            overdue.push(filing.due_date);
        } else if days <= PENDING_WINDOW_DAYS {
            pending.push(filing.due_date);
        }
    }

    if !overdue.is_empty() {
        let penalty = FILINGS_WEIGHT.min(overdue.len() as f64 * OVERDUE_PENALTY);
        let mut check = ComplianceCheck::new(
            NAME,
            CheckStatus::NonCompliant,
            FILINGS_WEIGHT,
            FILINGS_WEIGHT - penalty,
            format!("{} overdue filing(s)", overdue.len()),
        );
        check.due_date = overdue.iter().min().copied();
        check
    } else if !pending.is_empty() {
        let mut check = ComplianceCheck::new(
            NAME,
            CheckStatus::Warning,
            FILINGS_WEIGHT,
            FILINGS_WEIGHT * 0.75,
            format!("{} filing(s) due within {PENDING_WINDOW_DAYS} days", pending.len()),
        );
        check.due_date = pending.iter().min().copied();
        check
    } else {
        ComplianceCheck::new(
            NAME,
            CheckStatus::Compliant,
            FILINGS_WEIGHT,
            FILINGS_WEIGHT,
            "All filings up to date".into(),
        )
    }
}

fn summarize(status: ComplianceStatus, checks: &[ComplianceCheck]) -> String {
    let count = |s: CheckStatus| checks.iter().filter(|c| c.status == s).count();
    let compliant = count(CheckStatus::Compliant);
    let warnings = count(CheckStatus::Warning);
    let failing = count(CheckStatus::NonCompliant);

    match status {
        ComplianceStatus::Compliant => format!(
            "Client is compliant: {compliant} of {} checks passed.",
            checks.len()
        ),
        ComplianceStatus::AtRisk => format!(
            "Client is at risk: {warnings} warning(s) and {failing} non-compliant check(s) need attention."
        ),
        ComplianceStatus::NonCompliant => format!(
            "Client is non-compliant: {failing} check(s) failing, {warnings} warning(s), {compliant} passed."
        ),
    }
}

/// Score a client's compliance as of `today`.
pub fn calculate_client_compliance(
    client: &ComplianceClient,
    today: NaiveDate,
) -> ClientComplianceResult {
    let checks = vec![
        identifier_check(
            "TIN",
            has_min_len(client.tin.as_deref(), 8),
            TIN_WEIGHT,
            (CheckStatus::NonCompliant, 0.0),
            ("TIN on file", "TIN missing or invalid"),
        ),
        identifier_check(
            "NIS",
            has_min_len(client.nis_number.as_deref(), 6),
            NIS_WEIGHT,
            (CheckStatus::Warning, 0.0),
            ("NIS number on file", "NIS number missing"),
        ),
        identifier_check(
            "VAT",
            has_min_len(client.vat_number.as_deref(), 6),
            VAT_WEIGHT,
            (CheckStatus::Warning, VAT_WEIGHT * 0.5),
            ("VAT registration on file", "Not VAT registered"),
        ),
        identifier_check(
            "Business Registration",
            has_min_len(client.business_registration.as_deref(), 4),
            BUSINESS_REGISTRATION_WEIGHT,
            (CheckStatus::Warning, 0.0),
            ("Business registration on file", "Business registration missing"),
        ),
        filings_check(&client.filings, today),
    ];

    let total: f64 = checks.iter().map(|c| c.weight).sum();
    let earned: f64 = checks.iter().map(|c| c.earned).sum();
    let score = if total > 0.0 {
        (100.0 * earned / total).round() as u32
    } else {
        0
    };
    let status = ComplianceStatus::from_score(score);

    tracing::debug!(score, ?status, "scored client compliance");
    ClientComplianceResult {
        score,
        status,
        summary: summarize(status, &checks),
        checks,
    }
}
