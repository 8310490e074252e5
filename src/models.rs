//! Data models for payroll calculations.
//!
//! The `models` module defines the serialisable records passed into and
//! returned from the PAYE/NIS calculator.  They derive `Serialize` and
//! `Deserialize` so that the HTTP layer can accept and return them as
//! JSON without any intermediate representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An employee's earnings for one monthly pay period.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollEmployee {
    /// Identifier used to join calculation results back to the
    /// employee when producing reports.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// GRA taxpayer identification number.
    pub tin: Option<String>,
    /// National Insurance Scheme number.
    pub nis_number: Option<String>,
    pub basic_salary: f64,
    pub overtime: f64,
    pub allowances: f64,
    pub bonuses: f64,
    /// Number of children claimed for the child allowance.
    pub dependents: u32,
}

impl PayrollEmployee {
    /// Sum of every earnings component.
    pub fn gross_earnings(&self) -> f64 {
        self.basic_salary + self.overtime + self.allowances + self.bonuses
    }
}

/// PAYE and NIS breakdown for a single employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayeCalculationResult {
    pub employee_id: String,
    pub gross_earnings: f64,

    pub statutory_free_pay: f64,
    pub child_allowance: f64,
    pub overtime_tax_free: f64,
    /// Income left after NIS and all reliefs.  Never negative.
    pub taxable_income: f64,

    pub tax_band1_tax: f64,
    pub tax_band2_tax: f64,
    pub total_paye_tax: f64,

    /// Earnings subject to NIS, capped at the earnings ceiling.
    pub nisable_earnings: f64,
    pub employee_nis_contribution: f64,
    pub employer_nis_contribution: f64,

    /// Employee NIS plus PAYE.
    pub total_deductions: f64,
    /// Gross earnings minus employee NIS minus PAYE.
    pub net_pay: f64,
}

/// Totals for a payroll run together with the individual results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// One result per employee, in input order.
    pub results: Vec<PayeCalculationResult>,
    pub total_gross: f64,
    pub total_net: f64,
    pub total_paye: f64,
    pub total_employee_nis: f64,
    pub total_employer_nis: f64,
    pub employee_count: usize,
    pub generated_at: DateTime<Utc>,
}
