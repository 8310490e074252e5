//! Statutory payroll returns.
//!
//! Two formats are produced from a payroll run: the GRA Form 7B CSV and
//! the NIS CS3 contribution schedule.  Both are read by agency systems,
//! so field order, widths and padding must not change.  Results are
//! joined to employees by id; a result without a matching employee is
//! left out of the return.

use crate::error::{EngineError, Result};
use crate::models::{PayeCalculationResult, PayrollEmployee};
use std::collections::HashMap;

/// Header row of the Form 7B CSV.
pub const FORM_7B_HEADER: &str = "TIN,Last_Name,First_Name,Gross_Earnings,Tax_Deducted,NIS_Employee";

fn join_employees<'a>(
    results: &'a [PayeCalculationResult],
    employees: &'a [PayrollEmployee],
) -> impl Iterator<Item = (&'a PayeCalculationResult, &'a PayrollEmployee)> {
    let by_id: HashMap<&str, &PayrollEmployee> =
        employees.iter().map(|e| (e.id.as_str(), e)).collect();
    results.iter().filter_map(move |result| {
        let employee = by_id.get(result.employee_id.as_str()).copied();
        if employee.is_none() {
            tracing::debug!(employee_id = %result.employee_id, "no employee for result, skipping row");
        }
        employee.map(|e| (result, e))
    })
}

/// Render the GRA Form 7B CSV.
pub fn generate_gra_form7b_csv(
    results: &[PayeCalculationResult],
    employees: &[PayrollEmployee],
) -> String {
    let mut lines = vec![FORM_7B_HEADER.to_string()];
    for (result, employee) in join_employees(results, employees) {
        lines.push(format!(
            "{},{},{},{:.2},{:.2},{:.2}",
            employee.tin.as_deref().unwrap_or(""),
            employee.last_name,
            employee.first_name,
            result.gross_earnings,
            result.total_paye_tax,
            result.employee_nis_contribution,
        ));
    }
    lines.join("\n")
}

/// Render the NIS CS3 fixed-width schedule for `month` (1-12) of
/// `year`.
pub fn generate_nis_cs3_schedule(
    results: &[PayeCalculationResult],
    employees: &[PayrollEmployee],
    employer_nis: &str,
    month: u32,
    year: i32,
) -> Result<String> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::InvalidMonth(month));
    }

    let mut lines = vec![format!("NIS{employer_nis}{month:02}{year:04}")];
    for (result, employee) in join_employees(results, employees) {
        lines.push(format!(
            "{:<15}{:>12.2}{:>10.2}{:>10.2}",
            employee.nis_number.as_deref().unwrap_or(""),
            result.gross_earnings,
            result.employee_nis_contribution,
            result.employer_nis_contribution,
        ));
    }
    Ok(lines.join("\n"))
}
