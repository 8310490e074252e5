//! Payroll run engine.
//!
//! The `engine` module turns a list of [`PayrollEmployee`]s into a
//! [`PayrollSummary`].  It uses the [`rayon`] crate to parallelise
//! per-employee calculations across multiple CPU cores; the totals are
//! plain sums, so the order in which results are folded does not matter.

use crate::models::{PayeCalculationResult, PayrollEmployee, PayrollSummary};
use crate::tax::TaxCalculator;
use chrono::{DateTime, Utc};
use rayon::prelude::*;

/// Run payroll for `employees`, stamping the summary with the current
/// time.
pub fn process_payroll(
    employees: &[PayrollEmployee],
    calculator: &dyn TaxCalculator,
) -> PayrollSummary {
    process_payroll_at(employees, calculator, Utc::now())
}

/// Run payroll for `employees` with an explicit generation timestamp.
pub fn process_payroll_at(
    employees: &[PayrollEmployee],
    calculator: &dyn TaxCalculator,
    generated_at: DateTime<Utc>,
) -> PayrollSummary {
    let results: Vec<PayeCalculationResult> = employees
        .par_iter()
        .map(|employee| calculator.calculate(employee))
        .collect();

    let mut summary = PayrollSummary {
        results: Vec::new(),
        total_gross: 0.0,
        total_net: 0.0,
        total_paye: 0.0,
        total_employee_nis: 0.0,
        total_employer_nis: 0.0,
        employee_count: results.len(),
        generated_at,
    };
    for result in &results {
        summary.total_gross += result.gross_earnings;
        summary.total_net += result.net_pay;
        summary.total_paye += result.total_paye_tax;
        summary.total_employee_nis += result.employee_nis_contribution;
        summary.total_employer_nis += result.employer_nis_contribution;
    }
    summary.results = results;

    tracing::debug!(
        jurisdiction = calculator.jurisdiction(),
        employees = summary.employee_count,
        total_gross = summary.total_gross,
        total_paye = summary.total_paye,
        "processed payroll"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaxConfig;
    use crate::tax::GuyanaPayeCalculator;

    fn staff() -> Vec<PayrollEmployee> {
        [("A", 150_000.0), ("B", 300_000.0), ("C", 520_000.0)]
            .into_iter()
            .map(|(id, basic_salary)| PayrollEmployee {
                id: id.into(),
                basic_salary,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn totals_match_individual_results() {
        let calc = GuyanaPayeCalculator::new(TaxConfig::guyana_2025());
        let summary = process_payroll(&staff(), &calc);

        assert_eq!(summary.employee_count, 3);
        assert_eq!(summary.total_gross, 970_000.0);
        let ids: Vec<&str> = summary.results.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);

        let paye: f64 = summary.results.iter().map(|r| r.total_paye_tax).sum();
        let net: f64 = summary.results.iter().map(|r| r.net_pay).sum();
        assert!((summary.total_paye - paye).abs() < 1e-6);
        assert!((summary.total_net - net).abs() < 1e-6);
        assert!(
            (summary.total_employer_nis - (150_000.0 * 0.084 + 23_520.0 + 23_520.0)).abs() < 1e-6
        );
    }

    #[test]
    fn empty_run_has_zero_totals() {
        let calc = GuyanaPayeCalculator::new(TaxConfig::guyana_2025());
        let at = Utc::now();
        let summary = process_payroll_at(&[], &calc, at);
        assert_eq!(summary.employee_count, 0);
        assert_eq!(summary.total_gross, 0.0);
        assert_eq!(summary.generated_at, at);
    }
}
