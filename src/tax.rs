//! PAYE and NIS calculation.
//!
//! The `tax` module defines the [`TaxCalculator`] abstraction used by the
//! payroll engine and its Guyana implementation.  The arithmetic lives in
//! [`calculate_paye`], a pure function over an employee record and the
//! [`TaxConfig`] in force, so alternative tax years only need a
//! different configuration.

use crate::config::TaxConfig;
use crate::models::{PayeCalculationResult, PayrollEmployee};

/// A tax calculator turns one employee's earnings into a PAYE/NIS
/// breakdown.  Each jurisdiction provides its own implementation.
///
/// Tax calculators must be thread-safe (`Send + Sync`) because the
/// engine invokes them concurrently across multiple threads.
pub trait TaxCalculator: Send + Sync {
    /// Returns the canonical jurisdiction code (e.g. `"GY"`).
    fn jurisdiction(&self) -> &str;
    /// Calculate deductions and net pay for `employee`.
    fn calculate(&self, employee: &PayrollEmployee) -> PayeCalculationResult;
}

/// Guyana PAYE with two progressive bands and NIS contributions.
#[derive(Debug, Clone)]
pub struct GuyanaPayeCalculator {
    config: TaxConfig,
}

impl GuyanaPayeCalculator {
    pub fn new(config: TaxConfig) -> Self {
        Self { config }
    }
}

impl TaxCalculator for GuyanaPayeCalculator {
    fn jurisdiction(&self) -> &str {
        "GY"
    }

    fn calculate(&self, employee: &PayrollEmployee) -> PayeCalculationResult {
        calculate_paye(employee, &self.config)
    }
}

/// Calculate PAYE, NIS and net pay for one monthly pay period.
///
/// Inputs are not validated: negative amounts simply flow through the
/// arithmetic.  Only taxable income is floored at zero.
pub fn calculate_paye(employee: &PayrollEmployee, config: &TaxConfig) -> PayeCalculationResult {
    let gross_earnings = employee.gross_earnings();

    let nisable_earnings = gross_earnings.min(config.nis_earnings_ceiling);
    let employee_nis_contribution =
        (nisable_earnings * config.nis_employee_rate).min(config.max_employee_contribution);
    let employer_nis_contribution =
        (nisable_earnings * config.nis_employer_rate).min(config.max_employer_contribution);

    let children = employee.dependents.min(config.max_child_allowance_children);
    let child_allowance = f64::from(children) * config.child_allowance_per_child;
    let overtime_tax_free = employee.overtime.min(config.overtime_tax_free_limit);

    let taxable_income = (gross_earnings
        - employee_nis_contribution
        - config.statutory_free_pay
        - child_allowance
        - overtime_tax_free)
        .max(0.0);

    let tax_band1_tax = taxable_income.min(config.band1_limit) * config.band1_rate;
    let tax_band2_tax = if taxable_income > config.band1_limit {
        (taxable_income - config.band1_limit) * config.band2_rate
    } else {
        0.0
    };
    let total_paye_tax = tax_band1_tax + tax_band2_tax;

    PayeCalculationResult {
        employee_id: employee.id.clone(),
        gross_earnings,
        statutory_free_pay: config.statutory_free_pay,
        child_allowance,
        overtime_tax_free,
        taxable_income,
        tax_band1_tax,
        tax_band2_tax,
        total_paye_tax,
        nisable_earnings,
        employee_nis_contribution,
        employer_nis_contribution,
        total_deductions: employee_nis_contribution + total_paye_tax,
        net_pay: gross_earnings - employee_nis_contribution - total_paye_tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(basic_salary: f64) -> PayrollEmployee {
        PayrollEmployee {
            id: "E1".into(),
            first_name: "Test".into(),
            last_name: "Employee".into(),
            basic_salary,
            ..Default::default()
        }
    }

    /// Config with NIS switched off so taxable income can be targeted
    /// directly.
    fn no_nis_config() -> TaxConfig {
        TaxConfig {
            nis_employee_rate: 0.0,
            nis_employer_rate: 0.0,
            max_employee_contribution: 0.0,
            max_employer_contribution: 0.0,
            ..TaxConfig::guyana_2025()
        }
    }

    #[test]
    fn test_income_below_free_pay_is_untaxed() {
        let result = calculate_paye(&employee(120_000.0), &TaxConfig::guyana_2025());
        assert_eq!(result.taxable_income, 0.0);
        assert_eq!(result.total_paye_tax, 0.0);
        assert_eq!(result.employee_nis_contribution, 120_000.0 * 0.056);
        assert_eq!(
            result.net_pay,
            result.gross_earnings - result.employee_nis_contribution
        );
    }

    #[test]
    fn test_child_allowance_keeps_income_untaxed() {
        let mut e = employee(155_000.0);
        e.dependents = 3;
        let result = calculate_paye(&e, &TaxConfig::guyana_2025());
        // 155,000 - 8,680 NIS - 130,000 - 30,000 is below zero.
        assert_eq!(result.employee_nis_contribution, 8_680.0);
        assert_eq!(result.child_allowance, 30_000.0);
        assert_eq!(result.taxable_income, 0.0);
        assert_eq!(result.total_paye_tax, 0.0);

        e.dependents = 0;
        assert!(calculate_paye(&e, &TaxConfig::guyana_2025()).total_paye_tax > 0.0);
    }

    #[test]
    fn test_overtime_relief_keeps_income_untaxed() {
        let mut e = employee(130_000.0);
        e.overtime = 50_000.0;
        let result = calculate_paye(&e, &TaxConfig::guyana_2025());
        assert_eq!(result.overtime_tax_free, 50_000.0);
        assert_eq!(result.total_paye_tax, 0.0);
    }

    #[test]
    fn test_typical_salary() {
        let result = calculate_paye(&employee(300_000.0), &TaxConfig::guyana_2025());
        assert_eq!(result.nisable_earnings, 280_000.0);
        assert_eq!(result.employee_nis_contribution, 15_680.0);
        assert_eq!(result.employer_nis_contribution, 23_520.0);
        // 300,000 - 15,680 - 130,000
        assert_eq!(result.taxable_income, 154_320.0);
        assert_eq!(result.tax_band1_tax, 38_580.0);
        assert_eq!(result.tax_band2_tax, 0.0);
        assert_eq!(result.total_deductions, 15_680.0 + 38_580.0);
        assert_eq!(result.net_pay, 300_000.0 - 15_680.0 - 38_580.0);
    }

    #[test]
    fn test_band_boundary() {
        let config = no_nis_config();
        let at_limit = calculate_paye(&employee(130_000.0 + 260_000.0), &config);
        assert_eq!(at_limit.taxable_income, 260_000.0);
        assert_eq!(at_limit.tax_band2_tax, 0.0);
        assert_eq!(at_limit.tax_band1_tax, 65_000.0);

        let above = calculate_paye(&employee(130_000.0 + 261_000.0), &config);
        assert_eq!(above.taxable_income, 261_000.0);
        assert!((above.tax_band2_tax - 350.0).abs() < 1e-9);
        assert!((above.total_paye_tax - 65_350.0).abs() < 1e-9);
    }

    #[test]
    fn test_child_allowance_caps_at_three() {
        let config = TaxConfig::guyana_2025();
        let mut three = employee(400_000.0);
        three.dependents = 3;
        let mut four = three.clone();
        four.dependents = 4;

        let a = calculate_paye(&three, &config);
        let b = calculate_paye(&four, &config);
        assert_eq!(a.child_allowance, 30_000.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_overtime_relief_is_capped() {
        let config = TaxConfig::guyana_2025();
        let mut e = employee(200_000.0);
        e.overtime = 20_000.0;
        assert_eq!(calculate_paye(&e, &config).overtime_tax_free, 20_000.0);
        e.overtime = 80_000.0;
        assert_eq!(calculate_paye(&e, &config).overtime_tax_free, 50_000.0);
    }

    #[test]
    fn test_all_components_count_towards_gross() {
        let mut e = employee(100_000.0);
        e.overtime = 10_000.0;
        e.allowances = 5_000.0;
        e.bonuses = 2_500.0;
        let result = calculate_paye(&e, &TaxConfig::guyana_2025());
        assert_eq!(result.gross_earnings, 117_500.0);
    }

    #[test]
    fn test_negative_input_propagates() {
        let result = calculate_paye(&employee(-50_000.0), &TaxConfig::guyana_2025());
        assert_eq!(result.taxable_income, 0.0);
        assert!(result.net_pay < 0.0);
    }

    #[test]
    fn test_calculator_uses_its_config() {
        let calc = GuyanaPayeCalculator::new(no_nis_config());
        assert_eq!(calc.jurisdiction(), "GY");
        let result = calc.calculate(&employee(150_000.0));
        assert_eq!(result.employee_nis_contribution, 0.0);
        assert_eq!(result.taxable_income, 20_000.0);
        assert_eq!(result.total_paye_tax, 5_000.0);
    }
}
