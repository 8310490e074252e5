//! VAT return calculation.

use serde::{Deserialize, Serialize};

/// Sales and purchase figures for one VAT period.  Every field other
/// than `standard_sales` defaults to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VatInput {
    pub standard_sales: f64,
    pub zero_rated_sales: f64,
    pub exempt_sales: f64,
    pub standard_purchases: f64,
    /// Signed correction applied after netting output against input VAT.
    pub adjustments: f64,
}

impl VatInput {
    pub fn new(standard_sales: f64) -> Self {
        Self {
            standard_sales,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatCalculation {
    pub standard_sales: f64,
    pub zero_rated_sales: f64,
    pub exempt_sales: f64,
    pub total_sales: f64,
    pub standard_purchases: f64,
    pub vat_rate: f64,
    pub output_vat: f64,
    pub input_vat: f64,
    pub net_vat: f64,
    pub adjustments: f64,
    /// May be negative, in which case the business is owed a refund.
    pub total_vat_due: f64,
}

impl VatCalculation {
    pub fn is_refund(&self) -> bool {
        self.total_vat_due < 0.0
    }
}

/// Compute output, input and net VAT at `rate`.  Negative positions are
/// reported as-is.
pub fn calculate_vat(input: &VatInput, rate: f64) -> VatCalculation {
    let output_vat = input.standard_sales * rate;
    let input_vat = input.standard_purchases * rate;
    let net_vat = output_vat - input_vat;

    VatCalculation {
        standard_sales: input.standard_sales,
        zero_rated_sales: input.zero_rated_sales,
        exempt_sales: input.exempt_sales,
        total_sales: input.standard_sales + input.zero_rated_sales + input.exempt_sales,
        standard_purchases: input.standard_purchases,
        vat_rate: rate,
        output_vat,
        input_vat,
        net_vat,
        adjustments: input.adjustments,
        total_vat_due: net_vat + input.adjustments,
    }
}
