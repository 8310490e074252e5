//! Versioned tax configuration.
//!
//! Thresholds and rates change with each national budget, so they are
//! carried as data rather than code.  A [`TaxConfig`] describes one
//! set of monthly PAYE/NIS/VAT parameters together with the date range
//! in which it is in force, and a [`TaxConfigSet`] resolves which
//! configuration applies on a given date.  Configurations may be
//! compiled in ([`TaxConfig::guyana_2025`]) or loaded from versioned
//! JSON files stored in a directory.

use crate::error::{EngineError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tolerance used when checking precomputed NIS caps against
/// ceiling x rate.
const CAP_TOLERANCE: f64 = 0.01;

/// Monthly PAYE, NIS and VAT parameters for one tax year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Version label, e.g. `"GY-2025"`.  Loading a file with the same
    /// version as an existing configuration replaces it.
    pub version: String,
    /// First day on which this configuration applies.
    pub effective_from: NaiveDate,
    /// Last day on which this configuration applies.  `None` means the
    /// configuration stays in force until a later one supersedes it.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,

    pub statutory_free_pay: f64,
    /// Upper bound of the first PAYE band, applied to taxable income.
    pub band1_limit: f64,
    pub band1_rate: f64,
    pub band2_rate: f64,

    pub child_allowance_per_child: f64,
    pub max_child_allowance_children: u32,
    pub overtime_tax_free_limit: f64,

    pub nis_earnings_ceiling: f64,
    pub nis_employee_rate: f64,
    pub nis_employer_rate: f64,
    /// Precomputed `nis_earnings_ceiling * nis_employee_rate`.
    pub max_employee_contribution: f64,
    /// Precomputed `nis_earnings_ceiling * nis_employer_rate`.
    pub max_employer_contribution: f64,

    pub vat_rate: f64,
}

impl TaxConfig {
    /// The 2025 Guyana monthly parameters.  Stays in force until a later
    /// configuration is registered.
    pub fn guyana_2025() -> Self {
        Self {
            version: "GY-2025".to_string(),
            effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN),
            effective_to: None,
            statutory_free_pay: 130_000.0,
            band1_limit: 260_000.0,
            band1_rate: 0.25,
            band2_rate: 0.35,
            child_allowance_per_child: 10_000.0,
            max_child_allowance_children: 3,
            overtime_tax_free_limit: 50_000.0,
            nis_earnings_ceiling: 280_000.0,
            nis_employee_rate: 0.056,
            nis_employer_rate: 0.084,
            max_employee_contribution: 15_680.0,
            max_employer_contribution: 23_520.0,
            vat_rate: 0.14,
        }
    }

    /// Recompute both NIS caps from the ceiling and rates.
    pub fn with_derived_caps(mut self) -> Self {
        self.max_employee_contribution = self.nis_earnings_ceiling * self.nis_employee_rate;
        self.max_employer_contribution = self.nis_earnings_ceiling * self.nis_employer_rate;
        self
    }

    /// Check the effective range and that the precomputed NIS caps still
    /// agree with ceiling x rate.
    pub fn validate(&self) -> Result<()> {
        if let Some(to) = self.effective_to {
            if to < self.effective_from {
                return Err(EngineError::InvalidRange {
                    version: self.version.clone(),
                });
            }
        }
        let caps = [
            ("employee", self.max_employee_contribution, self.nis_employee_rate),
            ("employer", self.max_employer_contribution, self.nis_employer_rate),
        ];
        for (which, cap, rate) in caps {
            let expected = self.nis_earnings_ceiling * rate;
            if (cap - expected).abs() > CAP_TOLERANCE {
                return Err(EngineError::InconsistentNisCap {
                    version: self.version.clone(),
                    which,
                    cap,
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Whether `date` falls inside the effective range.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.effective_from && self.effective_to.map_or(true, |to| date <= to)
    }

    fn overlaps(&self, other: &TaxConfig) -> bool {
        let self_ends_before = self.effective_to.is_some_and(|to| to < other.effective_from);
        let other_ends_before = other.effective_to.is_some_and(|to| to < self.effective_from);
        !(self_ends_before || other_ends_before)
    }
}

/// A set of non-overlapping tax configurations ordered by start date.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaxConfigSet {
    configs: Vec<TaxConfig>,
}

impl TaxConfigSet {
    /// A set holding only the compiled-in configuration.
    pub fn builtin() -> Self {
        Self {
            configs: vec![TaxConfig::guyana_2025()],
        }
    }

    pub fn configs(&self) -> &[TaxConfig] {
        &self.configs
    }

    /// Register a configuration.
    ///
    /// An existing configuration with the same version is replaced.  An
    /// open-ended configuration that starts earlier is closed the day
    /// before the new one starts.  Any remaining overlap is an error and
    /// leaves the set unchanged.
    pub fn insert(&mut self, config: TaxConfig) -> Result<()> {
        config.validate()?;

        let mut next: Vec<TaxConfig> = self
            .configs
            .iter()
            .filter(|c| c.version != config.version)
            .cloned()
            .collect();
        for existing in next.iter_mut() {
            if existing.effective_to.is_none() && existing.effective_from < config.effective_from {
                existing.effective_to = config.effective_from.pred_opt();
            }
        }
        if let Some(clash) = next.iter().find(|c| c.overlaps(&config)) {
            return Err(EngineError::OverlappingConfig {
                first: clash.version.clone(),
                second: config.version,
            });
        }

        next.push(config);
        next.sort_by_key(|c| c.effective_from);
        self.configs = next;
        Ok(())
    }

    /// The configuration in force on `date`.
    pub fn for_date(&self, date: NaiveDate) -> Result<&TaxConfig> {
        self.configs
            .iter()
            .find(|c| c.covers(date))
            .ok_or(EngineError::NoConfigForDate(date))
    }

    /// Load every `.json` file in `path` as a [`TaxConfig`] and register
    /// it on top of the current set.  Files that fail to parse, fail
    /// validation or overlap an existing range are logged and skipped.
    /// A missing directory leaves the set untouched.
    pub fn load_dir(&mut self, path: &Path) -> Result<usize> {
        let mut loaded = 0;
        if !path.is_dir() {
            tracing::debug!(path = %path.display(), "tax config directory not found");
            return Ok(loaded);
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let file = entry.path();
            if entry.file_type()?.is_file() && file.extension().is_some_and(|ext| ext == "json") {
                files.push(file);
            }
        }
        // Directory order is unspecified; keep loading deterministic.
        files.sort();

        for file in files {
            let data = std::fs::read_to_string(&file)?;
            let config = match serde_json::from_str::<TaxConfig>(&data) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(file = %file.display(), %err, "failed to parse tax config");
                    continue;
                }
            };
            let version = config.version.clone();
            match self.insert(config) {
                Ok(()) => {
                    tracing::info!(file = %file.display(), %version, "loaded tax config");
                    loaded += 1;
                }
                Err(err) => {
                    tracing::warn!(file = %file.display(), %err, "rejected tax config");
                }
            }
        }
        Ok(loaded)
    }
}
