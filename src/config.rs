//! Run configuration.
//!
//! Values come from three layers, later ones winning:
//! 1. built-in defaults (point value presets, built-in catalogs)
//! 2. environment variables, with `.env` loaded first via `dotenvy`
//! 3. command-line flags

use std::path::{Path, PathBuf};

use crate::app::pipeline::CalcRequest;
use crate::catalog::Selection;
use crate::cli::{CaseArgs, CatalogArgs};
use crate::domain::{CatalogKind, EMPLOYEE_POINT_VALUE, InsurancePool, RESIDENT_POINT_VALUE};
use crate::error::{AppError, EXIT_INPUT};

pub const ENV_DIP_CATALOG: &str = "DIP_CATALOG";
pub const ENV_PROCEDURE_CATALOG: &str = "DIP_PROCEDURE_CATALOG";
pub const ENV_DIAGNOSIS_CATALOG: &str = "DIP_DIAGNOSIS_CATALOG";
pub const ENV_POINT_VALUE_RESIDENT: &str = "DIP_POINT_VALUE_RESIDENT";
pub const ENV_POINT_VALUE_EMPLOYEE: &str = "DIP_POINT_VALUE_EMPLOYEE";

/// Point value per insurance pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointValues {
    pub resident: f64,
    pub employee: f64,
}

impl Default for PointValues {
    fn default() -> Self {
        Self {
            resident: RESIDENT_POINT_VALUE,
            employee: EMPLOYEE_POINT_VALUE,
        }
    }
}

impl PointValues {
    pub fn for_pool(&self, pool: InsurancePool) -> f64 {
        match pool {
            InsurancePool::Resident => self.resident,
            InsurancePool::Employee => self.employee,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub dip_catalog: Option<PathBuf>,
    pub procedure_catalog: Option<PathBuf>,
    pub diagnosis_catalog: Option<PathBuf>,
    pub point_values: PointValues,
}

impl Config {
    /// Load `.env`, then build the config from the process environment and CLI flags.
    pub fn load(args: &CatalogArgs) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(args, |key| std::env::var(key).ok())
    }

    /// Build the config from CLI flags and an environment lookup.
    pub fn from_lookup(args: &CatalogArgs, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let env_path = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        let point_values = PointValues {
            resident: env_point_value(&lookup, ENV_POINT_VALUE_RESIDENT)?.unwrap_or(RESIDENT_POINT_VALUE),
            employee: env_point_value(&lookup, ENV_POINT_VALUE_EMPLOYEE)?.unwrap_or(EMPLOYEE_POINT_VALUE),
        };

        Ok(Self {
            dip_catalog: args.dip_catalog.clone().or_else(|| env_path(ENV_DIP_CATALOG)),
            procedure_catalog: args
                .procedure_catalog
                .clone()
                .or_else(|| env_path(ENV_PROCEDURE_CATALOG)),
            diagnosis_catalog: args
                .diagnosis_catalog
                .clone()
                .or_else(|| env_path(ENV_DIAGNOSIS_CATALOG)),
            point_values,
        })
    }

    pub fn catalog_path(&self, kind: CatalogKind) -> Option<&Path> {
        match kind {
            CatalogKind::Dip => self.dip_catalog.as_deref(),
            CatalogKind::Procedure => self.procedure_catalog.as_deref(),
            CatalogKind::Diagnosis => self.diagnosis_catalog.as_deref(),
        }
    }

    /// Default TUI form, with the configured point value for the default pool.
    pub fn default_request(&self) -> CalcRequest {
        let request = CalcRequest::default();
        CalcRequest {
            point_value: self.point_values.for_pool(request.pool),
            ..request
        }
    }

    /// Calculation request from `calc` flags.
    pub fn request_from_args(&self, args: &CaseArgs) -> CalcRequest {
        CalcRequest {
            treatment_fee: args.treatment_fee,
            exam_fee: args.exam_fee,
            drug_fee: args.drug_fee,
            material_fee: args.material_fee,
            medical_income_cost_ratio: args.medical_ratio,
            drug_material_cost_ratio: args.drug_material_ratio,
            payer_contribution: args.payer,
            tier_coefficient: args.tier,
            pool: args.pool,
            point_value: args
                .point_value
                .unwrap_or_else(|| self.point_values.for_pool(args.pool)),
            diagnosis: args
                .diagnosis
                .as_deref()
                .map(Selection::parse_diagnosis)
                .unwrap_or_default(),
            procedure: args
                .procedure
                .as_deref()
                .map(Selection::parse_procedure)
                .unwrap_or_default(),
            base_weight_override: args.base_weight,
        }
    }
}

fn env_point_value(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<f64>, AppError> {
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| AppError::new(EXIT_INPUT, format!("Invalid {key}='{raw}' (expected a number).")))?;
    if !(value.is_finite() && (0.0..=200.0).contains(&value)) {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Invalid {key}={value} (must be within [0, 200])."),
        ));
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env_or_flags() {
        let config = Config::from_lookup(&CatalogArgs::default(), lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.point_values.for_pool(InsurancePool::Resident), 63.3253);
        assert_eq!(config.point_values.for_pool(InsurancePool::Employee), 73.6011);
    }

    #[test]
    fn flags_override_env() {
        let args = CatalogArgs {
            dip_catalog: Some(PathBuf::from("flag.csv")),
            ..CatalogArgs::default()
        };
        let lookup = lookup_from(&[(ENV_DIP_CATALOG, "env.csv"), (ENV_DIAGNOSIS_CATALOG, "dx.csv")]);
        let config = Config::from_lookup(&args, lookup).unwrap();

        assert_eq!(config.catalog_path(CatalogKind::Dip), Some(Path::new("flag.csv")));
        assert_eq!(config.catalog_path(CatalogKind::Diagnosis), Some(Path::new("dx.csv")));
        assert_eq!(config.catalog_path(CatalogKind::Procedure), None);
    }

    #[test]
    fn env_point_values_apply_to_default_request() {
        let lookup = lookup_from(&[(ENV_POINT_VALUE_EMPLOYEE, "80.5")]);
        let config = Config::from_lookup(&CatalogArgs::default(), lookup).unwrap();
        assert_eq!(config.default_request().point_value, 80.5);
    }

    #[test]
    fn case_flags_parse_diagnosis_and_procedure_separately() {
        use clap::Parser;

        use crate::cli::{Cli, Command};

        let cli = Cli::parse_from(["dip", "calc", "--diagnosis", "无", "--procedure", "无"]);
        let Command::Calc(args) = cli.command else {
            panic!("expected calc");
        };
        let request = Config::default().request_from_args(&args.case);

        assert_eq!(request.diagnosis, Selection::Named("无".to_string()));
        assert_eq!(request.procedure, Selection::NoProcedure);
    }

    #[test]
    fn invalid_env_point_value_is_rejected() {
        let lookup = lookup_from(&[(ENV_POINT_VALUE_RESIDENT, "abc")]);
        assert!(Config::from_lookup(&CatalogArgs::default(), lookup).is_err());

        let lookup = lookup_from(&[(ENV_POINT_VALUE_RESIDENT, "250")]);
        assert!(Config::from_lookup(&CatalogArgs::default(), lookup).is_err());
    }
}
