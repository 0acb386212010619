//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::finance::DepreciationModel;
use crate::load::UserType;
use crate::orchestrator::{BackupPreference, ProposalInputs};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the residential baseline scenario. Load
/// from TOML with [`ScenarioConfig::from_toml_file`] or use a named preset.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Site address and customer classification.
    #[serde(default)]
    pub site: SiteConfig,
    /// Billed usage and planned electrification.
    #[serde(default)]
    pub usage: UsageConfig,
    /// PV system and inverter sizing.
    #[serde(default)]
    pub system: SystemConfig,
    /// Battery backup and reserve settings.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Dispatch policy flags.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Financing and depreciation settings.
    #[serde(default)]
    pub finance: FinanceConfig,
    /// Synthetic production source settings.
    #[serde(default)]
    pub production: ProductionConfig,
}

/// Site address and customer classification.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Free-text address containing a ZIP the geocoder can resolve.
    pub address: String,
    /// Intake-form user type label.
    pub user_type: String,
    /// Rate plan name from the tariff catalog.
    pub rate_plan: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            address: "456 Prairie Ave, Hibbing, MN 55714".to_string(),
            user_type: "Homeowner".to_string(),
            rate_plan: "Residential E-TOU-C".to_string(),
        }
    }
}

/// Billed usage and planned electrification load.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsageConfig {
    /// Average monthly consumption (kWh).
    pub monthly_kwh: f32,
    /// Planned annual EV mileage (0 = none).
    pub ev_annual_miles: f32,
    /// EV efficiency (miles per kWh).
    pub ev_efficiency_mi_kwh: f32,
    /// Planned annual heat-pump output (BTU, 0 = none).
    pub heat_pump_btu_yr: f32,
    /// Heat-pump coefficient of performance.
    pub heat_pump_cop: f32,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            monthly_kwh: 900.0,
            ev_annual_miles: 0.0,
            ev_efficiency_mi_kwh: 4.0,
            heat_pump_btu_yr: 0.0,
            heat_pump_cop: 3.0,
        }
    }
}

/// PV system and inverter sizing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    /// Nameplate capacity (kW DC).
    pub size_kw: f32,
    /// Inverter AC capacity (kW).
    pub inverter_kw: f32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            size_kw: 8.0,
            inverter_kw: 7.6,
        }
    }
}

/// Battery backup and reserve settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Backup preference: `"none"`, `"essentials"`, or `"whole_house"`.
    pub backup_pref: String,
    /// Minimum reserve floor (percent of capacity).
    pub min_reserve_pct: f32,
    /// Installed cost per kWh ($).
    pub cost_per_kwh: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            backup_pref: "essentials".to_string(),
            min_reserve_pct: 20.0,
            cost_per_kwh: 900.0,
        }
    }
}

/// Dispatch policy flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Prefer on-site consumption over export.
    pub self_consumption_priority: bool,
    /// Time-of-use aware discharge timing.
    pub tou_enabled: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            self_consumption_priority: true,
            tou_enabled: true,
        }
    }
}

/// Financing and depreciation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinanceConfig {
    /// Depreciation model: `"simplified_flat"` or `"macrs_year1"`.
    pub depreciation: String,
    /// Placed-in-service year for the MACRS model.
    pub placed_in_service: u16,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            depreciation: "simplified_flat".to_string(),
            placed_in_service: 2025,
        }
    }
}

/// Synthetic production source settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProductionConfig {
    /// Weather-noise standard deviation.
    pub noise_std: f32,
    /// Weather-noise seed.
    pub seed: u64,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            noise_std: 0.05,
            seed: 42,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.min_reserve_pct"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Residential TOU baseline: essentials battery, self-consumption first.
    pub fn residential_tou() -> Self {
        Self {
            site: SiteConfig::default(),
            usage: UsageConfig::default(),
            system: SystemConfig::default(),
            battery: BatteryConfig::default(),
            policy: PolicyConfig::default(),
            finance: FinanceConfig::default(),
            production: ProductionConfig::default(),
        }
    }

    /// Commercial preset: whole-house battery held for the peak window,
    /// MACRS depreciation.
    pub fn commercial_battery() -> Self {
        Self {
            site: SiteConfig {
                address: "800 Wilshire Blvd, Beverly Hills, CA 90210".to_string(),
                user_type: "Commercial / Business".to_string(),
                rate_plan: "Commercial B-10 TOU".to_string(),
            },
            usage: UsageConfig {
                monthly_kwh: 3000.0,
                ..UsageConfig::default()
            },
            system: SystemConfig {
                size_kw: 20.0,
                inverter_kw: 18.0,
            },
            battery: BatteryConfig {
                backup_pref: "whole_house".to_string(),
                min_reserve_pct: 10.0,
                ..BatteryConfig::default()
            },
            policy: PolicyConfig {
                self_consumption_priority: false,
                tou_enabled: true,
            },
            finance: FinanceConfig {
                depreciation: "macrs_year1".to_string(),
                placed_in_service: 2025,
            },
            production: ProductionConfig::default(),
        }
    }

    /// Agricultural preset: large batteryless array exporting its surplus.
    pub fn farm_export() -> Self {
        Self {
            site: SiteConfig {
                address: "Rural Route 5, Coalinga, CA 93210".to_string(),
                user_type: "Farm / Agriculture".to_string(),
                rate_plan: "Ag Rate AG-4B".to_string(),
            },
            usage: UsageConfig {
                monthly_kwh: 8000.0,
                ..UsageConfig::default()
            },
            system: SystemConfig {
                size_kw: 50.0,
                inverter_kw: 42.0,
            },
            battery: BatteryConfig {
                backup_pref: "none".to_string(),
                min_reserve_pct: 0.0,
                ..BatteryConfig::default()
            },
            policy: PolicyConfig {
                self_consumption_priority: false,
                tou_enabled: false,
            },
            finance: FinanceConfig::default(),
            production: ProductionConfig::default(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["residential_tou", "commercial_battery", "farm_export"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "residential_tou" => Ok(Self::residential_tou()),
            "commercial_battery" => Ok(Self::commercial_battery()),
            "farm_export" => Ok(Self::farm_export()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.site.address.trim().is_empty() {
            errors.push(ConfigError {
                field: "site.address".into(),
                message: "must not be empty".into(),
            });
        }
        if UserType::from_label(&self.site.user_type).is_none() {
            errors.push(ConfigError {
                field: "site.user_type".into(),
                message: format!("unknown user type \"{}\"", self.site.user_type),
            });
        }
        // An unknown rate plan is allowed (it falls back to the flat rate),
        // so it is not a validation error here.

        if self.usage.monthly_kwh < 0.0 {
            errors.push(ConfigError {
                field: "usage.monthly_kwh".into(),
                message: "must be >= 0".into(),
            });
        }
        if self.system.size_kw < 0.0 {
            errors.push(ConfigError {
                field: "system.size_kw".into(),
                message: "must be >= 0".into(),
            });
        }
        if self.system.inverter_kw < 0.0 {
            errors.push(ConfigError {
                field: "system.inverter_kw".into(),
                message: "must be >= 0".into(),
            });
        }

        if BackupPreference::from_label(&self.battery.backup_pref).is_none() {
            errors.push(ConfigError {
                field: "battery.backup_pref".into(),
                message: format!(
                    "must be \"none\", \"essentials\", or \"whole_house\", got \"{}\"",
                    self.battery.backup_pref
                ),
            });
        }
        if !(0.0..=100.0).contains(&self.battery.min_reserve_pct) {
            errors.push(ConfigError {
                field: "battery.min_reserve_pct".into(),
                message: "must be in [0, 100]".into(),
            });
        }
        if self.battery.cost_per_kwh < 0.0 {
            errors.push(ConfigError {
                field: "battery.cost_per_kwh".into(),
                message: "must be >= 0".into(),
            });
        }

        if self.finance.depreciation != "simplified_flat"
            && self.finance.depreciation != "macrs_year1"
        {
            errors.push(ConfigError {
                field: "finance.depreciation".into(),
                message: format!(
                    "must be \"simplified_flat\" or \"macrs_year1\", got \"{}\"",
                    self.finance.depreciation
                ),
            });
        }

        errors
    }

    /// Converts a validated scenario into orchestrator inputs.
    ///
    /// Unknown user-type or backup-preference labels fall back to the
    /// residential defaults; `validate` reports them first.
    pub fn to_inputs(&self) -> ProposalInputs {
        let depreciation = if self.finance.depreciation == "macrs_year1" {
            DepreciationModel::MacrsYear1 {
                placed_in_service: self.finance.placed_in_service,
            }
        } else {
            DepreciationModel::SimplifiedFlat
        };

        ProposalInputs {
            address: self.site.address.clone(),
            monthly_kwh_usage: Some(self.usage.monthly_kwh),
            system_size_kw: Some(self.system.size_kw),
            inverter_size_kw: Some(self.system.inverter_kw),
            backup_pref: BackupPreference::from_label(&self.battery.backup_pref)
                .unwrap_or(BackupPreference::EssentialsOnly),
            min_battery_reserve_pct: Some(self.battery.min_reserve_pct),
            self_consumption_priority: self.policy.self_consumption_priority,
            tou_enabled: self.policy.tou_enabled,
            rate_plan: self.site.rate_plan.clone(),
            user_type: UserType::from_label(&self.site.user_type).unwrap_or(UserType::Homeowner),
            battery_cost_per_kwh: Some(self.battery.cost_per_kwh),
            ev_annual_miles: Some(self.usage.ev_annual_miles),
            ev_efficiency_mi_kwh: Some(self.usage.ev_efficiency_mi_kwh),
            heat_pump_btu_yr: Some(self.usage.heat_pump_btu_yr),
            heat_pump_cop: Some(self.usage.heat_pump_cop),
            depreciation,
        }
    }

    /// Rate plans every preset refers to; kept here so a catalog rename
    /// breaks a test instead of silently falling back at run time.
    pub fn preset_rate_plans() -> Vec<String> {
        [
            Self::residential_tou(),
            Self::commercial_battery(),
            Self::farm_export(),
        ]
        .iter()
        .map(|c| c.site.rate_plan.clone())
        .collect()
    }
}
