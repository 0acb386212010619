//! Incentive calculations: investment tax credit and depreciation benefit.

use serde::Deserialize;

use crate::load::UserType;

/// Federal investment tax credit rate applied to capex.
pub const BASE_ITC_RATE: f32 = 0.30;

/// Effective combined tax rate used by both depreciation models.
pub const EFFECTIVE_TAX_RATE: f32 = 0.26;

/// Basis factor of the simplified depreciation heuristic.
const SIMPLIFIED_BASIS_FACTOR: f32 = 0.85;

/// 5-year MACRS first-year rate (half-year convention).
const MACRS_5YR_YEAR_1: f32 = 0.20;

/// Investment tax credit for a given capex.
pub fn itc_amount(capex: f32) -> f32 {
    if capex > 0.0 { capex * BASE_ITC_RATE } else { 0.0 }
}

/// Depreciation benefit strategy.
///
/// Both variants are illustrative planning estimates, not compliant tax
/// calculations. The benefit applies only to the Commercial / Business user
/// type; every other classification receives zero.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum DepreciationModel {
    /// Flat heuristic: `(capex - 0.5 x ITC) x 0.85 x effective tax rate`.
    SimplifiedFlat,
    /// Bonus-depreciation phase-down plus the 5-year MACRS year-1 rate on
    /// the remaining basis, keyed by placed-in-service year.
    MacrsYear1 { placed_in_service: u16 },
}

impl Default for DepreciationModel {
    fn default() -> Self {
        Self::SimplifiedFlat
    }
}

impl DepreciationModel {
    /// Bonus depreciation rate for a placed-in-service year.
    ///
    /// 100% through 2022, then the phase-down: 80% (2023), 60% (2024),
    /// 40% (2025), 20% (2026), 0% after.
    fn bonus_rate(year: u16) -> f32 {
        match year {
            ..=2022 => 1.0,
            2023 => 0.80,
            2024 => 0.60,
            2025 => 0.40,
            2026 => 0.20,
            _ => 0.0,
        }
    }

    /// First-year depreciation tax benefit in dollars.
    ///
    /// The depreciable basis is reduced by half the ITC in both models, per
    /// the usual basis-adjustment rule.
    pub fn benefit(&self, capex: f32, itc: f32, user_type: UserType) -> f32 {
        if user_type != UserType::Commercial || capex <= 0.0 {
            return 0.0;
        }
        let basis = (capex - 0.5 * itc).max(0.0);
        match self {
            Self::SimplifiedFlat => basis * SIMPLIFIED_BASIS_FACTOR * EFFECTIVE_TAX_RATE,
            Self::MacrsYear1 { placed_in_service } => {
                let bonus = basis * Self::bonus_rate(*placed_in_service);
                let macrs_year_1 = (basis - bonus) * MACRS_5YR_YEAR_1;
                (bonus + macrs_year_1) * EFFECTIVE_TAX_RATE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn itc_is_thirty_percent_of_capex() {
        assert_eq!(itc_amount(100_000.0), 30_000.0);
        assert_eq!(itc_amount(0.0), 0.0);
        assert_eq!(itc_amount(-5.0), 0.0);
    }

    #[test]
    fn simplified_flat_matches_hand_calculation() {
        let capex = 100_000.0;
        let itc = itc_amount(capex);
        let benefit = DepreciationModel::SimplifiedFlat.benefit(capex, itc, UserType::Commercial);
        // basis = 100000 - 15000 = 85000; 85000 * 0.85 * 0.26 = 18785
        assert!((benefit - 18_785.0).abs() < 0.5);
    }

    #[test]
    fn non_commercial_user_gets_no_benefit() {
        let capex = 100_000.0;
        let itc = itc_amount(capex);
        for user in [UserType::Homeowner, UserType::Farm, UserType::Nonprofit] {
            assert_eq!(DepreciationModel::SimplifiedFlat.benefit(capex, itc, user), 0.0);
            let macrs = DepreciationModel::MacrsYear1 {
                placed_in_service: 2025,
            };
            assert_eq!(macrs.benefit(capex, itc, user), 0.0);
        }
    }

    #[test]
    fn macrs_year1_phase_down() {
        let capex = 100_000.0;
        let itc = itc_amount(capex);
        let basis = capex - 0.5 * itc; // 85000

        let b2025 = DepreciationModel::MacrsYear1 {
            placed_in_service: 2025,
        }
        .benefit(capex, itc, UserType::Commercial);
        // bonus 40% = 34000; remaining 51000 * 0.20 = 10200; total 44200 * 0.26
        assert!((b2025 - 44_200.0 * 0.26).abs() < 0.5);

        let b2030 = DepreciationModel::MacrsYear1 {
            placed_in_service: 2030,
        }
        .benefit(capex, itc, UserType::Commercial);
        // no bonus left, only MACRS year 1
        assert!((b2030 - basis * 0.20 * 0.26).abs() < 0.5);

        let b2022 = DepreciationModel::MacrsYear1 {
            placed_in_service: 2022,
        }
        .benefit(capex, itc, UserType::Commercial);
        // full bonus expensing
        assert!((b2022 - basis * 0.26).abs() < 0.5);
    }

    #[test]
    fn deserializes_from_toml_tag() {
        #[derive(Deserialize)]
        struct Wrapper {
            depreciation: DepreciationModel,
        }
        let flat: Wrapper = toml::from_str("depreciation = { model = \"simplified_flat\" }")
            .expect("flat variant should parse");
        assert_eq!(flat.depreciation, DepreciationModel::SimplifiedFlat);

        let macrs: Wrapper =
            toml::from_str("depreciation = { model = \"macrs_year1\", placed_in_service = 2024 }")
                .expect("macrs variant should parse");
        assert_eq!(
            macrs.depreciation,
            DepreciationModel::MacrsYear1 {
                placed_in_service: 2024
            }
        );
    }
}
