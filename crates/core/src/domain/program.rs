use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::household::Household;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramId(pub String);

impl ProgramId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Federal,
    State,
    City,
    Education,
}

impl Category {
    pub const ALL: [Category; 4] =
        [Category::Federal, Category::State, Category::City, Category::Education];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Federal => "federal",
            Self::State => "state",
            Self::City => "city",
            Self::Education => "education",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "federal" => Ok(Self::Federal),
            "state" => Ok(Self::State),
            "city" => Ok(Self::City),
            "education" => Ok(Self::Education),
            other => Err(DomainError::UnknownCategory(other.to_string())),
        }
    }
}

/// Whether a program pays out month after month or as a one-time/seasonal
/// grant whose nominal annual figure is not `monthly * 12`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountModel {
    Recurring,
    LumpSum,
}

/// Dollar amounts keyed by household size, extrapolated linearly past the
/// last bracket. `amounts[0]` is the single-member figure; sizes below one
/// clamp to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SizeBracket {
    pub amounts: &'static [i64],
    pub per_additional_member: i64,
}

impl SizeBracket {
    pub fn amount_for(&self, household_size: u32) -> i64 {
        let size = household_size.max(1) as usize;
        if size <= self.amounts.len() {
            return self.amounts[size - 1];
        }
        let last = self.amounts.last().copied().unwrap_or(0);
        last + self.per_additional_member * (size - self.amounts.len()) as i64
    }
}

/// Income ceiling descriptor, interpreted rather than embedded as code so
/// the catalog stays pure data.
// Serialize-only: the catalog is static Rust data, never read back in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncomeLimitRule {
    SizeTable(SizeBracket),
    PerMember { amount: i64 },
    Flat { amount: i64 },
}

impl IncomeLimitRule {
    pub fn monthly_limit(&self, household_size: u32) -> i64 {
        match self {
            Self::SizeTable(bracket) => bracket.amount_for(household_size),
            Self::PerMember { amount } => i64::from(household_size.max(1)) * amount,
            Self::Flat { amount } => *amount,
        }
    }
}

/// Monthly benefit formula descriptor. Shares are whole percentages so the
/// catalog can stay const-friendly; evaluation runs on `Decimal`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BenefitRule {
    /// Max allotment minus a share of net income, with a floor. Net income
    /// deducts a share of rent first (SNAP shelter deduction).
    SlidingScale {
        max_allotment: SizeBracket,
        income_share_pct: u32,
        rent_offset_pct: u32,
        floor: i64,
    },
    /// Flat amount per dependent below an age cutoff.
    PerYoungDependent { under_age: u32, amount: i64 },
    /// Flat amount per household member.
    PerMember { amount: i64 },
    /// Fair-market rent minus a share of income.
    RentSubsidy { fair_market_rent: i64, income_share_pct: u32 },
    /// Max grant minus a share of income. Deliberately unfloored; the
    /// reported figure can go negative for high earners.
    CashGrant { max_grant: SizeBracket, income_share_pct: u32 },
    /// Flat amount per dependent inside an inclusive age band.
    PerTeenDependent { min_age: u32, max_age: u32, amount: i64 },
    /// Flat amount per dependent regardless of age.
    PerDependent { amount: i64 },
    Fixed { amount: i64 },
}

impl BenefitRule {
    pub fn monthly_amount(&self, household: &Household) -> i64 {
        match self {
            Self::SlidingScale { max_allotment, income_share_pct, rent_offset_pct, floor } => {
                let allotment = Decimal::from(max_allotment.amount_for(household.household_size));
                let net_income = Decimal::from(household.monthly_income)
                    - Decimal::from(household.rent_amount) * pct(*rent_offset_pct);
                let benefit = allotment - net_income * pct(*income_share_pct);
                round_dollars(benefit.max(Decimal::from(*floor)))
            }
            Self::PerYoungDependent { under_age, amount } => {
                household.dependents_under(*under_age) as i64 * amount
            }
            Self::PerMember { amount } => i64::from(household.household_size) * amount,
            Self::RentSubsidy { fair_market_rent, income_share_pct } => {
                let tenant_portion =
                    Decimal::from(household.monthly_income) * pct(*income_share_pct);
                round_dollars(Decimal::from(*fair_market_rent) - tenant_portion)
            }
            Self::CashGrant { max_grant, income_share_pct } => {
                let grant = Decimal::from(max_grant.amount_for(household.household_size))
                    - Decimal::from(household.monthly_income) * pct(*income_share_pct);
                round_dollars(grant)
            }
            Self::PerTeenDependent { min_age, max_age, amount } => {
                household.dependents_between(*min_age, *max_age) as i64 * amount
            }
            Self::PerDependent { amount } => household.dependents.len() as i64 * amount,
            Self::Fixed { amount } => *amount,
        }
    }
}

fn pct(value: u32) -> Decimal {
    Decimal::from(value) / Decimal::from(100)
}

fn round_dollars(amount: Decimal) -> i64 {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// One benefit program. Static configuration: built once by the catalog,
/// never mutated. The nominal amounts are presentational defaults and do
/// not override the computed benefit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: &'static str,
    pub name_es: &'static str,
    pub description: &'static str,
    pub description_es: &'static str,
    pub agency: &'static str,
    pub income_limit: IncomeLimitRule,
    pub requirements: &'static [&'static str],
    pub benefit_rule: BenefitRule,
    pub amount_model: AmountModel,
    pub nominal_monthly: i64,
    pub nominal_annual: i64,
    pub processing_time: &'static str,
    pub renewal_period: &'static str,
    pub required_documents: &'static [&'static str],
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{BenefitRule, Category, IncomeLimitRule, SizeBracket};
    use crate::domain::household::sample_household;
    use crate::errors::DomainError;

    #[test]
    fn size_bracket_extrapolates_past_the_table() {
        let bracket = SizeBracket {
            amounts: &[1580, 2137, 2694, 3250, 3808],
            per_additional_member: 558,
        };
        assert_eq!(bracket.amount_for(3), 2694);
        assert_eq!(bracket.amount_for(5), 3808);
        assert_eq!(bracket.amount_for(7), 3808 + 2 * 558);
        assert_eq!(bracket.amount_for(0), 1580);
    }

    #[test]
    fn per_member_limit_scales_with_size() {
        let rule = IncomeLimitRule::PerMember { amount: 579 };
        assert_eq!(rule.monthly_limit(3), 1737);
        assert_eq!(rule.monthly_limit(0), 579);
    }

    #[test]
    fn sliding_scale_nets_rent_share_out_of_income() {
        // size 3, income 2400, rent 1800: 766 - (2400 - 900) * 0.3 = 316
        let rule = BenefitRule::SlidingScale {
            max_allotment: SizeBracket {
                amounts: &[291, 535, 766, 973, 1155],
                per_additional_member: 0,
            },
            income_share_pct: 30,
            rent_offset_pct: 50,
            floor: 23,
        };
        assert_eq!(rule.monthly_amount(&sample_household()), 316);
    }

    #[test]
    fn sliding_scale_floors_at_minimum_allotment() {
        let rule = BenefitRule::SlidingScale {
            max_allotment: SizeBracket { amounts: &[291], per_additional_member: 0 },
            income_share_pct: 30,
            rent_offset_pct: 50,
            floor: 23,
        };
        let mut wealthy = sample_household();
        wealthy.monthly_income = 9000;
        assert_eq!(rule.monthly_amount(&wealthy), 23);
    }

    #[test]
    fn cash_grant_is_not_floored() {
        let rule = BenefitRule::CashGrant {
            max_grant: SizeBracket { amounts: &[500, 633, 766, 898], per_additional_member: 0 },
            income_share_pct: 50,
        };
        // 766 - 1200
        assert_eq!(rule.monthly_amount(&sample_household()), -434);
    }

    #[test]
    fn rent_subsidy_subtracts_tenant_portion() {
        let rule = BenefitRule::RentSubsidy { fair_market_rent: 2100, income_share_pct: 30 };
        assert_eq!(rule.monthly_amount(&sample_household()), 1380);
    }

    #[test]
    fn dependent_counting_rules() {
        let household = sample_household();
        let wic = BenefitRule::PerYoungDependent { under_age: 13, amount: 47 };
        let teens = BenefitRule::PerTeenDependent { min_age: 14, max_age: 18, amount: 2000 };
        let all = BenefitRule::PerDependent { amount: 750 };
        assert_eq!(wic.monthly_amount(&household), 47);
        assert_eq!(teens.monthly_amount(&household), 2000);
        assert_eq!(all.monthly_amount(&household), 1500);
    }

    #[test]
    fn rule_descriptors_serialize_with_kind_tags() {
        let limit = IncomeLimitRule::PerMember { amount: 579 };
        assert_eq!(
            serde_json::to_value(&limit).expect("serialize"),
            serde_json::json!({ "kind": "per_member", "amount": 579 })
        );

        let bracket = IncomeLimitRule::SizeTable(SizeBracket {
            amounts: &[1580, 2137],
            per_additional_member: 558,
        });
        let raw = serde_json::to_value(&bracket).expect("serialize");
        assert_eq!(raw["kind"], "size_table");
        assert_eq!(raw["amounts"], serde_json::json!([1580, 2137]));
    }

    #[test]
    fn category_parsing_rejects_unknown_names() {
        assert_eq!(Category::from_str("Federal").expect("parse"), Category::Federal);
        assert!(matches!(
            Category::from_str("county"),
            Err(DomainError::UnknownCategory(name)) if name == "county"
        ));
    }
}
