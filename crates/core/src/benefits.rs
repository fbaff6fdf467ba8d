use serde::Serialize;

use crate::catalog::Catalog;
use crate::domain::household::Household;
use crate::domain::program::{AmountModel, ProgramId};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BenefitAmount {
    pub program_id: ProgramId,
    pub program_name: &'static str,
    pub monthly_amount: i64,
    pub annual_amount: i64,
    pub processing_time: &'static str,
    pub renewal_period: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BenefitStatement {
    pub household_id: String,
    pub program_amounts: Vec<BenefitAmount>,
    pub total_monthly_benefit: i64,
    pub total_annual_benefit: i64,
}

/// Computes the dollar value of each selected program for the household.
///
/// Monthly figures come from each program's benefit rule. Annual figures
/// are `monthly * 12` for recurring programs; lump-sum programs (fuel
/// assistance, workforce development, community-college tuition, summer
/// youth employment) report their declared nominal annual amount because
/// a monthly multiplier is not meaningful for one-time/seasonal grants.
pub fn calculate(
    catalog: &Catalog,
    household: &Household,
    program_ids: &[ProgramId],
) -> Result<BenefitStatement, DomainError> {
    let programs = catalog.resolve(program_ids)?;

    let program_amounts: Vec<BenefitAmount> = programs
        .into_iter()
        .map(|program| {
            let monthly_amount = program.benefit_rule.monthly_amount(household);
            let annual_amount = match program.amount_model {
                AmountModel::Recurring => monthly_amount * 12,
                AmountModel::LumpSum => program.nominal_annual,
            };

            BenefitAmount {
                program_id: program.id.clone(),
                program_name: program.name,
                monthly_amount,
                annual_amount,
                processing_time: program.processing_time,
                renewal_period: program.renewal_period,
            }
        })
        .collect();

    let total_monthly_benefit = program_amounts.iter().map(|amount| amount.monthly_amount).sum();
    let total_annual_benefit = program_amounts.iter().map(|amount| amount.annual_amount).sum();

    Ok(BenefitStatement {
        household_id: household.id.0.clone(),
        program_amounts,
        total_monthly_benefit,
        total_annual_benefit,
    })
}

#[cfg(test)]
mod tests {
    use super::calculate;
    use crate::catalog::standard_catalog;
    use crate::domain::household::sample_household;
    use crate::domain::program::ProgramId;

    fn ids(raw: &[&str]) -> Vec<ProgramId> {
        raw.iter().map(|id| ProgramId::new(*id)).collect()
    }

    #[test]
    fn snap_monthly_benefit_follows_the_sliding_scale() {
        let catalog = standard_catalog();
        let statement =
            calculate(&catalog, &sample_household(), &ids(&["snap"])).expect("calculate");

        assert_eq!(statement.program_amounts[0].monthly_amount, 316);
        assert_eq!(statement.program_amounts[0].annual_amount, 316 * 12);
    }

    #[test]
    fn lump_sum_programs_report_nominal_annual_amounts() {
        let catalog = standard_catalog();
        let statement = calculate(
            &catalog,
            &sample_household(),
            &ids(&["fuel_assist", "summer_youth", "workforce_dev", "cc_tuition"]),
        )
        .expect("calculate");

        let annuals: Vec<i64> =
            statement.program_amounts.iter().map(|amount| amount.annual_amount).collect();
        assert_eq!(annuals, vec![1200, 2000, 500, 5000]);
        // None of these multiply a monthly figure by twelve.
        for amount in &statement.program_amounts {
            assert_ne!(amount.annual_amount, amount.monthly_amount * 12);
        }
    }

    #[test]
    fn totals_equal_the_sum_of_per_program_amounts() {
        let catalog = standard_catalog();
        let statement = calculate(&catalog, &sample_household(), &[]).expect("calculate");

        let monthly: i64 = statement.program_amounts.iter().map(|a| a.monthly_amount).sum();
        let annual: i64 = statement.program_amounts.iter().map(|a| a.annual_amount).sum();
        assert_eq!(statement.total_monthly_benefit, monthly);
        assert_eq!(statement.total_annual_benefit, annual);
        assert_eq!(statement.program_amounts.len(), 12);
    }

    #[test]
    fn wic_pays_per_dependent_under_thirteen() {
        let catalog = standard_catalog();
        let statement =
            calculate(&catalog, &sample_household(), &ids(&["wic"])).expect("calculate");
        // Only Miguel (12) qualifies.
        assert_eq!(statement.program_amounts[0].monthly_amount, 47);
    }
}
