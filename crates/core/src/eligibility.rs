use serde::Serialize;

use crate::catalog::Catalog;
use crate::domain::household::Household;
use crate::domain::program::ProgramId;
use crate::errors::DomainError;

/// Outcome of checking one household against one program's income ceiling.
///
/// The qualitative requirement strings are carried verbatim and are NOT
/// verified against household fields; the income comparison is the only
/// quantitative check. That simplification is deliberate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EligibilityResult {
    pub program_id: ProgramId,
    pub program_name: &'static str,
    pub eligible: bool,
    pub income_limit: i64,
    pub household_income: i64,
    pub margin: i64,
    pub requirements_met: &'static [&'static str],
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EligibilityReport {
    pub household_id: String,
    pub total_programs_checked: usize,
    pub eligible_programs: usize,
    pub ineligible_programs: usize,
    pub results: Vec<EligibilityResult>,
}

/// Evaluates the household against the selected programs (empty selection
/// means the whole catalog). Fails with `ProgramNotFound` on unknown ids.
pub fn evaluate(
    catalog: &Catalog,
    household: &Household,
    program_ids: &[ProgramId],
) -> Result<EligibilityReport, DomainError> {
    let programs = catalog.resolve(program_ids)?;

    let results: Vec<EligibilityResult> = programs
        .into_iter()
        .map(|program| {
            let income_limit = program.income_limit.monthly_limit(household.household_size);
            let eligible = household.monthly_income <= income_limit;
            let reason = if eligible {
                format!(
                    "Household income (${}) is below program limit (${income_limit})",
                    household.monthly_income
                )
            } else {
                format!(
                    "Household income (${}) exceeds program limit (${income_limit})",
                    household.monthly_income
                )
            };

            EligibilityResult {
                program_id: program.id.clone(),
                program_name: program.name,
                eligible,
                income_limit,
                household_income: household.monthly_income,
                margin: income_limit - household.monthly_income,
                requirements_met: program.requirements,
                reason,
            }
        })
        .collect();

    let eligible_programs = results.iter().filter(|result| result.eligible).count();

    Ok(EligibilityReport {
        household_id: household.id.0.clone(),
        total_programs_checked: results.len(),
        eligible_programs,
        ineligible_programs: results.len() - eligible_programs,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::evaluate;
    use crate::catalog::standard_catalog;
    use crate::domain::household::sample_household;
    use crate::domain::program::ProgramId;
    use crate::errors::DomainError;

    #[test]
    fn snap_scenario_matches_published_limits() {
        let catalog = standard_catalog();
        let household = sample_household();
        let report = evaluate(&catalog, &household, &[ProgramId::new("snap")]).expect("evaluate");

        let snap = &report.results[0];
        assert!(snap.eligible);
        assert_eq!(snap.income_limit, 2694);
        assert_eq!(snap.margin, 294);
        assert!(snap.reason.contains("below program limit"));
    }

    #[test]
    fn margin_sign_always_agrees_with_eligibility() {
        let catalog = standard_catalog();
        let mut household = sample_household();

        for income in [0, 1000, 2400, 2694, 2695, 5000, 12_000] {
            household.monthly_income = income;
            let report = evaluate(&catalog, &household, &[]).expect("evaluate");
            for result in &report.results {
                if result.eligible {
                    assert!(result.margin >= 0, "{} at income {income}", result.program_id.0);
                } else {
                    assert!(result.margin < 0, "{} at income {income}", result.program_id.0);
                }
            }
        }
    }

    #[test]
    fn report_counts_partition_the_results() {
        let catalog = standard_catalog();
        let household = sample_household();
        let report = evaluate(&catalog, &household, &[]).expect("evaluate");

        assert_eq!(report.total_programs_checked, 12);
        assert_eq!(report.eligible_programs + report.ineligible_programs, 12);
        // At $2400/month with size 3, TAFDC ($1737 ceiling) is the only miss.
        assert_eq!(report.ineligible_programs, 1);
    }

    #[test]
    fn unknown_program_id_fails_the_whole_evaluation() {
        let catalog = standard_catalog();
        let household = sample_household();
        let result = evaluate(&catalog, &household, &[ProgramId::new("mystery")]);
        assert!(matches!(result, Err(DomainError::ProgramNotFound(_))));
    }
}
