use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HouseholdId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub unit: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Employed,
    Unemployed,
    Underemployed,
}

impl EmploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employed => "employed",
            Self::Unemployed => "unemployed",
            Self::Underemployed => "underemployed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employment {
    pub status: EmploymentStatus,
    pub last_employer: String,
    pub last_position: String,
    pub last_employment_date: NaiveDate,
    pub unemployment_benefits: i64,
    pub last_annual_income: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependent {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub grade: u32,
    pub school: String,
    pub date_of_birth: NaiveDate,
}

/// One family unit. Loaded once at process start and read-only for the
/// lifetime of a session; no mutation operation exists on purpose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub id: HouseholdId,
    pub name: String,
    pub age: u32,
    pub date_of_birth: NaiveDate,
    pub language: String,
    pub preferred_language: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub employment: Employment,
    pub marital_status: String,
    pub divorce_date: Option<NaiveDate>,
    pub rent_amount: i64,
    pub dependents: Vec<Dependent>,
    // household_size is carried separately from dependents.len() + 1 and is
    // tolerated if it drifts; the rules key off the recorded size.
    pub household_size: u32,
    pub monthly_income: i64,
    pub annual_income: i64,
    pub last_updated: NaiveDate,
}

impl Household {
    pub fn dependents_under(&self, age: u32) -> usize {
        self.dependents.iter().filter(|dependent| dependent.age < age).count()
    }

    pub fn dependents_between(&self, min_age: u32, max_age: u32) -> usize {
        self.dependents
            .iter()
            .filter(|dependent| dependent.age >= min_age && dependent.age <= max_age)
            .count()
    }
}

/// Read-only registry of known households, shared freely across sessions.
#[derive(Clone, Debug, Default)]
pub struct HouseholdDirectory {
    households: Vec<Household>,
}

impl HouseholdDirectory {
    pub fn new(households: Vec<Household>) -> Self {
        Self { households }
    }

    /// Directory seeded with the demo household record.
    pub fn seeded() -> Self {
        Self::new(vec![sample_household()])
    }

    pub fn get(&self, household_id: &str) -> Option<&Household> {
        self.households.iter().find(|household| household.id.0 == household_id)
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("static date literal")
}

/// The Santos household fixture that backs the demo deployment.
pub fn sample_household() -> Household {
    Household {
        id: HouseholdId("PARENT_001".to_string()),
        name: "Maria Santos".to_string(),
        age: 38,
        date_of_birth: date(1986, 4, 12),
        language: "es".to_string(),
        preferred_language: "Spanish".to_string(),
        email: "maria.santos@email.com".to_string(),
        phone: "+1-617-555-0142".to_string(),
        address: Address {
            street: "42 Woodrow Avenue".to_string(),
            unit: "2R".to_string(),
            city: "Dorchester".to_string(),
            state: "MA".to_string(),
            zip: "02124".to_string(),
        },
        employment: Employment {
            status: EmploymentStatus::Unemployed,
            last_employer: "Target Corporation".to_string(),
            last_position: "Retail Manager".to_string(),
            last_employment_date: date(2024, 9, 15),
            unemployment_benefits: 2400,
            last_annual_income: 52_000,
        },
        marital_status: "divorced".to_string(),
        divorce_date: Some(date(2024, 5, 1)),
        rent_amount: 1800,
        dependents: vec![
            Dependent {
                id: "STUDENT_001".to_string(),
                name: "Sofia Santos".to_string(),
                age: 15,
                grade: 10,
                school: "Boston Latin Academy".to_string(),
                date_of_birth: date(2009, 3, 15),
            },
            Dependent {
                id: "STUDENT_002".to_string(),
                name: "Miguel Santos".to_string(),
                age: 12,
                grade: 7,
                school: "Rafael Hernández K-8 School".to_string(),
                date_of_birth: date(2012, 8, 22),
            },
        ],
        household_size: 3,
        monthly_income: 2400,
        annual_income: 28_800,
        last_updated: date(2024, 11, 12),
    }
}

#[cfg(test)]
mod tests {
    use super::{sample_household, HouseholdDirectory};

    #[test]
    fn sample_household_size_matches_members() {
        let household = sample_household();
        assert_eq!(household.household_size as usize, 1 + household.dependents.len());
    }

    #[test]
    fn dependent_age_filters() {
        let household = sample_household();
        assert_eq!(household.dependents_under(13), 1);
        assert_eq!(household.dependents_between(14, 18), 1);
        assert_eq!(household.dependents_under(21), 2);
    }

    #[test]
    fn directory_resolves_only_known_ids() {
        let directory = HouseholdDirectory::seeded();
        assert!(directory.get("PARENT_001").is_some());
        assert!(directory.get("PARENT_999").is_none());
    }
}
