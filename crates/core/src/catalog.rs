use crate::domain::program::{
    AmountModel, BenefitRule, Category, IncomeLimitRule, Program, ProgramId, SizeBracket,
};
use crate::errors::DomainError;

/// Static registry of benefit programs grouped by category. Built once at
/// startup; read-only afterwards, so it can be shared across sessions
/// without synchronization.
pub struct Catalog {
    sections: Vec<(Category, Vec<Program>)>,
}

impl Catalog {
    pub fn new(sections: Vec<(Category, Vec<Program>)>) -> Self {
        Self { sections }
    }

    /// Programs in the requested categories, flattened in declaration
    /// order. An empty category set means all four categories.
    pub fn programs_in(&self, categories: &[Category]) -> Vec<&Program> {
        let selected: &[Category] = if categories.is_empty() { &Category::ALL } else { categories };
        selected
            .iter()
            .flat_map(|category| {
                self.sections
                    .iter()
                    .filter(move |(section, _)| section == category)
                    .flat_map(|(_, programs)| programs.iter())
            })
            .collect()
    }

    pub fn all_programs(&self) -> impl Iterator<Item = &Program> {
        self.sections.iter().flat_map(|(_, programs)| programs.iter())
    }

    pub fn find(&self, program_id: &ProgramId) -> Result<&Program, DomainError> {
        self.all_programs()
            .find(|program| &program.id == program_id)
            .ok_or_else(|| DomainError::ProgramNotFound(program_id.clone()))
    }

    /// Category membership is derived by reverse lookup, not stored on the
    /// program record; linear in catalog size.
    pub fn category_of(&self, program_id: &ProgramId) -> Option<Category> {
        self.sections
            .iter()
            .find(|(_, programs)| programs.iter().any(|program| &program.id == program_id))
            .map(|(category, _)| *category)
    }

    /// Resolves a program-id selection. An empty selection means every
    /// program in the catalog; any unknown id is an error rather than a
    /// silent skip.
    pub fn resolve(&self, program_ids: &[ProgramId]) -> Result<Vec<&Program>, DomainError> {
        if program_ids.is_empty() {
            return Ok(self.all_programs().collect());
        }
        program_ids.iter().map(|id| self.find(id)).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|(_, programs)| programs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Catalog {
    fn default() -> Self {
        standard_catalog()
    }
}

/// Massachusetts / Boston program set with 2024 figures.
pub fn standard_catalog() -> Catalog {
    Catalog::new(vec![
        (Category::Federal, federal_programs()),
        (Category::State, state_programs()),
        (Category::City, city_programs()),
        (Category::Education, education_programs()),
    ])
}

fn federal_programs() -> Vec<Program> {
    vec![
        Program {
            id: ProgramId::new("snap"),
            name: "SNAP Food Assistance",
            name_es: "Asistencia de Alimentos SNAP",
            description: "Monthly food assistance for groceries",
            description_es: "Asistencia mensual para comprar alimentos",
            agency: "USDA",
            income_limit: IncomeLimitRule::SizeTable(SizeBracket {
                amounts: &[1580, 2137, 2694, 3250, 3808],
                per_additional_member: 558,
            }),
            requirements: &[
                "US Citizen or Legal Resident",
                "Massachusetts Resident",
                "Income below 130% FPL",
            ],
            benefit_rule: BenefitRule::SlidingScale {
                max_allotment: SizeBracket {
                    amounts: &[291, 535, 766, 973, 1155],
                    per_additional_member: 0,
                },
                income_share_pct: 30,
                rent_offset_pct: 50,
                floor: 23,
            },
            amount_model: AmountModel::Recurring,
            nominal_monthly: 740,
            nominal_annual: 8880,
            processing_time: "7-30 days",
            renewal_period: "6 months",
            required_documents: &[
                "Photo ID",
                "Proof of address",
                "Proof of income (unemployment letter)",
                "Social Security cards",
            ],
        },
        Program {
            id: ProgramId::new("wic"),
            name: "WIC Nutrition Program",
            name_es: "Programa de Nutrición WIC",
            description: "Nutritious foods for children under 13",
            description_es: "Alimentos nutritivos para niños menores de 13 años",
            agency: "USDA",
            income_limit: IncomeLimitRule::SizeTable(SizeBracket {
                amounts: &[2430, 3287, 4144, 5000, 5857],
                per_additional_member: 857,
            }),
            requirements: &["Child under age 5 OR Pregnant", "Income below 185% FPL"],
            benefit_rule: BenefitRule::PerYoungDependent { under_age: 13, amount: 47 },
            amount_model: AmountModel::Recurring,
            nominal_monthly: 47,
            nominal_annual: 564,
            processing_time: "1-2 weeks",
            renewal_period: "6 months",
            required_documents: &[
                "Photo ID",
                "Proof of address",
                "Child birth certificates",
                "Proof of income",
            ],
        },
        Program {
            id: ProgramId::new("medicaid"),
            name: "MassHealth (Medicaid)",
            name_es: "MassHealth (Medicaid)",
            description: "Free health insurance for entire family",
            description_es: "Seguro médico gratuito para toda la familia",
            agency: "MassHealth",
            income_limit: IncomeLimitRule::SizeTable(SizeBracket {
                amounts: &[1732, 2348, 2961, 3575, 4188],
                per_additional_member: 613,
            }),
            requirements: &["Massachusetts Resident", "Income below 150% FPL"],
            // Valued at the average per-member family coverage cost in MA.
            benefit_rule: BenefitRule::PerMember { amount: 283 },
            amount_model: AmountModel::Recurring,
            nominal_monthly: 850,
            nominal_annual: 10_200,
            processing_time: "30-45 days",
            renewal_period: "12 months",
            required_documents: &[
                "Photo ID",
                "Proof of address",
                "Proof of income",
                "Social Security cards",
                "Child birth certificates",
            ],
        },
        Program {
            id: ProgramId::new("section8"),
            name: "Section 8 Housing Choice Voucher",
            name_es: "Cupones de Vivienda Section 8",
            description: "Rental assistance through Boston Housing Authority",
            description_es: "Asistencia de alquiler de Boston Housing Authority",
            agency: "HUD / Boston Housing Authority",
            // 50% AMI for Boston.
            income_limit: IncomeLimitRule::SizeTable(SizeBracket {
                amounts: &[3750, 4275, 4800, 5325, 5850],
                per_additional_member: 525,
            }),
            requirements: &["Income below 50% AMI", "US Citizen or Legal Resident"],
            // 2BR fair-market rent in Boston.
            benefit_rule: BenefitRule::RentSubsidy { fair_market_rent: 2100, income_share_pct: 30 },
            amount_model: AmountModel::Recurring,
            nominal_monthly: 900,
            nominal_annual: 10_800,
            processing_time: "Waitlist: 2-5 years",
            renewal_period: "12 months",
            required_documents: &[
                "Photo ID",
                "Birth certificates",
                "Social Security cards",
                "Proof of income",
                "Rental history",
                "Credit report",
            ],
        },
    ]
}

fn state_programs() -> Vec<Program> {
    vec![
        Program {
            id: ProgramId::new("tafdc"),
            name: "TAFDC Cash Assistance",
            name_es: "Asistencia en Efectivo TAFDC",
            description: "Temporary cash assistance for families",
            description_es: "Asistencia temporal en efectivo para familias",
            agency: "MA Department of Transitional Assistance",
            income_limit: IncomeLimitRule::PerMember { amount: 579 },
            requirements: &[
                "Dependent child under 18",
                "Income below program limits",
                "Work requirements or exemption",
            ],
            benefit_rule: BenefitRule::CashGrant {
                max_grant: SizeBracket { amounts: &[500, 633, 766, 898], per_additional_member: 0 },
                income_share_pct: 50,
            },
            amount_model: AmountModel::Recurring,
            nominal_monthly: 578,
            nominal_annual: 6936,
            processing_time: "30-45 days",
            renewal_period: "6 months",
            required_documents: &[
                "Photo ID",
                "Birth certificates",
                "Social Security cards",
                "Proof of income",
                "Proof of address",
                "School enrollment verification",
            ],
        },
        Program {
            id: ProgramId::new("fuel_assist"),
            name: "Fuel Assistance (LIHEAP)",
            name_es: "Asistencia de Combustible",
            description: "Winter heating bill assistance",
            description_es: "Ayuda con facturas de calefacción en invierno",
            agency: "MA Department of Housing and Community Development",
            income_limit: IncomeLimitRule::SizeTable(SizeBracket {
                amounts: &[4395, 5745, 7095, 8445, 9795],
                per_additional_member: 1350,
            }),
            requirements: &["Income below 60% State Median", "Heating costs"],
            // Average seasonal benefit in MA, paid once per heating season.
            benefit_rule: BenefitRule::Fixed { amount: 1200 },
            amount_model: AmountModel::LumpSum,
            nominal_monthly: 100,
            nominal_annual: 1200,
            processing_time: "4-6 weeks",
            renewal_period: "Annual (Nov-Apr)",
            required_documents: &[
                "Photo ID",
                "Proof of address",
                "Heating bills",
                "Proof of income",
            ],
        },
        Program {
            id: ProgramId::new("connector_care"),
            name: "ConnectorCare",
            name_es: "ConnectorCare",
            description: "Subsidized health insurance marketplace",
            description_es: "Seguro médico subsidiado",
            agency: "Massachusetts Health Connector",
            income_limit: IncomeLimitRule::SizeTable(SizeBracket {
                amounts: &[3960, 5360, 6760, 8160, 9560],
                per_additional_member: 1400,
            }),
            requirements: &["Income between 150-300% FPL", "Not eligible for MassHealth"],
            benefit_rule: BenefitRule::Fixed { amount: 350 },
            amount_model: AmountModel::Recurring,
            nominal_monthly: 350,
            nominal_annual: 4200,
            processing_time: "2-3 weeks",
            renewal_period: "12 months",
            required_documents: &[
                "Photo ID",
                "Social Security cards",
                "Proof of income",
                "Tax returns",
            ],
        },
        Program {
            id: ProgramId::new("mrvp"),
            name: "Mass Rental Voucher Program",
            name_es: "Programa de Cupones de Alquiler",
            description: "State rental assistance supplement",
            description_es: "Suplemento estatal de asistencia de alquiler",
            agency: "MA Department of Housing and Community Development",
            income_limit: IncomeLimitRule::SizeTable(SizeBracket {
                amounts: &[3200, 3650, 4100, 4550, 5000],
                per_additional_member: 450,
            }),
            requirements: &["Income below 80% AMI", "Massachusetts resident 1+ year"],
            benefit_rule: BenefitRule::Fixed { amount: 600 },
            amount_model: AmountModel::Recurring,
            nominal_monthly: 600,
            nominal_annual: 7200,
            processing_time: "Waitlist: 6-18 months",
            renewal_period: "12 months",
            required_documents: &[
                "Photo ID",
                "Birth certificates",
                "Social Security cards",
                "Proof of income",
                "Rental history",
            ],
        },
    ]
}

fn city_programs() -> Vec<Program> {
    vec![
        Program {
            id: ProgramId::new("summer_youth"),
            name: "Boston Summer Youth Employment",
            name_es: "Empleos de Verano para Jóvenes",
            description: "Paid summer employment for teens 14-18",
            description_es: "Empleo pagado de verano para adolescentes 14-18",
            agency: "Boston Private Industry Council",
            // No strict income limit; priority goes to low-income families.
            income_limit: IncomeLimitRule::Flat { amount: 999_999 },
            requirements: &["Age 14-18", "Boston resident", "School enrollment"],
            // Six weeks at $15/hr per eligible teen.
            benefit_rule: BenefitRule::PerTeenDependent { min_age: 14, max_age: 18, amount: 2000 },
            amount_model: AmountModel::LumpSum,
            nominal_monthly: 0,
            nominal_annual: 2000,
            processing_time: "Apply by May 1",
            renewal_period: "Annual",
            required_documents: &[
                "School enrollment verification",
                "Birth certificate",
                "Work permit (if under 16)",
            ],
        },
        Program {
            id: ProgramId::new("afterschool"),
            name: "Boston Centers for Youth & Families Programs",
            name_es: "Programas Después de la Escuela",
            description: "Free after-school activities",
            description_es: "Actividades gratuitas después de la escuela",
            agency: "Boston Centers for Youth & Families",
            income_limit: IncomeLimitRule::PerMember { amount: 2500 },
            requirements: &["Boston resident", "Age 5-18"],
            // Value of free programming per enrolled child.
            benefit_rule: BenefitRule::PerDependent { amount: 750 },
            amount_model: AmountModel::Recurring,
            nominal_monthly: 125,
            nominal_annual: 1500,
            processing_time: "1-2 weeks",
            renewal_period: "Per season",
            required_documents: &[
                "Child birth certificates",
                "Proof of address",
                "School enrollment",
            ],
        },
    ]
}

fn education_programs() -> Vec<Program> {
    vec![
        Program {
            id: ProgramId::new("workforce_dev"),
            name: "Workforce Development Training",
            name_es: "Desarrollo Laboral",
            description: "Job training through Boston PIC with stipend",
            description_es: "Capacitación laboral a través de Boston PIC con estipendio",
            agency: "Boston Private Industry Council",
            income_limit: IncomeLimitRule::Flat { amount: 5000 },
            requirements: &["Unemployed or underemployed", "Boston resident"],
            benefit_rule: BenefitRule::Fixed { amount: 500 },
            amount_model: AmountModel::LumpSum,
            nominal_monthly: 0,
            nominal_annual: 500,
            processing_time: "2-4 weeks",
            renewal_period: "One-time",
            required_documents: &[
                "Photo ID",
                "Social Security card",
                "Proof of address",
                "Resume",
            ],
        },
        Program {
            id: ProgramId::new("cc_tuition"),
            name: "Community College Tuition Waiver",
            name_es: "Exención de Matrícula Universitaria",
            description: "Free community college courses",
            description_es: "Cursos gratuitos en community college",
            agency: "Massachusetts Community Colleges",
            income_limit: IncomeLimitRule::PerMember { amount: 2000 },
            requirements: &["Income below limits", "Massachusetts resident"],
            benefit_rule: BenefitRule::Fixed { amount: 5000 },
            amount_model: AmountModel::LumpSum,
            nominal_monthly: 0,
            nominal_annual: 5000,
            processing_time: "Apply before semester start",
            renewal_period: "Per semester",
            required_documents: &[
                "Photo ID",
                "Social Security card",
                "Tax returns",
                "High school diploma/GED",
            ],
        },
    ]
}
