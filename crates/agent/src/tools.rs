use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use navigator_core::workflow::{self, ApplicationLedger, SubmissionOutcome};
use navigator_core::{
    benefits, changes, documents, eligibility, Catalog, Category, Household, HouseholdDirectory,
    ProgramId,
};

/// Structured-call definition handed to the dialogue driver. The eight
/// tool names and input shapes are a compatibility surface and must not
/// be renamed.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "detect_household_changes",
            description: "Detects changes in household circumstances that trigger benefit \
                          eligibility (unemployment, income changes, family composition \
                          changes). This is the PROACTIVE trigger that initiates the benefits \
                          scan.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "household_id": {
                        "type": "string",
                        "description": "Unique identifier for the household"
                    }
                },
                "required": ["household_id"]
            }),
        },
        ToolDefinition {
            name: "scan_benefit_programs",
            description: "Scans ALL available benefit programs (federal, state, city, \
                          education) and returns complete catalog. This is the comprehensive \
                          discovery step.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "categories": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Categories to scan: federal, state, city, education. \
                                        Leave empty to scan all."
                    }
                }
            }),
        },
        ToolDefinition {
            name: "calculate_eligibility",
            description: "Determines eligibility for specific benefit programs based on \
                          household data. Returns which programs the household qualifies for \
                          and why.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "household_id": {
                        "type": "string",
                        "description": "Household identifier"
                    },
                    "program_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Specific program IDs to check, or empty array to check all"
                    }
                },
                "required": ["household_id"]
            }),
        },
        ToolDefinition {
            name: "calculate_benefit_amounts",
            description: "Calculates exact dollar amounts for eligible benefits based on \
                          household specifics (income, size, rent, etc)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "household_id": {
                        "type": "string",
                        "description": "Household identifier"
                    },
                    "program_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Program IDs to calculate amounts for"
                    }
                },
                "required": ["household_id", "program_ids"]
            }),
        },
        ToolDefinition {
            name: "get_required_documents",
            description: "Returns list of documents needed to complete benefit applications",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "household_id": {
                        "type": "string",
                        "description": "Household identifier"
                    },
                    "program_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Programs to get document requirements for"
                    }
                },
                "required": ["household_id", "program_ids"]
            }),
        },
        ToolDefinition {
            name: "prefill_application",
            description: "Prepares pre-filled application for a benefit program using stored \
                          household data",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "household_id": {
                        "type": "string",
                        "description": "Household identifier"
                    },
                    "program_id": {
                        "type": "string",
                        "description": "Benefit program ID to prepare application for"
                    }
                },
                "required": ["household_id", "program_id"]
            }),
        },
        ToolDefinition {
            name: "submit_application",
            description: "Submits a benefit application after family review and approval",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "household_id": {
                        "type": "string",
                        "description": "Household identifier"
                    },
                    "program_id": {
                        "type": "string",
                        "description": "Program ID to submit application for"
                    },
                    "consent_given": {
                        "type": "boolean",
                        "description": "Whether family has given consent to submit"
                    }
                },
                "required": ["household_id", "program_id", "consent_given"]
            }),
        },
        ToolDefinition {
            name: "check_application_status",
            description: "Checks status of submitted benefit applications",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "household_id": {
                        "type": "string",
                        "description": "Household identifier"
                    },
                    "program_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Program IDs to check status for. Empty array checks \
                                        all submitted applications."
                    }
                },
                "required": ["household_id"]
            }),
        },
    ]
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
enum DispatchFailure {
    #[error("Unknown tool")]
    UnknownTool,
    #[error("invalid input for `{tool}`: {source}")]
    InvalidInput { tool: &'static str, source: serde_json::Error },
    #[error(transparent)]
    Domain(#[from] navigator_core::DomainError),
    #[error("could not serialize tool result: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct HouseholdScopeInput {
    household_id: String,
    #[serde(default)]
    program_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ScanInput {
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApplicationInput {
    household_id: String,
    program_id: String,
}

#[derive(Debug, Deserialize)]
struct SubmitInput {
    household_id: String,
    program_id: String,
    consent_given: bool,
}

/// Pure routing from a named tool invocation to the core engines. Reads
/// the shared catalog/household directory; the only write path is the
/// application ledger on a consented submission.
#[derive(Clone)]
pub struct ToolDispatcher {
    catalog: Arc<Catalog>,
    households: Arc<HouseholdDirectory>,
    ledger: Arc<ApplicationLedger>,
}

impl ToolDispatcher {
    pub fn new(
        catalog: Arc<Catalog>,
        households: Arc<HouseholdDirectory>,
        ledger: Arc<ApplicationLedger>,
    ) -> Self {
        Self { catalog, households, ledger }
    }

    pub fn tool_count(&self) -> usize {
        tool_definitions().len()
    }

    /// Executes a tool and always yields a JSON value; failures become
    /// `{"error": ...}` payloads the driver can read and relay.
    pub fn dispatch(&self, tool_name: &str, input: &Value) -> Value {
        match self.run(tool_name, input) {
            Ok(result) => result,
            Err(failure) => json!({ "error": failure.to_string() }),
        }
    }

    fn run(&self, tool_name: &str, input: &Value) -> Result<Value, DispatchFailure> {
        match tool_name {
            "detect_household_changes" => {
                let scope: HouseholdScopeInput = parse("detect_household_changes", input)?;
                let household = self.household(&scope.household_id)?;
                serialize(&changes::detect(household))
            }
            "scan_benefit_programs" => {
                let scan: ScanInput = parse("scan_benefit_programs", input)?;
                self.scan_programs(&scan.categories)
            }
            "calculate_eligibility" => {
                let scope: HouseholdScopeInput = parse("calculate_eligibility", input)?;
                let household = self.household(&scope.household_id)?;
                let report =
                    eligibility::evaluate(&self.catalog, household, &program_ids(&scope.program_ids))?;
                serialize(&report)
            }
            "calculate_benefit_amounts" => {
                let scope: HouseholdScopeInput = parse("calculate_benefit_amounts", input)?;
                let household = self.household(&scope.household_id)?;
                let statement =
                    benefits::calculate(&self.catalog, household, &program_ids(&scope.program_ids))?;
                serialize(&statement)
            }
            "get_required_documents" => {
                let scope: HouseholdScopeInput = parse("get_required_documents", input)?;
                self.household(&scope.household_id)?;
                let checklist =
                    documents::checklist(&self.catalog, &program_ids(&scope.program_ids))?;
                let mut result = serialize(&checklist)?;
                if let Some(object) = result.as_object_mut() {
                    object.insert("household_id".to_string(), json!(scope.household_id));
                }
                Ok(result)
            }
            "prefill_application" => {
                let application: ApplicationInput = parse("prefill_application", input)?;
                let household = self.household(&application.household_id)?;
                let result = workflow::prefill(
                    &self.catalog,
                    household,
                    &ProgramId::new(application.program_id),
                )?;
                serialize(&result)
            }
            "submit_application" => {
                let submit: SubmitInput = parse("submit_application", input)?;
                let household = self.household(&submit.household_id)?;
                let outcome = workflow::submit(
                    &self.catalog,
                    &self.ledger,
                    household,
                    &ProgramId::new(submit.program_id),
                    submit.consent_given,
                )?;
                match outcome {
                    SubmissionOutcome::Declined { reason } => {
                        Ok(json!({ "success": false, "error": reason }))
                    }
                    SubmissionOutcome::Submitted(receipt) => {
                        let mut result = serialize(&receipt)?;
                        if let Some(object) = result.as_object_mut() {
                            object.insert("success".to_string(), json!(true));
                        }
                        Ok(result)
                    }
                }
            }
            "check_application_status" => {
                let scope: HouseholdScopeInput = parse("check_application_status", input)?;
                let household = self.household(&scope.household_id)?;
                let report = workflow::check_status(
                    &self.catalog,
                    &self.ledger,
                    household,
                    &program_ids(&scope.program_ids),
                )?;
                serialize(&report)
            }
            _ => Err(DispatchFailure::UnknownTool),
        }
    }

    fn household(&self, household_id: &str) -> Result<&Household, DispatchFailure> {
        self.households.get(household_id).ok_or_else(|| {
            DispatchFailure::Domain(navigator_core::DomainError::HouseholdNotFound(
                household_id.to_string(),
            ))
        })
    }

    fn scan_programs(&self, raw_categories: &[String]) -> Result<Value, DispatchFailure> {
        let categories = raw_categories
            .iter()
            .map(|name| name.parse::<Category>())
            .collect::<Result<Vec<_>, _>>()?;

        let programs = self.catalog.programs_in(&categories);
        let scanned: Vec<Category> =
            if categories.is_empty() { Category::ALL.to_vec() } else { categories };

        let entries: Vec<Value> = programs
            .iter()
            .map(|program| {
                json!({
                    "id": program.id,
                    "name": program.name,
                    "nameEs": program.name_es,
                    "description": program.description,
                    "descriptionEs": program.description_es,
                    "agency": program.agency,
                    "category": self.catalog.category_of(&program.id),
                })
            })
            .collect();

        Ok(json!({
            "total_programs_scanned": entries.len(),
            "categories_scanned": scanned,
            "programs": entries,
        }))
    }
}

fn parse<T: serde::de::DeserializeOwned>(
    tool: &'static str,
    input: &Value,
) -> Result<T, DispatchFailure> {
    serde_json::from_value(input.clone())
        .map_err(|source| DispatchFailure::InvalidInput { tool, source })
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<Value, DispatchFailure> {
    serde_json::to_value(value).map_err(DispatchFailure::Serialize)
}

fn program_ids(raw: &[String]) -> Vec<ProgramId> {
    raw.iter().map(ProgramId::new).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use navigator_core::workflow::ApplicationLedger;
    use navigator_core::{standard_catalog, HouseholdDirectory};

    use super::{tool_definitions, ToolDispatcher};

    fn dispatcher() -> ToolDispatcher {
        ToolDispatcher::new(
            Arc::new(standard_catalog()),
            Arc::new(HouseholdDirectory::seeded()),
            Arc::new(ApplicationLedger::seeded()),
        )
    }

    #[test]
    fn exposes_exactly_the_eight_contract_tools() {
        let names: Vec<&str> = tool_definitions().iter().map(|tool| tool.name).collect();
        assert_eq!(
            names,
            vec![
                "detect_household_changes",
                "scan_benefit_programs",
                "calculate_eligibility",
                "calculate_benefit_amounts",
                "get_required_documents",
                "prefill_application",
                "submit_application",
                "check_application_status",
            ]
        );
    }

    #[test]
    fn every_tool_schema_is_an_object_schema() {
        for tool in tool_definitions() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(!tool.description.is_empty(), "{}", tool.name);
        }
    }

    #[test]
    fn unknown_tool_yields_the_contract_error_payload() {
        let result = dispatcher().dispatch("transfer_funds", &json!({}));
        assert_eq!(result, json!({ "error": "Unknown tool" }));
    }

    #[test]
    fn scan_with_empty_categories_covers_the_whole_catalog() {
        let result = dispatcher().dispatch("scan_benefit_programs", &json!({ "categories": [] }));
        assert_eq!(result["total_programs_scanned"], 12);
        assert_eq!(result["categories_scanned"], json!(["federal", "state", "city", "education"]));
        assert_eq!(result["programs"][0]["id"], "snap");
        assert_eq!(result["programs"][0]["category"], "federal");
        // Spanish variants ride alongside in camelCase, unlike the rest
        // of this tool's snake_case counters.
        assert_eq!(result["programs"][0]["nameEs"], "Asistencia de Alimentos SNAP");
        assert_eq!(
            result["programs"][0]["descriptionEs"],
            "Asistencia mensual para comprar alimentos"
        );
    }

    #[test]
    fn scan_rejects_unknown_categories() {
        let result =
            dispatcher().dispatch("scan_benefit_programs", &json!({ "categories": ["county"] }));
        assert!(result["error"].as_str().expect("error").contains("county"));
    }

    #[test]
    fn eligibility_defaults_to_all_programs() {
        let result = dispatcher()
            .dispatch("calculate_eligibility", &json!({ "household_id": "PARENT_001" }));
        assert_eq!(result["total_programs_checked"], 12);
        assert_eq!(result["household_id"], "PARENT_001");
        assert_eq!(
            result["eligible_programs"].as_u64().unwrap()
                + result["ineligible_programs"].as_u64().unwrap(),
            12
        );
    }

    #[test]
    fn benefit_amounts_include_totals_matching_the_sum() {
        let result = dispatcher().dispatch(
            "calculate_benefit_amounts",
            &json!({ "household_id": "PARENT_001", "program_ids": ["snap", "wic"] }),
        );
        assert_eq!(result["program_amounts"][0]["monthly_amount"], 316);
        assert_eq!(result["program_amounts"][1]["monthly_amount"], 47);
        assert_eq!(result["total_monthly_benefit"], 316 + 47);
        assert_eq!(result["total_annual_benefit"], (316 + 47) * 12);
    }

    #[test]
    fn documents_payload_carries_household_id_and_union() {
        let result = dispatcher().dispatch(
            "get_required_documents",
            &json!({ "household_id": "PARENT_001", "program_ids": ["snap", "wic"] }),
        );
        assert_eq!(result["household_id"], "PARENT_001");
        assert_eq!(result["programs_checked"], 2);
        assert_eq!(result["total_unique_documents"], 6);
    }

    #[test]
    fn submission_without_consent_is_declined() {
        let result = dispatcher().dispatch(
            "submit_application",
            &json!({
                "household_id": "PARENT_001",
                "program_id": "snap",
                "consent_given": false
            }),
        );
        assert_eq!(result["success"], false);
        assert_eq!(result["error"], "Cannot submit without family consent");
        assert!(result.get("confirmation_number").is_none());
    }

    #[test]
    fn consented_submission_then_status_check_round_trips() {
        let dispatcher = dispatcher();
        let submitted = dispatcher.dispatch(
            "submit_application",
            &json!({
                "household_id": "PARENT_001",
                "program_id": "cc_tuition",
                "consent_given": true
            }),
        );
        assert_eq!(submitted["success"], true);
        let confirmation = submitted["confirmation_number"].as_str().expect("confirmation");
        assert!(confirmation.starts_with("CC_TUITION-"));

        let status = dispatcher.dispatch(
            "check_application_status",
            &json!({ "household_id": "PARENT_001", "program_ids": ["cc_tuition"] }),
        );
        assert_eq!(status["statuses"][0]["status"], "pending");
        assert_eq!(status["summary"]["pending"], 1);
    }

    #[test]
    fn unknown_household_is_reported_in_the_error_payload() {
        let result = dispatcher()
            .dispatch("detect_household_changes", &json!({ "household_id": "PARENT_404" }));
        assert!(result["error"].as_str().expect("error").contains("PARENT_404"));
    }

    #[test]
    fn unknown_program_id_is_surfaced_not_skipped() {
        let result = dispatcher().dispatch(
            "calculate_benefit_amounts",
            &json!({ "household_id": "PARENT_001", "program_ids": ["snap", "ebt"] }),
        );
        assert!(result["error"].as_str().expect("error").contains("ebt"));
    }

    #[test]
    fn malformed_input_is_an_error_payload_not_a_panic() {
        let result = dispatcher().dispatch("prefill_application", &json!({ "program_id": 7 }));
        assert!(result["error"].as_str().expect("error").contains("prefill_application"));
    }
}
