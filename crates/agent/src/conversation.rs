use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use navigator_core::{Household, HouseholdDirectory};

use crate::driver::{ChatMessage, DialogueDriver, DriverTurn};
use crate::tools::{tool_definitions, ToolDispatcher};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("unknown household `{0}`")]
    HouseholdNotFound(String),
    #[error("dialogue driver failed")]
    Driver(#[source] anyhow::Error),
    #[error("dialogue driver timed out after {0:?}")]
    DriverTimeout(Duration),
    #[error("tool-call round limit of {0} exceeded in one turn")]
    ToolRoundLimit(u32),
}

/// One conversation's state. Message history is in the driver's wire
/// shape so it can be replayed to the driver verbatim each round.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub household_id: String,
    pub language: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn new(id: String, household_id: String, language: String) -> Self {
        Self { id, household_id, language, messages: Vec::new(), created_at: Utc::now() }
    }
}

/// Shared session registry. The outer map lock is held only to look up or
/// insert; each session carries its own async mutex so concurrent
/// messages to the same session serialize while distinct sessions
/// proceed in parallel.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(
        &self,
        session_id: &str,
        household_id: &str,
        language: &str,
    ) -> Arc<Mutex<Session>> {
        if let Some(session) = self.get(session_id) {
            return session;
        }
        let mut sessions = self.sessions.write().expect("session map lock poisoned");
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                info!(session_id, household_id, "creating session");
                Arc::new(Mutex::new(Session::new(
                    session_id.to_string(),
                    household_id.to_string(),
                    language.to_string(),
                )))
            })
            .clone()
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().expect("session map lock poisoned").get(session_id).cloned()
    }

    pub fn evict(&self, session_id: &str) -> bool {
        self.sessions.write().expect("session map lock poisoned").remove(session_id).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.read().expect("session map lock poisoned").len()
    }
}

/// Caps for one conversational turn. `max_tool_rounds` bounds how many
/// tool invocations a single user message may trigger before the turn is
/// aborted instead of looping forever.
#[derive(Clone, Copy, Debug)]
pub struct LoopSettings {
    pub max_tool_rounds: u32,
    pub driver_timeout: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self { max_tool_rounds: 10, driver_timeout: Duration::from_secs(60) }
    }
}

/// A tool invocation that happened during a turn, surfaced to callers
/// for transparency alongside the assistant's final text.
#[derive(Clone, Debug, Serialize)]
pub struct ToolCallRecord {
    pub tool: String,
    pub input: Value,
    pub result: Value,
}

#[derive(Clone, Debug)]
pub struct TurnOutcome {
    pub message: String,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Orchestrates one user message into a finished assistant reply:
/// replay history to the driver, execute any tool it requests, feed the
/// result back, repeat until the driver produces text.
pub struct ConversationLoop {
    driver: Arc<dyn DialogueDriver>,
    dispatcher: ToolDispatcher,
    households: Arc<HouseholdDirectory>,
    store: SessionStore,
    settings: LoopSettings,
}

impl ConversationLoop {
    pub fn new(
        driver: Arc<dyn DialogueDriver>,
        dispatcher: ToolDispatcher,
        households: Arc<HouseholdDirectory>,
        settings: LoopSettings,
    ) -> Self {
        Self { driver, dispatcher, households, store: SessionStore::new(), settings }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    pub async fn handle_message(
        &self,
        session_id: &str,
        household_id: &str,
        language: &str,
        user_message: &str,
    ) -> Result<TurnOutcome, AgentError> {
        let household = self
            .households
            .get(household_id)
            .ok_or_else(|| AgentError::HouseholdNotFound(household_id.to_string()))?;

        let session = self.store.get_or_create(session_id, household_id, language);
        let mut session = session.lock().await;

        let system_prompt = system_prompt(household, &session.language);
        let tools = tool_definitions();

        session.messages.push(ChatMessage::user_text(user_message));

        let mut tool_calls = Vec::new();
        for round in 0..self.settings.max_tool_rounds {
            let turn = tokio::time::timeout(
                self.settings.driver_timeout,
                self.driver.next_turn(&system_prompt, &session.messages, &tools),
            )
            .await
            .map_err(|_| AgentError::DriverTimeout(self.settings.driver_timeout))?
            .map_err(AgentError::Driver)?;

            match turn {
                DriverTurn::FinalText(text) => {
                    session.messages.push(ChatMessage::assistant_text(&text));
                    debug!(session_id, rounds = round, tools = tool_calls.len(), "turn finished");
                    return Ok(TurnOutcome { message: text, tool_calls });
                }
                DriverTurn::ToolRequest { id, name, input } => {
                    info!(session_id, tool = %name, "executing tool");
                    let result = self.dispatcher.dispatch(&name, &input);
                    session.messages.push(ChatMessage::assistant_tool_use(
                        &id,
                        &name,
                        input.clone(),
                    ));
                    session.messages.push(ChatMessage::tool_result(&id, &result));
                    tool_calls.push(ToolCallRecord { tool: name, input, result });
                }
            }
        }

        warn!(session_id, limit = self.settings.max_tool_rounds, "tool round limit exceeded");
        Err(AgentError::ToolRoundLimit(self.settings.max_tool_rounds))
    }
}

/// System prompt handed to the driver each round. The driver narrates
/// and sequences; every figure it reports must come from tool results.
fn system_prompt(household: &Household, language: &str) -> String {
    let language_line = if language == "es" || household.language == "es" {
        "Respond in Spanish. The family prefers Spanish for all communication."
    } else {
        "Respond in English, and offer Spanish if the family seems to prefer it."
    };

    format!(
        "You are a benefits navigator helping the {name} family find and apply for \
         government benefit programs in Massachusetts.\n\
         \n\
         Household context: {name}, household of {size}, monthly income ${income}, \
         employment status {employment}.\n\
         \n\
         Work proactively: when circumstances change, detect the change, scan the full \
         program catalog, check eligibility, calculate amounts, and walk the family \
         through documents, pre-filled applications, and submission.\n\
         \n\
         Rules:\n\
         - Use the tools for every factual claim. Never estimate eligibility, dollar \
         amounts, or application status yourself.\n\
         - Never submit an application without explicit consent from the family.\n\
         - Be warm, concrete, and brief. Lead with what the family gains.\n\
         - {language_line}",
        name = household.name,
        size = household.household_size,
        income = household.monthly_income,
        employment = household.employment.status.as_str(),
        language_line = language_line,
    )
}
