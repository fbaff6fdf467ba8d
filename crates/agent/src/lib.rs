//! Agent runtime - tool dispatch and conversation orchestration
//!
//! This crate sits between the HTTP surface and the deterministic core
//! engines:
//! - Describes the eight benefit tools to the dialogue driver (`tools`)
//! - Routes tool invocations into the core engines (`tools`)
//! - Owns per-session message history and the bounded tool-call loop
//!   (`conversation`)
//! - Abstracts the dialogue-driver service behind a trait (`driver`)
//!
//! # Safety principle
//!
//! The dialogue driver is strictly a translator and step-sequencer. It
//! never computes eligibility, dollar amounts, or application state;
//! those are deterministic decisions made by `navigator-core`.

pub mod conversation;
pub mod driver;
pub mod tools;

pub use conversation::{
    AgentError, ConversationLoop, LoopSettings, Session, SessionStore, ToolCallRecord, TurnOutcome,
};
pub use driver::{ChatMessage, ContentBlock, DialogueDriver, DriverTurn, Role};
pub use tools::{tool_definitions, ToolDefinition, ToolDispatcher};
