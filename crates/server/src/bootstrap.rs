use std::sync::Arc;
use std::time::Duration;

use navigator_agent::{ConversationLoop, LoopSettings, ToolDispatcher};
use navigator_core::config::{AppConfig, ConfigError, LoadOptions};
use navigator_core::workflow::ApplicationLedger;
use navigator_core::{standard_catalog, HouseholdDirectory};
use thiserror::Error;
use tracing::info;

use crate::anthropic::{AnthropicDriver, DriverBuildError};
use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Driver(#[from] DriverBuildError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!("starting application bootstrap");

    let catalog = Arc::new(standard_catalog());
    let households = Arc::new(HouseholdDirectory::seeded());
    let ledger = Arc::new(ApplicationLedger::seeded());
    info!(programs = catalog.len(), "benefit catalog loaded");

    let dispatcher = ToolDispatcher::new(catalog, households.clone(), ledger);
    let driver = Arc::new(AnthropicDriver::from_config(&config.anthropic)?);
    let settings = LoopSettings {
        max_tool_rounds: config.agent.max_tool_rounds,
        driver_timeout: Duration::from_secs(config.agent.driver_timeout_secs),
    };

    let conversation =
        Arc::new(ConversationLoop::new(driver, dispatcher, households.clone(), settings));

    Ok(Application { config, state: AppState::new(conversation, households) })
}

#[cfg(test)]
mod tests {
    use navigator_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    #[tokio::test]
    async fn bootstrap_fails_fast_on_a_blank_driver_credential() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                anthropic_api_key: Some("   ".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;
        let message = result.err().expect("error").to_string();
        assert!(message.contains("anthropic.api_key"));
    }

    #[tokio::test]
    async fn bootstrap_wires_catalog_households_and_agent() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                anthropic_api_key: Some("sk-test".to_string()),
                max_tool_rounds: Some(4),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with a credential");

        assert_eq!(app.config.agent.max_tool_rounds, 4);
        assert_eq!(app.state.conversation().dispatcher().tool_count(), 8);
        assert_eq!(app.state.conversation().store().active_count(), 0);
    }
}
