use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::Config;
use crate::formatters::{CalendarFormatter, JsonCalendarFormatter, TerminalCalendarFormatter};
use crate::services::CalendarService;

pub mod calendar;
pub mod config_ops;

/// Trait for all command implementations
#[async_trait]
pub trait Command {
    /// Execute the command with the provided context
    async fn execute(&mut self, context: &CommandContext) -> Result<()>;
}

/// Shared context for all commands
pub struct CommandContext {
    pub config: Arc<RwLock<Config>>,
    pub calendar: CalendarService,
    pub json_output: bool,
}

impl CommandContext {
    pub fn new(config: Arc<RwLock<Config>>, calendar: CalendarService, json_output: bool) -> Self {
        Self {
            config,
            calendar,
            json_output,
        }
    }

    /// Formatter matching the requested output mode
    pub fn formatter(&self) -> Box<dyn CalendarFormatter + Send + Sync> {
        if self.json_output {
            Box::new(JsonCalendarFormatter::default())
        } else {
            Box::new(TerminalCalendarFormatter::new(self.config.read().display.use_colors))
        }
    }

    pub fn events_per_day(&self) -> usize {
        self.config.read().get_events_per_day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::Facets;

    fn context(json_output: bool) -> CommandContext {
        let mut config = Config::default();
        config.display.use_colors = false;
        let calendar = CalendarService::new(&config).unwrap();
        CommandContext::new(Arc::new(RwLock::new(config)), calendar, json_output)
    }

    #[test]
    fn test_formatter_follows_output_mode() {
        let facets = Facets {
            categories: vec!["Funding".to_string()],
            audiences: Vec::new(),
        };

        let json = context(true).formatter().format_facets(&facets).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["categories"][0], "Funding");

        let text = context(false).formatter().format_facets(&facets).unwrap();
        assert!(text.contains("Categories"));
        assert!(text.contains("- Funding"));
    }

    #[test]
    fn test_events_per_day_reads_shared_config() {
        let context = context(false);
        context.config.write().display.max_events_per_day = 5;
        assert_eq!(context.events_per_day(), 5);
    }
}
