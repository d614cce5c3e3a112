use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

use super::{Command, CommandContext};
use crate::config::Config;

/// Command to write the current configuration to disk
pub struct InitConfigCommand {
    pub path: Option<PathBuf>,
}

#[async_trait]
impl Command for InitConfigCommand {
    async fn execute(&mut self, context: &CommandContext) -> Result<()> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Config::get_config_path()?,
        };

        let config = context.config.read().clone();
        config.save_to(&path).await?;

        println!("✅ Configuration written to {}", path.display());
        println!("💡 Timezone: {}", config.get_timezone());
        println!("💡 Events API: {}", config.get_api_url());
        Ok(())
    }
}
