use crate::{
    api,
    cli::{actions::Action, globals::Config},
};
use anyhow::Result;
use tracing::warn;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            token_secret,
        } => {
            // Fail early on malformed connection strings.
            let dsn = Url::parse(&dsn)?;

            let config = Config::new(token_secret);
            if config.is_fallback_secret() {
                warn!(
                    "PRESENZA_TOKEN_SECRET not set, using a development-only fallback signing key"
                );
            }

            api::new(port, dsn.to_string(), config).await?;
        }
    }

    Ok(())
}
