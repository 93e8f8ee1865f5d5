use async_trait::async_trait;
use inquire::Confirm;

use weather_lookup_core::{Coordinates, LocationError, LocationSource, Permission};

const CONSENT_PROMPT: &str = "Allow weather to look up your approximate location?";

/// Asks the user before letting the wrapped source take a reading.
#[derive(Debug, Clone)]
pub struct PromptedLocation<S> {
    inner: S,
    assume_yes: bool,
}

impl<S: LocationSource> PromptedLocation<S> {
    pub fn new(inner: S, assume_yes: bool) -> Self {
        Self { inner, assume_yes }
    }
}

fn ask() -> Permission {
    let answer = Confirm::new(CONSENT_PROMPT)
        .with_default(false)
        .with_help_message("Your public IP address is sent to ip-api.com")
        .prompt();

    match answer {
        Ok(true) => Permission::Granted,
        Ok(false) => Permission::Denied,
        Err(err) => {
            // No terminal, or the prompt was cancelled.
            tracing::debug!(%err, "location consent prompt failed");
            Permission::Denied
        }
    }
}

#[async_trait]
impl<S: LocationSource> LocationSource for PromptedLocation<S> {
    async fn request_permission(&self) -> Permission {
        if !self.assume_yes {
            let answer = tokio::task::spawn_blocking(ask).await.unwrap_or(Permission::Denied);
            if answer == Permission::Denied {
                return Permission::Denied;
            }
        }
        self.inner.request_permission().await
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.inner.current_position().await
    }
}
