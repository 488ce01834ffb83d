use freshplate_core::auth::{Credential, MemoryTokenStore, SignInClient};
use freshplate_core::config::TOKEN_ENV;

use crate::commands::common::AppContext;
use crate::error::CliError;

pub async fn run_login(email: &str, password: &str, context: &AppContext) -> Result<(), CliError> {
    let base_url = context.config.api_base_url()?;
    let client = SignInClient::new(base_url, context.config.request_timeout())?;
    let store = MemoryTokenStore::new();
    let session = client.sign_in_into(&store, email, password).await?;

    let label = session
        .user
        .email
        .as_deref()
        .or(session.user.name.as_deref())
        .unwrap_or("(no email)");
    println!("Signed in as {label}");
    println!("{}", token_export_line(&session.credential));
    Ok(())
}

/// Shell line that makes the token available to later invocations.
pub fn token_export_line(credential: &Credential) -> String {
    format!("export {TOKEN_ENV}={}", credential.token())
}
