//! Credential CLI commands: link, unlink.

use anyhow::Result;
use console::style;
use dialoguer::Password;

use voxclone_types::credential::{Redacted, UserId};

use crate::state::AppState;

/// Store a user's platform credentials, prompting for the key when needed.
///
/// # Examples
///
/// ```bash
/// # Secure prompt (recommended)
/// voxclone link user-42
///
/// # Script/automation mode
/// voxclone link user-42 --api-key sk_... --web-token wt_...
/// ```
pub async fn link(
    state: &AppState,
    user: &str,
    api_key: Option<&str>,
    web_token: Option<&str>,
    json: bool,
) -> Result<()> {
    let user = UserId::parse(user)?;

    let api_key = match api_key {
        Some(k) => k.to_string(),
        None => Password::new()
            .with_prompt(format!("Platform API key for {}", style(&user).bold()))
            .interact()?,
    };

    state
        .clone_service
        .link(&user, &api_key, web_token)
        .await?;

    let masked = Redacted::new(api_key.trim()).masked();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "linked": true,
                "user_id": user,
                "api_key": masked,
                "has_web_token": web_token.is_some_and(|t| !t.trim().is_empty()),
            })
        );
    } else {
        println!(
            "  {} Linked {} ({})",
            style("✓").green().bold(),
            style(&user).bold(),
            masked
        );
    }

    Ok(())
}

/// Delete a user's stored credentials and remembered clone ids.
pub async fn unlink(state: &AppState, user: &str, json: bool) -> Result<()> {
    let user = UserId::parse(user)?;
    state.clone_service.unlink(&user).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "unlinked": true, "user_id": user })
        );
    } else {
        println!(
            "  {} Unlinked {}",
            style("✓").green().bold(),
            style(&user).bold()
        );
    }

    Ok(())
}
