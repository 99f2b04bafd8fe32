//! Per-user status command.

use anyhow::Result;
use console::style;

use voxclone_types::credential::UserId;

use crate::state::AppState;

/// Show the stored credential metadata and last clone ids for a user.
///
/// Never decrypts or prints the key itself.
pub async fn status(state: &AppState, user: &str, json: bool) -> Result<()> {
    let user = UserId::parse(user)?;
    let record = state.clone_service.status(&user).await?;

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "templates_dir": state.templates_dir.display().to_string(),
            "linked": record.is_some(),
            "credentials": record,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} voxclone v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("  {}", style("── User ──").dim());
    println!("  Id:         {}", style(&user).bold());

    let Some(record) = record else {
        println!("  Linked:     {}", style("no").yellow());
        println!();
        println!(
            "  Run {} to store an API key.",
            style(format!("voxclone link {user}")).cyan()
        );
        return Ok(());
    };

    println!("  Linked:     {}", style("yes").green());
    println!(
        "  Web token:  {}",
        if record.has_web_token { "stored" } else { "none" }
    );
    println!(
        "  Updated:    {}",
        record.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    println!("  {}", style("── Clones ──").dim());
    let show = |id: Option<&str>| match id {
        Some(id) => style(id.to_string()).cyan(),
        None => style("not cloned yet".to_string()).dim(),
    };
    println!("  Tool:       {}", show(record.tool_id.as_deref()));
    println!("  Assistant:  {}", show(record.assistant_id.as_deref()));
    println!();

    println!("  {}", style("── Storage ──").dim());
    println!("  Data:       {}", state.data_dir.display());
    println!("  Templates:  {}", state.templates_dir.display());
    println!();

    Ok(())
}
