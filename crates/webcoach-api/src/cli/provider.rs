//! `webcoach check-provider`: probe the configured completion provider.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Send the probe message and print the provider's reply.
pub async fn check_provider(state: &AppState, json: bool) -> Result<()> {
    let provider = state.chat_service.provider_name().to_string();
    let model = state.config.llm.model.clone();

    match state.chat_service.check_provider().await {
        Ok(reply) => {
            if json {
                let out = serde_json::json!({
                    "provider": provider,
                    "model": model,
                    "ok": true,
                    "result": reply,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!();
                println!(
                    "  {} {} ({}) is reachable",
                    style("✓").green().bold(),
                    style(&provider).cyan(),
                    style(&model).dim()
                );
                println!();
                println!("  {}", reply);
                println!();
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let out = serde_json::json!({
                    "provider": provider,
                    "model": model,
                    "ok": false,
                    "error": e.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                eprintln!();
                eprintln!(
                    "  {} {} check failed: {}",
                    style("✗").red().bold(),
                    style(&provider).cyan(),
                    e
                );
                eprintln!();
            }
            Err(e.into())
        }
    }
}
