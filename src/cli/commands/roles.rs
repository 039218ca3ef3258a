//! Roles command implementation.

use crate::agent::AgentRole;
use crate::cli::Output;
use crate::config::{Instructions, Settings};
use anyhow::Result;
use console::style;

/// List the coaching agents with their instructions.
pub fn run_roles(settings: &Settings) -> Result<()> {
    let instructions = Instructions::load(
        settings.instructions.custom_dir.as_deref(),
        Some(&settings.instructions.variables),
    )?;

    Output::header("Coaching agents");

    for role in AgentRole::ALL {
        println!();
        println!(
            "{} {} ({})",
            style("*").cyan(),
            style(role.name()).bold(),
            style(role.key()).dim()
        );
        Output::kv("Role", role.description());
        Output::kv("Model", &settings.model.name);
        for line in instructions.for_role(role) {
            println!("    {}", line);
        }
    }

    println!();
    Output::kv("Conversation prompt", &instructions.conversation_prompt());

    Ok(())
}
