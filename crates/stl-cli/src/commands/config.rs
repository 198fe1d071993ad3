use super::CommandContext;
use crate::ConfigCommands;
use anyhow::Result;

pub fn handle_config_command(ctx: &CommandContext, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show_config(ctx),
    }
}

fn show_config(ctx: &CommandContext) -> Result<()> {
    println!("Current Configuration");
    println!("====================");

    println!("Data Directory: {}", ctx.config.data_dir.display());
    println!("Data Source: {}", ctx.config.data_source);
    println!();

    println!("API Settings:");
    println!("  Base URL: {}", ctx.config.api.base_url);
    println!("  Token Path: {}", ctx.config.api.token_path);
    println!("  Profile Path: {}", ctx.config.api.profile_path);
    println!("  Register Path: {}", ctx.config.api.register_path);
    match ctx.config.api.request_timeout() {
        Some(timeout) => println!("  Request Timeout: {}s", timeout.as_secs()),
        None => println!("  Request Timeout: none"),
    }
    println!();

    println!("Access Settings:");
    println!("  Fallback Route: {}", ctx.config.access.fallback_route);
    let mut overrides: Vec<_> = ctx.config.access.role_fallbacks.iter().collect();
    overrides.sort();
    for (role, route) in overrides {
        println!("  Fallback for {}: {}", role, route);
    }
    println!();

    println!("Fixture Settings:");
    println!("  Password Required: {}", ctx.config.fixture.password.is_some());

    Ok(())
}
