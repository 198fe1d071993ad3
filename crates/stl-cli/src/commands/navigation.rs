use super::CommandContext;
use anyhow::Result;
use stl_client::access::{Navigation, Resolution, standard_menu};

pub async fn open(ctx: &CommandContext, path: &str, strict: bool) -> Result<()> {
    ctx.restore().await;
    let session = ctx.session.snapshot();

    match ctx.access.navigate(path, &session) {
        Navigation::Loading => println!("Session is still loading"),
        Navigation::Render { route, view, params } => {
            println!("Route:  {}", route);
            println!("View:   {}", view);
            let mut params: Vec<_> = params.into_iter().collect();
            params.sort();
            for (key, value) in params {
                println!("Param:  {} = {}", key, value);
            }
        }
        Navigation::Redirect(target) => {
            println!("Redirect to {} ({})", target, target.path(None));
        }
    }

    if strict {
        if let Resolution::Route { route, .. } = ctx.access.routes().resolve(path) {
            ctx.access.ensure(route, &session)?;
        }
    }

    Ok(())
}

pub async fn show_menu(ctx: &CommandContext, current: Option<&str>) -> Result<()> {
    ctx.restore().await;
    let session = ctx.session.snapshot();

    let groups = ctx.access.visible_menu(&standard_menu(), &session);
    if groups.is_empty() {
        println!("No menu entries. Sign in first.");
        return Ok(());
    }

    for group in groups {
        println!("{}", group.label);
        for entry in group.entries {
            let marker = if current.map(|path| entry.is_active(path)).unwrap_or(false) { ">" } else { " " };
            println!("  {} {:<16} {}", marker, entry.label, entry.path);
        }
    }

    Ok(())
}

pub fn list_routes(ctx: &CommandContext) {
    println!("{:<20} {:<24} {:<30}", "Route", "Path", "Access");
    println!("{}", "-".repeat(74));

    for permission in ctx.access.routes().permissions() {
        println!("{:<20} {:<24} {:<30}", permission.route.name(), permission.route.pattern(), permission.access.to_string());
    }
}
