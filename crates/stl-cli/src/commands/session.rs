use super::CommandContext;
use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};
use stl_client::ClientError;
use stl_client::models::RegistrationRequest;

pub async fn login(ctx: &CommandContext, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    match ctx.session.authenticate(username, &password).await {
        Ok(user) => {
            println!("Signed in as {} ({})", user.username, user.role.as_deref().unwrap_or("no role"));
            Ok(())
        }
        Err(ClientError::InvalidCredentials { .. }) => bail!("Invalid username or password"),
        Err(e) if e.is_transport() => bail!("Could not reach the server at {}: {}", ctx.config.api.base_url, e),
        Err(e) => Err(e).context("Sign-in failed"),
    }
}

pub fn logout(ctx: &CommandContext) {
    ctx.session.logout();
    println!("Signed out.");
}

pub async fn whoami(ctx: &CommandContext) -> Result<()> {
    ctx.restore().await;

    let Some(user) = ctx.session.view().current_user() else {
        println!("Not signed in.");
        return Ok(());
    };

    println!("Username: {}", user.username);
    println!("Role:     {}", user.role.as_deref().unwrap_or("-"));
    if let Some(email) = &user.email {
        println!("Email:    {}", email);
    }
    if let Some(company) = &user.company {
        println!("Company:  {}", company);
    }

    Ok(())
}

pub async fn register(ctx: &CommandContext, username: String, email: String, password: String, company: Option<String>) -> Result<()> {
    let request = RegistrationRequest::client(username, email, password, company);
    let user = ctx.session.register(request).await.context("Registration failed")?;

    println!("Registered client account {}", user.username);
    println!("Sign in with: stl login {}", user.username);
    Ok(())
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
