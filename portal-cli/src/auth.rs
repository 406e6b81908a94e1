use std::process::ExitCode;

use console::style;
use dialoguer::Password;
use portal::{
    models::StudentRequest,
    session::Session,
    validation::{validate_password, Validate},
    Portal,
};
use tracing::info;

use crate::{utils::prompt_if_missing, work::spinner, write_success, TERMINAL};

fn print_token(session: &Session) -> anyhow::Result<()> {
    TERMINAL.write_line("")?;
    TERMINAL.write_line(&session.token)?;
    TERMINAL.write_line("")?;
    TERMINAL.write_line(&format!(
        "{} export PORTAL_TOKEN={}",
        style("Use it with").dim(),
        session.token
    ))?;

    Ok(())
}

pub async fn login(portal: &mut Portal, email: Option<&str>) -> anyhow::Result<ExitCode> {
    let email = prompt_if_missing(email, "Email")?;
    let password = Password::new().with_prompt("Password").interact()?;

    let spinner = spinner("Signing in", email.clone());
    let result = portal.login(&email, &password).await.cloned();
    spinner.finish_and_clear();

    let session = result?;

    let name = session
        .user
        .as_ref()
        .map(|user| user.name.clone())
        .unwrap_or(email);

    write_success(&format!(
        "Signed in as {} ({})",
        style(name).bold(),
        session.role
    ))?;
    print_token(&session)?;

    Ok(ExitCode::SUCCESS)
}

pub async fn register(portal: &mut Portal) -> anyhow::Result<ExitCode> {
    let name = prompt_if_missing(None, "Name")?;
    let email = prompt_if_missing(None, "Email")?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "The passwords do not match")
        .validate_with(|password: &String| validate_password(password).map_err(|err| err.to_string()))
        .interact()?;

    let request = StudentRequest {
        name: name.trim().to_owned(),
        email: email.trim().to_lowercase(),
        password: Some(password),
    };
    request.validate()?;

    let spinner = spinner("Registering", request.email.clone());
    let result = portal.api.register(&request).await;
    spinner.finish_and_clear();

    let session = Session::from(result?);
    portal.set_session(Some(session.clone()));

    info!("Registered {}", request.email);

    write_success(&format!("Registered {}", style(&request.name).bold()))?;
    print_token(&session)?;

    Ok(ExitCode::SUCCESS)
}

pub async fn logout(portal: &mut Portal) -> anyhow::Result<ExitCode> {
    portal.logout().await?;

    write_success("Signed out and cleared local bookmarks")?;
    TERMINAL.write_line(&format!("{} unset PORTAL_TOKEN", style("Also run").dim()))?;

    Ok(ExitCode::SUCCESS)
}
