mod args;
mod auth;
mod bookmark;
mod comment;
mod logging;
mod student;
mod table;
mod tag;
mod utils;
mod work;

use std::{fs, process::ExitCode};

use args::{Arguments, Command};
use clap::Parser;
use console::{Style, Term};
use directories::ProjectDirs;
use indicatif::ProgressStyle;
use lazy_static::lazy_static;
use logging::initialize_logging;
use portal::{session::Session, Portal, DEFAULT_CONFIG};
use tracing::{error, info};

lazy_static! {
    pub static ref ARGUMENTS: Arguments = Arguments::parse();
    pub static ref PROJECT_DIRS: ProjectDirs =
        ProjectDirs::from("cz", "finalworks", "portal").expect("could not get project directories");
    pub static ref TERMINAL: Term = Term::stdout();
    pub static ref PREFIX_STYLE: Style = Style::new().green().bold();
    pub static ref ERROR_STYLE: Style = Style::new().red().bold();
    pub static ref SPINNER_STYLE: ProgressStyle =
        ProgressStyle::with_template("{prefix} {spinner} {wide_msg}")
            .expect("invalid spinner template");
}

fn ensure_config() -> anyhow::Result<()> {
    if !fs::exists(&ARGUMENTS.config)? {
        write_config()?;
    }

    Ok(())
}

fn write_config() -> anyhow::Result<()> {
    fs::create_dir_all(
        ARGUMENTS
            .config
            .parent()
            .ok_or_else(|| anyhow::anyhow!("could not get config path directory"))?,
    )?;
    fs::write(&ARGUMENTS.config, DEFAULT_CONFIG)?;

    info!("Wrote default config to {:?}", ARGUMENTS.config);

    Ok(())
}

async fn fallible() -> anyhow::Result<ExitCode> {
    if let Command::WriteConfig = &ARGUMENTS.command {
        write_config()?;
        write_success(&format!("Wrote {}", ARGUMENTS.config.to_string_lossy()))?;
        return Ok(ExitCode::SUCCESS);
    }

    if let Err(err) = ensure_config() {
        error!("Could not create the config: {err}");
        write_failure(&format!("Failed to create the config: {err}"))?;
        return Ok(ExitCode::FAILURE);
    }

    let mut portal = Portal::from_path(&ARGUMENTS.config).await?;

    portal.set_session(ARGUMENTS.token.as_deref().map(Session::from_token));

    let result = match &ARGUMENTS.command {
        Command::Home { display_options } => work::home(&mut portal, display_options).await,
        Command::Work { command } => work::work_command(&mut portal, command).await,
        Command::Comment { command } => comment::comment_command(&mut portal, command).await,
        Command::Bookmark { command } => bookmark::bookmark_command(&mut portal, command).await,
        Command::Rate { work, score } => bookmark::rate(&portal, *work, *score).await,
        Command::Tag { command } => tag::tag_command(&mut portal, command).await,
        Command::Student { command } => student::student_command(&mut portal, command).await,
        Command::Login { email } => auth::login(&mut portal, email.as_deref()).await,
        Command::Register => auth::register(&mut portal).await,
        Command::Logout => auth::logout(&mut portal).await,
        Command::WriteConfig => unreachable!("handled before loading the portal"),
    };

    match result {
        Ok(code) => Ok(code),
        Err(err) => match err.downcast::<portal::Error>() {
            Ok(err) => {
                error!("{err}");
                write_failure(&format!("Failed: {err}"))?;

                Ok(ExitCode::FAILURE)
            }
            Err(err) => Err(err),
        },
    }
}

pub fn write_with(string: &str, style: &Style) -> anyhow::Result<()> {
    let Some((first_word, rest)) = string.split_once(" ") else {
        TERMINAL.write_line(&format!("{}", style.apply_to(string)))?;

        return Ok(());
    };

    TERMINAL.write_line(&format!("{} {}", style.apply_to(first_word), rest))?;

    Ok(())
}

pub fn write_success(string: &str) -> anyhow::Result<()> {
    write_with(string, &PREFIX_STYLE)
}

pub fn write_failure(string: &str) -> anyhow::Result<()> {
    write_with(string, &ERROR_STYLE)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    initialize_logging()?;

    let result = fallible().await;

    if let Err(err) = &result {
        error!("Portal encountered an error which it could not recover from");
        error!("{err}");
    }

    result
}
