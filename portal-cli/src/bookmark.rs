use std::process::ExitCode;

use console::style;
use portal::{models::WorkId, Portal};

use crate::{
    args::BookmarkCommand,
    utils::format_stars,
    work::{print_works, spinner, LocalState},
    write_success, TERMINAL,
};

pub async fn bookmark_command(
    portal: &mut Portal,
    command: &BookmarkCommand,
) -> anyhow::Result<ExitCode> {
    match command {
        BookmarkCommand::Add { work } => {
            if portal.preferences.add_bookmark(*work).await? {
                write_success(&format!("Bookmarked work {}", style(work).bold()))?;
            } else {
                TERMINAL.write_line(&format!("Work {work} is already bookmarked"))?;
            }
        }
        BookmarkCommand::Remove { work } => {
            if portal.preferences.remove_bookmark(*work).await? {
                write_success(&format!("Removed bookmark for work {}", style(work).bold()))?;
            } else {
                TERMINAL.write_line(&format!("Work {work} is not bookmarked"))?;
            }
        }
        BookmarkCommand::Toggle { work } => {
            if portal.preferences.toggle_bookmark(*work).await? {
                write_success(&format!("Bookmarked work {}", style(work).bold()))?;
            } else {
                write_success(&format!("Removed bookmark for work {}", style(work).bold()))?;
            }
        }
        BookmarkCommand::List { display_options } => {
            let spinner = spinner("Loading", "bookmarks");
            let works = portal.bookmarked_works().await;
            spinner.finish_and_clear();

            let works = works?;

            if works.is_empty() {
                TERMINAL.write_line("You have no bookmarks yet.")?;
            } else {
                print_works(&works, &LocalState::load(portal).await?, display_options)?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

pub async fn rate(portal: &Portal, work: WorkId, score: u8) -> anyhow::Result<ExitCode> {
    portal.preferences.rate(work, score).await?;

    write_success(&format!(
        "Rated work {} {}",
        style(work).bold(),
        format_stars(score)
    ))?;

    Ok(ExitCode::SUCCESS)
}
