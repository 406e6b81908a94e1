use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    process::ExitCode,
    time::Duration,
};

use console::style;
use indicatif::ProgressBar;
use itertools::Itertools;
use portal::{
    models::{Work, WorkId, WorkRequest},
    Browse, Portal,
};

use crate::{
    args::{WorkColumn, WorkCommand, WorkDetails, WorkDisplayOptions},
    table::Table,
    utils::{format_stars, format_submitted, limit_len, prompt_if_missing},
    write_success, PREFIX_STYLE, SPINNER_STYLE, TERMINAL,
};

pub async fn work_command(portal: &mut Portal, command: &WorkCommand) -> anyhow::Result<ExitCode> {
    match command {
        WorkCommand::List {
            query,
            text,
            tags,
            sort,
            limit,
            explain,
            display_options,
        } => {
            if *explain {
                if let Some(query) = query {
                    query.print_query_tree()?;
                }
            }

            let browse = Browse {
                text: text.clone(),
                query: query.clone(),
                tags: tags.iter().cloned().collect::<HashSet<_>>(),
                sort: *sort,
                limit: *limit,
            };

            work_list(portal, &browse, display_options).await
        }
        WorkCommand::Show { id } => work_show(portal, *id).await,
        WorkCommand::Add { details } => work_add(portal, details).await,
        WorkCommand::Update { id, details } => work_update(portal, *id, details).await,
        WorkCommand::Delete { id } => work_delete(portal, *id).await,
    }
}

pub fn spinner(prefix: &str, message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner().with_style(SPINNER_STYLE.clone());

    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_prefix(PREFIX_STYLE.apply_to(prefix).to_string());
    spinner.set_message(message.into());

    spinner
}

/// What the local profile knows about the works being displayed.
pub struct LocalState {
    pub ratings: BTreeMap<WorkId, u8>,
    pub bookmarks: BTreeSet<WorkId>,
}

impl LocalState {
    pub async fn load(portal: &Portal) -> anyhow::Result<Self> {
        Ok(Self {
            ratings: portal.preferences.ratings().await?,
            bookmarks: portal.preferences.bookmarks().await?,
        })
    }
}

pub fn display_work_header(table: &mut Table, options: &WorkDisplayOptions) -> anyhow::Result<()> {
    for column in &options.columns {
        table.push_cell(style(column.to_string()).bold())?;
    }

    Ok(())
}

pub fn display_work(
    table: &mut Table,
    work: &Work,
    local: &LocalState,
    options: &WorkDisplayOptions,
) -> anyhow::Result<()> {
    for column in &options.columns {
        match column {
            WorkColumn::Id => table.push_cell(work.id)?,
            WorkColumn::Title => table.push_cell(&work.title)?,
            WorkColumn::Author => table.push_cell(work.author())?,
            WorkColumn::Submitted => table.push_cell(format_submitted(work))?,
            WorkColumn::Tags => table.push_cell(work.tag_names().join(", "))?,
            WorkColumn::Comments => table.push_cell(work.comments.len())?,
            WorkColumn::Rating => table.push_cell(
                local
                    .ratings
                    .get(&work.id)
                    .map(|score| score.to_string())
                    .unwrap_or_default(),
            )?,
            WorkColumn::Average => table.push_cell(
                work.average_rating
                    .map(|average| format!("{average:.1}"))
                    .unwrap_or_default(),
            )?,
            WorkColumn::Bookmarked => table.push_cell(if local.bookmarks.contains(&work.id) {
                "yes"
            } else {
                ""
            })?,
            WorkColumn::Description => {
                table.push_cell(work.description.as_deref().unwrap_or_default())?
            }
            WorkColumn::File => table.push_cell(work.file_url.as_deref().unwrap_or_default())?,
        }
    }

    Ok(())
}

pub fn print_works(
    works: &[Work],
    local: &LocalState,
    options: &WorkDisplayOptions,
) -> anyhow::Result<()> {
    let behaviors: Vec<_> = options.columns.iter().map(WorkColumn::behavior).collect();
    let mut table = Table::new(&TERMINAL, &behaviors);

    display_work_header(&mut table, options)?;

    for work in works {
        display_work(&mut table, work, local, options)?;
    }

    Ok(())
}

pub async fn home(portal: &mut Portal, options: &WorkDisplayOptions) -> anyhow::Result<ExitCode> {
    let spinner = spinner("Loading", "works");
    let home = portal.home().await;
    spinner.finish_and_clear();

    let home = home?;
    let local = LocalState::load(portal).await?;

    TERMINAL.write_line(&style("Newest works").bold().to_string())?;
    if home.newest.is_empty() {
        TERMINAL.write_line("No works have been submitted yet.")?;
    } else {
        print_works(&home.newest, &local, options)?;
    }

    TERMINAL.write_line("")?;

    TERMINAL.write_line(&style("Best rated works").bold().to_string())?;
    if home.top_rated.is_empty() {
        TERMINAL.write_line("No works have been submitted yet.")?;
    } else {
        print_works(&home.top_rated, &local, options)?;
    }

    Ok(ExitCode::SUCCESS)
}

pub async fn work_list(
    portal: &mut Portal,
    browse: &Browse,
    options: &WorkDisplayOptions,
) -> anyhow::Result<ExitCode> {
    let spinner = spinner("Loading", "works");
    let works = portal.browse(browse).await;
    spinner.finish_and_clear();

    let works = works?;

    if works.is_empty() {
        TERMINAL.write_line("No works found.")?;
        return Ok(ExitCode::SUCCESS);
    }

    print_works(&works, &LocalState::load(portal).await?, options)?;

    if browse.text.is_some() || browse.query.is_some() || !browse.tags.is_empty() {
        write_success(&format!(
            "Found {count} {}",
            if works.len() == 1 { "work" } else { "works" },
            count = style(works.len()).bold()
        ))?;
    }

    Ok(ExitCode::SUCCESS)
}

pub async fn work_show(portal: &mut Portal, id: WorkId) -> anyhow::Result<ExitCode> {
    let spinner = spinner("Loading", format!("work {id}"));
    let work = portal.work(id).await;
    spinner.finish_and_clear();

    let work = work?;

    let rating = portal.preferences.rating(id).await?;
    let bookmarked = portal.preferences.is_bookmarked(id).await?;

    TERMINAL.write_line(&format!(
        "{} {}",
        style(&work.title).bold(),
        style(format!("#{}", work.id)).dim()
    ))?;
    TERMINAL.write_line(&format!(
        "by {} on {}",
        work.author(),
        format_submitted(&work)
    ))?;

    if !work.tags.is_empty() {
        TERMINAL.write_line(&format!("tags: {}", work.tag_names().join(", ")))?;
    }
    if let Some(file_url) = &work.file_url {
        TERMINAL.write_line(&format!("file: {file_url}"))?;
    }
    if let Some(average) = work.average_rating {
        TERMINAL.write_line(&format!(
            "average: {average:.1} from {} ratings",
            work.rating_count.unwrap_or_default()
        ))?;
    }
    if rating > 0 {
        TERMINAL.write_line(&format!("your rating: {}", format_stars(rating)))?;
    }
    if bookmarked {
        TERMINAL.write_line("bookmarked")?;
    }

    TERMINAL.write_line("")?;
    TERMINAL.write_line(work.description.as_deref().unwrap_or("No description"))?;

    if !work.comments.is_empty() {
        TERMINAL.write_line("")?;
        TERMINAL.write_line(&style(format!("{} comments", work.comments.len())).bold().to_string())?;

        for comment in &work.comments {
            TERMINAL.write_line(&format!(
                "{}: {}",
                style(&comment.author_name).bold(),
                limit_len(&comment.content, 200)
            ))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

pub async fn work_add(portal: &mut Portal, details: &WorkDetails) -> anyhow::Result<ExitCode> {
    let mut request = WorkRequest::from(details.clone());

    request.title = prompt_if_missing(details.title.as_deref(), "Title")?;
    if request.file_url.is_empty() {
        request.file_url = prompt_if_missing(None, "File url")?;
    }

    let session = portal.require_session()?.clone();

    let spinner = spinner("Uploading", request.title.clone());
    let result = portal.api.create_work(&session, &request).await;
    spinner.finish_and_clear();

    let work = portal.check(result)?;

    write_success(&format!(
        "Submitted {} as {}",
        style(&work.title).dim(),
        style(work.id).bold()
    ))?;

    Ok(ExitCode::SUCCESS)
}

pub async fn work_update(
    portal: &mut Portal,
    id: WorkId,
    details: &WorkDetails,
) -> anyhow::Result<ExitCode> {
    let session = portal.require_session()?.clone();

    let result = portal.api.work(Some(&session), id).await;
    let existing = portal.check(result)?;

    let mut request = WorkRequest::from(&existing);
    request.update(details.clone().into());

    let result = portal.api.update_work(&session, id, &request).await;
    let work = portal.check(result)?;

    write_success(&format!("Updated {}", style(&work.title).bold()))?;

    Ok(ExitCode::SUCCESS)
}

pub async fn work_delete(portal: &mut Portal, id: WorkId) -> anyhow::Result<ExitCode> {
    let session = portal.require_session()?.clone();

    let result = portal.api.delete_work(&session, id).await;
    portal.check(result)?;

    portal.preferences.remove_bookmark(id).await?;

    write_success(&format!("Deleted work {}", style(id).bold()))?;

    Ok(ExitCode::SUCCESS)
}
