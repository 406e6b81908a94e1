use std::process::ExitCode;

use console::style;
use portal::{models::NewComment, Portal};

use crate::{
    args::CommentCommand,
    utils::{format_submitted_raw, prompt_if_missing},
    write_success, TERMINAL,
};

pub async fn comment_command(
    portal: &mut Portal,
    command: &CommentCommand,
) -> anyhow::Result<ExitCode> {
    match command {
        CommentCommand::List { work } => {
            let result = portal.api.comments(portal.session(), *work).await;
            let comments = portal.check(result)?;

            if comments.is_empty() {
                TERMINAL.write_line("No comments yet.")?;
            }

            for comment in comments {
                TERMINAL.write_line(&format!(
                    "{} {} {}",
                    style(format!("#{}", comment.id)).dim(),
                    style(&comment.author_name).bold(),
                    style(format_submitted_raw(comment.created_at.as_deref())).dim()
                ))?;
                TERMINAL.write_line(&comment.content)?;
                TERMINAL.write_line("")?;
            }

            Ok(ExitCode::SUCCESS)
        }
        CommentCommand::Add {
            work,
            content,
            author,
        } => {
            let session = portal.require_session()?.clone();

            let author_name = match (author, &session.user) {
                (Some(author), _) => author.clone(),
                (None, Some(user)) => user.name.clone(),
                (None, None) => prompt_if_missing(None, "Your name")?,
            };

            let comment = NewComment {
                content: prompt_if_missing(content.as_deref(), "Comment")?,
                author_name,
            };

            let result = portal.api.add_comment(&session, *work, &comment).await;
            let comment = portal.check(result)?;

            write_success(&format!(
                "Commented on work {} as {}",
                style(work).bold(),
                style(comment.id).bold()
            ))?;

            Ok(ExitCode::SUCCESS)
        }
        CommentCommand::Delete { id } => {
            let session = portal.require_session()?.clone();

            let result = portal.api.delete_comment(&session, *id).await;
            portal.check(result)?;

            write_success(&format!("Deleted comment {}", style(id).bold()))?;

            Ok(ExitCode::SUCCESS)
        }
    }
}
