use std::process::ExitCode;

use console::style;
use portal::{models::NewTag, Portal};

use crate::{args::TagCommand, write_success, TERMINAL};

pub async fn tag_command(portal: &mut Portal, command: &TagCommand) -> anyhow::Result<ExitCode> {
    match command {
        TagCommand::List { popular } => {
            let result = if *popular {
                portal.api.popular_tags(portal.session()).await
            } else {
                portal.api.tags(portal.session()).await
            };
            let tags = portal.check(result)?;

            if tags.is_empty() {
                TERMINAL.write_line("No tags yet.")?;
            }

            for tag in tags {
                TERMINAL.write_line(&format!("{} {}", style(tag.id).dim(), tag.name))?;
            }

            Ok(ExitCode::SUCCESS)
        }
        TagCommand::Create { name } => {
            let session = portal.require_session()?.clone();

            let result = portal.api.create_tag(&session, &NewTag::new(name.trim())).await;
            let tag = portal.check(result)?;

            write_success(&format!("Created tag {}", style(&tag.name).bold()))?;

            Ok(ExitCode::SUCCESS)
        }
    }
}
