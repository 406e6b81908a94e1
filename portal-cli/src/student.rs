use std::process::ExitCode;

use console::style;
use dialoguer::Password;
use portal::{
    models::{Student, StudentId, StudentRequest},
    validation::validate_password,
    Portal,
};

use crate::{
    args::{StudentCommand, StudentDetails},
    table::{ColumnBehavior, Table},
    utils::prompt_if_missing,
    write_success, TERMINAL,
};

const STUDENT_COLUMNS: [ColumnBehavior; 4] = [
    ColumnBehavior::fixed(6),
    ColumnBehavior::flexible(28, 10),
    ColumnBehavior::flexible(32, 12),
    ColumnBehavior::fixed(6),
];

fn prompt_password() -> anyhow::Result<String> {
    Ok(Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "The passwords do not match")
        .validate_with(|password: &String| validate_password(password).map_err(|err| err.to_string()))
        .interact()?)
}

fn print_students(students: &[Student]) -> anyhow::Result<()> {
    let mut table = Table::new(&TERMINAL, &STUDENT_COLUMNS);

    for header in ["id", "name", "email", "role"] {
        table.push_cell(style(header).bold())?;
    }

    for student in students {
        table.push_cell(student.id)?;
        table.push_cell(&student.name)?;
        table.push_cell(&student.email)?;
        table.push_cell(student.role.unwrap_or_default())?;
    }

    Ok(())
}

pub async fn student_command(
    portal: &mut Portal,
    command: &StudentCommand,
) -> anyhow::Result<ExitCode> {
    let session = portal.require_session()?.clone();

    match command {
        StudentCommand::List => {
            let result = portal.api.students(&session).await;
            let students = portal.check(result)?;

            if students.is_empty() {
                TERMINAL.write_line("No students registered.")?;
            } else {
                print_students(&students)?;
            }
        }
        StudentCommand::Show { id } => {
            let result = portal.api.student(&session, *id).await;
            let student = portal.check(result)?;

            print_students(&[student])?;
        }
        StudentCommand::Add { details } => {
            let request = StudentRequest {
                name: prompt_if_missing(details.name.as_deref(), "Name")?,
                email: prompt_if_missing(details.email.as_deref(), "Email")?
                    .trim()
                    .to_lowercase(),
                password: Some(prompt_password()?),
            };

            let result = portal.api.create_student(&session, &request).await;
            let student = portal.check(result)?;

            write_success(&format!(
                "Added {} as {}",
                style(&student.name).dim(),
                style(student.id).bold()
            ))?;
        }
        StudentCommand::Update { id, details } => {
            student_update(portal, *id, details).await?;
        }
        StudentCommand::Delete { id } => {
            let result = portal.api.delete_student(&session, *id).await;
            portal.check(result)?;

            write_success(&format!("Deleted student {}", style(id).bold()))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn student_update(
    portal: &mut Portal,
    id: StudentId,
    details: &StudentDetails,
) -> anyhow::Result<()> {
    let session = portal.require_session()?.clone();

    let result = portal.api.student(&session, id).await;
    let existing = portal.check(result)?;

    let request = StudentRequest {
        name: details.name.clone().unwrap_or(existing.name),
        email: details
            .email
            .as_deref()
            .map(|email| email.trim().to_lowercase())
            .unwrap_or(existing.email),
        password: if details.password {
            Some(prompt_password()?)
        } else {
            None
        },
    };

    let result = portal.api.update_student(&session, id, &request).await;
    let student = portal.check(result)?;

    write_success(&format!("Updated {}", style(&student.name).bold()))?;

    Ok(())
}
