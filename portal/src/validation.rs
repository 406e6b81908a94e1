//! Checks run before a payload is sent to the API.

use crate::models::{NewComment, NewTag, StudentRequest, WorkRequest};

pub const MAX_COMMENT_LEN: usize = 2000;
pub const MAX_AUTHOR_LEN: usize = 100;
pub const MAX_TAG_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 8;

fn invalid(field: &'static str, message: impl Into<String>) -> crate::Error {
    crate::Error::Validation {
        field,
        message: message.into(),
    }
}

fn required(field: &'static str, value: &str) -> Result<(), crate::Error> {
    if value.trim().is_empty() {
        return Err(invalid(field, "is required"));
    }

    Ok(())
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<(), crate::Error> {
    required(field, value)?;

    if value.trim().chars().count() > max {
        return Err(invalid(field, format!("must be at most {max} characters")));
    }

    Ok(())
}

pub trait Validate {
    fn validate(&self) -> Result<(), crate::Error>;
}

impl Validate for WorkRequest {
    fn validate(&self) -> Result<(), crate::Error> {
        required("title", &self.title)?;
        required("file url", &self.file_url)?;

        for tag in &self.tags {
            tag.validate()?;
        }

        Ok(())
    }
}

impl Validate for NewComment {
    fn validate(&self) -> Result<(), crate::Error> {
        bounded("content", &self.content, MAX_COMMENT_LEN)?;
        bounded("author name", &self.author_name, MAX_AUTHOR_LEN)
    }
}

impl Validate for NewTag {
    fn validate(&self) -> Result<(), crate::Error> {
        bounded("tag name", &self.name, MAX_TAG_LEN)
    }
}

impl Validate for StudentRequest {
    fn validate(&self) -> Result<(), crate::Error> {
        required("name", &self.name)?;
        required("email", &self.email)?;

        if !self.email.contains('@') {
            return Err(invalid("email", "must be an email address"));
        }

        if let Some(password) = &self.password {
            validate_password(password)?;
        }

        Ok(())
    }
}

/// At least [`MIN_PASSWORD_LEN`] characters with one uppercase letter.
pub fn validate_password(password: &str) -> Result<(), crate::Error> {
    if password.chars().count() < MIN_PASSWORD_LEN || !password.chars().any(char::is_uppercase) {
        return Err(invalid(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters long and contain an uppercase letter"),
        ));
    }

    Ok(())
}
