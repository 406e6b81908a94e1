use dialoguer::Input;
use portal::models::{parse_timestamp, Work};

pub fn limit_len(string: &str, len: usize) -> String {
    if string.chars().count() <= len {
        return string.to_owned();
    }

    let truncated: String = string.chars().take(len.saturating_sub(3)).collect();

    format!("{truncated}...")
}

pub fn format_submitted(work: &Work) -> String {
    format_submitted_raw(work.submitted_at_raw.as_deref())
}

/// Formats an API timestamp as a date, leaving unparseable text as is.
pub fn format_submitted_raw(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    match parse_timestamp(raw) {
        Some(timestamp) => timestamp.format("%d.%m.%Y").to_string(),
        None => raw.to_owned(),
    }
}

pub fn format_stars(score: u8) -> String {
    if score == 0 {
        return String::new();
    }

    let full = usize::from(score.min(5));

    format!("{}{}", "★".repeat(full), "☆".repeat(5 - full))
}

/// Returns `value` or asks for it interactively.
pub fn prompt_if_missing(value: Option<&str>, prompt: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value.to_owned()),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_stars, limit_len};

    #[test]
    fn test_limit_len() {
        assert_eq!(limit_len("short", 10), "short");
        assert_eq!(limit_len("Příliš dlouhý název", 10), "Příliš ...");
    }

    #[test]
    fn test_format_stars() {
        assert_eq!(format_stars(0), "");
        assert_eq!(format_stars(3), "★★★☆☆");
    }
}
