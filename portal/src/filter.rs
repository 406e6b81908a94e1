//! Derived views over a list of works: text and tag filtering, sorting and
//! the short previews shown on the home page.
//!
//! Every function here is order preserving unless it sorts, and none of them
//! can fail.

use std::{
    cmp::Reverse,
    collections::{BTreeSet, HashSet},
};

use strum::{Display, EnumString};

use crate::models::{Work, WorkId};

/// Number of works shown in a home page preview.
pub const PREVIEW_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SortMode {
    #[default]
    Newest,
    TopRated,
}

pub(crate) fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Whether the title, description or author name of `work` contains the
/// already lowercased `needle`.
pub(crate) fn matches_text(work: &Work, needle_lower: &str) -> bool {
    contains_ignore_case(&work.title, needle_lower)
        || work
            .description
            .as_deref()
            .is_some_and(|description| contains_ignore_case(description, needle_lower))
        || work
            .student_name
            .as_deref()
            .is_some_and(|name| contains_ignore_case(name, needle_lower))
}

/// Keeps the works whose title, description or author contains `query`,
/// ignoring case. A blank query returns `works` unchanged.
pub fn filter_by_text(works: Vec<Work>, query: &str) -> Vec<Work> {
    if query.trim().is_empty() {
        return works;
    }

    let needle = query.to_lowercase();

    works
        .into_iter()
        .filter(|work| matches_text(work, &needle))
        .collect()
}

/// Keeps the works carrying at least one of the `selected` tags. An empty
/// selection returns `works` unchanged.
pub fn filter_by_tags(works: Vec<Work>, selected: &HashSet<String>) -> Vec<Work> {
    if selected.is_empty() {
        return works;
    }

    works
        .into_iter()
        .filter(|work| work.tag_names().any(|tag| selected.contains(tag)))
        .collect()
}

/// Keeps the works whose id is in `bookmarks`.
pub fn bookmarked(works: Vec<Work>, bookmarks: &BTreeSet<WorkId>) -> Vec<Work> {
    works
        .into_iter()
        .filter(|work| bookmarks.contains(&work.id))
        .collect()
}

/// Sorts descending by submission date or by the rating `rating` associates
/// with each work. Ties keep their input order. Works without a parseable
/// timestamp go after every dated work when sorting by date.
pub fn sort_works(mut works: Vec<Work>, mode: SortMode, rating: impl Fn(&Work) -> f64) -> Vec<Work> {
    match mode {
        SortMode::Newest => works.sort_by_key(|work| Reverse(work.submitted_at())),
        SortMode::TopRated => works.sort_by(|a, b| rating(b).total_cmp(&rating(a))),
    }

    works
}

/// The first [`PREVIEW_LEN`] works in `mode` order.
pub fn preview(works: Vec<Work>, mode: SortMode, rating: impl Fn(&Work) -> f64) -> Vec<Work> {
    let mut works = sort_works(works, mode, rating);
    works.truncate(PREVIEW_LEN);
    works
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{BTreeSet, HashSet};

    use crate::models::{Tag, TagId, Work, WorkId};

    use super::{
        bookmarked, filter_by_tags, filter_by_text, preview, sort_works, SortMode, PREVIEW_LEN,
    };

    pub fn work(id: i64, title: &str, tags: &[&str]) -> Work {
        Work {
            id: WorkId(id),
            title: title.to_owned(),
            description: None,
            file_url: None,
            submitted_at_raw: None,
            student_id: None,
            student_name: None,
            student_email: None,
            tags: tags
                .iter()
                .enumerate()
                .map(|(i, name)| Tag {
                    id: TagId(i as i64),
                    name: (*name).to_owned(),
                })
                .collect(),
            comments: Vec::new(),
            average_rating: None,
            rating_count: None,
        }
    }

    fn dated(id: i64, submitted_at: &str) -> Work {
        Work {
            submitted_at_raw: Some(submitted_at.to_owned()),
            ..work(id, "dated", &[])
        }
    }

    fn ids(works: &[Work]) -> Vec<i64> {
        works.iter().map(|work| work.id.0).collect()
    }

    fn sample() -> Vec<Work> {
        vec![work(1, "A", &["x"]), work(2, "B", &["y"])]
    }

    #[test]
    fn test_empty_query_is_identity() {
        assert_eq!(filter_by_text(sample(), ""), sample());
        assert_eq!(filter_by_text(sample(), "   "), sample());
    }

    #[test]
    fn test_query_matches_title_description_and_author() {
        assert_eq!(ids(&filter_by_text(sample(), "b")), vec![2]);

        let mut works = sample();
        works[0].description = Some(String::from("Graph Theory notes"));
        works[1].student_name = Some(String::from("Petr Novák"));

        assert_eq!(ids(&filter_by_text(works.clone(), "THEORY")), vec![1]);
        assert_eq!(ids(&filter_by_text(works, "novák")), vec![2]);
    }

    #[test]
    fn test_query_without_match_is_empty() {
        assert!(filter_by_text(sample(), "nothing like this").is_empty());
    }

    #[test]
    fn test_tag_filter() {
        assert_eq!(filter_by_tags(sample(), &HashSet::new()), sample());

        let selected = HashSet::from([String::from("x")]);
        assert_eq!(ids(&filter_by_tags(sample(), &selected)), vec![1]);

        let selected = HashSet::from([String::from("x"), String::from("y")]);
        assert_eq!(ids(&filter_by_tags(sample(), &selected)), vec![1, 2]);

        let selected = HashSet::from([String::from("z")]);
        assert!(filter_by_tags(sample(), &selected).is_empty());
    }

    #[test]
    fn test_sort_newest() {
        let works = vec![
            dated(1, "2023-01-01T00:00:00"),
            dated(2, "not a date"),
            dated(3, "2024-06-01T12:00:00"),
            dated(4, "2023-01-01T00:00:00"),
        ];

        let sorted = sort_works(works, SortMode::Newest, |_| 0.0);
        assert_eq!(ids(&sorted), vec![3, 1, 4, 2]);

        let resorted = sort_works(sorted.clone(), SortMode::Newest, |_| 0.0);
        assert_eq!(sorted, resorted);
    }

    #[test]
    fn test_sort_top_rated_is_stable() {
        let works = vec![work(1, "a", &[]), work(2, "b", &[]), work(3, "c", &[])];
        let rating = |work: &crate::models::Work| if work.id.0 == 2 { 5.0 } else { 3.0 };

        assert_eq!(ids(&sort_works(works, SortMode::TopRated, rating)), vec![2, 1, 3]);
    }

    #[test]
    fn test_preview_truncates() {
        let works = (0..10)
            .map(|i| dated(i, &format!("2024-01-{:02}T00:00:00", i + 1)))
            .collect();

        let previewed = preview(works, SortMode::Newest, |_| 0.0);
        assert_eq!(previewed.len(), PREVIEW_LEN);
        assert_eq!(previewed[0].id.0, 9);
    }

    #[test]
    fn test_bookmarked() {
        let bookmarks = BTreeSet::from([WorkId(2)]);
        assert_eq!(ids(&bookmarked(sample(), &bookmarks)), vec![2]);
    }

    #[test]
    fn test_sort_mode_names() {
        assert_eq!("top-rated".parse::<SortMode>().unwrap(), SortMode::TopRated);
        assert_eq!(SortMode::Newest.to_string(), "newest");
    }
}
