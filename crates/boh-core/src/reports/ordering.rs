use std::cmp::Ordering;

use crate::models::{ChapterFilter, Member};
use crate::utils::cmp_ignore_case;

/// Report order: chapter precedence (National, AD, HA, HS, then the rest),
/// handle ignoring case, then raw handle and id so equal keys never depend
/// on input order.
pub fn report_order(a: &Member, b: &Member) -> Ordering {
    a.chapter
        .precedence()
        .cmp(&b.chapter.precedence())
        .then_with(|| cmp_ignore_case(&a.handle, &b.handle))
        .then_with(|| a.handle.cmp(&b.handle))
        .then_with(|| a.id.cmp(&b.id))
}

/// Apply the chapter filter and sort into report order.
pub fn sort_for_report(members: &[Member], chapter: &ChapterFilter) -> Vec<Member> {
    let mut selected: Vec<Member> = members
        .iter()
        .filter(|m| chapter.matches(&m.chapter))
        .cloned()
        .collect();
    selected.sort_by(report_order);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chapter;

    fn member(id: &str, handle: &str, chapter: Chapter) -> Member {
        Member {
            id: id.to_string(),
            handle: handle.to_string(),
            chapter,
            ..Default::default()
        }
    }

    fn handles(members: &[Member]) -> Vec<&str> {
        members.iter().map(|m| m.handle.as_str()).collect()
    }

    #[test]
    fn test_chapter_precedence_wins() {
        let input = vec![
            member("1", "b", Chapter::Hs),
            member("2", "a", Chapter::National),
            member("3", "c", Chapter::Ad),
        ];
        let sorted = sort_for_report(&input, &ChapterFilter::All);
        assert_eq!(handles(&sorted), vec!["a", "c", "b"]);

        let mut reversed = input.clone();
        reversed.reverse();
        assert_eq!(handles(&sort_for_report(&reversed, &ChapterFilter::All)), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_handles_compare_ignoring_case() {
        let input = vec![
            member("1", "zed", Chapter::Ha),
            member("2", "Alpha", Chapter::Ha),
            member("3", "beta", Chapter::Ha),
        ];
        let sorted = sort_for_report(&input, &ChapterFilter::All);
        assert_eq!(handles(&sorted), vec!["Alpha", "beta", "zed"]);
    }

    #[test]
    fn test_unknown_chapters_sort_last() {
        let input = vec![
            member("1", "nomad", Chapter::Other("Nomads".into())),
            member("2", "loner", Chapter::Unassigned),
            member("3", "prez", Chapter::National),
        ];
        let sorted = sort_for_report(&input, &ChapterFilter::All);
        assert_eq!(sorted[0].handle, "prez");
    }

    #[test]
    fn test_ties_are_input_order_independent() {
        let a = member("1", "Bob", Chapter::Ad);
        let b = member("2", "bob", Chapter::Ad);
        let c = member("3", "bob", Chapter::Ad);
        let forward = sort_for_report(&[a.clone(), b.clone(), c.clone()], &ChapterFilter::All);
        let backward = sort_for_report(&[c, b, a], &ChapterFilter::All);
        let ids = |ms: &[Member]| ms.iter().map(|m| m.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&forward), ids(&backward));
    }

    #[test]
    fn test_chapter_filter_is_exact() {
        let input = vec![
            member("1", "a", Chapter::Ha),
            member("2", "b", Chapter::Hs),
            member("3", "c", Chapter::Ha),
        ];
        let sorted = sort_for_report(&input, &ChapterFilter::Only(Chapter::Ha));
        assert_eq!(handles(&sorted), vec!["a", "c"]);
    }
}
