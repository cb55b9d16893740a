//! Filtering, searching, and ordering over a snapshot of ideas.
//!
//! Everything here is a pure function of its input; the store is never
//! consulted and the input slice is never modified.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::idea::{Idea, IdeaType};
use crate::tags::{has_tag, normalize_tag};

/// Filter criteria. All set criteria must hold; unset or empty ones impose
/// no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaFilter {
    pub idea_type: Option<IdeaType>,
    pub favorites_only: bool,
    /// Matches ideas carrying at least one of these tags.
    pub tags: Vec<String>,
    /// Case-insensitive substring of title, content, or any tag.
    pub search_query: Option<String>,
    /// Calendar day (UTC) the idea was created on.
    pub created_on: Option<NaiveDate>,
}

impl IdeaFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_type(mut self, idea_type: IdeaType) -> Self {
        self.idea_type = Some(idea_type);
        self
    }

    pub fn favorites(mut self) -> Self {
        self.favorites_only = true;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn created_on(mut self, day: NaiveDate) -> Self {
        self.created_on = Some(day);
        self
    }

    /// Number of criteria that actually constrain the result.
    pub fn active_count(&self) -> usize {
        [
            self.idea_type.is_some(),
            self.favorites_only,
            !self.wanted_tags().is_empty(),
            self.needle().is_some(),
            self.created_on.is_some(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Test a single idea against every criterion.
    pub fn matches(&self, idea: &Idea) -> bool {
        if let Some(t) = self.idea_type {
            if idea.idea_type() != t {
                return false;
            }
        }
        if self.favorites_only && !idea.is_favorite {
            return false;
        }
        let wanted = self.wanted_tags();
        if !wanted.is_empty() && !wanted.iter().any(|w| has_tag(&idea.tags, w)) {
            return false;
        }
        if let Some(needle) = self.needle() {
            if !matches_search(idea, &needle) {
                return false;
            }
        }
        if let Some(day) = self.created_on {
            if idea.created_at.date_naive() != day {
                return false;
            }
        }
        true
    }

    fn wanted_tags(&self) -> Vec<String> {
        self.tags.iter().filter_map(|t| normalize_tag(t)).collect()
    }

    fn needle(&self) -> Option<String> {
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

fn matches_search(idea: &Idea, needle: &str) -> bool {
    idea.title.to_lowercase().contains(needle)
        || idea.content().to_lowercase().contains(needle)
        || idea.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// Ideas matching `criteria`, in input order.
pub fn filter(ideas: &[Idea], criteria: &IdeaFilter) -> Vec<Idea> {
    ideas
        .iter()
        .filter(|idea| criteria.matches(idea))
        .cloned()
        .collect()
}

/// Stable sort by creation time; equal timestamps keep their input order.
pub fn sort_by_created_at(ideas: &[Idea], ascending: bool) -> Vec<Idea> {
    let mut sorted = ideas.to_vec();
    if ascending {
        sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    } else {
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    sorted
}

/// Every tag used in the collection, lowercased, deduplicated, ascending.
pub fn distinct_tags(ideas: &[Idea]) -> Vec<String> {
    ideas
        .iter()
        .flat_map(|idea| idea.tags.iter())
        .map(|t| t.to_lowercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idea::{IdeaId, IdeaKind};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rstest::rstest;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn text(id: &str, title: &str, content: &str, tags: &[&str], minutes: i64) -> Idea {
        let at = base_time() + Duration::minutes(minutes);
        Idea {
            id: IdeaId::from(id),
            title: title.into(),
            kind: IdeaKind::Text {
                content: content.into(),
            },
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_favorite: false,
            created_at: at,
            updated_at: at,
        }
    }

    fn voice(id: &str, title: &str, tags: &[&str], minutes: i64) -> Idea {
        let mut idea = text(id, title, "", tags, minutes);
        idea.kind = IdeaKind::Voice {
            recording_uri: Some(format!("file:///rec/{}.m4a", id)),
            description: Some("concatenated thoughts".into()),
        };
        idea
    }

    fn fixture() -> Vec<Idea> {
        let mut fav = text("3", "Garden plan", "tomatoes", &["home", "idea"], 30);
        fav.is_favorite = true;
        vec![
            text("1", "Cat feeder", "automatic", &["gadget"], 10),
            text("2", "Quarterly report", "numbers", &["work"], 20),
            fav,
            voice("4", "Song hook", &["music", "catchy"], 40),
            text("5", "Lunch", "Try the Catalan place", &[], 50),
        ]
    }

    fn ids(ideas: &[Idea]) -> Vec<&str> {
        ideas.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let ideas = fixture();
        let filter_all = IdeaFilter::default();
        assert!(filter_all.is_empty());
        assert_eq!(filter(&ideas, &filter_all), ideas);
    }

    #[test]
    fn search_hits_title_content_and_tags_only() {
        let ideas = fixture();
        let found = filter(&ideas, &IdeaFilter::new().search("cat"));
        // title "Cat feeder", tag "catchy", content "Catalan"; the voice
        // description "concatenated" is not searched
        assert_eq!(ids(&found), vec!["1", "4", "5"]);
    }

    #[rstest]
    #[case("CAT")]
    #[case("  cat ")]
    #[case("Cat")]
    fn search_is_case_insensitive_and_trimmed(#[case] query: &str) {
        let found = filter(&fixture(), &IdeaFilter::new().search(query));
        assert_eq!(ids(&found), vec!["1", "4", "5"]);
    }

    #[test]
    fn blank_search_is_no_constraint() {
        let ideas = fixture();
        assert_eq!(filter(&ideas, &IdeaFilter::new().search("   ")).len(), ideas.len());
    }

    #[test]
    fn tag_filter_is_a_union() {
        let found = filter(&fixture(), &IdeaFilter::new().with_tags(["work", "idea"]));
        assert_eq!(ids(&found), vec!["2", "3"]);
    }

    #[test]
    fn tag_filter_is_case_insensitive() {
        let found = filter(&fixture(), &IdeaFilter::new().with_tags(["MUSIC"]));
        assert_eq!(ids(&found), vec!["4"]);
    }

    #[test]
    fn tag_filter_matches_whole_tags_only() {
        let mut ideas = fixture();
        ideas[0].tags = vec!["side project".into()];
        let found = filter(&ideas, &IdeaFilter::new().with_tags(["  Side   Project ", "   "]));
        assert_eq!(ids(&found), vec!["1"]);
        assert!(filter(&ideas, &IdeaFilter::new().with_tags(["mus"])).is_empty());
    }

    #[test]
    fn type_and_favorites() {
        let ideas = fixture();
        assert_eq!(ids(&filter(&ideas, &IdeaFilter::new().of_type(IdeaType::Voice))), vec!["4"]);
        assert_eq!(ids(&filter(&ideas, &IdeaFilter::new().favorites())), vec!["3"]);
        assert!(filter(&ideas, &IdeaFilter::new().of_type(IdeaType::Image)).is_empty());
    }

    #[test]
    fn criteria_are_conjunctive() {
        let criteria = IdeaFilter::new()
            .of_type(IdeaType::Text)
            .search("cat")
            .with_tags(["gadget", "music"]);
        assert_eq!(criteria.active_count(), 3);
        assert_eq!(ids(&filter(&fixture(), &criteria)), vec!["1"]);
    }

    #[test]
    fn created_on_matches_calendar_day() {
        let mut ideas = fixture();
        ideas[0].created_at = base_time() - Duration::days(1);
        let day = base_time().date_naive();
        let found = filter(&ideas, &IdeaFilter::new().created_on(day));
        assert_eq!(ids(&found), vec!["2", "3", "4", "5"]);
    }

    #[test]
    fn filter_does_not_mutate_input() {
        let ideas = fixture();
        let snapshot = ideas.clone();
        let _ = filter(&ideas, &IdeaFilter::new().favorites());
        let _ = sort_by_created_at(&ideas, false);
        assert_eq!(ideas, snapshot);
    }

    #[test]
    fn sort_orders_both_ways() {
        let ideas = fixture();
        assert_eq!(ids(&sort_by_created_at(&ideas, true)), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(ids(&sort_by_created_at(&ideas, false)), vec!["5", "4", "3", "2", "1"]);
    }

    #[test]
    fn sort_is_stable_and_idempotent() {
        let mut ideas = fixture();
        ideas[1].created_at = ideas[3].created_at;
        let once = sort_by_created_at(&ideas, true);
        assert_eq!(ids(&once), vec!["1", "3", "2", "4", "5"]);
        assert_eq!(sort_by_created_at(&once, true), once);

        let desc = sort_by_created_at(&ideas, false);
        assert_eq!(ids(&desc), vec!["5", "2", "4", "3", "1"]);
        assert_eq!(sort_by_created_at(&desc, false), desc);
    }

    #[test]
    fn distinct_tags_sorted_and_deduped() {
        let mut ideas = fixture();
        ideas[4].tags = vec!["Work".into(), "home".into()];
        assert_eq!(
            distinct_tags(&ideas),
            vec!["catchy", "gadget", "home", "idea", "music", "work"]
        );
        assert!(distinct_tags(&[]).is_empty());
    }
}
