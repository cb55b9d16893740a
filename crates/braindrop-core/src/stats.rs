//! Collection statistics for dashboards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::idea::{Idea, IdeaType};

/// Counts over a snapshot of ideas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaStats {
    pub total: usize,
    pub text: usize,
    pub voice: usize,
    pub image: usize,
    pub favorites: usize,
    /// Ideas created on `today` (UTC calendar day).
    pub created_today: usize,
}

impl IdeaStats {
    pub fn compute(ideas: &[Idea], today: NaiveDate) -> Self {
        ideas.iter().fold(Self::default(), |mut stats, idea| {
            stats.total += 1;
            match idea.idea_type() {
                IdeaType::Text => stats.text += 1,
                IdeaType::Voice => stats.voice += 1,
                IdeaType::Image => stats.image += 1,
            }
            if idea.is_favorite {
                stats.favorites += 1;
            }
            if idea.created_at.date_naive() == today {
                stats.created_today += 1;
            }
            stats
        })
    }

    pub fn count_of(&self, idea_type: IdeaType) -> usize {
        match idea_type {
            IdeaType::Text => self.text,
            IdeaType::Voice => self.voice,
            IdeaType::Image => self.image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idea::{IdeaId, IdeaKind};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn counts_by_type_favorite_and_day() {
        let today = Utc.with_ymd_and_hms(2024, 6, 1, 23, 59, 0).unwrap();
        let make = |id: &str, kind: IdeaKind, fav: bool, days_ago: i64| {
            let at = today - Duration::days(days_ago);
            Idea {
                id: IdeaId::from(id),
                title: id.into(),
                kind,
                tags: vec![],
                is_favorite: fav,
                created_at: at,
                updated_at: at,
            }
        };
        let ideas = vec![
            make("a", IdeaKind::Text { content: "x".into() }, true, 0),
            make("b", IdeaKind::Text { content: "y".into() }, false, 1),
            make(
                "c",
                IdeaKind::Voice {
                    recording_uri: None,
                    description: None,
                },
                true,
                0,
            ),
            make(
                "d",
                IdeaKind::Image {
                    uri: None,
                    description: None,
                },
                false,
                3,
            ),
        ];

        let stats = IdeaStats::compute(&ideas, today.date_naive());
        assert_eq!(
            stats,
            IdeaStats {
                total: 4,
                text: 2,
                voice: 1,
                image: 1,
                favorites: 2,
                created_today: 2,
            }
        );
        assert_eq!(stats.count_of(IdeaType::Text), 2);
    }

    #[test]
    fn empty_collection() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(IdeaStats::compute(&[], day), IdeaStats::default());
    }
}
