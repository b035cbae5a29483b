//! Achievement badges derived from a user's statistics

use serde::Serialize;

/// Snapshot of a user's activity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub uploads: i64,
    pub likes: i64,
    pub comments: i64,
    pub reputation: i64,
}

/// One entry of the badge table
pub struct BadgeRule {
    pub name: &'static str,
    pub earned: fn(&UserStats) -> bool,
}

/// Badge table, evaluated in declaration order. Append new rules at the end.
pub const BADGE_RULES: &[BadgeRule] = &[
    BadgeRule {
        name: "New Member",
        earned: |_| true,
    },
    BadgeRule {
        name: "Contributor",
        earned: |s| s.uploads >= 1,
    },
    BadgeRule {
        name: "Upload Master",
        earned: |s| s.uploads >= 10,
    },
    BadgeRule {
        name: "Active Commenter",
        earned: |s| s.comments >= 20,
    },
];

/// Names of every badge earned by `stats`, in table order
pub fn evaluate(stats: &UserStats) -> Vec<&'static str> {
    evaluate_with(BADGE_RULES, stats)
}

pub fn evaluate_with(rules: &[BadgeRule], stats: &UserStats) -> Vec<&'static str> {
    rules
        .iter()
        .filter(|rule| (rule.earned)(stats))
        .map(|rule| rule.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(uploads: i64, comments: i64) -> UserStats {
        UserStats {
            uploads,
            comments,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_user_has_only_new_member() {
        assert_eq!(evaluate(&UserStats::default()), vec!["New Member"]);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        assert_eq!(evaluate(&stats(1, 0)), vec!["New Member", "Contributor"]);
        assert_eq!(
            evaluate(&stats(10, 20)),
            vec!["New Member", "Contributor", "Upload Master", "Active Commenter"]
        );
        assert_eq!(evaluate(&stats(9, 19)), vec!["New Member", "Contributor"]);
    }

    #[test]
    fn test_order_follows_table_not_threshold() {
        assert_eq!(evaluate(&stats(0, 25)), vec!["New Member", "Active Commenter"]);
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let snapshot = stats(12, 3);
        assert_eq!(evaluate(&snapshot), evaluate(&snapshot));
    }

    #[test]
    fn test_custom_rule_table() {
        let rules = [BadgeRule {
            name: "Popular",
            earned: |s| s.likes > 100,
        }];
        let popular = UserStats {
            likes: 101,
            ..Default::default()
        };
        assert_eq!(evaluate_with(&rules, &popular), vec!["Popular"]);
        assert!(evaluate_with(&rules, &UserStats::default()).is_empty());
    }
}
