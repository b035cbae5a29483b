//! Threaded comment assembly
//!
//! Turns the flat set of a resource's comments into a forest of replies.
//! Nodes are collected into an index arena first and then linked child to
//! parent in a single pass, so malformed parent pointers (self references,
//! cycles, comments from another resource) can never cause a loop.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// A comment joined with its author and live like count
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Empty when the author account no longer exists
    pub author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>,
    pub likes: i64,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<CommentWithAuthor>,
}

/// Build the newest-first reply forest for one resource
///
/// Every input comment appears exactly once in the output. A comment whose
/// parent is absent from `comments` (or is itself) becomes a root.
pub fn build_tree(comments: Vec<CommentWithAuthor>) -> Vec<CommentWithAuthor> {
    let index: HashMap<Uuid, usize> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    // parent slot for each node; None means root
    let mut parent_of: Vec<Option<usize>> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.parent_id
                .and_then(|p| index.get(&p).copied())
                .filter(|&p| p != i)
        })
        .collect();

    break_cycles(&mut parent_of);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();
    for (i, parent) in parent_of.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    let mut slots: Vec<Option<CommentWithAuthor>> = comments.into_iter().map(Some).collect();
    let mut forest: Vec<CommentWithAuthor> = roots
        .into_iter()
        .filter_map(|i| assemble(i, &children, &mut slots))
        .collect();

    sort_newest_first(&mut forest);
    forest
}

/// Detach one member of every parent cycle so that each node reaches a root
fn break_cycles(parent_of: &mut [Option<usize>]) {
    // 0 = unvisited, 1 = on current path, 2 = done
    let mut state = vec![0u8; parent_of.len()];
    for start in 0..parent_of.len() {
        let mut path = Vec::new();
        let mut node = start;
        loop {
            match state[node] {
                2 => break,
                1 => {
                    // node closes a cycle on the current path
                    parent_of[node] = None;
                    break;
                }
                _ => {}
            }
            state[node] = 1;
            path.push(node);
            match parent_of[node] {
                Some(p) => node = p,
                None => break,
            }
        }
        for n in path {
            state[n] = 2;
        }
    }
}

fn assemble(
    node: usize,
    children: &[Vec<usize>],
    slots: &mut [Option<CommentWithAuthor>],
) -> Option<CommentWithAuthor> {
    let mut comment = slots[node].take()?;
    comment.replies = children[node]
        .iter()
        .filter_map(|&child| assemble(child, children, slots))
        .collect();
    Some(comment)
}

fn sort_newest_first(level: &mut [CommentWithAuthor]) {
    // stable: equal timestamps keep input order
    level.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    for comment in level.iter_mut() {
        sort_newest_first(&mut comment.replies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn comment(id: Uuid, parent: Option<Uuid>, minute: i64) -> CommentWithAuthor {
        CommentWithAuthor {
            id,
            resource_id: Uuid::nil(),
            user_id: Uuid::nil(),
            parent_id: parent,
            content: format!("at {}", minute),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minute),
            author_name: "Ana".to_string(),
            author_avatar: None,
            likes: 0,
            replies: Vec::new(),
        }
    }

    fn count(forest: &[CommentWithAuthor]) -> usize {
        forest.iter().map(|c| 1 + count(&c.replies)).sum()
    }

    fn assert_sorted(level: &[CommentWithAuthor]) {
        assert!(level.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        for c in level {
            assert_sorted(&c.replies);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(Vec::new()).is_empty());
    }

    #[test]
    fn test_nests_replies_and_sorts_every_level() {
        let (a, b, c, d, e) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let flat = vec![
            comment(d, Some(a), 4),
            comment(a, None, 1),
            comment(b, None, 2),
            comment(c, Some(a), 3),
            comment(e, Some(c), 5),
        ];

        let tree = build_tree(flat);

        assert_eq!(count(&tree), 5);
        assert_sorted(&tree);
        assert_eq!(tree.iter().map(|c| c.id).collect::<Vec<_>>(), vec![b, a]);

        let root_a = &tree[1];
        assert_eq!(root_a.replies.iter().map(|c| c.id).collect::<Vec<_>>(), vec![d, c]);
        assert_eq!(root_a.replies[1].replies[0].id, e);
        assert_eq!(root_a.replies[1].replies[0].parent_id, Some(c));
    }

    #[test]
    fn test_orphan_becomes_root() {
        let (root, orphan) = (Uuid::new_v4(), Uuid::new_v4());
        let tree = build_tree(vec![
            comment(root, None, 1),
            comment(orphan, Some(Uuid::new_v4()), 2),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, orphan);
        assert!(tree.iter().all(|c| c.replies.is_empty()));
    }

    #[test]
    fn test_self_reference_becomes_root() {
        let id = Uuid::new_v4();
        let tree = build_tree(vec![comment(id, Some(id), 1)]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].replies.is_empty());
    }

    #[test]
    fn test_cycle_keeps_every_comment() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let tree = build_tree(vec![
            comment(a, Some(c), 1),
            comment(b, Some(a), 2),
            comment(c, Some(b), 3),
        ]);

        assert_eq!(count(&tree), 3);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let tree = build_tree(vec![comment(a, None, 1), comment(b, None, 1)]);
        assert_eq!(tree.iter().map(|c| c.id).collect::<Vec<_>>(), vec![a, b]);
    }
}
