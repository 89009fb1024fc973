//! Drill-down navigation through a [`TopicTree`].

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::loader::split_topic_path;
use crate::model::{TopicId, TopicTree, WeightedItem, ROOT_LABEL};
use crate::search::best_match;

/// Topics selected so far, outermost first. Empty means the top level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DrillPath {
    labels: Vec<String>,
}

impl DrillPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>) {
        self.labels.push(label.into());
    }

    /// Keeps the first `index + 1` topics, as when clicking a breadcrumb.
    pub fn truncate_to(&mut self, index: usize) {
        self.labels.truncate(index + 1);
    }

    pub fn reset(&mut self) {
        self.labels.clear();
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// "All Topics" followed by every selected label.
    pub fn breadcrumbs(&self) -> Vec<&str> {
        std::iter::once(ROOT_LABEL)
            .chain(self.labels.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for DrillPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels.join(" > "))
    }
}

impl FromStr for DrillPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self {
            labels: split_topic_path(s).into_iter().map(str::to_string).collect(),
        })
    }
}

impl<S: Into<String>> FromIterator<S> for DrillPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl TopicTree {
    /// Node addressed by `path`, matching labels exactly.
    pub fn find(&self, path: &DrillPath) -> Result<TopicId> {
        let mut cur = self.root;
        for seg in path.labels() {
            cur = self.child_by_label(cur, seg).ok_or_else(|| Error::UnknownTopic {
                segment: seg.clone(),
                parent: self.node(cur).label.clone(),
            })?;
        }
        Ok(cur)
    }

    /// Subtopics shown after drilling into `path`; empty when there are none.
    pub fn items_at(&self, path: &DrillPath) -> Result<Vec<WeightedItem>> {
        Ok(self.children_items(self.find(path)?))
    }

    /// Maps loosely typed segments onto real labels, one level at a time.
    pub fn resolve(&self, path: &DrillPath) -> Result<DrillPath> {
        let mut cur = self.root;
        let mut resolved = DrillPath::new();
        for seg in path.labels() {
            let children = &self.node(cur).children;
            let label = best_match(seg, children.iter().map(|c| self.node(*c).label.as_str()))
                .ok_or_else(|| Error::UnknownTopic {
                    segment: seg.clone(),
                    parent: self.node(cur).label.clone(),
                })?
                .to_string();
            cur = self
                .child_by_label(cur, &label)
                .ok_or_else(|| Error::UnknownTopic {
                    segment: seg.clone(),
                    parent: self.node(cur).label.clone(),
                })?;
            resolved.push(label);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TopicTree {
        let mut tree = TopicTree::new();
        let contract = tree.ensure_child(tree.root, "Contract");
        tree.ensure_child(contract, "Payment");
        tree.ensure_child(contract, "Breach");
        tree.ensure_child(tree.root, "Injury");
        tree
    }

    #[test]
    fn breadcrumb_navigation() {
        let mut path = DrillPath::new();
        assert!(path.is_root());
        path.push("Contract");
        path.push("Payment");
        path.push("Late fees");
        assert_eq!(path.breadcrumbs(), ["All Topics", "Contract", "Payment", "Late fees"]);
        path.truncate_to(0);
        assert_eq!(path.labels(), ["Contract"]);
        path.reset();
        assert!(path.is_root());
    }

    #[test]
    fn display_and_parse_agree() {
        let path: DrillPath = "Contract > Payment".parse().unwrap();
        assert_eq!(path.to_string(), "Contract > Payment");
        assert_eq!(path, DrillPath::from_iter(["Contract", "Payment"]));
    }

    #[test]
    fn items_at_each_level() {
        let tree = sample();
        let top = tree.items_at(&DrillPath::new()).unwrap();
        assert_eq!(top.len(), 2);
        let sub = tree.items_at(&"Contract".parse().unwrap()).unwrap();
        let labels: Vec<_> = sub.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["Payment", "Breach"]);
        assert!(tree.items_at(&"Injury".parse().unwrap()).unwrap().is_empty());
    }

    #[test]
    fn unknown_segment_names_parent() {
        let tree = sample();
        let err = tree.items_at(&"Contract > Nope".parse().unwrap()).unwrap_err();
        match err {
            Error::UnknownTopic { segment, parent } => {
                assert_eq!(segment, "Nope");
                assert_eq!(parent, "Contract");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn resolve_fixes_loose_segments() {
        let tree = sample();
        let resolved = tree.resolve(&"contract > brch".parse().unwrap()).unwrap();
        assert_eq!(resolved.labels(), ["Contract", "Breach"]);
        assert!(tree.resolve(&"qqq".parse().unwrap()).is_err());
    }
}
