use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Label shown for the synthetic root of every topic tree.
pub const ROOT_LABEL: &str = "All Topics";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedItem {
    pub label: String,
    pub weight: f64,
}

impl WeightedItem {
    pub fn new(label: impl Into<String>, weight: f64) -> Self {
        Self {
            label: label.into(),
            weight,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(Error::InvalidWeight {
                label: self.label.clone(),
                weight: self.weight,
            });
        }
        Ok(())
    }
}

/// Pixel dimensions of the area bubbles are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if !ok(self.width) || !ok(self.height) {
            return Err(Error::InvalidContainer {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Truncates to whole pixels.
    pub fn whole_pixels(&self) -> Self {
        Self {
            width: self.width.floor(),
            height: self.height.floor(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A sized bubble with its center. Y grows upward from the container's bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedCircle {
    pub label: String,
    pub radius: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl PlacedCircle {
    pub fn distance_to(&self, other: &PlacedCircle) -> f64 {
        (self.center_x - other.center_x).hypot(self.center_y - other.center_y)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (x - self.center_x).hypot(y - self.center_y) <= self.radius
    }
}

/// An item the packer could not find a slot for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedItem {
    pub label: String,
    pub radius: f64,
}

/// Packing result: placed circles in placement order plus the items left out.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    pub container: ContainerSize,
    pub circles: Vec<PlacedCircle>,
    pub dropped: Vec<DroppedItem>,
}

impl Layout {
    pub fn empty(container: ContainerSize) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    /// Topmost circle under `(x, y)`; later placements are drawn over earlier ones.
    pub fn circle_at(&self, x: f64, y: f64) -> Option<&PlacedCircle> {
        self.circles.iter().rev().find(|c| c.contains(x, y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TopicId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicNode {
    pub id: TopicId,
    pub parent: Option<TopicId>,
    pub label: String,
    pub weight: f64,
    pub children: Vec<TopicId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicTree {
    pub root: TopicId,
    pub nodes: Vec<TopicNode>,
}

impl Default for TopicTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicTree {
    /// A tree holding only the "All Topics" root.
    pub fn new() -> Self {
        Self {
            root: TopicId(0),
            nodes: vec![TopicNode {
                id: TopicId(0),
                parent: None,
                label: ROOT_LABEL.to_string(),
                weight: 0.0,
                children: Vec::new(),
            }],
        }
    }

    pub fn node(&self, id: TopicId) -> &TopicNode {
        &self.nodes[id.0 as usize]
    }

    pub fn child_by_label(&self, parent: TopicId, label: &str) -> Option<TopicId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|c| self.node(*c).label == label)
    }

    /// Returns the child of `parent` labelled `label`, creating it with zero weight.
    pub fn ensure_child(&mut self, parent: TopicId, label: &str) -> TopicId {
        if let Some(id) = self.child_by_label(parent, label) {
            return id;
        }
        let id = TopicId(self.nodes.len() as u64);
        self.nodes.push(TopicNode {
            id,
            parent: Some(parent),
            label: label.to_string(),
            weight: 0.0,
            children: Vec::new(),
        });
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    pub fn children_items(&self, id: TopicId) -> Vec<WeightedItem> {
        self.node(id)
            .children
            .iter()
            .map(|c| {
                let n = self.node(*c);
                WeightedItem::new(n.label.clone(), n.weight)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
