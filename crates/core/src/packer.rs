//! Greedy bubble packing.
//!
//! Weights are scaled so the average item gets a radius of a quarter of the
//! container's shorter side, clamped to `[min_radius, min(w, h) / 2]`, then
//! placed largest first on a grid whose step is the bubble's diameter.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{ContainerSize, DroppedItem, Layout, PlacedCircle, WeightedItem};

/// Smallest radius a bubble is given, so its label stays legible.
pub const DEFAULT_MIN_RADIUS: f64 = 56.0;
/// Minimum center distance as a multiple of the radius being placed.
pub const DEFAULT_SEPARATION: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackConfig {
    pub min_radius: f64,
    pub separation_factor: f64,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            min_radius: DEFAULT_MIN_RADIUS,
            separation_factor: DEFAULT_SEPARATION,
        }
    }
}

impl PackConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.min_radius.is_finite() || self.min_radius <= 0.0 {
            return Err(Error::InvalidConfig {
                name: "min_radius",
                message: "must be a positive number of pixels",
            });
        }
        if !self.separation_factor.is_finite() || self.separation_factor <= 0.0 {
            return Err(Error::InvalidConfig {
                name: "separation_factor",
                message: "must be positive",
            });
        }
        Ok(())
    }
}

/// Stateless packer; holds only its configuration.
#[derive(Debug, Clone, Default)]
pub struct BubblePacker {
    config: PackConfig,
}

impl BubblePacker {
    pub fn new(config: PackConfig) -> Self {
        Self { config }
    }

    /// Lays out `items` inside `container`.
    ///
    /// Weights and dimensions are validated before any arithmetic. Empty input
    /// or a zero-area container produce an empty layout. Circles come back in
    /// placement order (largest radius first, ties in input order); items with
    /// no free grid slot are listed in [`Layout::dropped`].
    pub fn pack(&self, items: &[WeightedItem], container: ContainerSize) -> Result<Layout> {
        self.config.validate()?;
        container.validate()?;
        for item in items {
            item.validate()?;
        }

        let area = container.whole_pixels();
        if items.is_empty() {
            return Ok(Layout::empty(area));
        }
        if area.is_empty() {
            debug!(items = items.len(), "zero-area container, nothing placed");
            return Ok(Layout {
                container: area,
                circles: Vec::new(),
                dropped: items
                    .iter()
                    .map(|i| DroppedItem {
                        label: i.label.clone(),
                        radius: 0.0,
                    })
                    .collect(),
            });
        }

        let radii = self.radii(items, area);

        // Vec::sort_by is stable, so equal radii keep input order.
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| radii[b].total_cmp(&radii[a]));

        let mut layout = Layout::empty(area);
        for idx in order {
            let label = &items[idx].label;
            let radius = radii[idx];
            match self.find_slot(&layout.circles, radius, area) {
                Some((x, y)) => layout.circles.push(PlacedCircle {
                    label: label.clone(),
                    radius,
                    center_x: x,
                    center_y: y,
                }),
                None => {
                    debug!(%label, radius, "no free slot, dropping bubble");
                    layout.dropped.push(DroppedItem {
                        label: label.clone(),
                        radius,
                    });
                }
            }
        }

        info!(
            placed = layout.circles.len(),
            dropped = layout.dropped.len(),
            width = area.width,
            height = area.height,
            "bubble layout computed"
        );
        Ok(layout)
    }

    fn radii(&self, items: &[WeightedItem], area: ContainerSize) -> Vec<f64> {
        let max_radius = area.width.min(area.height) / 2.0;
        let scale = scale_factor(items, max_radius);
        items
            .iter()
            .map(|item| match scale {
                Some(s) => (item.weight * s)
                    .round()
                    .min(max_radius)
                    .max(self.config.min_radius),
                None => self.config.min_radius,
            })
            .collect()
    }

    /// First grid point, row by row from the origin, that keeps at least
    /// `floor(separation * r)` from every placed center.
    fn find_slot(&self, placed: &[PlacedCircle], radius: f64, area: ContainerSize) -> Option<(f64, f64)> {
        // Grid coordinates are f64; next_grid ends the scan once a step is lost to rounding.
        let r = radius.round().max(1.0);
        let step = 2.0 * r;
        let max_x = area.width - r;
        let max_y = area.height - r;
        let min_dist = (self.config.separation_factor * r).floor();

        let mut y = r;
        while y <= max_y {
            let mut x = r;
            while x <= max_x {
                if placed
                    .iter()
                    .all(|p| (x - p.center_x).hypot(y - p.center_y) >= min_dist)
                {
                    return Some((x, y));
                }
                x = next_grid(x, step)?;
            }
            y = next_grid(y, step)?;
        }
        None
    }
}

/// `pos + step`, or `None` once the step no longer moves past `pos` at this magnitude.
fn next_grid(pos: f64, step: f64) -> Option<f64> {
    let next = pos + step;
    (next > pos).then_some(next)
}

/// Pixels per unit of weight, or `None` when every weight is zero.
fn scale_factor(items: &[WeightedItem], max_radius: f64) -> Option<f64> {
    let avg = items.iter().map(|i| i.weight).sum::<f64>() / items.len() as f64;
    (avg > 0.0).then(|| max_radius / (avg * 2.0))
}

/// Packs with the default configuration and returns only the placed circles.
pub fn compute_layout(items: &[WeightedItem], container: ContainerSize) -> Result<Vec<PlacedCircle>> {
    BubblePacker::default()
        .pack(items, container)
        .map(|layout| layout.circles)
}
