//! Viewport camera: pan/zoom transform and auto-fit.
//!
//! # Responsibility
//! - Hold the translate + uniform scale transform used to project world
//!   coordinates onto the screen.
//! - Compute the transform that fits and centres a laid-out node set.
//! - Drive the animated transition towards a fitted transform.
//!
//! # Invariants
//! - `transform.k` always lies within `[min_scale, max_scale]`.
//! - An auto-fit scale always lies within `[min_scale, max_fit_scale]`.
//! - An inverted scale range never panics: the upper bound wins.
//! - Translation is never clamped.

use crate::layout::{GraphNode, Point};
use log::{debug, info};

/// Camera and fit settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    /// World units added to the node bounding box width before fitting.
    pub fit_padding_x: f64,
    /// World units added to the node bounding box height before fitting.
    pub fit_padding_y: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Upper bound on the scale chosen by auto-fit.
    pub max_fit_scale: f64,
    pub transition_ms: u64,
    pub initial_scale: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fit_padding_x: 400.0,
            fit_padding_y: 600.0,
            min_scale: 0.1,
            max_scale: 3.0,
            max_fit_scale: 0.8,
            transition_ms: 750,
            initial_scale: 0.6,
        }
    }
}

/// Translate-then-scale transform: `screen = world * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    /// World point to screen point.
    pub fn apply(&self, point: Point) -> Point {
        Point::new(point.x * self.k + self.x, point.y * self.k + self.y)
    }

    /// Screen point to world point.
    pub fn invert(&self, point: Point) -> Point {
        Point::new((point.x - self.x) / self.k, (point.y - self.y) / self.k)
    }
}

/// Axis-aligned bounding box of node centres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounds of all node positions, `None` when `nodes` is empty.
    pub fn of_nodes(nodes: &[GraphNode]) -> Option<Bounds> {
        let first = nodes.first()?;
        let seed = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(nodes.iter().fold(seed, |bounds, node| Bounds {
            min_x: bounds.min_x.min(node.x),
            min_y: bounds.min_y.min(node.y),
            max_x: bounds.max_x.max(node.x),
            max_y: bounds.max_y.max(node.y),
        }))
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Animated move from one transform to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: Transform,
    pub to: Transform,
    pub duration_ms: u64,
}

impl Transition {
    /// Transform at `elapsed_ms` into the transition, eased cubic in-out.
    pub fn sample(&self, elapsed_ms: u64) -> Transform {
        if self.duration_ms == 0 || elapsed_ms >= self.duration_ms {
            return self.to;
        }
        let t = ease_cubic_in_out(elapsed_ms as f64 / self.duration_ms as f64);
        Transform {
            x: lerp(self.from.x, self.to.x, t),
            y: lerp(self.from.y, self.to.y, t),
            k: lerp(self.from.k, self.to.k, t),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveTransition {
    transition: Transition,
    elapsed_ms: u64,
}

/// Owned camera state.
#[derive(Debug, Clone)]
pub struct Viewport {
    config: ViewportConfig,
    transform: Transform,
    active: Option<ActiveTransition>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        let transform = Transform {
            x: 0.0,
            y: 0.0,
            k: bounded(config.initial_scale, config.min_scale, config.max_scale),
        };
        Self {
            config,
            transform,
            active: None,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Current transform, including any in-flight transition progress.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    /// Replaces the transform directly, clamping the scale.
    ///
    /// Cancels a running transition, like any user gesture.
    pub fn set_transform(&mut self, transform: Transform) {
        self.active = None;
        self.transform = Transform {
            k: self.clamp_scale(transform.k),
            ..transform
        };
    }

    /// Pans by a screen-space offset.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.active = None;
        self.transform.x += dx;
        self.transform.y += dy;
    }

    /// Zooms by `factor`, keeping the screen point `anchor` fixed.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) {
        self.active = None;
        let world = self.transform.invert(anchor);
        let k = self.clamp_scale(self.transform.k * factor);
        self.transform = Transform {
            x: anchor.x - world.x * k,
            y: anchor.y - world.y * k,
            k,
        };
    }

    /// Transform that centres and scales `nodes` into a `width` × `height` view.
    ///
    /// Returns `None` when there are no nodes or the view has no area.
    pub fn fit_transform(&self, nodes: &[GraphNode], width: f64, height: f64) -> Option<Transform> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let bounds = Bounds::of_nodes(nodes)?;
        let box_width = bounds.width() + self.config.fit_padding_x;
        let box_height = bounds.height() + self.config.fit_padding_y;
        let k = bounded(
            (width / box_width).min(height / box_height),
            self.config.min_scale,
            self.config.max_fit_scale,
        );
        let center = bounds.center();
        Some(Transform {
            x: width / 2.0 - center.x * k,
            y: height / 2.0 - center.y * k,
            k,
        })
    }

    /// Starts an animated transition to the fitted transform.
    pub fn auto_fit(&mut self, nodes: &[GraphNode], width: f64, height: f64) -> Option<Transition> {
        let Some(target) = self.fit_transform(nodes, width, height) else {
            debug!(
                "event=auto_fit module=viewport status=skipped nodes={} width={} height={}",
                nodes.len(),
                width,
                height
            );
            return None;
        };
        let transition = Transition {
            from: self.transform,
            to: target,
            duration_ms: self.config.transition_ms,
        };
        self.active = Some(ActiveTransition {
            transition,
            elapsed_ms: 0,
        });
        info!(
            "event=auto_fit module=viewport status=ok nodes={} scale={:.3}",
            nodes.len(),
            target.k
        );
        Some(transition)
    }

    /// Advances a running transition by `delta_ms` and returns the transform.
    pub fn tick(&mut self, delta_ms: u64) -> Transform {
        if let Some(active) = self.active.as_mut() {
            active.elapsed_ms = active.elapsed_ms.saturating_add(delta_ms);
            self.transform = active.transition.sample(active.elapsed_ms);
            if active.elapsed_ms >= active.transition.duration_ms {
                self.active = None;
            }
        }
        self.transform
    }

    /// Jumps a running transition to its end.
    pub fn settle(&mut self) -> Transform {
        if let Some(active) = self.active.take() {
            self.transform = active.transition.to;
        }
        self.transform
    }

    fn clamp_scale(&self, k: f64) -> f64 {
        bounded(k, self.config.min_scale, self.config.max_scale)
    }
}

/// `f64::clamp` without the `min <= max` panic; `max` wins when inverted.
fn bounded(k: f64, min: f64, max: f64) -> f64 {
    k.max(min).min(max)
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Bounds, Transform, Transition, Viewport, ViewportConfig};
    use crate::layout::{GraphNode, Point};
    use crate::model::person::{Gender, Person, PersonId};

    fn node(id: &str, x: f64, y: f64) -> GraphNode {
        GraphNode {
            id: PersonId::from(id),
            x,
            y,
            depth: 0,
            person: Person::with_id(PersonId::from(id), id, Gender::Male),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn fit_centres_bounding_box() {
        let viewport = Viewport::default();
        let nodes = vec![node("a", -140.0, 0.0), node("b", 140.0, 400.0)];
        let fit = viewport.fit_transform(&nodes, 1200.0, 800.0).unwrap();
        let center = Bounds::of_nodes(&nodes).unwrap().center();
        let projected = fit.apply(center);
        assert_close(projected.x, 600.0);
        assert_close(projected.y, 400.0);
        // min(1200 / 680, 800 / 1000) = 0.8
        assert_close(fit.k, 0.8);
    }

    #[test]
    fn fit_scale_has_a_floor() {
        let viewport = Viewport::default();
        let nodes = vec![node("a", 0.0, 0.0), node("b", 100_000.0, 100_000.0)];
        let fit = viewport.fit_transform(&nodes, 800.0, 600.0).unwrap();
        assert_close(fit.k, 0.1);
    }

    #[test]
    fn inverted_scale_range_does_not_panic() {
        let config = ViewportConfig {
            min_scale: 0.5,
            max_fit_scale: 0.2,
            max_scale: 0.4,
            ..ViewportConfig::default()
        };
        let mut viewport = Viewport::new(config);
        assert_close(viewport.transform().k, 0.4);

        let nodes = vec![node("a", 0.0, 0.0), node("b", 100_000.0, 100_000.0)];
        let fit = viewport.fit_transform(&nodes, 800.0, 600.0).unwrap();
        assert_close(fit.k, 0.2);

        viewport.zoom_by(0.01, Point::new(0.0, 0.0));
        assert_close(viewport.transform().k, 0.4);
    }

    #[test]
    fn fit_needs_nodes_and_area() {
        let viewport = Viewport::default();
        assert!(viewport.fit_transform(&[], 800.0, 600.0).is_none());
        assert!(viewport
            .fit_transform(&[node("a", 0.0, 0.0)], 0.0, 600.0)
            .is_none());
    }

    #[test]
    fn zoom_is_clamped_and_keeps_anchor_fixed() {
        let mut viewport = Viewport::default();
        let anchor = Point::new(300.0, 200.0);
        let world_before = viewport.transform().invert(anchor);
        viewport.zoom_by(100.0, anchor);
        assert_close(viewport.transform().k, 3.0);
        let world_after = viewport.transform().invert(anchor);
        assert_close(world_after.x, world_before.x);
        assert_close(world_after.y, world_before.y);

        viewport.zoom_by(0.0001, anchor);
        assert_close(viewport.transform().k, 0.1);
    }

    #[test]
    fn pan_is_unclamped() {
        let mut viewport = Viewport::default();
        viewport.pan(-1.0e6, 2.0e6);
        assert_close(viewport.transform().x, -1.0e6);
        assert_close(viewport.transform().y, 2.0e6);
    }

    #[test]
    fn auto_fit_animates_to_target() {
        let mut viewport = Viewport::default();
        let nodes = vec![node("a", 0.0, 0.0)];
        let transition = viewport.auto_fit(&nodes, 1000.0, 800.0).unwrap();
        assert!(viewport.is_animating());

        let halfway = viewport.tick(375);
        assert_close(halfway.k, (transition.from.k + transition.to.k) / 2.0);

        let done = viewport.tick(1_000);
        assert_eq!(done, transition.to);
        assert!(!viewport.is_animating());
    }

    #[test]
    fn user_gesture_cancels_transition() {
        let mut viewport = Viewport::default();
        viewport.auto_fit(&[node("a", 0.0, 0.0)], 1000.0, 800.0);
        viewport.pan(5.0, 5.0);
        assert!(!viewport.is_animating());
    }

    #[test]
    fn transition_sample_hits_endpoints() {
        let transition = Transition {
            from: Transform::IDENTITY,
            to: Transform {
                x: 10.0,
                y: 20.0,
                k: 2.0,
            },
            duration_ms: 100,
        };
        assert_eq!(transition.sample(0), Transform::IDENTITY);
        assert_eq!(transition.sample(100), transition.to);
    }
}
