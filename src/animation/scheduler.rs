//! Per-frame driver for every active timeline.
//!
//! The scheduler is a cheap, clonable handle to a shared binding list, so a
//! callback step can capture a clone and add or remove timelines while an
//! update pass is running. Each pass iterates a snapshot of the list; changes
//! made by callbacks land in the live list and are seen from the next pass,
//! except removals, which stop a timeline immediately.

use std::cell::RefCell;
use std::rc::Rc;

use super::timeline::{PropertyFlags, Timeline};
use crate::element::{ElementStore, SpecError};
use crate::texture::TextureCache;

#[derive(Clone)]
struct Binding {
    target: String,
    timeline: Rc<RefCell<Timeline>>,
}

impl Binding {
    fn same_as(&self, other: &Binding) -> bool {
        self.target == other.target && Rc::ptr_eq(&self.timeline, &other.timeline)
    }
}

/// Values pulled out of a timeline after its update, applied once the
/// timeline borrow is released.
struct Output {
    touched: PropertyFlags,
    texture: Option<String>,
    visible: Option<bool>,
    position: (f32, f32),
    size: (f32, f32),
    rotation: f32,
    alpha: f32,
    scale: f32,
}

/// Shared list of `(target, timeline)` bindings.
#[derive(Clone, Default)]
pub struct Scheduler {
    bindings: Rc<RefCell<Vec<Binding>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `timeline` to the element `target`, seeding its live values from
    /// the element. Several timelines may drive the same target.
    ///
    /// Returns `false` (and drops the timeline) when the element is unknown.
    pub fn add(&self, store: &ElementStore, target: &str, mut timeline: Timeline) -> bool {
        let Some(element) = store.get(target) else {
            log::error!("Animation target '{}' not found", target);
            return false;
        };
        timeline.seed_from(element);
        self.push(target, timeline);
        true
    }

    /// Bind a timeline without access to the store, e.g. from inside a
    /// callback step. The target is validated and the timeline seeded at the
    /// start of its first update.
    pub fn add_pending(&self, target: &str, timeline: Timeline) {
        self.push(target, timeline);
    }

    /// Drop every timeline bound to `target`, effective immediately.
    pub fn remove(&self, target: &str) {
        self.bindings.borrow_mut().retain(|b| b.target != target);
    }

    pub fn clear(&self) {
        self.bindings.borrow_mut().clear();
    }

    pub fn contains(&self, target: &str) -> bool {
        self.bindings.borrow().iter().any(|b| b.target == target)
    }

    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    /// Parse a JSON step list and bind the resulting timeline to `target`.
    pub fn load_from_json(
        &self,
        store: &ElementStore,
        target: &str,
        json: &str,
    ) -> Result<(), SpecError> {
        let timeline = Timeline::from_json(json)?;
        if self.add(store, target, timeline) {
            Ok(())
        } else {
            Err(SpecError::UnknownTarget(target.to_string()))
        }
    }

    /// Advance every timeline by `dt_ms` and write its output into `store`.
    pub fn update(&self, dt_ms: f32, store: &mut ElementStore, cache: &mut TextureCache) {
        let snapshot: Vec<Binding> = self.bindings.borrow().clone();
        if snapshot.is_empty() {
            return;
        }

        for binding in &snapshot {
            // Removed by a callback earlier in this pass.
            if !self.is_live(binding) {
                continue;
            }

            let Some(output) = self.advance(binding, dt_ms, store) else {
                continue;
            };
            apply(&binding.target, output, store, cache);
        }

        let finished: Vec<&Binding> = snapshot
            .iter()
            .filter(|b| b.timeline.try_borrow().is_ok_and(|t| t.is_finished()))
            .collect();
        if !finished.is_empty() {
            self.bindings
                .borrow_mut()
                .retain(|b| !finished.iter().any(|f| f.same_as(b)));
        }
    }

    fn push(&self, target: &str, timeline: Timeline) {
        self.bindings.borrow_mut().push(Binding {
            target: target.to_string(),
            timeline: Rc::new(RefCell::new(timeline)),
        });
    }

    fn is_live(&self, binding: &Binding) -> bool {
        self.bindings.borrow().iter().any(|b| b.same_as(binding))
    }

    fn unbind(&self, binding: &Binding) {
        self.bindings.borrow_mut().retain(|b| !b.same_as(binding));
    }

    fn advance(&self, binding: &Binding, dt_ms: f32, store: &ElementStore) -> Option<Output> {
        let Ok(mut timeline) = binding.timeline.try_borrow_mut() else {
            log::warn!("Timeline for '{}' is already updating", binding.target);
            return None;
        };

        if !timeline.is_seeded() {
            match store.get(&binding.target) {
                Some(element) => timeline.seed_from(element),
                None => {
                    log::error!("Animation target '{}' not found", binding.target);
                    drop(timeline);
                    self.unbind(binding);
                    return None;
                }
            }
        }

        timeline.update(dt_ms);
        Some(Output {
            touched: timeline.touched(),
            texture: timeline.take_texture_change(),
            visible: timeline.take_visible_override(),
            position: timeline.current_position(),
            size: timeline.current_size(),
            rotation: timeline.current_rotation(),
            alpha: timeline.current_alpha(),
            scale: timeline.current_scale(),
        })
    }
}

fn apply(target: &str, out: Output, store: &mut ElementStore, cache: &mut TextureCache) {
    if let Some(image) = out.texture {
        store.change_texture(cache, target, &image);
    }
    if out.touched.contains(PropertyFlags::POSITION) {
        store.move_to(target, out.position.0.round() as i32, out.position.1.round() as i32);
    }
    if out.touched.contains(PropertyFlags::SIZE) {
        store.resize(target, out.size.0.round() as i32, out.size.1.round() as i32);
    }
    if out.touched.contains(PropertyFlags::ROTATION) {
        store.set_rotation(target, out.rotation);
    }
    if out.touched.contains(PropertyFlags::ALPHA) {
        store.set_alpha(target, out.alpha);
    }
    if out.touched.contains(PropertyFlags::SCALE) {
        store.set_scale(target, out.scale);
    }
    if let Some(visible) = out.visible {
        store.set_visible(target, visible);
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bindings = self.bindings.borrow();
        f.debug_list()
            .entries(bindings.iter().map(|b| &b.target))
            .finish()
    }
}
