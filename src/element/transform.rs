//! World transforms, composed parent-first by walking the name chain.
//!
//! Rotation and scale pivot around each ancestor's own center: a child's
//! render center is its parent's render center plus the local center offset,
//! scaled by the parent's world scale and rotated by the parent's world
//! rotation. Dangling parent links resolve to "no parent".

use super::store::ElementStore;
use crate::geometry::{rotate_offset, Rect};

impl ElementStore {
    /// Unscaled top-left corner in screen space: the sum of every ancestor's
    /// local offset. `(0, 0)` for unknown names.
    pub fn world_position(&self, name: &str) -> (i32, i32) {
        self.index_of(name)
            .map_or((0, 0), |idx| self.world_position_of(idx))
    }

    /// Unscaled, unrotated rect in screen space.
    pub fn world_rect(&self, name: &str) -> Rect {
        let Some(idx) = self.index_of(name) else {
            return Rect::ZERO;
        };
        let (x, y) = self.world_position_of(idx);
        let rect = self.elements[idx].rect;
        Rect::new(x, y, rect.w, rect.h)
    }

    /// Own rotation plus every ancestor's, in degrees.
    pub fn world_rotation(&self, name: &str) -> f32 {
        self.index_of(name)
            .map_or(0.0, |idx| self.world_rotation_of(idx))
    }

    /// Own scale times every ancestor's.
    pub fn world_scale(&self, name: &str) -> f32 {
        self.index_of(name).map_or(1.0, |idx| self.world_scale_of(idx))
    }

    /// Own alpha times every ancestor's, unclamped.
    pub fn world_alpha(&self, name: &str) -> f32 {
        self.index_of(name).map_or(1.0, |idx| self.world_alpha_of(idx))
    }

    /// Render center after ancestor scale and rotation.
    pub fn scaled_center(&self, name: &str) -> (f32, f32) {
        self.index_of(name)
            .map_or((0.0, 0.0), |idx| self.scaled_center_of(idx))
    }

    /// Axis-aligned render rect: the element's size times its world scale,
    /// centered on [`scaled_center`](Self::scaled_center). Its own rotation
    /// is applied by the canvas around this rect's center.
    pub fn scaled_rect(&self, name: &str) -> Rect {
        self.index_of(name)
            .map_or(Rect::ZERO, |idx| self.scaled_rect_of(idx))
    }

    pub(super) fn world_position_of(&self, idx: usize) -> (i32, i32) {
        let own = self.elements[idx].rect;
        self.ancestors(idx).fold((own.x, own.y), |(x, y), a| {
            let r = self.elements[a].rect;
            (x + r.x, y + r.y)
        })
    }

    pub(super) fn world_rotation_of(&self, idx: usize) -> f32 {
        self.ancestors(idx)
            .fold(self.elements[idx].rotation, |acc, a| {
                acc + self.elements[a].rotation
            })
    }

    pub(super) fn world_scale_of(&self, idx: usize) -> f32 {
        self.ancestors(idx)
            .fold(self.elements[idx].scale, |acc, a| acc * self.elements[a].scale)
    }

    pub(super) fn world_alpha_of(&self, idx: usize) -> f32 {
        self.ancestors(idx)
            .fold(self.elements[idx].alpha, |acc, a| acc * self.elements[a].alpha)
    }

    pub(super) fn scaled_center_of(&self, idx: usize) -> (f32, f32) {
        // Collect the chain root-first, then accumulate downwards.
        let mut chain: Vec<usize> = self.ancestors(idx).collect();
        chain.reverse();
        chain.push(idx);

        let root = self.elements[chain[0]].rect;
        let mut center = (
            root.x as f32 + root.w as f32 / 2.0,
            root.y as f32 + root.h as f32 / 2.0,
        );
        let mut scale = 1.0;
        let mut rotation = 0.0;

        for pair in chain.windows(2) {
            let parent = &self.elements[pair[0]];
            let child = self.elements[pair[1]].rect;
            scale *= parent.scale;
            rotation += parent.rotation;

            let offset_x = child.x as f32 + child.w as f32 / 2.0 - parent.rect.w as f32 / 2.0;
            let offset_y = child.y as f32 + child.h as f32 / 2.0 - parent.rect.h as f32 / 2.0;
            let (dx, dy) = rotate_offset(offset_x * scale, offset_y * scale, rotation);
            center = (center.0 + dx, center.1 + dy);
        }
        center
    }

    pub(super) fn scaled_rect_of(&self, idx: usize) -> Rect {
        let rect = self.elements[idx].rect;
        let scale = self.world_scale_of(idx);
        let (cx, cy) = self.scaled_center_of(idx);
        let w = (rect.w as f32 * scale).round() as i32;
        let h = (rect.h as f32 * scale).round() as i32;
        Rect::new(
            (cx - w as f32 / 2.0).round() as i32,
            (cy - h as f32 / 2.0).round() as i32,
            w,
            h,
        )
    }

    /// Whether this element and every ancestor are unscaled and unrotated.
    pub(super) fn is_axis_aligned(&self, idx: usize) -> bool {
        let plain = |i: usize| {
            let e = &self.elements[i];
            e.scale == 1.0 && e.rotation == 0.0
        };
        plain(idx) && self.ancestors(idx).all(plain)
    }
}

#[cfg(test)]
mod tests {
    use crate::element::{ElementStore, UiElement};
    use crate::geometry::Rect;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn nested() -> ElementStore {
        let mut store = ElementStore::new();
        store.add_element(UiElement::new(Rect::new(0, 0, 100, 100)).name("A"));
        store.add_element(
            UiElement::new(Rect::new(10, 10, 20, 20))
                .name("B")
                .parent("A"),
        );
        store
    }

    #[test]
    fn test_world_position_is_unscaled_sum() {
        let mut store = nested();
        store.add_element(UiElement::new(Rect::new(3, 4, 5, 5)).name("C").parent("B"));
        store.move_to("A", 100, 50);
        store.set_scale("A", 3.0);

        assert_eq!(store.world_position("B"), (110, 60));
        assert_eq!(store.world_position("C"), (113, 64));
        assert_eq!(store.world_rect("C"), Rect::new(113, 64, 5, 5));
        assert_eq!(store.world_position("ghost"), (0, 0));
    }

    #[test]
    fn test_world_rotation_scale_alpha_accumulate() {
        let mut store = nested();
        store.set_rotation("A", 30.0);
        store.set_rotation("B", 15.0);
        store.set_scale("A", 2.0);
        store.set_scale("B", 0.5);
        store.set_alpha("A", 0.5);
        store.set_alpha("B", 0.5);

        assert!(approx_eq(store.world_rotation("B"), 45.0));
        assert!(approx_eq(
            store.world_rotation("B"),
            store.rotation("B") + store.world_rotation("A")
        ));
        assert!(approx_eq(store.world_scale("B"), 1.0));
        assert!(approx_eq(store.world_alpha("B"), 0.25));
    }

    #[test]
    fn test_parent_scale_doubles_child_offset() {
        let mut store = nested();
        let before = store.scaled_rect("B");
        assert_eq!(before, Rect::new(10, 10, 20, 20));

        store.set_scale("A", 2.0);
        let (acx, acy) = store.scaled_center("A");
        let (bcx, bcy) = store.scaled_center("B");
        assert!(approx_eq(acx, 50.0) && approx_eq(acy, 50.0));
        // Local offset from A's center is (-30, -30); doubled to (-60, -60).
        assert!(approx_eq(bcx - acx, -60.0));
        assert!(approx_eq(bcy - acy, -60.0));
        assert_eq!(store.scaled_rect("B"), Rect::new(-30, -30, 40, 40));
    }

    #[test]
    fn test_parent_rotation_orbits_child() {
        let mut store = ElementStore::new();
        store.add_element(UiElement::new(Rect::new(0, 0, 100, 100)).name("A"));
        // Child centered 40px right of A's center.
        store.add_element(UiElement::new(Rect::new(80, 40, 20, 20)).name("B").parent("A"));
        store.set_rotation("A", 90.0);

        let (cx, cy) = store.scaled_center("B");
        assert!(approx_eq(cx, 50.0));
        assert!(approx_eq(cy, 90.0));
    }

    #[test]
    fn test_grandchild_uses_accumulated_scale() {
        let mut store = nested();
        store.add_element(UiElement::new(Rect::new(0, 0, 10, 10)).name("C").parent("B"));
        store.set_scale("A", 2.0);

        // C's offset from B's center is (-5, -5), scaled by A*B = 2.
        let (bx, by) = store.scaled_center("B");
        let (cx, cy) = store.scaled_center("C");
        assert!(approx_eq(cx - bx, -10.0));
        assert!(approx_eq(cy - by, -10.0));
        assert_eq!(store.scaled_rect("C").w, 20);
    }

    #[test]
    fn test_orphan_resolves_as_root() {
        let mut store = nested();
        store.remove_element("A");
        assert_eq!(store.world_position("B"), (10, 10));
        assert_eq!(store.scaled_rect("B"), Rect::new(10, 10, 20, 20));
        assert!(approx_eq(store.world_scale("B"), 1.0));
    }
}
