//! Two-pass rendering and hit testing.

use super::store::ElementStore;
use crate::geometry::Rect;
use crate::renderer::Canvas;

impl ElementStore {
    /// Draw every element onto `canvas`.
    ///
    /// Regular elements are drawn first in collection order, then the
    /// always-on-top ones, also in collection order.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        for idx in 0..self.elements.len() {
            if !self.elements[idx].always_on_top {
                self.render_element(canvas, idx);
            }
        }
        for idx in 0..self.elements.len() {
            if self.elements[idx].always_on_top {
                self.render_element(canvas, idx);
            }
        }
    }

    /// Topmost visible, clickable element whose render rect contains the
    /// point.
    pub fn find_element_at(&self, x: i32, y: i32) -> Option<&str> {
        self.elements
            .iter()
            .enumerate()
            .rev()
            .filter(|(idx, e)| e.clickable && self.is_drawn(*idx))
            .find(|(idx, _)| self.scaled_rect_of(*idx).contains(x, y))
            .map(|(_, e)| e.name.as_str())
    }

    /// Clip rect for an element: the intersection of every ancestor's render
    /// rect. `None` when no clipping applies (roots, or any scale or rotation
    /// along the chain); `Some(None)` when the ancestors do not overlap.
    pub fn clip_rect(&self, name: &str) -> Option<Option<Rect>> {
        self.index_of(name).and_then(|idx| self.clip_rect_of(idx))
    }

    fn render_element(&self, canvas: &mut dyn Canvas, idx: usize) {
        let element = &self.elements[idx];
        let Some(texture) = element.texture.as_ref() else {
            return;
        };
        if !self.is_drawn(idx) {
            return;
        }

        let dst = self.scaled_rect_of(idx);
        let clip = match self.clip_rect_of(idx) {
            None => None,
            Some(Some(clip)) if dst.intersects(&clip) => Some(clip),
            // Fully clipped away.
            Some(_) => return,
        };

        let alpha = self.world_alpha_of(idx).clamp(0.0, 1.0);
        canvas.set_element(&element.name);
        canvas.draw_texture(texture, dst, self.world_rotation_of(idx), alpha, clip);
    }

    /// Visible itself, with every ancestor visible and resolvable.
    fn is_drawn(&self, idx: usize) -> bool {
        let mut current = idx;
        for _ in 0..=self.elements.len() {
            let element = &self.elements[current];
            if !element.visible {
                return false;
            }
            let Some(parent) = element.parent.as_deref() else {
                return true;
            };
            match self.index_of(parent) {
                Some(p) => current = p,
                // Dangling parent link.
                None => return false,
            }
        }
        false
    }

    fn clip_rect_of(&self, idx: usize) -> Option<Option<Rect>> {
        self.parent_index(idx)?;
        if !self.is_axis_aligned(idx) {
            return None;
        }

        let mut clip: Option<Rect> = None;
        for ancestor in self.ancestors(idx) {
            let rect = self.scaled_rect_of(ancestor);
            clip = match clip {
                None => Some(rect),
                Some(c) => match c.intersect(&rect) {
                    Some(i) => Some(i),
                    None => return Some(None),
                },
            };
        }
        Some(clip.filter(|c| !c.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use crate::element::{ElementStore, UiElement};
    use crate::geometry::Rect;
    use crate::renderer::DrawList;
    use crate::texture::Texture;

    fn tex() -> Texture {
        Texture::solid(2, 2, [255, 255, 255, 255]).unwrap()
    }

    fn el(name: &str, rect: Rect) -> UiElement {
        UiElement::new(rect).name(name).texture("white", tex())
    }

    fn draw(store: &ElementStore) -> DrawList {
        let mut list = DrawList::new();
        store.render(&mut list);
        list
    }

    #[test]
    fn test_always_on_top_draws_last() {
        let mut store = ElementStore::new();
        store.add_element(el("toast", Rect::new(0, 0, 10, 10)).always_on_top(true));
        store.add_element(el("a", Rect::new(0, 0, 10, 10)));
        store.add_element(el("b", Rect::new(0, 0, 10, 10)));
        store.add_element(el("badge", Rect::new(0, 0, 10, 10)).always_on_top(true));

        assert_eq!(draw(&store).element_names(), ["a", "b", "toast", "badge"]);
    }

    #[test]
    fn test_skips_hidden_textureless_and_hidden_ancestors() {
        let mut store = ElementStore::new();
        store.add_element(el("panel", Rect::new(0, 0, 50, 50)).visible(false));
        store.add_element(el("child", Rect::new(0, 0, 10, 10)).parent("panel"));
        store.add_element(UiElement::new(Rect::new(0, 0, 5, 5)).name("bare"));
        store.add_element(el("shown", Rect::new(0, 0, 5, 5)));

        assert_eq!(draw(&store).element_names(), ["shown"]);
    }

    #[test]
    fn test_dangling_parent_is_not_drawn() {
        let mut store = ElementStore::new();
        store.add_element(el("p", Rect::new(0, 0, 50, 50)));
        store.add_element(el("c", Rect::new(0, 0, 10, 10)).parent("p"));
        store.remove_element("p");
        assert!(draw(&store).is_empty());
    }

    #[test]
    fn test_alpha_multiplies_and_clamps() {
        let mut store = ElementStore::new();
        store.add_element(el("p", Rect::new(0, 0, 50, 50)).alpha(0.5));
        store.add_element(el("c", Rect::new(0, 0, 10, 10)).alpha(0.5).parent("p"));
        store.add_element(el("hot", Rect::new(0, 0, 10, 10)).alpha(3.0));

        let list = draw(&store);
        assert_eq!(list.find("c").map(|c| c.alpha), Some(0.25));
        assert_eq!(list.find("hot").map(|c| c.alpha), Some(1.0));
    }

    #[test]
    fn test_clip_intersects_every_ancestor() {
        let mut store = ElementStore::new();
        store.add_element(el("outer", Rect::new(0, 0, 100, 100)));
        store.add_element(el("inner", Rect::new(50, 50, 100, 100)).parent("outer"));
        store.add_element(el("leaf", Rect::new(-20, -20, 40, 40)).parent("inner"));

        let list = draw(&store);
        assert_eq!(list.find("outer").and_then(|c| c.clip), None);
        assert_eq!(
            list.find("inner").and_then(|c| c.clip),
            Some(Rect::new(0, 0, 100, 100))
        );
        // inner renders at (50,50,100,100); intersected with outer.
        assert_eq!(
            list.find("leaf").and_then(|c| c.clip),
            Some(Rect::new(50, 50, 50, 50))
        );
    }

    #[test]
    fn test_fully_clipped_child_is_skipped() {
        let mut store = ElementStore::new();
        store.add_element(el("box", Rect::new(0, 0, 20, 20)));
        store.add_element(el("outside", Rect::new(40, 40, 10, 10)).parent("box"));
        assert_eq!(draw(&store).element_names(), ["box"]);
    }

    #[test]
    fn test_no_clip_under_scale_or_rotation() {
        let mut store = ElementStore::new();
        store.add_element(el("box", Rect::new(0, 0, 20, 20)).rotation(10.0));
        store.add_element(el("outside", Rect::new(40, 40, 10, 10)).parent("box"));

        let list = draw(&store);
        assert_eq!(list.element_names(), ["box", "outside"]);
        assert_eq!(list.find("outside").and_then(|c| c.clip), None);
        assert_eq!(list.find("outside").map(|c| c.rotation), Some(10.0));
        assert_eq!(store.clip_rect("outside"), None);
    }

    #[test]
    fn test_find_element_at_prefers_topmost_clickable() {
        let mut store = ElementStore::new();
        store.add_element(el("back", Rect::new(0, 0, 100, 100)).clickable(true));
        store.add_element(el("front", Rect::new(10, 10, 20, 20)).clickable(true));
        store.add_element(el("decor", Rect::new(10, 10, 20, 20)));
        store.add_element(el("hidden", Rect::new(10, 10, 20, 20)).clickable(true).visible(false));

        assert_eq!(store.find_element_at(15, 15), Some("front"));
        assert_eq!(store.find_element_at(50, 50), Some("back"));
        assert_eq!(store.find_element_at(100, 100), None);

        // Hit testing follows the scaled rect.
        store.set_scale("front", 2.0);
        assert_eq!(store.find_element_at(35, 35), Some("front"));
    }
}
