//! Canvas tree maintenance: creation, re-parenting, removal and region
//! layout.

use super::{CanvasId, Viewer};
use crate::canvas::{Canvas, ImageDescriptor, Relayout};
use crate::camera::Rect;
use crate::error::ViewerError;

impl Viewer {
    /// Create a canvas under `parent` (the root when `None`). It is laid
    /// out immediately when its parent already has a region.
    pub fn create_canvas(
        &mut self,
        descriptor: ImageDescriptor,
        parent: Option<CanvasId>,
    ) -> Result<CanvasId, ViewerError> {
        descriptor.validate()?;
        let parent = parent.unwrap_or(self.root);
        if !self.canvases.contains_key(parent) {
            return Err(ViewerError::UnknownCanvas(parent));
        }
        let mut canvas = Canvas::new(
            descriptor,
            self.options.camera.clone(),
            self.options.transitions.clone(),
        );
        canvas.parent = Some(parent);
        canvas.set_embedded(self.canvases[parent].descriptor().has_image());
        let id = self.canvases.insert(canvas);
        self.canvases[parent].children.push(id);
        self.structure_dirty = true;
        self.layout_subtree(id, Relayout::KeepView);
        log::debug!("canvas {id:?} created under {parent:?}");
        Ok(id)
    }

    /// Move `child` (with its subtree) to the end of `parent`'s children.
    pub fn add_child(&mut self, parent: CanvasId, child: CanvasId) -> Result<(), ViewerError> {
        for id in [parent, child] {
            if !self.canvases.contains_key(id) {
                return Err(ViewerError::UnknownCanvas(id));
            }
        }
        if child == self.root {
            log::warn!("rejected re-parenting of the root canvas");
            return Err(ViewerError::RootCanvas);
        }
        if self.is_ancestor_or_self(child, parent) {
            log::warn!("rejected re-parenting: {child:?} under its descendant {parent:?}");
            return Err(ViewerError::Cycle { parent, child });
        }
        self.detach(child);
        let embedded = self.canvases[parent].descriptor().has_image();
        self.canvases[child].parent = Some(parent);
        self.canvases[child].set_embedded(embedded);
        self.canvases[parent].children.push(child);
        self.structure_dirty = true;
        self.layout_subtree(child, Relayout::KeepView);
        Ok(())
    }

    /// Remove a canvas. Its pending animations are interrupted and its
    /// children move to the root, keeping their order. Its tickets stay
    /// queryable through [`Viewer::status`].
    pub fn destroy(&mut self, id: CanvasId) -> Result<(), ViewerError> {
        if id == self.root {
            return Err(ViewerError::RootCanvas);
        }
        if !self.canvases.contains_key(id) {
            return Err(ViewerError::UnknownCanvas(id));
        }
        self.detach(id);
        let orphans = std::mem::take(&mut self.canvases[id].children);
        for &orphan in &orphans {
            self.canvases[orphan].parent = Some(self.root);
            self.canvases[orphan].set_embedded(false);
        }
        self.canvases[self.root].children.extend(orphans.iter().copied());
        if let Some(mut canvas) = self.canvases.remove(id) {
            canvas.destroy();
            self.retire(id, canvas.into_tickets());
        }
        let _ = self.planned_layers.remove(&id);
        self.structure_dirty = true;
        for orphan in orphans {
            self.layout_subtree(orphan, Relayout::KeepView);
        }
        log::debug!("canvas {id:?} destroyed");
        Ok(())
    }

    /// Place a canvas inside its parent's region.
    pub fn set_area(
        &mut self,
        id: CanvasId,
        area: Rect,
        animate: bool,
        now: f64,
    ) -> Result<bool, ViewerError> {
        let accepted = self.try_canvas_mut(id)?.set_area(area, animate, now);
        if accepted {
            self.layout_subtree(id, Relayout::KeepView);
        }
        Ok(accepted)
    }

    /// Set a canvas's draw-order hint among its siblings.
    pub fn set_z_index(&mut self, id: CanvasId, z_index: i32) -> Result<(), ViewerError> {
        self.try_canvas_mut(id)?.set_z_index(z_index);
        self.structure_dirty = true;
        Ok(())
    }

    /// Whether `ancestor` is `id` or lies on its parent chain.
    pub(crate) fn is_ancestor_or_self(&self, ancestor: CanvasId, id: CanvasId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.canvases.get(current).and_then(Canvas::parent);
        }
        false
    }

    fn detach(&mut self, id: CanvasId) {
        if let Some(old) = self.canvases.get(id).and_then(Canvas::parent) {
            if let Some(parent) = self.canvases.get_mut(old) {
                parent.children.retain(|&c| c != id);
            }
        }
    }

    /// Recompute every region from the element rect down.
    pub(super) fn layout(&mut self, mode: Relayout) {
        self.layout_subtree(self.root, mode);
    }

    /// Recompute regions of `id` and its descendants from its parent's.
    fn layout_subtree(&mut self, id: CanvasId, mode: Relayout) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let region = self.region_for(current);
            let Some(canvas) = self.canvases.get_mut(current) else {
                continue;
            };
            canvas.set_region(region, mode);
            stack.extend(canvas.children.iter().copied());
        }
    }

    fn region_for(&self, id: CanvasId) -> Rect {
        if id == self.root {
            return self.element_rect();
        }
        let Some(canvas) = self.canvases.get(id) else {
            return Rect::default();
        };
        canvas
            .parent()
            .and_then(|p| self.canvases.get(p))
            .map_or_else(Rect::default, |parent| parent.region().sub_rect(&canvas.area()))
    }
}

#[cfg(test)]
mod tests {
    use crate::animation::AnimationStatus;
    use crate::camera::{Projection, Rect, View};
    use crate::canvas::{ImageDescriptor, SetViewOptions};
    use crate::engine::Viewer;
    use crate::error::ViewerError;
    use crate::options::Options;

    fn viewer() -> Viewer {
        Viewer::new(1000.0, 500.0, 1.0, Options::default())
    }

    fn image() -> ImageDescriptor {
        ImageDescriptor::image(2000.0, 1000.0, Projection::Flat)
    }

    #[test]
    fn test_child_region_follows_area() {
        let mut v = viewer();
        let a = v.create_canvas(ImageDescriptor::container(), None).unwrap();
        assert!(v.set_area(a, Rect::new(0.5, 0.0, 0.5, 1.0), false, 0.0).unwrap());
        let b = v.create_canvas(image(), Some(a)).unwrap();
        assert!(v.set_area(b, Rect::new(0.0, 0.5, 1.0, 0.5), false, 0.0).unwrap());
        assert_eq!(v.canvas(b).unwrap().region(), Rect::new(500.0, 250.0, 500.0, 250.0));
        assert!(v.canvas(b).unwrap().is_at_rest());
    }

    #[test]
    fn test_empty_area_is_rejected() {
        let mut v = viewer();
        let a = v.create_canvas(image(), None).unwrap();
        assert!(!v.set_area(a, Rect::new(0.0, 0.0, 0.0, 1.0), false, 0.0).unwrap());
        assert_eq!(v.canvas(a).unwrap().area(), Rect::UNIT);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut v = viewer();
        let a = v.create_canvas(ImageDescriptor::container(), None).unwrap();
        let b = v.create_canvas(ImageDescriptor::container(), Some(a)).unwrap();
        let c = v.create_canvas(image(), Some(b)).unwrap();
        assert!(matches!(v.add_child(c, a), Err(ViewerError::Cycle { .. })));
        assert!(matches!(v.add_child(a, a), Err(ViewerError::Cycle { .. })));
        assert!(matches!(v.add_child(a, v.root()), Err(ViewerError::RootCanvas)));
        // the tree is untouched
        assert_eq!(v.canvas(a).unwrap().children(), &[b]);
        assert_eq!(v.canvas(c).unwrap().parent(), Some(b));
    }

    #[test]
    fn test_reparent_moves_to_end() {
        let mut v = viewer();
        let a = v.create_canvas(ImageDescriptor::container(), None).unwrap();
        let b = v.create_canvas(image(), None).unwrap();
        let c = v.create_canvas(image(), None).unwrap();
        v.add_child(a, c).unwrap();
        v.add_child(a, b).unwrap();
        assert_eq!(v.canvas(a).unwrap().children(), &[c, b]);
        assert_eq!(v.canvas(v.root()).unwrap().children(), &[a]);
    }

    #[test]
    fn test_destroy_rehomes_children() {
        let mut v = viewer();
        let a = v.create_canvas(ImageDescriptor::container(), None).unwrap();
        let _ = v.set_area(a, Rect::new(0.0, 0.0, 0.5, 0.5), false, 0.0).unwrap();
        let b = v.create_canvas(image(), Some(a)).unwrap();
        let c = v.create_canvas(image(), Some(a)).unwrap();
        v.destroy(a).unwrap();
        assert!(!v.contains(a));
        assert_eq!(v.canvas(v.root()).unwrap().children(), &[b, c]);
        assert_eq!(v.canvas(b).unwrap().parent(), Some(v.root()));
        assert_eq!(v.canvas(b).unwrap().region(), Rect::new(0.0, 0.0, 1000.0, 500.0));
        assert!(matches!(v.destroy(a), Err(ViewerError::UnknownCanvas(_))));
        assert!(matches!(v.destroy(v.root()), Err(ViewerError::RootCanvas)));
    }

    #[test]
    fn test_animated_area_relayouts_on_tick() {
        let mut v = viewer();
        let a = v.create_canvas(image(), None).unwrap();
        assert!(v.set_area(a, Rect::new(0.0, 0.0, 0.5, 1.0), true, 0.0).unwrap());
        assert_eq!(v.canvas(a).unwrap().region(), Rect::new(0.0, 0.0, 1000.0, 500.0));
        let report = v.tick(10_000.0);
        assert!(!report.animating);
        assert_eq!(v.canvas(a).unwrap().region(), Rect::new(0.0, 0.0, 500.0, 500.0));
    }

    fn large_image() -> ImageDescriptor {
        ImageDescriptor::image(8000.0, 4000.0, Projection::Flat)
    }

    fn same_view(a: View, b: View) -> bool {
        (a.center_x - b.center_x).abs() < 1e-9
            && (a.center_y - b.center_y).abs() < 1e-9
            && (a.width - b.width).abs() < 1e-9
            && (a.height - b.height).abs() < 1e-9
    }

    #[test]
    fn test_area_change_keeps_own_view() {
        for animate in [false, true] {
            let mut v = viewer();
            let a = v.create_canvas(image(), None).unwrap();
            let home = v.canvas(a).unwrap().view();
            assert!(v.canvas(a).unwrap().is_zoomed_out(false));

            // same aspect ratio: the view is untouched
            assert!(v.set_area(a, Rect::new(0.5, 0.5, 0.5, 0.5), animate, 0.0).unwrap());
            let _ = v.tick(10_000.0);
            let c = v.canvas(a).unwrap();
            assert_eq!(c.region(), Rect::new(500.0, 250.0, 500.0, 250.0));
            assert!(same_view(c.view(), home), "{:?}", c.view());
            assert!(c.is_zoomed_out(false));

            // half-width cell: the whole image stays in view
            assert!(v.set_area(a, Rect::new(0.0, 0.0, 0.5, 1.0), animate, 20_000.0).unwrap());
            let _ = v.tick(30_000.0);
            let c = v.canvas(a).unwrap();
            let after = c.view();
            assert!((after.width - home.width).abs() < 1e-9);
            assert!(after.height >= home.height);
            assert!((after.center_x - home.center_x).abs() < 1e-9);
            assert!(c.is_zoomed_out(false));
        }
    }

    #[test]
    fn test_area_change_keeps_zoomed_view() {
        let mut v = viewer();
        let a = v.create_canvas(large_image(), None).unwrap();
        let zoomed = View::new(0.3, 0.4, 0.2, 0.2);
        v.canvas_mut(a)
            .unwrap()
            .set_view(&zoomed, &SetViewOptions::default());
        assert!(v.set_area(a, Rect::new(0.0, 0.0, 0.5, 0.5), false, 0.0).unwrap());
        assert!(same_view(v.canvas(a).unwrap().view(), zoomed));
    }

    #[test]
    fn test_resize_keeps_scale() {
        let mut v = viewer();
        let a = v.create_canvas(large_image(), None).unwrap();
        v.canvas_mut(a)
            .unwrap()
            .set_view(&View::new(0.3, 0.4, 0.2, 0.2), &SetViewOptions::default());
        let scale = v.canvas(a).unwrap().scale();
        v.resize(500.0, 250.0, 1.0);
        let c = v.canvas(a).unwrap();
        assert!((c.scale() - scale).abs() < 1e-9);
        assert!((c.view().width - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_overlay_fades_use_embed_duration() {
        let mut v = viewer();
        let a = v.create_canvas(image(), None).unwrap();
        let b = v.create_canvas(image(), Some(a)).unwrap();
        let base = v.canvas_mut(a).unwrap().fade_to(0.0, false, 0.0);
        let overlay = v.canvas_mut(b).unwrap().fade_to(0.0, false, 0.0);
        // embed fade 200 ms, cross-fade 300 ms
        let _ = v.tick(250.0);
        assert_eq!(v.status(b, overlay), AnimationStatus::Completed);
        assert_eq!(v.status(a, base), AnimationStatus::Pending);

        v.add_child(v.root(), b).unwrap();
        let top = v.canvas_mut(b).unwrap().fade_to(1.0, false, 300.0);
        let _ = v.tick(550.0);
        assert_eq!(v.status(b, top), AnimationStatus::Pending);
    }

    #[test]
    fn test_invalid_image_is_rejected() {
        let mut v = viewer();
        let bad = ImageDescriptor::image(f64::NAN, 10.0, Projection::Flat);
        assert!(matches!(v.create_canvas(bad, None), Err(ViewerError::InvalidImage(_))));
        assert_eq!(v.len(), 1);
    }
}
