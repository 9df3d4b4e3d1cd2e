use super::state::ShapeGardenApp;
use crate::config::SCROLL_SENSITIVITY_FACTOR;
use crate::picking::mutator::MutationOutcome;
use crate::picking::{PointerEvent, ViewportRect, pick};
use eframe::egui::{Context, Pos2, Response};

impl ShapeGardenApp {
    pub fn mouse_wheel_zoom(&mut self, ctx: &Context) {
        // only while the pointer is over the viewport
        if !self.viewport_has_pointer {
            return;
        }
        let scroll_delta = ctx.input(|i| i.raw_scroll_delta);
        if scroll_delta.y == 0.0 {
            return;
        }
        let steps = (scroll_delta.y.abs() * SCROLL_SENSITIVITY_FACTOR) as f64;
        if scroll_delta.y > 0.0 {
            self.context.orbit.dolly_in(steps);
        } else {
            self.context.orbit.dolly_out(steps);
        }
    }

    pub fn handle_viewport_response(&mut self, resp: &Response) {
        if resp.dragged() {
            let delta = resp.drag_delta();
            if delta.x != 0.0 || delta.y != 0.0 {
                self.context.orbit.rotate_by_pixels(
                    delta.x as f64,
                    delta.y as f64,
                    resp.rect.height() as f64,
                );
            }
        }

        if resp.clicked() {
            if let Some(pos) = resp.interact_pointer_pos() {
                self.click_at(pos, resp);
            }
        }
    }

    /// Recolors whatever is under `pos`. Misses are ignored.
    fn click_at(&mut self, pos: Pos2, resp: &Response) {
        let rect = ViewportRect {
            left: resp.rect.left() as f64,
            top: resp.rect.top() as f64,
            width: resp.rect.width() as f64,
            height: resp.rect.height() as f64,
        };
        let pointer = PointerEvent {
            x: pos.x as f64,
            y: pos.y as f64,
        };
        let pickables = self.context.registry.snapshot();
        let Some(hit) = pick(
            pointer,
            &rect,
            &self.context.camera,
            &self.context.scene,
            &pickables,
        ) else {
            return;
        };

        let name = self
            .context
            .scene
            .node(hit.node)
            .map(|node| node.name.clone())
            .unwrap_or_default();
        match self.mutator.mutate(&mut self.context.scene, hit.node) {
            MutationOutcome::RecoloredInPlace(color) | MutationOutcome::Replaced(color) => {
                log::debug!(
                    "Picked {name} at distance {:.2}, new color {:?}",
                    hit.distance,
                    color.to_rgb8().0
                );
            }
            MutationOutcome::Unchanged => log::debug!("Picked {name}, material left as is"),
        }
    }
}
