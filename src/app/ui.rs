use super::state::ShapeGardenApp;
use crate::assets::LoadStage;
use crate::controls::ControlKey;
use eframe::egui::{
    self, CentralPanel, Context, Image, ProgressBar, ScrollArea, Sense, SidePanel, Slider, Ui,
    Vec2,
};

impl ShapeGardenApp {
    pub fn render_ui(&mut self, ctx: &Context) {
        SidePanel::right("controls_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        ui.style_mut().spacing.slider_width = 200.0;
                        ui.heading("⚙ Controls");
                        ui.add_space(10.0);

                        self.render_model_controls(ui);
                        self.render_light_controls(ui);
                        self.render_help(ui);

                        ui.add_space(10.0);
                    });
            });

        CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Shape Garden");
                ui.add_space(10.0);
                ui.label(format!("FPS: {}", self.fps() as u32));
                ui.label(format!("Objects: {}", self.context.registry.len()));
            });
            self.render_viewport(ui);
        });

        if let Some(error_msg) = &self.error_message.clone() {
            egui::Window::new("⚠ Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(error_msg);
                    ui.separator();
                    if ui.add_sized(Vec2::new(120.0, 32.0), egui::Button::new("OK")).clicked() {
                        self.error_message = None;
                    }
                });
        }
    }

    fn render_model_controls(&mut self, ui: &mut Ui) {
        ui.separator();
        ui.label("📂 Model");
        ui.add_space(5.0);

        ui.group(|ui| {
            let loading = !self.loads.is_empty();
            if ui
                .add_enabled(!loading, egui::Button::new("Open OBJ…"))
                .clicked()
            {
                self.open_file_dialog();
            }
            if let Some((stage, fraction)) = self.load_progress {
                let stage = match stage {
                    LoadStage::Materials => "materials",
                    LoadStage::Geometry => "geometry",
                };
                ui.add(
                    ProgressBar::new(fraction)
                        .show_percentage()
                        .text(format!("Loading {stage}")),
                );
            }
            if !self.status.is_empty() {
                ui.label(&self.status);
            }
        });
        ui.add_space(10.0);
    }

    fn render_light_controls(&mut self, ui: &mut Ui) {
        ui.separator();
        ui.label("💡 Lights");
        ui.add_space(5.0);

        ui.group(|ui| {
            for key in ControlKey::ALL {
                self.render_light_slider(ui, key);
            }
        });
        ui.add_space(10.0);
    }

    fn render_light_slider(&mut self, ui: &mut Ui, key: ControlKey) {
        let Some(mut value) = self.controls.input(key) else {
            return;
        };
        let limits = key.limits();
        let changed = ui
            .push_id(key.id(), |ui| {
                ui.label(key.label());
                ui.horizontal(|ui| {
                    let changed = ui
                        .add(
                            Slider::new(&mut value, limits.slider_range())
                                .step_by(limits.step)
                                .show_value(false),
                        )
                        .changed();
                    ui.monospace(self.controls.display(key).unwrap_or(""));
                    changed
                })
                .inner
            })
            .inner;

        if changed {
            let raw = value.to_string();
            if let Err(e) =
                self.controller
                    .on_input(&mut self.context.lights, &mut self.controls, key, &raw)
            {
                log::warn!("{e}");
            }
        }
    }

    fn render_help(&self, ui: &mut Ui) {
        ui.separator();
        ui.label("🖱 Mouse");
        ui.label("• Click a shape to give it a random color");
        ui.label("• Drag to orbit the camera");
        ui.label("• Scroll to zoom");
    }

    fn render_viewport(&mut self, ui: &mut Ui) {
        ui.separator();

        let available_size = ui.available_size();
        let pixels_per_point = ui.ctx().pixels_per_point();
        let viewport_width = (available_size.x * pixels_per_point) as u32;
        let viewport_height = (available_size.y * pixels_per_point) as u32;

        if viewport_width > 0 && viewport_height > 0 {
            self.update_viewport_size(viewport_width, viewport_height);
        }

        if let Some(texture) = &self.texture {
            let resp = ui.add(
                Image::new((texture.id(), available_size)).sense(Sense::click_and_drag()),
            );
            self.viewport_has_pointer = resp.hovered();
            self.handle_viewport_response(&resp);
        } else {
            self.viewport_has_pointer = false;
        }
    }
}
