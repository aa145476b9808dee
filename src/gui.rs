use crate::assets::IconAtlas;
use crate::keyboard_hook::{KeyEventReceiver, KeyboardHook};
use crate::overlay::{OverlayDriver, Scene};
use crate::settings::{OverlayColor, OverlaySettings};
use eframe::egui;
use std::time::{Duration, Instant};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const TEXT_GAP_PX: f32 = 2.0;

/// Window painting the key label grid over a chroma-key background.
pub struct OverlayApp {
    driver: OverlayDriver<IconAtlas>,
    scene: Scene,
    textures: Vec<egui::TextureHandle>,
    settings: OverlaySettings,
    hook: KeyboardHook,
}

impl OverlayApp {
    pub fn new(
        ctx: &egui::Context,
        settings: OverlaySettings,
        atlas: IconAtlas,
        events: KeyEventReceiver,
        hook: KeyboardHook,
    ) -> Self {
        let textures = atlas
            .images()
            .iter()
            .enumerate()
            .map(|(index, image)| {
                let size = [image.width() as usize, image.height() as usize];
                ctx.load_texture(
                    format!("key-icon-{index}"),
                    egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw()),
                    egui::TextureOptions::NEAREST,
                )
            })
            .collect();

        Self {
            driver: OverlayDriver::new(settings.grid_config(), atlas, events),
            scene: Scene::new(),
            textures,
            settings,
            hook,
        }
    }

    fn paint(&self, ui: &egui::Ui) {
        let painter = ui.painter();
        let origin = ui.max_rect().min;
        let icon_size = self.settings.icon_size_px as f32;
        let font = egui::FontId::proportional(self.settings.font_size);
        let palette = &self.settings.palette;
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

        for (_, label, (x, y)) in self.scene.placed() {
            let top_left = origin + egui::vec2(x as f32, y as f32);
            if let Some(texture) = self.textures.get(label.icon.0) {
                let rect = egui::Rect::from_min_size(top_left, egui::vec2(icon_size, icon_size));
                painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
            }

            let Some(text) = label.text.as_deref() else {
                continue;
            };
            let color = color32(palette.text_color(label.style));
            let galley = painter.layout_no_wrap(text.to_owned(), font.clone(), color);
            let size = galley.size();
            let text_min = egui::pos2(
                top_left.x + (icon_size - size.x) / 2.0,
                top_left.y + icon_size + TEXT_GAP_PX,
            );
            painter.rect_filled(
                egui::Rect::from_min_size(text_min, size),
                0.0,
                color32(palette.text_background),
            );
            painter.galley(text_min, galley, color);
        }
    }
}

fn color32(color: OverlayColor) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let report = self.driver.pump(Instant::now(), &mut self.scene);
        if report.changed() {
            tracing::trace!(?report, labels = self.scene.len(), "overlay updated");
        }

        let background = color32(self.settings.palette.chroma_key);
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(background))
            .show(ctx, |ui| self.paint(ui));

        ctx.request_repaint_after(FRAME_INTERVAL);
    }
}

impl Drop for OverlayApp {
    fn drop(&mut self) {
        self.hook.deactivate();
        self.driver.shutdown(&mut self.scene);
    }
}
