use anyhow::{anyhow, Context};
use eframe::egui;
use keystroke_overlay::assets::{IconAtlas, KeyboardLayout};
use keystroke_overlay::gui::OverlayApp;
use keystroke_overlay::keyboard_hook::{key_event_queue, KeyboardHook};
use keystroke_overlay::{logging, settings_store};

fn main() -> anyhow::Result<()> {
    let loaded = settings_store::load_or_init()?;
    let _log_guard = logging::init(
        loaded.settings.debug_logging,
        loaded.settings.log_dir.as_deref(),
    );
    loaded.report();
    let settings = loaded.settings;

    let layout = KeyboardLayout::standard();
    let atlas = IconAtlas::load(
        &settings.assets.bindings,
        &settings.assets.marker,
        &settings.assets.arrows,
        &layout,
        settings.palette.chroma_key.to_pixel(),
    )
    .context("prepare key icons")?;

    let (sender, events) = key_event_queue(settings.event_queue_capacity);
    let mut hook = KeyboardHook::new(sender);
    hook.activate().context("install keyboard hook")?;

    let mut viewport = egui::ViewportBuilder::default()
        .with_title("Overlay")
        .with_inner_size([settings.row_width_px as f32, settings.window_height_px as f32]);
    if settings.always_on_top {
        viewport = viewport.with_always_on_top();
    }
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    tracing::info!(
        width = settings.row_width_px,
        height = settings.window_height_px,
        "starting keystroke overlay"
    );
    eframe::run_native(
        "keystroke_overlay",
        native_options,
        Box::new(move |cc| Box::new(OverlayApp::new(&cc.egui_ctx, settings, atlas, events, hook))),
    )
    .map_err(|err| anyhow!("overlay window failed: {err}"))
}
