mod app_context;
mod balance;
mod bank;
mod config;
mod contract;
mod schedule;
mod session;
mod shared;
mod theme;
mod units;

use std::sync::Arc;

use gpui::*;
use gpui_component::theme::Theme;
use gpui_component::Root;

use app_context::BankContext;
use config::AppConfig;
use theme::apply_bank_theme;

const DEFAULT_FONT_SIZE: f32 = 16.0;

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("[Config] {}", e);
            std::process::exit(1);
        }
    };
    config.log_summary();

    let ctx = match BankContext::from_config(config) {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            log::error!("[Bank] startup failed: {}", e);
            std::process::exit(1);
        }
    };

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(move |cx| {
        gpui_component::init(cx);
        apply_bank_theme(cx);
        Theme::global_mut(cx).font_size = px(DEFAULT_FONT_SIZE);

        let opened = cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                    None,
                    size(px(560.), px(680.)),
                    cx,
                ))),
                titlebar: Some(TitlebarOptions {
                    title: Some(config::APP_NAME.into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            move |window, cx| {
                window.set_rem_size(px(DEFAULT_FONT_SIZE));
                let view = cx.new(|cx| bank::BankView::new(ctx, window, cx));
                cx.new(|cx| Root::new(view, window, cx))
            },
        );
        if let Err(e) = opened {
            log::error!("[Bank] failed to open window: {}", e);
            cx.quit();
        }
    });
}
