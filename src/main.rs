mod app;
mod ui;

fn main() -> iced::Result {
    tracing_subscriber::fmt::init();

    iced::application(app::DownloadApp::default, app::update, app::view)
        .title("YT Downloader")
        .subscription(app::subscription)
        .window_size((560.0, 520.0))
        .run()
}
