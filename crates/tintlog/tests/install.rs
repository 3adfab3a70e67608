use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use serial_test::serial;
use tintlog::{set_color_detector, Level, Renderer, Setup, Sink};

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// `log` accepts one global logger per process, so this file installs once.
#[test]
#[serial]
fn installed_logger_renders_log_macros() {
    set_color_detector(|_| true);

    let buffer = Buffer::default();
    let renderer = Renderer::builder()
        .template("{levelname:<7}|{name}|{message}|{user}")
        .default_value("user", "-")
        .palette("levelname", "1")
        .build()
        .unwrap();

    Setup::new("svc")
        .package("app")
        .level(Level::Info)
        .sink(Sink::writer(buffer.clone()))
        .renderer(renderer)
        .install()
        .unwrap();

    log::info!(target: "app::svc", "started");
    log::info!(target: "app::svc::db", user = "ada"; "connected");
    log::debug!(target: "app::svc", "too verbose");
    log::error!(target: "elsewhere", "not ours");

    let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    assert_eq!(
        text,
        "\x1b[1mINFO   \x1b[0m|app::svc|started|-\n\x1b[1mINFO   \x1b[0m|app::svc::db|connected|ada\n"
    );

    assert!(Setup::new("again").install().is_err());
}
