//! Built-in applications besides the terminal.

pub mod browser;
pub mod clock;
pub mod settings;

pub use browser::AppBrowser;
pub use clock::Clock;
pub use settings::Settings;
