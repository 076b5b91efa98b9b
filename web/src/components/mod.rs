pub mod loading;
pub mod status_bar;

pub use loading::LoadingView;
pub use status_bar::StatusBar;
