pub mod icons;
pub mod panel;
pub mod progress;

pub use panel::{panel_width, render_panel};
pub use progress::RequestSpinner;
