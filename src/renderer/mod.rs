//! DOM rendering adapters
//!
//! Apply sim decisions to page elements. Nothing here decides anything;
//! every view reads a snapshot or sim state and mutates the DOM.

pub mod beam_view;
pub mod ramp_view;
pub mod table_view;
pub mod toast;

pub use beam_view::BeamView;
pub use table_view::TableView;
pub use toast::ToastView;
