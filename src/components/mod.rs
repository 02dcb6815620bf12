//! UI Components
//!
//! Presentational Leptos components. Ordering and filtering rules live in
//! `taskboard-core`; these only render and forward gestures.

mod add_stage_form;
mod board_picker;
mod board_view;
mod card_detail;
mod card_tile;
mod error_banner;
mod filter_bar;
mod session_bar;
mod stage_column;

pub use add_stage_form::AddStageForm;
pub use board_picker::BoardPicker;
pub use board_view::{BoardDnd, BoardView};
pub use card_detail::CardDetail;
pub use card_tile::CardTile;
pub use error_banner::ErrorBanner;
pub use filter_bar::FilterBar;
pub use session_bar::SessionBar;
pub use stage_column::StageColumn;
