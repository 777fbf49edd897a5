//! eframe host: widgets bound to the session and renderers for the derived views.

pub mod panels;
pub mod plot;
