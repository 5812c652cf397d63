pub mod month;
pub mod rate;
pub mod setup;
pub mod ui;
