pub mod changes;
pub mod components;
pub mod setup;
pub mod ui;
