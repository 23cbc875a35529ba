pub mod logging;
pub mod presenter;
