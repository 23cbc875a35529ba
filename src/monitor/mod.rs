pub mod classify;
pub mod config;
pub mod framebuffer;
pub mod timing;
pub mod tracker;
