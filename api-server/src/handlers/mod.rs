//! HTTP handlers

pub mod health;
pub mod sensors;
pub mod predict;
pub mod dashboard;
