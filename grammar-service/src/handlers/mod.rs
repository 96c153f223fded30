//! HTTP handlers for the grammar service.

pub mod check;
pub mod form;
pub mod health;
