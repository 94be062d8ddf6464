//! Flutter bridge surface for TodoShark core.

pub mod api;
