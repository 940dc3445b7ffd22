//! Flutter-facing bridge for the race-winners form.

pub mod api;
