//! Satellite pass prediction built on the SGP4/SDP4 orbit models.

pub mod config;
pub mod predict;
pub mod sgpsdp;
pub mod time_expr;
