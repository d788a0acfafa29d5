//! Domain layer for the Leads domain

pub mod entities;
