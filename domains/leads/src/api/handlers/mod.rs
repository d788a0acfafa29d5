//! HTTP handlers for the Leads domain

pub mod leads;
