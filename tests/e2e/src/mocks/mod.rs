//! Test doubles and data builders

pub mod fixtures;
