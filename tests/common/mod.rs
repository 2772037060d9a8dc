//! Helpers shared by the integration suites

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
