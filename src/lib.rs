#![forbid(unsafe_code)]

pub mod analysis;
pub mod artifact;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod convert;
pub mod error;
pub mod metadata;
pub mod normalize;
pub mod plan;
pub mod resolver;
