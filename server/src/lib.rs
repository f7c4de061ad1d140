pub mod ai;
pub mod config;
pub mod engine;
pub mod learning;
pub mod web;
