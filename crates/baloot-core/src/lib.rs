#![deny(warnings)]
pub mod belief;
pub mod model;
pub mod projects;
pub mod rules;
pub mod scoring;
