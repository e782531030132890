pub mod clock;
pub mod commands;
pub mod config;
pub mod connectors;
pub mod document;
pub mod entities;
pub mod ingress;
pub mod task;
pub mod task_store;
