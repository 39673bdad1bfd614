// Service module exports

pub mod appointment;
pub mod database;
pub mod resource;
pub mod settings;
pub mod store;
