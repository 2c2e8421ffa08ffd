// Library for tests to access modules

pub mod config;
pub mod controller;
pub mod counter;
pub mod dashboard;
pub mod models;
pub mod remote;
pub mod routes;
pub mod scheduler;
pub mod version;
