pub mod api;
pub mod app;
pub mod carbon;
pub mod config;
pub mod db;
pub mod forecast;
pub mod seed;
pub mod services;
