pub mod aggregation;
pub mod repository;
pub mod service;
