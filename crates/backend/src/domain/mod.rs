pub mod a001_entity;
pub mod a002_client;
pub mod a003_provider;
