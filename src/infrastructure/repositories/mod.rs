//! Repository implementations using SeaORM

pub mod client_repository;

pub use client_repository::SeaOrmClientRepository;
