pub mod audit;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod enums;
pub mod error;
pub mod filters;
pub mod models;
pub mod reference;
pub mod repository;
pub mod response;
pub mod routes;
pub mod schedule;
pub mod services;
pub mod slug;
pub mod state;
pub mod validation;
