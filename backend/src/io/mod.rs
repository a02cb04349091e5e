//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services.
//!
//! Handlers deserialize requests into the DTOs of the `shared` crate, validate
//! them, map them to domain commands, and translate `ServiceError`s into HTTP
//! status codes with an `ErrorResponse` body.

pub mod rest;
