// src/handlers.rs
pub mod contracts;
pub mod invoices;
