pub mod contract_service;
pub mod invoice_generator;
pub mod invoice_service;
pub mod scheduler;
