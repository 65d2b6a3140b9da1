pub mod store;
pub use store::{ContractStore, InvoiceStore};
pub mod contract_repo;
pub use contract_repo::ContractRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;

#[cfg(test)]
pub mod memory_store;
#[cfg(test)]
pub use memory_store::MemoryStore;
