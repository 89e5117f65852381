//! File-backed storage adapters.

mod csv_pool_store;
mod source_list;

pub use csv_pool_store::CsvPoolStore;
pub use source_list::load_source_list;
