pub mod csv_export;
pub mod file;
pub mod store;

pub use csv_export::export_schedule_csv;
pub use store::{CapacityStore, ContactStore, JsonFileStore, ProjectPatch, ProjectStore};
