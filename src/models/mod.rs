pub mod inventory;
pub mod lookup;

pub use inventory::{InventoryRecord, QuickViewRow, TableView};
pub use lookup::{LookupError, LookupParams, LookupRequest, LookupResponse, QuickViewResponse};
