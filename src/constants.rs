// Application Constants
// Centralized constants to avoid magic numbers

/// Default server configuration
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 4410;

/// Dataset loading defaults
pub const DEFAULT_DATASET_SOURCE: &str = "warehouse_data.json";
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOAD_RETRIES: u32 = 1;

/// Default timezone for response timestamps
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Rate limiting configuration
pub const RELOAD_RATE_LIMIT_PER_MINUTE: u32 = 5;

/// Search query limits
pub const MAX_SEARCH_QUERY_LENGTH: usize = 100;

/// Record field names, case-sensitive as they appear in the dataset file
pub const FIELD_MATERIAL_ID: &str = "MATERIAL_ID";
pub const FIELD_MATERIAL_DESCRIPTION: &str = "MATERIAL_DESCRIPTION";
pub const FIELD_ZONE: &str = "ZONE";
pub const FIELD_STORAGE_BIN: &str = "STORAGE_BIN";
pub const FIELD_BATCH: &str = "BATCH";
pub const FIELD_VENDOR_NAME: &str = "VENDOR_NAME";
pub const FIELD_BARCODE_NUMBER: &str = "BARCODE_NUMBER";

/// Column order of the full result table
pub const TABLE_COLUMNS: [&str; 7] = [
    FIELD_MATERIAL_ID,
    FIELD_MATERIAL_DESCRIPTION,
    FIELD_ZONE,
    FIELD_STORAGE_BIN,
    FIELD_BATCH,
    FIELD_VENDOR_NAME,
    FIELD_BARCODE_NUMBER,
];

/// API response messages
pub const MSG_EMPTY_QUERY: &str = "Scan or enter GTIN / Barcode to search.";
pub const MSG_NOT_FOUND: &str = "No record found.";
