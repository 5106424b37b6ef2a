pub mod dataset;
pub mod lookup;
