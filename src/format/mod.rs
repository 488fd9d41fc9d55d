/// MPEG transport stream tables
pub mod ts;
