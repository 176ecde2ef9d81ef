// Market data module entrypoint
pub mod adapters;   // generic adapter driver + per-exchange mapping rules
pub mod error;      // adapter/source error taxonomy
pub mod exchange;   // supported exchanges
pub mod executor;   // routes queries to live adapters
pub mod normaliser; // wire strings/timestamps -> canonical units
pub mod source;     // network boundary (REST + fixtures)
