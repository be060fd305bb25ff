//! Data providers and result sinks for salou.
//!
//! File-backed implementations read the tables the collectors produce on
//! disk; in-memory implementations back tests and dry runs.

pub mod fundamentals;
pub mod prices;
pub mod sink;

mod columns;

pub use fundamentals::{CsvFundamentalsProvider, MemoryFundamentals};
pub use prices::{CsvPriceProvider, MemoryPriceProvider};
pub use sink::{CsvResultSink, MemorySink};
