pub mod builder;
pub mod io;

pub use builder::ExonIndexBuilder;
pub use io::{ExonRecord, ExonTableReader, TableDialect};
