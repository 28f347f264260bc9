pub mod io;
pub mod normalize;

pub use io::{RawSvRecord, SvFilter, VcfReader};
pub use normalize::normalize;
