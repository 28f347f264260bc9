use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{PseudoError, Result};

/// Open a plain or gzipped text file.
///
/// `.gz` files go through `MultiGzDecoder`, so BGZF (bgzip) input works too.
pub fn open_bufread(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| PseudoError::io(e, path))?;

    let is_gz = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    if is_gz {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
