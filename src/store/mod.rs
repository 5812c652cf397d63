pub mod disk;

pub use disk::DiskRateTable;

use crate::core::RateError;
use fjall::Keyspace;
use std::path::Path;

/// Opens (or creates) the keyspace holding persisted rates under `path`.
pub fn open_keyspace(path: &Path) -> Result<Keyspace, RateError> {
    std::fs::create_dir_all(path).map_err(|e| {
        RateError::Fetch(format!(
            "cannot create local rate table directory {}: {e}",
            path.display()
        ))
    })?;
    fjall::Config::new(path.join("rates_db"))
        .open()
        .map_err(|e| RateError::Fetch(format!("cannot open local rate table: {e}")))
}
