use crate::sync_error::{Result, SyncError};
use rusoto_core::Region;
use std::str::FromStr;

const BUCKET_VAR: &str = "ALBUMSYNC_BUCKET";
const REGION_VAR: &str = "ALBUMSYNC_REGION";
const PAGE_SIZE_VAR: &str = "ALBUMSYNC_PAGE_SIZE";

const DEFAULT_PAGE_SIZE: usize = 20;

/// Startup configuration, resolved once and passed into client constructors.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bucket holding uploaded photo objects.
    pub bucket: String,
    /// Region for the object store and labeling clients.
    pub region: Region,
    /// Photos returned per page when loading an album.
    pub page_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        let bucket = std::env::var(BUCKET_VAR)
            .map_err(|_| SyncError::Config(format!("env {} not set", BUCKET_VAR)))?;

        let region = match std::env::var(REGION_VAR) {
            Ok(name) => Region::from_str(&name)
                .map_err(|err| SyncError::Config(format!("invalid region '{}': {}", name, err)))?,
            Err(_) => Region::UsEast1,
        };

        let page_size = match std::env::var(PAGE_SIZE_VAR) {
            Ok(raw) => raw
                .parse()
                .map_err(|_| SyncError::Config(format!("invalid {}: '{}'", PAGE_SIZE_VAR, raw)))?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        Ok(Config { bucket, region, page_size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bucket_is_a_config_error() {
        std::env::remove_var(BUCKET_VAR);
        assert!(matches!(Config::from_env(), Err(SyncError::Config(_))));
    }
}
