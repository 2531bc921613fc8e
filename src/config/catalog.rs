//! Catalog storage driver configuration.

use super::defaults::default_catalog_path;
use serde::{Deserialize, Serialize};

/// Where the catalog's persisted JSON blob (`{media, questions, options, sets}`,
/// see §6) is loaded from. The driver is a name only: question authoring and
/// the persistent store itself are external collaborators (§1); the engine
/// just needs bytes at startup.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum CatalogConfig {
    Filesystem {
        #[serde(default = "default_catalog_path")]
        path: String,
    },
    S3 {
        bucket: String,
        key: String,
    },
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: default_catalog_path(),
        }
    }
}
