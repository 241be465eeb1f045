//! Shared helpers for integration tests.

use std::env;
use std::error::Error;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

/// Registry of remote reference brain-imaging datasets.
///
/// Archives are downloaded on first use and unpacked into a cache directory,
/// `$BRAINSTACK_TEST_DATA_DIR` or a directory under the system temp dir.
/// Only the `#[ignore]`d smoke tests touch the network.
pub struct TestDataRegistry {
    base_url: String,
    cache_dir: PathBuf,
}

impl TestDataRegistry {
    pub fn new() -> TestDataRegistry {
        let cache_dir = env::var_os("BRAINSTACK_TEST_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("brainstack-test-data"));
        TestDataRegistry {
            base_url: "https://gin.g-node.org/BrainGlobe/test-data/raw/master".to_string(),
            cache_dir,
        }
    }

    /// Fetch a zip archive from the registry and unpack it into the cache.
    ///
    /// Returns the path of the unpacked directory; a previously fetched
    /// archive is reused without touching the network.
    pub fn fetch_unzip(&self, name: &str) -> Result<PathBuf, Box<dyn Error>> {
        let unpacked = self.cache_dir.join(name.trim_end_matches(".zip"));
        if unpacked.exists() {
            return Ok(unpacked);
        }
        fs::create_dir_all(&self.cache_dir)?;

        let url = format!("{}/{}", self.base_url, name);
        let bytes = reqwest::blocking::get(url.as_str())?
            .error_for_status()?
            .bytes()?;
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_ref()))?;
        archive.extract(&self.cache_dir)?;

        if !unpacked.exists() {
            return Err(format!("archive {} did not unpack to {:?}", name, unpacked).into());
        }
        Ok(unpacked)
    }
}
