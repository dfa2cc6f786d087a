use crc32fast::Hasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// Generate a stable document ID from a document name using CRC32
pub fn get_document_id(name: &str) -> String {
    let mut buff = String::from(name);
    if !name.starts_with("template://") {
        buff = format!("template://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for element nodes
///
/// IDs are `<seed>-<count>`. The seed is random per generator so that
/// documents opened in different processes never share identifiers, and
/// the counter guarantees uniqueness within one process.
#[derive(Debug)]
pub struct IDGenerator {
    seed: String,
    count: AtomicU64,
}

impl IDGenerator {
    pub fn new() -> Self {
        Self::from_seed(format!("{:08x}", rand::random::<u32>()))
    }

    pub fn from_seed(seed: String) -> Self {
        Self {
            seed,
            count: AtomicU64::new(0),
        }
    }

    /// Generate next sequential ID
    pub fn new_id(&self) -> String {
        let count = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.seed, count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for IDGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide generator used for every new element
pub fn global() -> &'static IDGenerator {
    static GENERATOR: OnceLock<IDGenerator> = OnceLock::new();
    GENERATOR.get_or_init(IDGenerator::new)
}
