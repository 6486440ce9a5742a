use sha2::{Digest, Sha256};

const HASH_LEN: usize = 8;
const MAX_HUMAN_LEN: usize = 240;

/// Stable template id for the construct at `path` (outermost first).
///
/// Non-alphanumeric characters are dropped from the readable part, so a
/// hash of the full path is appended to keep `DB lib` and `DBlib` apart.
pub fn logical_id(path: &[&str]) -> String {
    let human: String = path
        .iter()
        .flat_map(|component| component.chars())
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_HUMAN_LEN)
        .collect();
    format!("{human}{}", path_hash(path))
}

/// Content address of a source directory reference.
pub fn asset_id(source_directory: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_directory.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn path_hash(path: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.join("/").as_bytes());
    let digest = format!("{:X}", hasher.finalize());
    digest[..HASH_LEN].to_string()
}
