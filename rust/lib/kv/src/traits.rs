use crate::error::KVError;

/// KVStore provides a key-value storage interface with an atomic conditional write.
///
/// Keys follow a namespaced convention: `org:organization:{id}`, `auth:user:{email}`.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair unconditionally.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Write `value` only if the stored value is exactly `expected`.
    ///
    /// `expected = None` means the key must not exist yet. Returns `false`
    /// (and writes nothing) when the stored value differs.
    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, KVError>;

    /// Delete a key, returning the value it held.
    fn delete(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Scan all keys matching a prefix. Returns sorted (key, value) pairs.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}
