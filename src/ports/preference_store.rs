//! Preference store port - local key-value persistence substrate.
//!
//! Mirrors platform preference storage: synchronous scalar reads and writes
//! under stable string keys. The contract is infallible - implementations
//! absorb and log storage failures rather than surfacing them, consistent
//! with local-preference storage where write failure is treated as fatal or
//! unreachable.

/// Port for durable local scalar storage.
///
/// Reads return `None` for keys never written. Writes replace the previous
/// value. Implementations must be safe for concurrent use; last writer wins.
pub trait PreferenceStore: Send + Sync {
    /// Read a boolean value.
    fn get_bool(&self, key: &str) -> Option<bool>;

    /// Write a boolean value.
    fn set_bool(&self, key: &str, value: bool);

    /// Read a string value.
    fn get_string(&self, key: &str) -> Option<String>;

    /// Write a string value.
    fn set_string(&self, key: &str, value: &str);

    /// Read an integer value.
    fn get_int(&self, key: &str) -> Option<i64>;

    /// Write an integer value.
    fn set_int(&self, key: &str, value: i64);

    /// Remove a key of any type. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that the trait is object-safe.
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn PreferenceStore) {}
}
