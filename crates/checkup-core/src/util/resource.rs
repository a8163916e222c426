//! Helpers for slash-delimited API resource names.

/// Returns the trailing segment of a resource name.
///
/// `accounts/1/apps/12/operations/123` yields `123`. Nothing else about
/// the structure of the name is assumed.
pub fn resource_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
