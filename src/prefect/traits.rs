//! Common traits for Prefect API payloads

use uuid::Uuid;

/// Common trait for API objects that carry an ID and a human-readable name
///
/// Used by adapters that accept either identifier (data sources, imports).
pub trait ApiResource {
    /// Get the resource ID
    fn id(&self) -> Uuid;

    /// Get the human-readable name
    fn name(&self) -> &str;

    /// Check if the resource matches by name or ID
    fn matches(&self, input: &str) -> bool {
        self.name() == input || self.id().to_string() == input
    }
}

/// Find the single resource matching `input` by ID or name
pub fn find_match<'a, T: ApiResource>(items: &'a [T], input: &str) -> Option<&'a T> {
    items.iter().find(|item| item.matches(input))
}
