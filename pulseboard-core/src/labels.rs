//! Fixed action-label lookup tables.
//!
//! Plain immutable mappings with documented fallbacks: unmapped labels
//! pass through as their own description and render gray.

/// Default color for unmapped action labels (gray).
pub const DEFAULT_ACTION_COLOR: &str = "#6b7280";

/// Friendly description for an action label. Case-insensitive;
/// unmapped labels pass through unchanged.
pub fn action_description(action: &str) -> &str {
    match action.to_ascii_uppercase().as_str() {
        "LISTIN" => "Item Added",
        "LISTOUT" => "Item Removed",
        "LISTUPDATE" => "Item Name Changed",
        "LISTSTORE" => "Item Store Updated",
        "CHECKED" => "Item Checked",
        "UNCHECKED" => "Item Unchecked",
        _ => action,
    }
}

/// Chart color for an action label. Case-insensitive; unmapped labels
/// get the default gray.
pub fn action_color(action: &str) -> &'static str {
    match action.to_ascii_uppercase().as_str() {
        "LISTIN" => "#10b981",
        "LISTOUT" => "#ef4444",
        "LISTUPDATE" => "#3b82f6",
        "LISTSTORE" => "#8b5cf6",
        "CHECKED" => "#f59e0b",
        "UNCHECKED" => "#6b7280",
        _ => DEFAULT_ACTION_COLOR,
    }
}
