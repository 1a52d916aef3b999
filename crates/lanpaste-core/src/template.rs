//! Placeholder substitution for the served HTML page.
//!
//! This is a flat string replacement, not a templating engine: exactly two
//! tokens are recognised and there are no loops or conditionals.

/// Token replaced with the host the page should point forms at.
pub const HOST_PLACEHOLDER: &str = "{{HOST}}";

/// Token replaced with the listener's port.
pub const PORT_PLACEHOLDER: &str = "{{PORT}}";

/// Replaces every `{{HOST}}` and `{{PORT}}` in `template`.
///
/// # Example
///
/// ```rust
/// use lanpaste_core::substitute_placeholders;
///
/// let html = substitute_placeholders("http://{{HOST}}:{{PORT}}/", "10.0.0.2", 2234);
/// assert_eq!(html, "http://10.0.0.2:2234/");
/// ```
pub fn substitute_placeholders(template: &str, host: &str, port: u16) -> String {
    template
        .replace(HOST_PLACEHOLDER, host)
        .replace(PORT_PLACEHOLDER, &port.to_string())
}
