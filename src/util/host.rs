//! Local host name used as the `host` tag.

use gethostname::gethostname;

/// Returns the local host name, or an empty string if it is not valid UTF-8.
///
/// Resolved once at startup; an empty host tag is left off written points.
pub fn local_hostname() -> String {
    gethostname().into_string().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_hostname_is_stable() {
        assert_eq!(local_hostname(), local_hostname());
    }
}
