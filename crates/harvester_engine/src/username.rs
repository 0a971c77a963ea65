/// Extract the username from a redirect target such as `https://host/u/alice.123/`.
///
/// Takes the last path segment after stripping trailing slashes, then the part
/// before its first `.`. Returns `None` when nothing usable is left.
pub fn username_from_location(location: &str) -> Option<String> {
    let trimmed = location.trim_end_matches('/');
    let segment = trimmed.rsplit('/').next()?;
    let name = segment.split('.').next()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_name_before_id_suffix() {
        assert_eq!(
            username_from_location("https://voz.vn/u/alice.123/").as_deref(),
            Some("alice")
        );
        assert_eq!(username_from_location("/u/bob.7").as_deref(), Some("bob"));
    }

    #[test]
    fn name_without_dot_is_kept_whole() {
        assert_eq!(
            username_from_location("https://voz.vn/u/carol///").as_deref(),
            Some("carol")
        );
    }

    #[test]
    fn structurally_empty_targets_are_unknown() {
        assert_eq!(username_from_location(""), None);
        assert_eq!(username_from_location("/"), None);
        assert_eq!(username_from_location("///"), None);
        assert_eq!(username_from_location("https://voz.vn/u/.5/"), None);
    }
}
