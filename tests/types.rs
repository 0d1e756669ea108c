// ABOUTME: Integration tests for image references.
// ABOUTME: Parsing, accessors and display.

use hubsync::types::*;

mod image_reference_tests {
    use super::*;

    #[test]
    fn parse_simple_name() {
        let img = ImageReference::parse("nginx").unwrap();
        assert_eq!(img.name(), "nginx");
        assert_eq!(img.tag(), DEFAULT_TAG);
        assert!(img.repository().is_empty());
        assert_eq!(img.path(), "nginx");
    }

    #[test]
    fn parse_name_with_tag() {
        let img = ImageReference::parse("nginx:1.25").unwrap();
        assert_eq!(img.name(), "nginx");
        assert_eq!(img.tag(), "1.25");
        assert_eq!(img.full_name(), "nginx:1.25");
    }

    #[test]
    fn parse_with_registry_and_namespace() {
        let img = ImageReference::parse("ghcr.io/org/app:v1.2.3").unwrap();
        assert_eq!(img.repository(), "ghcr.io/org");
        assert_eq!(img.name(), "app");
        assert_eq!(img.tag(), "v1.2.3");
        assert_eq!(img.path(), "ghcr.io/org/app");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let img = ImageReference::parse("  redis:7 \n").unwrap();
        assert_eq!(img.full_name(), "redis:7");
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            ImageReference::parse(""),
            Err(ParseImageRefError::Empty)
        ));
    }

    #[test]
    fn display_is_full_name() {
        let img = ImageReference::parse("yugasun/alpine").unwrap();
        assert_eq!(img.to_string(), "yugasun/alpine:latest");
    }

    #[test]
    fn equal_names_compare_equal() {
        assert_eq!(
            ImageReference::parse("nginx").unwrap(),
            ImageReference::parse("nginx:latest").unwrap()
        );
    }
}
