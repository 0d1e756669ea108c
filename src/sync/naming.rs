// ABOUTME: Turns a raw `hubsync` entry into its (source, target) image pair.
// ABOUTME: Handles the `$` custom-name marker and namespace/repository qualification.

use crate::types::ImageReference;

const CUSTOM_NAME_MARKER: char = '$';

/// Where mirrored images land.
#[derive(Debug, Clone, Copy)]
pub struct TargetLocation<'a> {
    /// Registry host/path prefix; empty means Docker Hub.
    pub repository: &'a str,
    pub namespace: &'a str,
}

/// Derive the source and target references for one raw entry.
///
/// Rules, in order:
/// - `base$custom`: `base` is the source, `custom` the requested target name.
///   Only the first two `$`-separated parts are looked at.
/// - A source without a tag gets `:latest`; a registry port is not a tag.
/// - With a repository: the target is `repository/namespace/<last path
///   segment>` of the custom name (tagged with the source tag when it has
///   none) or of the source.
/// - Without a repository:
///   - a custom name that differs from the source's own image name becomes
///     `namespace/<last segment of custom>`;
///   - an entry containing `:v` with a marker keeps the source unchanged;
///   - a custom name equal to the source's image name keeps the whole
///     source path, `/` flattened to `.`, under `namespace/`;
///   - anything else is `namespace/<last segment>` unless the source already
///     starts with `namespace/`.
///
/// Never fails: empty entries are filtered out before this point.
pub fn generate_references(
    raw: &str,
    location: TargetLocation<'_>,
) -> (ImageReference, ImageReference) {
    let mut parts = raw.split(CUSTOM_NAME_MARKER);
    let base = parts.next().unwrap_or(raw);
    let custom_name = parts.next();
    let has_marker = custom_name.is_some();
    let custom_name = custom_name.unwrap_or_default();

    // A registry port is not a tag: `localhost:5000/app` still gets `:latest`.
    let source_ref = ImageReference::from_full_name(base);
    let source = source_ref.full_name().to_string();
    let source_tag = source_ref.tag();

    // Deliberately narrow: any `:v` counts, not just semantic versions.
    let is_tagged_with_version = raw.contains(":v") && has_marker;

    let custom_target = (!custom_name.is_empty()).then(|| {
        if custom_name.contains(':') {
            custom_name.to_string()
        } else {
            format!("{custom_name}:{source_tag}")
        }
    });

    let target = if !location.repository.is_empty() {
        let target_base = custom_target.as_deref().unwrap_or(&source);
        format!(
            "{}/{}/{}",
            location.repository,
            location.namespace,
            last_segment(target_base)
        )
    } else {
        let renames = custom_name != source_ref.name();

        match custom_target {
            Some(custom) if renames => qualify_with_namespace(&custom, location.namespace),
            _ if is_tagged_with_version => source.clone(),
            Some(_) => format!("{}/{}", location.namespace, source.replace('/', ".")),
            None => qualify_with_namespace(&source, location.namespace),
        }
    };

    (source_ref, ImageReference::from_full_name(&target))
}

fn qualify_with_namespace(target: &str, namespace: &str) -> String {
    if target.starts_with(&format!("{namespace}/")) {
        target.to_string()
    } else {
        format!("{namespace}/{}", last_segment(target))
    }
}

fn last_segment(reference: &str) -> &str {
    reference
        .rsplit_once('/')
        .map(|(_, name)| name)
        .unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUB: TargetLocation<'static> = TargetLocation {
        repository: "",
        namespace: "yugasun",
    };

    const PRIVATE: TargetLocation<'static> = TargetLocation {
        repository: "registry.example.com",
        namespace: "yugasun",
    };

    fn names(raw: &str, location: TargetLocation<'_>) -> (String, String) {
        let (source, target) = generate_references(raw, location);
        (source.full_name().to_string(), target.full_name().to_string())
    }

    #[test]
    fn plain_tagged_image_goes_under_namespace() {
        assert_eq!(
            names("nginx:1.19", HUB),
            ("nginx:1.19".into(), "yugasun/nginx:1.19".into())
        );
    }

    #[test]
    fn untagged_image_defaults_to_latest() {
        assert_eq!(
            names("nginx", HUB),
            ("nginx:latest".into(), "yugasun/nginx:latest".into())
        );
    }

    #[test]
    fn custom_marker_repeating_the_name_flattens_source_path() {
        assert_eq!(
            names("yugasun/alpine$alpine", HUB),
            (
                "yugasun/alpine:latest".into(),
                "yugasun/yugasun.alpine:latest".into()
            )
        );
    }

    #[test]
    fn version_tag_with_marker_keeps_source() {
        assert_eq!(
            names("yugasun/alpine:v1$alpine", HUB),
            ("yugasun/alpine:v1".into(), "yugasun/alpine:v1".into())
        );
    }

    #[test]
    fn version_tag_check_matches_any_colon_v() {
        // ":various" trips the version heuristic as well.
        assert_eq!(
            names("library/foo:various$foo", HUB),
            ("library/foo:various".into(), "library/foo:various".into())
        );
    }

    #[test]
    fn custom_name_renames_target_with_source_tag() {
        assert_eq!(
            names("ubuntu:22.04$myubuntu", HUB),
            ("ubuntu:22.04".into(), "yugasun/myubuntu:22.04".into())
        );
    }

    #[test]
    fn custom_name_with_own_tag_keeps_it() {
        assert_eq!(
            names("nginx:1.25$web:stable", HUB),
            ("nginx:1.25".into(), "yugasun/web:stable".into())
        );
    }

    #[test]
    fn only_first_two_marker_parts_matter() {
        assert_eq!(
            names("redis:7$cache$ignored", HUB),
            ("redis:7".into(), "yugasun/cache:7".into())
        );
    }

    #[test]
    fn empty_custom_name_behaves_like_no_marker() {
        assert_eq!(
            names("nginx$", HUB),
            ("nginx:latest".into(), "yugasun/nginx:latest".into())
        );
    }

    #[test]
    fn source_path_is_dropped_under_default_namespace() {
        assert_eq!(
            names("k8s.gcr.io/kube-apiserver:v1.23.0", HUB),
            (
                "k8s.gcr.io/kube-apiserver:v1.23.0".into(),
                "yugasun/kube-apiserver:v1.23.0".into()
            )
        );
    }

    #[test]
    fn source_already_in_namespace_is_not_reprefixed() {
        assert_eq!(
            names("yugasun/tools/curl:8", HUB),
            ("yugasun/tools/curl:8".into(), "yugasun/tools/curl:8".into())
        );
    }

    #[test]
    fn repository_qualifies_target() {
        assert_eq!(
            names("nginx:1.19", PRIVATE),
            (
                "nginx:1.19".into(),
                "registry.example.com/yugasun/nginx:1.19".into()
            )
        );
    }

    #[test]
    fn repository_with_marker_uses_custom_name() {
        assert_eq!(
            names("yugasun/alpine$alpine", PRIVATE),
            (
                "yugasun/alpine:latest".into(),
                "registry.example.com/yugasun/alpine:latest".into()
            )
        );
        assert_eq!(
            names("nginx:1.25$team/web", PRIVATE),
            (
                "nginx:1.25".into(),
                "registry.example.com/yugasun/web:1.25".into()
            )
        );
    }

    #[test]
    fn registry_port_is_not_taken_for_a_tag() {
        assert_eq!(
            names("localhost:5000/app", HUB),
            ("localhost:5000/app:latest".into(), "yugasun/app:latest".into())
        );
        assert_eq!(
            names("localhost:5000/app", PRIVATE),
            (
                "localhost:5000/app:latest".into(),
                "registry.example.com/yugasun/app:latest".into()
            )
        );
    }

    #[test]
    fn custom_name_survives_a_registry_port() {
        assert_eq!(
            names("localhost:5000/app$web", HUB),
            ("localhost:5000/app:latest".into(), "yugasun/web:latest".into())
        );
        assert_eq!(
            names("localhost:5000/app:2.1$web", PRIVATE),
            (
                "localhost:5000/app:2.1".into(),
                "registry.example.com/yugasun/web:2.1".into()
            )
        );
    }

    #[test]
    fn references_are_split_into_parts() {
        let (source, target) = generate_references("yugasun/alpine:v1$alpine", HUB);
        assert_eq!(source.repository(), "yugasun");
        assert_eq!(source.name(), "alpine");
        assert_eq!(source.tag(), "v1");
        assert_eq!(target.tag(), "v1");

        let (_, target) = generate_references("nginx:1.19", PRIVATE);
        assert_eq!(target.repository(), "registry.example.com/yugasun");
        assert_eq!(target.name(), "nginx");
        assert_eq!(target.tag(), "1.19");
    }
}
