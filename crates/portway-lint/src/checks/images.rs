use crate::check::{Check, CheckInfo, Finding, Severity, ValidationContext};

/// PW006: images referenced without a tag or digest.
///
/// Services with a build section are skipped; their image name is the
/// build output, not a pull reference. So are empty images, which usually
/// come from an unset variable.
pub struct ImageVersionPinned;

impl ImageVersionPinned {
    pub const INFO: CheckInfo = CheckInfo {
        code: "PW006",
        name: "Image Version Not Pinned",
        description: "Check that images reference an explicit tag or digest",
        severity: Severity::Warning,
        category: "images",
    };
}

impl Check for ImageVersionPinned {
    fn info(&self) -> &CheckInfo {
        &Self::INFO
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Vec<Finding> {
        ctx.services()
            .filter(|(_, service)| service.build.is_none())
            .filter_map(|(name, service)| {
                let image = service.image.as_deref().filter(|image| !image.is_empty())?;
                if image.contains(':') {
                    return None;
                }
                Some(
                    Finding::for_service(
                        name,
                        "image",
                        format!("Image \"{}\" does not specify a version", image),
                    )
                    .with_suggestion(format!(
                        "Pin a tag or digest, e.g. \"{}:<version>\"",
                        image
                    )),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Scope;
    use portway_compose::{ApplicationGraph, Service};

    fn run(service: Service) -> Vec<Finding> {
        let graph = ApplicationGraph::new("demo").with_service(service);
        ImageVersionPinned.evaluate(&ValidationContext::new(&graph, &Scope::Global))
    }

    #[test]
    fn test_untagged_image_is_flagged() {
        let findings = run(Service::new("web").image("nginx"));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "services.web.image");
    }

    #[test]
    fn test_tagged_or_digested_image_passes() {
        assert!(run(Service::new("web").image("nginx:1.25")).is_empty());
        assert!(run(Service::new("web").image("nginx@sha256:0123abcd")).is_empty());
    }

    #[test]
    fn test_build_section_skips_check() {
        assert!(run(Service::new("api").image("acme/api").build("./api")).is_empty());
        assert!(run(Service::new("worker")).is_empty());
    }

    #[test]
    fn test_empty_image_is_not_flagged() {
        assert!(run(Service::new("web").image("")).is_empty());
    }
}
