use crate::check::{Check, CheckInfo, Finding, Severity, ValidationContext};
use portway_compose::MountType;

/// PW004: mounts other than named or anonymous volumes.
///
/// The platform has no access to host paths, so bind mounts and the other
/// mount types cannot be honoured. One issue is raised per offending mount.
pub struct UnsupportedVolumeType;

impl UnsupportedVolumeType {
    pub const INFO: CheckInfo = CheckInfo {
        code: "PW004",
        name: "Unsupported Volume Type",
        description: "Only volumes of type 'volume' are supported; bind mounts and other types are rejected",
        severity: Severity::Error,
        category: "storage",
    };
}

impl Check for UnsupportedVolumeType {
    fn info(&self) -> &CheckInfo {
        &Self::INFO
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for (name, service) in ctx.services() {
            for mount in service.volumes.iter().filter(|m| m.kind != MountType::Volume) {
                findings.push(
                    Finding::for_service(
                        name,
                        "volumes",
                        format!(
                            "Only volume type is allowed, found {} volume type for {}",
                            mount.kind, mount.target
                        ),
                    )
                    .with_suggestion("Use a named volume, or include the content in the image"),
                );
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Scope;
    use portway_compose::{ApplicationGraph, Service, VolumeMount};

    #[test]
    fn test_one_issue_per_offending_mount() {
        let tmpfs = VolumeMount {
            kind: MountType::Tmpfs,
            source: None,
            target: "/tmp".to_string(),
            read_only: false,
        };
        let graph = ApplicationGraph::new("demo").with_service(
            Service::new("web")
                .volume(VolumeMount::named("assets", "/srv/assets"))
                .volume(VolumeMount::bind("./conf", "/etc/nginx/conf.d"))
                .volume(tmpfs),
        );

        let findings = UnsupportedVolumeType.evaluate(&ValidationContext::new(&graph, &Scope::Global));

        assert_eq!(findings.len(), 2);
        assert_eq!(
            findings[0].message,
            "Only volume type is allowed, found bind volume type for /etc/nginx/conf.d"
        );
        assert!(findings[1].message.contains("found tmpfs volume type"));
        assert!(findings.iter().all(|f| f.field == "services.web.volumes"));
    }
}
