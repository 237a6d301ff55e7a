use crate::check::{Check, CheckInfo, Finding, Severity, ValidationContext};

/// Capabilities the target platform refuses to grant.
pub const DANGEROUS_CAPABILITIES: &[&str] = &[
    "SYS_ADMIN",
    "NET_ADMIN",
    "ALL",
    "SYS_MODULE",
    "SYS_RAWIO",
    "SYS_PTRACE",
];

/// PW001: services running in privileged mode.
pub struct PrivilegedMode;

impl PrivilegedMode {
    pub const INFO: CheckInfo = CheckInfo {
        code: "PW001",
        name: "Privileged Mode",
        description: "Check for services running in privileged mode",
        severity: Severity::Warning,
        category: "security",
    };
}

impl Check for PrivilegedMode {
    fn info(&self) -> &CheckInfo {
        &Self::INFO
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Vec<Finding> {
        ctx.services()
            .filter(|(_, service)| service.privileged)
            .map(|(name, _)| {
                Finding::for_service(name, "privileged", "Privileged mode is not supported")
                    .with_suggestion("Remove `privileged: true` and grant only the access the service needs")
            })
            .collect()
    }
}

/// PW002: services adding capabilities from [`DANGEROUS_CAPABILITIES`].
///
/// All offending capabilities of a service are reported in one issue.
pub struct DangerousCapabilities;

impl DangerousCapabilities {
    pub const INFO: CheckInfo = CheckInfo {
        code: "PW002",
        name: "Dangerous Capabilities",
        description: "Check for dangerous Linux capabilities in cap_add",
        severity: Severity::Warning,
        category: "security",
    };
}

fn is_dangerous(capability: &str) -> bool {
    let upper = capability.trim().to_ascii_uppercase();
    let bare = upper.strip_prefix("CAP_").unwrap_or(&upper);
    DANGEROUS_CAPABILITIES.contains(&bare)
}

impl Check for DangerousCapabilities {
    fn info(&self) -> &CheckInfo {
        &Self::INFO
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Vec<Finding> {
        ctx.services()
            .filter_map(|(name, service)| {
                let found: Vec<&str> = service
                    .cap_add
                    .iter()
                    .map(String::as_str)
                    .filter(|cap| is_dangerous(cap))
                    .collect();
                if found.is_empty() {
                    return None;
                }
                Some(
                    Finding::for_service(
                        name,
                        "cap_add",
                        format!(
                            "These capabilities are not supported: {}",
                            found.join(", ")
                        ),
                    )
                    .with_suggestion("Remove them or use a more restrictive alternative"),
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
    use pretty_assertions::assert_eq;

    fn run(check: &dyn Check, graph: &ApplicationGraph) -> Vec<Finding> {
        check.evaluate(&ValidationContext::new(graph, &Scope::Global))
    }

    #[test]
    fn test_privileged_flagged() {
        let graph = ApplicationGraph::new("demo")
            .with_service(Service::new("agent").privileged(true))
            .with_service(Service::new("web"));

        let findings = run(&PrivilegedMode, &graph);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].service, "agent");
        assert_eq!(findings[0].field, "services.agent.privileged");
    }

    #[test]
    fn test_only_denied_capabilities_are_listed() {
        let graph = ApplicationGraph::new("demo")
            .with_service(Service::new("vpn").cap_add(["SYS_ADMIN", "CHOWN"]));

        let findings = run(&DangerousCapabilities, &graph);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "services.vpn.cap_add");
        assert_eq!(
            findings[0].message,
            "These capabilities are not supported: SYS_ADMIN"
        );
    }

    #[test]
    fn test_capabilities_aggregate_per_service_in_declared_order() {
        let graph = ApplicationGraph::new("demo").with_service(
            Service::new("debugger").cap_add(["CAP_SYS_PTRACE", "NET_BIND_SERVICE", "net_admin"]),
        );

        let findings = run(&DangerousCapabilities, &graph);

        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "These capabilities are not supported: CAP_SYS_PTRACE, net_admin"
        );
    }

    #[test]
    fn test_harmless_capabilities_pass() {
        let graph = ApplicationGraph::new("demo")
            .with_service(Service::new("web").cap_add(["CHOWN", "NET_BIND_SERVICE"]));
        assert!(run(&DangerousCapabilities, &graph).is_empty());
    }
}
