use crate::check::{Check, CheckInfo, Finding, Severity, ValidationContext};

/// PW003: long-running services that neither publish nor expose a port.
///
/// Services with `restart: "no"` are treated as one-shot jobs and skipped.
pub struct MissingPorts;

impl MissingPorts {
    pub const INFO: CheckInfo = CheckInfo {
        code: "PW003",
        name: "Missing Port Configuration",
        description: "Check for services without ports or expose configuration",
        severity: Severity::Warning,
        category: "networking",
    };
}

impl Check for MissingPorts {
    fn info(&self) -> &CheckInfo {
        &Self::INFO
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Vec<Finding> {
        ctx.services()
            .filter(|(_, service)| !service.is_one_shot())
            .filter(|(_, service)| service.ports.is_empty() && service.expose.is_empty())
            .map(|(name, _)| {
                Finding::for_service(name, "ports", "Service does not expose any ports")
                    .with_suggestion(
                        "Add ports or expose configuration to make the service reachable. \
                         If the service is not expected to listen on a port, this warning can be ignored.",
                    )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Scope;
    use portway_compose::{ApplicationGraph, PortMapping, Service};

    fn run(graph: &ApplicationGraph) -> Vec<Finding> {
        MissingPorts.evaluate(&ValidationContext::new(graph, &Scope::Global))
    }

    #[test]
    fn test_service_without_ports_is_flagged() {
        let graph = ApplicationGraph::new("demo").with_service(Service::new("web").restart("always"));

        let findings = run(&graph);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].field, "services.web.ports");
        assert!(findings[0].suggestion.is_some());
    }

    #[test]
    fn test_one_shot_jobs_are_skipped() {
        let graph = ApplicationGraph::new("demo").with_service(Service::new("migrate").restart("no"));
        assert!(run(&graph).is_empty());
    }

    #[test]
    fn test_expose_or_ports_satisfy_the_check() {
        let graph = ApplicationGraph::new("demo")
            .with_service(Service::new("api").expose("3000"))
            .with_service(Service::new("web").port(PortMapping::target("80").published("8080")));
        assert!(run(&graph).is_empty());
    }
}
