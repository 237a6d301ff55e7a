//! Normalized application graph
//!
//! This is the shape every consumer sees after loading. Short and long compose
//! syntaxes have already been folded into a single representation here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A multi-service application, keyed by compose service key.
///
/// Services live in a `BTreeMap` so that every traversal is in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationGraph {
    pub name: String,
    pub services: BTreeMap<String, Service>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
}

impl ApplicationGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a service under its own name, replacing any previous definition.
    pub fn with_service(mut self, service: Service) -> Self {
        self.services.insert(service.name.clone(), service);
        self
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn services_with_build(&self) -> impl Iterator<Item = &Service> {
        self.services.values().filter(|s| s.build.is_some())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildConfig>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub privileged: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortMapping>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expose: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeMount>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn build(mut self, context: impl Into<String>) -> Self {
        self.build = Some(BuildConfig {
            context: context.into(),
            dockerfile: None,
        });
        self
    }

    pub fn privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    pub fn cap_add<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cap_add = caps.into_iter().map(Into::into).collect();
        self
    }

    pub fn port(mut self, port: PortMapping) -> Self {
        self.ports.push(port);
        self
    }

    pub fn expose(mut self, port: impl Into<String>) -> Self {
        self.expose.push(port.into());
        self
    }

    pub fn restart(mut self, policy: impl Into<String>) -> Self {
        self.restart = Some(policy.into());
        self
    }

    pub fn volume(mut self, mount: VolumeMount) -> Self {
        self.volumes.push(mount);
        self
    }

    /// True when the restart policy is explicitly `no`, the marker for one-shot jobs.
    pub fn is_one_shot(&self) -> bool {
        self.restart.as_deref() == Some("no")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl PortMapping {
    pub fn target(target: impl Into<String>) -> Self {
        Self {
            host_ip: None,
            published: None,
            target: target.into(),
            protocol: None,
        }
    }

    pub fn published(mut self, published: impl Into<String>) -> Self {
        self.published = Some(published.into());
        self
    }
}

/// Mount kinds as named by the compose `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MountType {
    Volume,
    Bind,
    Tmpfs,
    Npipe,
    Cluster,
    Other(String),
}

impl MountType {
    pub fn as_str(&self) -> &str {
        match self {
            MountType::Volume => "volume",
            MountType::Bind => "bind",
            MountType::Tmpfs => "tmpfs",
            MountType::Npipe => "npipe",
            MountType::Cluster => "cluster",
            MountType::Other(other) => other,
        }
    }
}

impl From<String> for MountType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "volume" => MountType::Volume,
            "bind" => MountType::Bind,
            "tmpfs" => MountType::Tmpfs,
            "npipe" => MountType::Npipe,
            "cluster" => MountType::Cluster,
            _ => MountType::Other(value),
        }
    }
}

impl From<MountType> for String {
    fn from(value: MountType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for MountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    #[serde(rename = "type")]
    pub kind: MountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub target: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

impl VolumeMount {
    pub fn named(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: MountType::Volume,
            source: Some(source.into()),
            target: target.into(),
            read_only: false,
        }
    }

    pub fn bind(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: MountType::Bind,
            source: Some(source.into()),
            target: target.into(),
            read_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_iterate_in_key_order() {
        let graph = ApplicationGraph::new("demo")
            .with_service(Service::new("worker"))
            .with_service(Service::new("api"))
            .with_service(Service::new("db"));

        let names: Vec<_> = graph.service_names().collect();
        assert_eq!(names, vec!["api", "db", "worker"]);
    }

    #[test]
    fn test_one_shot_requires_explicit_no() {
        assert!(Service::new("job").restart("no").is_one_shot());
        assert!(!Service::new("web").restart("always").is_one_shot());
        assert!(!Service::new("web").is_one_shot());
    }

    #[test]
    fn test_mount_type_round_trips_through_strings() {
        assert_eq!(MountType::from("bind".to_string()), MountType::Bind);
        assert_eq!(
            MountType::from("weird".to_string()),
            MountType::Other("weird".to_string())
        );
        assert_eq!(MountType::Other("weird".to_string()).to_string(), "weird");
    }
}
