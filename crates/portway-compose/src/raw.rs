//! Compose syntax as written, before normalization into the graph
//!
//! Fields that accept several shapes stay as `serde_yaml::Value` here and
//! are resolved by the normalizers below, which know which service and field
//! to blame when a shape is wrong.

use crate::error::{ComposeError, Result};
use crate::graph::{BuildConfig, MountType, PortMapping, Service, VolumeMount};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawDocument {
    pub name: Option<String>,
    pub services: Option<BTreeMap<String, Option<RawService>>>,
    pub volumes: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawService {
    pub image: Option<Value>,
    pub build: Option<Value>,
    pub privileged: Option<Value>,
    pub cap_add: Option<Value>,
    pub ports: Option<Value>,
    pub expose: Option<Value>,
    pub restart: Option<Value>,
    pub volumes: Option<Value>,
}

impl RawService {
    pub fn normalize(self, name: &str) -> Result<Service> {
        Ok(Service {
            name: name.to_string(),
            image: self
                .image
                .map(|v| scalar(&v, name, "image"))
                .transpose()?,
            build: self.build.map(|v| build(&v, name)).transpose()?,
            privileged: self
                .privileged
                .map(|v| boolean(&v, name, "privileged"))
                .transpose()?
                .unwrap_or(false),
            cap_add: scalar_list(self.cap_add, name, "cap_add")?,
            ports: sequence(self.ports, name, "ports")?
                .iter()
                .map(|item| port(item, name))
                .collect::<Result<_>>()?,
            expose: scalar_list(self.expose, name, "expose")?,
            restart: self
                .restart
                .map(|v| scalar(&v, name, "restart"))
                .transpose()?,
            volumes: sequence(self.volumes, name, "volumes")?
                .iter()
                .map(|item| volume(item, name))
                .collect::<Result<_>>()?,
        })
    }
}

fn scalar(value: &Value, service: &str, field: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ComposeError::invalid(service, field, "expected a scalar")),
    }
}

fn boolean(value: &Value, service: &str, field: &str) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") || s.is_empty() => Ok(false),
        _ => Err(ComposeError::invalid(service, field, "expected a boolean")),
    }
}

fn sequence(value: Option<Value>, service: &str, field: &str) -> Result<Vec<Value>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => Ok(items),
        Some(_) => Err(ComposeError::invalid(service, field, "expected a list")),
    }
}

fn scalar_list(value: Option<Value>, service: &str, field: &str) -> Result<Vec<String>> {
    sequence(value, service, field)?
        .iter()
        .map(|item| scalar(item, service, field))
        .collect()
}

fn optional_scalar(map: &serde_yaml::Mapping, key: &str, service: &str, field: &str) -> Result<Option<String>> {
    map.get(key)
        .filter(|v| !v.is_null())
        .map(|v| scalar(v, service, field))
        .transpose()
}

fn build(value: &Value, service: &str) -> Result<BuildConfig> {
    match value {
        Value::String(context) => Ok(BuildConfig {
            context: context.clone(),
            dockerfile: None,
        }),
        Value::Mapping(map) => Ok(BuildConfig {
            context: optional_scalar(map, "context", service, "build.context")?
                .unwrap_or_else(|| ".".to_string()),
            dockerfile: optional_scalar(map, "dockerfile", service, "build.dockerfile")?,
        }),
        _ => Err(ComposeError::invalid(
            service,
            "build",
            "expected a path or a mapping",
        )),
    }
}

fn port(value: &Value, service: &str) -> Result<PortMapping> {
    match value {
        Value::Number(n) => Ok(PortMapping::target(n.to_string())),
        Value::String(s) => parse_port(s).ok_or_else(|| {
            ComposeError::invalid(service, "ports", format!("cannot parse port '{}'", s))
        }),
        Value::Mapping(map) => Ok(PortMapping {
            host_ip: optional_scalar(map, "host_ip", service, "ports.host_ip")?,
            published: optional_scalar(map, "published", service, "ports.published")?,
            target: optional_scalar(map, "target", service, "ports.target")?.ok_or_else(|| {
                ComposeError::invalid(service, "ports", "long syntax requires a target")
            })?,
            protocol: optional_scalar(map, "protocol", service, "ports.protocol")?,
        }),
        _ => Err(ComposeError::invalid(service, "ports", "unsupported port entry")),
    }
}

/// Parse `[[host_ip:]published:]target[/protocol]`.
pub(crate) fn parse_port(spec: &str) -> Option<PortMapping> {
    let (address, protocol) = match spec.split_once('/') {
        Some((address, protocol)) => (address, Some(protocol.to_string())),
        None => (spec, None),
    };

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    let parts: Vec<&str> = address.split(':').collect();
    let (host_ip, published, target) = match parts.as_slice() {
        [target] => (None, None, *target),
        [published, target] => (None, non_empty(*published), *target),
        [host_ip, published, target] => (non_empty(*host_ip), non_empty(*published), *target),
        _ => return None,
    };

    if target.is_empty() {
        return None;
    }

    Some(PortMapping {
        host_ip,
        published,
        target: target.to_string(),
        protocol,
    })
}

fn volume(value: &Value, service: &str) -> Result<VolumeMount> {
    match value {
        Value::String(s) => parse_volume(s).ok_or_else(|| {
            ComposeError::invalid(service, "volumes", format!("cannot parse volume '{}'", s))
        }),
        Value::Mapping(map) => {
            let kind = optional_scalar(map, "type", service, "volumes.type")?
                .map(MountType::from)
                .unwrap_or(MountType::Volume);
            let read_only = map
                .get("read_only")
                .map(|v| boolean(v, service, "volumes.read_only"))
                .transpose()?
                .unwrap_or(false);
            Ok(VolumeMount {
                kind,
                source: optional_scalar(map, "source", service, "volumes.source")?,
                target: optional_scalar(map, "target", service, "volumes.target")?.ok_or_else(
                    || ComposeError::invalid(service, "volumes", "long syntax requires a target"),
                )?,
                read_only,
            })
        }
        _ => Err(ComposeError::invalid(service, "volumes", "unsupported volume entry")),
    }
}

/// Parse `[source:]target[:mode]`, inferring bind mounts from path-like sources.
pub(crate) fn parse_volume(spec: &str) -> Option<VolumeMount> {
    let mut parts: Vec<String> = spec.split(':').map(str::to_string).collect();

    // Rejoin a Windows drive letter split off the source ("C:\data:/data").
    if parts.len() >= 3 && is_drive_letter(&parts[0]) {
        let drive = parts.remove(0);
        parts[0] = format!("{}:{}", drive, parts[0]);
    }

    let (source, target, mode) = match parts.as_slice() {
        [target] => (None, target.clone(), None),
        [source, target] => (Some(source.clone()), target.clone(), None),
        [source, target, mode] => (Some(source.clone()), target.clone(), Some(mode.clone())),
        _ => return None,
    };

    if target.is_empty() {
        return None;
    }

    let kind = match source.as_deref() {
        Some(src) if is_path_like(src) => MountType::Bind,
        _ => MountType::Volume,
    };

    let read_only = mode
        .as_deref()
        .is_some_and(|m| m.split(',').any(|flag| flag == "ro"));

    Some(VolumeMount {
        kind,
        source,
        target,
        read_only,
    })
}

fn is_drive_letter(s: &str) -> bool {
    s.len() == 1 && s.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_path_like(source: &str) -> bool {
    source.starts_with('/')
        || source.starts_with('.')
        || source.starts_with('~')
        || source.starts_with('\\')
        || source.get(1..3).is_some_and(|s| s == ":\\" || s == ":/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_port_forms() {
        assert_eq!(parse_port("80").unwrap(), PortMapping::target("80"));
        assert_eq!(
            parse_port("8080:80").unwrap(),
            PortMapping::target("80").published("8080")
        );

        let full = parse_port("127.0.0.1:8080:80/udp").unwrap();
        assert_eq!(full.host_ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(full.published.as_deref(), Some("8080"));
        assert_eq!(full.target, "80");
        assert_eq!(full.protocol.as_deref(), Some("udp"));

        assert!(parse_port("a:b:c:d").is_none());
        assert!(parse_port("8080:").is_none());
    }

    #[test]
    fn test_parse_volume_infers_type() {
        assert_eq!(parse_volume("/var/lib/data").unwrap().kind, MountType::Volume);
        assert_eq!(
            parse_volume("pgdata:/var/lib/postgresql/data").unwrap(),
            VolumeMount::named("pgdata", "/var/lib/postgresql/data")
        );
        assert_eq!(parse_volume("./src:/app").unwrap().kind, MountType::Bind);
        assert_eq!(parse_volume("~/cache:/cache").unwrap().kind, MountType::Bind);

        let ro = parse_volume("/etc/ssl:/etc/ssl:ro").unwrap();
        assert_eq!(ro.kind, MountType::Bind);
        assert!(ro.read_only);
    }

    #[test]
    fn test_parse_volume_windows_drive() {
        let mount = parse_volume("C:\\data:/data").unwrap();
        assert_eq!(mount.kind, MountType::Bind);
        assert_eq!(mount.source.as_deref(), Some("C:\\data"));
        assert_eq!(mount.target, "/data");
    }

    #[test]
    fn test_normalize_rejects_wrong_shapes() {
        let raw = RawService {
            ports: Some(Value::String("80".into())),
            ..Default::default()
        };
        let err = raw.normalize("web").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for services.web.ports: expected a list"
        );
    }
}
