// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Minimal structural model of an assembled compose document
//!
//! Only what port resolution needs is modelled: the services declared
//! under each top-level `services:` key, and the `host:container` list
//! items inside each service's subtree together with the byte range of
//! their host-port token.

use crate::types::PortBinding;

/// A declared service and the port bindings found in its subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNode {
    /// Service name as declared
    pub name: String,
    /// Bindings in document order
    pub ports: Vec<PortBinding>,
}

/// Services of a document, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeModel {
    /// Declared services
    pub services: Vec<ServiceNode>,
}

impl ComposeModel {
    /// Build the model in a single pass over the text.
    ///
    /// The service level is the indentation of the first entry under a
    /// `services:` key; a line at that level ending in a bare `name:`
    /// opens a service, and every deeper line belongs to it. Comments and
    /// blank lines never change structure.
    #[must_use]
    pub fn parse(document: &str) -> Self {
        let mut services: Vec<ServiceNode> = Vec::new();
        let mut in_services = false;
        let mut service_indent: Option<usize> = None;
        let mut current: Option<usize> = None;
        let mut offset = 0;

        for (idx, raw) in document.split_inclusive('\n').enumerate() {
            let line_start = offset;
            offset += raw.len();

            let line = raw.trim_end_matches(['\n', '\r']);
            let content = line.trim_start();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }

            let indent = line.len() - content.len();
            if indent == 0 {
                in_services = content.trim_end() == "services:";
                service_indent = None;
                current = None;
                continue;
            }
            if !in_services {
                continue;
            }

            let level = *service_indent.get_or_insert(indent);
            if indent <= level {
                current = if indent == level {
                    service_name(content).map(|name| {
                        services.push(ServiceNode {
                            name: name.to_string(),
                            ports: Vec::new(),
                        });
                        services.len() - 1
                    })
                } else {
                    None
                };
                continue;
            }

            let Some(service) = current.and_then(|i| services.get_mut(i)) else {
                continue;
            };
            if let Some(item) = parse_port_item(line) {
                service.ports.push(PortBinding {
                    host_port: item.host_port,
                    container_port: item.container_port.to_string(),
                    service: service.name.clone(),
                    line: idx,
                    span: line_start + item.host_start..line_start + item.host_start + item.host_len,
                });
            }
        }

        Self { services }
    }

    /// Every binding in document order
    pub fn bindings(&self) -> impl Iterator<Item = &PortBinding> {
        self.services.iter().flat_map(|s| s.ports.iter())
    }

    /// Look up a service by name (first declaration wins)
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceNode> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// `name:` with a name made of compose-legal characters
fn service_name(content: &str) -> Option<&str> {
    let name = content.trim_end().strip_suffix(':')?;
    let legal = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    legal.then_some(name)
}

/// A matched port list item, positions relative to the line
#[derive(Debug, PartialEq, Eq)]
struct PortItem<'a> {
    host_port: u32,
    container_port: &'a str,
    host_start: usize,
    host_len: usize,
}

/// Match `- 8080:80`, `- "8080:80"`, `- '53:53/udp'` and friends.
fn parse_port_item(line: &str) -> Option<PortItem<'_>> {
    let item = line.trim_start().strip_prefix('-')?;
    let value = item.trim_start();
    if value.len() == item.len() {
        return None;
    }
    let mut start = line.len() - value.len();

    let value = value.split_once(" #").map_or(value, |(v, _)| v).trim_end();

    let value = match value.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            start += 1;
            value.get(1..)?.strip_suffix(quote)?
        }
        _ => value,
    };

    let (host, container) = value.split_once(':')?;
    let container_digits = container
        .strip_suffix("/tcp")
        .or_else(|| container.strip_suffix("/udp"))
        .unwrap_or(container);
    if !is_digits(host) || !is_digits(container_digits) {
        return None;
    }

    Some(PortItem {
        host_port: host.parse().ok()?,
        container_port: container,
        host_start: start,
        host_len: host.len(),
    })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
