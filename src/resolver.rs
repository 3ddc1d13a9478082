// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Host-port conflict resolution
//!
//! The first service (in document order) to claim a host port keeps it.
//! Every later claimant is moved to the lowest port above the contested
//! one that nobody holds yet, including ports handed out earlier in the
//! same pass. Edits are applied to the exact host-port tokens recorded
//! by [`ComposeModel`], so nothing outside those tokens changes.

use crate::model::ComposeModel;
use crate::types::{ConflictReport, PortBinding, PortChange, PortConflict};
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use tracing::{debug, info, warn};

/// Highest port a compose file can actually publish
pub const MAX_PORT: u32 = 65_535;

/// Output of a resolver pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The document with every conflict repaired
    pub document: String,
    /// What changed; `None` when no port was contested
    pub report: Option<ConflictReport>,
}

/// Repair every host port claimed by more than one service.
///
/// Running this on its own output is a no-op that returns no report.
#[must_use]
pub fn resolve(document: &str) -> Resolution {
    let model = ComposeModel::parse(document);
    let bindings: Vec<&PortBinding> = model.bindings().collect();
    let mut claimed: BTreeSet<u32> = bindings.iter().map(|b| b.host_port).collect();

    let mut conflicts = Vec::new();
    let mut edits: Vec<(Range<usize>, u32)> = Vec::new();

    for (port, group) in group_by_port(&bindings) {
        let claimants = distinct_services(&group);
        if claimants.len() < 2 {
            continue;
        }

        let mut changes = Vec::new();
        for service in claimants.iter().skip(1) {
            let Some(new_port) = next_free_port(port, &claimed) else {
                warn!("No free port above {} for {}, leaving it unchanged", port, service);
                continue;
            };
            if new_port > MAX_PORT {
                warn!("{} moved to {}, beyond the valid port range", service, new_port);
            }
            claimed.insert(new_port);

            let moved: Vec<&PortBinding> = group.iter().copied().filter(|b| b.service == *service).collect();
            edits.extend(moved.iter().map(|b| (b.span.clone(), new_port)));
            let change = PortChange {
                service: (*service).to_string(),
                from: port,
                to: new_port,
                lines: moved.iter().map(|b| b.line + 1).collect(),
            };
            info!("Port conflict resolved: {} (line {:?})", change, change.lines);
            changes.push(change);
        }

        conflicts.push(PortConflict {
            port,
            services: claimants.iter().map(|s| (*s).to_string()).collect(),
            changes,
        });
    }

    if conflicts.is_empty() {
        debug!("No port conflicts across {} bindings", bindings.len());
        return Resolution {
            document: document.to_string(),
            report: None,
        };
    }

    let lines_changed = edits.len();
    Resolution {
        document: apply_edits(document, edits),
        report: Some(ConflictReport {
            conflicts,
            lines_changed,
        }),
    }
}

/// Bindings grouped by host port, groups in order of first appearance
fn group_by_port<'a>(bindings: &[&'a PortBinding]) -> Vec<(u32, Vec<&'a PortBinding>)> {
    let mut groups: Vec<(u32, Vec<&PortBinding>)> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();

    for &binding in bindings {
        let slot = *index.entry(binding.host_port).or_insert_with(|| {
            groups.push((binding.host_port, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(binding);
    }

    groups
}

/// Service names in first-appearance order, without repeats
fn distinct_services<'a>(group: &[&'a PortBinding]) -> Vec<&'a str> {
    let mut names: Vec<&str> = Vec::new();
    for &binding in group {
        if !names.contains(&binding.service.as_str()) {
            names.push(&binding.service);
        }
    }
    names
}

/// Lowest port above `port` not yet claimed
fn next_free_port(port: u32, claimed: &BTreeSet<u32>) -> Option<u32> {
    let mut candidate = port.checked_add(1)?;
    while claimed.contains(&candidate) {
        candidate = candidate.checked_add(1)?;
    }
    Some(candidate)
}

/// Apply non-overlapping span replacements in one pass
fn apply_edits(document: &str, mut edits: Vec<(Range<usize>, u32)>) -> String {
    edits.sort_by_key(|(span, _)| span.start);

    let mut out = String::with_capacity(document.len() + edits.len());
    let mut cursor = 0;
    for (span, port) in edits {
        out.push_str(&document[cursor..span.start]);
        out.push_str(&port.to_string());
        cursor = span.end;
    }
    out.push_str(&document[cursor..]);
    out
}
