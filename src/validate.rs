// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Sanity checks for raw catalog entries
//!
//! These run on catalog entries before assembly; the assembler itself
//! never rejects anything.

use crate::types::ServiceFragment;
use serde::Serialize;
use std::collections::HashSet;

/// Outcome of validating one catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Catalog id of the entry
    pub tool_id: String,
    /// Problems that make the entry unusable
    pub errors: Vec<String>,
    /// Problems worth fixing that do not break assembly
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True when no errors were found
    #[must_use]
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a single catalog entry
#[must_use]
pub fn validate_tool(tool: &ServiceFragment) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if tool.id.trim().is_empty() {
        errors.push("id is empty".to_string());
    }
    if tool.name.trim().is_empty() {
        errors.push("name is empty".to_string());
    }
    if tool.description.trim().is_empty() {
        warnings.push("description is empty".to_string());
    }

    if tool.compose.trim().is_empty() {
        errors.push("compose body is empty".to_string());
    } else {
        check_compose(&tool.compose, &mut errors);
    }

    ValidationReport {
        tool_id: tool.id.clone(),
        errors,
        warnings,
    }
}

fn check_compose(compose: &str, errors: &mut Vec<String>) {
    let mut lines = compose
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty() && !l.trim_start().starts_with('#'));

    if lines.next().map(|(_, l)| l.trim_end()) != Some("services:") {
        errors.push("first line must be 'services:'".to_string());
    }

    let mut service_indent = None;
    let mut services = Vec::new();
    let mut has_image = false;

    for (idx, line) in lines {
        let content = line.trim_start();
        let leading = &line[..line.len() - content.len()];
        if leading.contains('\t') {
            errors.push(format!("line {}: tab indentation", idx + 1));
            continue;
        }

        let indent = leading.len();
        if indent % 2 != 0 {
            errors.push(format!("line {}: indentation of {} is not a multiple of 2", idx + 1, indent));
        }
        if indent == 0 {
            errors.push(format!("line {}: unexpected top-level key", idx + 1));
            continue;
        }

        if *service_indent.get_or_insert(indent) == indent {
            services.push(content.trim_end().trim_end_matches(':').to_string());
        } else if content.starts_with("image:") {
            has_image = true;
        }
    }

    match services.len() {
        0 => errors.push("no service declared".to_string()),
        1 => {}
        n => errors.push(format!("{n} services declared ({}), expected one", services.join(", "))),
    }
    if !has_image {
        errors.push("missing 'image:' line".to_string());
    }
}

/// Validate every entry, flagging ids that appear more than once
#[must_use]
pub fn validate_catalog(tools: &[ServiceFragment]) -> Vec<ValidationReport> {
    let mut seen = HashSet::new();
    tools
        .iter()
        .map(|tool| {
            let mut report = validate_tool(tool);
            if !seen.insert(tool.id.as_str()) {
                report.errors.push(format!("duplicate id '{}'", tool.id));
            }
            report
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(compose: &str) -> ServiceFragment {
        ServiceFragment::new("web", "Web", "A web server", compose)
    }

    #[test]
    fn test_valid_tool_passes() {
        let report = validate_tool(&tool("services:\n  web:\n    image: nginx\n    ports:\n      - 80:80\n"));
        assert!(report.passed(), "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_root_and_image() {
        let report = validate_tool(&tool("  web:\n    ports:\n      - 80:80\n"));
        assert!(!report.passed());
        assert!(report.errors.iter().any(|e| e.contains("services:")));
        assert!(report.errors.iter().any(|e| e.contains("image:")));
    }

    #[test]
    fn test_two_services_rejected() {
        let report = validate_tool(&tool("services:\n  a:\n    image: x\n  b:\n    image: y\n"));
        assert!(report.errors.iter().any(|e| e.contains("2 services declared (a, b)")));
    }

    #[test]
    fn test_indentation_rules() {
        let report = validate_tool(&tool("services:\n  web:\n     image: nginx\n\t  restart: always\n"));
        assert!(report.errors.iter().any(|e| e.contains("line 3") && e.contains("multiple of 2")));
        assert!(report.errors.iter().any(|e| e.contains("line 4: tab")));
    }

    #[test]
    fn test_empty_fields() {
        let report = validate_tool(&ServiceFragment::new("", "", "", ""));
        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.warnings, vec!["description is empty"]);
    }

    #[test]
    fn test_duplicate_ids() {
        let entry = tool("services:\n  web:\n    image: nginx\n");
        let reports = validate_catalog(&[entry.clone(), entry]);
        assert!(reports[0].passed());
        assert!(!reports[1].passed());
    }
}
