// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Fragment normalisation and assembly
//!
//! Catalog fragments are authored as standalone documents, each with its
//! own `services:` wrapper and its own indentation. Assembly strips the
//! wrapper, re-derives every line's nesting level from the whitespace and
//! re-emits it at a canonical depth under one shared `services:` root.
//!
//! Nesting is inferred, not parsed: a line one level deeper follows any
//! line ending in a bare `key:`, and a line whose original indentation
//! receded climbs back out by half the recession. Fragments indented in
//! consistent 2-space steps round-trip exactly. Anything else (tabs, odd
//! widths, block scalars, multi-line list items) is best-effort.

use crate::types::{ServiceFragment, Settings};
use tracing::debug;

/// Fixed comment block at the top of every assembled document
pub const HEADER: &str = "\
# Generated by compose-forge
# Shared values live in the accompanying .env file";

/// Document-level key every fragment is re-homed under
pub const ROOT_KEY: &str = "services:";

/// Indentation of a service-name line under the root key
pub const BASE_INDENT: usize = 2;

/// Spaces per nesting level
pub const INDENT_UNIT: usize = 2;

/// Remove the fragment's own top-level `services:` line(s).
///
/// Only unindented lines are removed; an input without one comes back
/// unchanged.
#[must_use]
pub fn strip_root_key(fragment: &str) -> String {
    if !fragment.lines().any(|line| line.trim_end() == ROOT_KEY) {
        return fragment.to_string();
    }
    fragment
        .lines()
        .filter(|line| line.trim_end() != ROOT_KEY)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Re-indent a stripped fragment body to canonical nesting.
///
/// The first non-blank line (the service name) lands at [`BASE_INDENT`];
/// every later line lands at `BASE_INDENT + INDENT_UNIT * level`. Blank
/// lines are passed through untouched.
#[must_use]
pub fn reindent(body: &str) -> String {
    let mut out = Vec::new();
    let mut level = 0usize;
    // (original indentation, opens a block) of the last non-blank line
    let mut previous: Option<(usize, bool)> = None;

    for line in body.lines() {
        let content = line.trim_start();
        if content.is_empty() {
            out.push(line.to_string());
            continue;
        }

        let indent = line.len() - content.len();
        match previous {
            None => level = 0,
            Some((_, true)) => level += 1,
            Some((prev_indent, false)) if indent < prev_indent => {
                level = level.saturating_sub((prev_indent - indent) / INDENT_UNIT);
            }
            Some(_) => {}
        }
        previous = Some((indent, opens_block(content)));

        let width = BASE_INDENT + INDENT_UNIT * level;
        out.push(format!("{:width$}{content}", ""));
    }

    out.join("\n")
}

/// A bare `key:` with nothing after the colon
fn opens_block(content: &str) -> bool {
    let content = content.trim_end();
    content.ends_with(':') && !content.starts_with('#')
}

/// Replace every `${NAME}` whose name is a settings key with its value.
///
/// Unknown names, defaulted forms like `${NAME:-x}` and unterminated
/// placeholders are left as written. Placeholders nested inside a
/// default (`${APP_UID:-${PUID}}`) are still replaced.
#[must_use]
pub fn substitute(body: &str, settings: &Settings) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        if !is_identifier(name) {
            // Keep the `$` and rescan from the brace so inner placeholders match.
            out.push('$');
            rest = &rest[start + 1..];
            continue;
        }

        match settings.lookup(name) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Build one compose document from the selected fragments, in order.
///
/// Fragments whose body is empty once the root key is stripped are
/// skipped. The result depends only on the arguments.
#[must_use]
pub fn assemble(fragments: &[ServiceFragment], settings: &Settings, interpolate: bool) -> String {
    let mut doc = String::from(HEADER);
    doc.push_str("\n\n");
    doc.push_str(ROOT_KEY);
    doc.push('\n');

    for fragment in fragments {
        let body = strip_root_key(&fragment.compose);
        if body.trim().is_empty() {
            debug!("Skipping {}: no service body", fragment.id);
            continue;
        }

        let mut body = reindent(body.trim_matches('\n'));
        if interpolate {
            body = substitute(&body, settings);
        }

        doc.push('\n');
        doc.push_str(&" ".repeat(BASE_INDENT));
        doc.push_str("# ");
        doc.push_str(&annotation(fragment));
        doc.push('\n');
        doc.push_str(&body);
        doc.push('\n');
        debug!("Assembled {} ({} lines)", fragment.id, body.lines().count());
    }

    doc
}

/// The `name - description` comment placed above each service
fn annotation(fragment: &ServiceFragment) -> String {
    let name = fragment.name.trim();
    let description = fragment.description.trim();
    if description.is_empty() {
        name.to_string()
    } else {
        format!("{name} - {description}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SONARR: &str = "services:
  sonarr:
    image: lscr.io/linuxserver/sonarr:latest
    environment:
      - PUID=${PUID}
      - TZ=${TZ}
    ports:
      - 8989:8989
    restart: ${RESTART_POLICY}
";

    #[test]
    fn test_strip_root_key() {
        let body = strip_root_key(SONARR);
        assert!(!body.lines().any(|l| l == "services:"));
        assert!(body.starts_with("  sonarr:"));
    }

    #[test]
    fn test_strip_root_key_without_root() {
        let input = "  web:\n    image: nginx\n";
        assert_eq!(strip_root_key(input), input);
    }

    #[test]
    fn test_strip_root_key_keeps_nested_services() {
        let input = "services:\n  app:\n    labels:\n      services:\n        - x";
        assert_eq!(
            strip_root_key(input),
            "  app:\n    labels:\n      services:\n        - x"
        );
    }

    #[test]
    fn test_reindent_ports_block() {
        let out = reindent("    sonarr:\n        ports:\n          - 8989:8989");
        assert_eq!(out, "  sonarr:\n    ports:\n      - 8989:8989");
    }

    #[test]
    fn test_reindent_climbs_back_out() {
        let body = "sonarr:\n  environment:\n    - TZ=UTC\n  volumes:\n    - /a:/b\n  restart: always";
        let out = reindent(body);
        let expected = "  sonarr:\n    environment:\n      - TZ=UTC\n    volumes:\n      - /a:/b\n    restart: always";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_reindent_four_space_fragment_is_best_effort() {
        // Two levels of 4-space recession count as two canonical levels.
        let body = "app:\n    healthcheck:\n        test: x\n    image: y";
        let out = reindent(body);
        assert_eq!(out, "  app:\n    healthcheck:\n      test: x\n  image: y");
    }

    #[test]
    fn test_reindent_keeps_blank_lines() {
        let out = reindent("app:\n\n  image: y");
        assert_eq!(out, "  app:\n\n    image: y");
    }

    #[test]
    fn test_reindent_level_never_negative() {
        let out = reindent("        app:\n  image: y");
        assert_eq!(out, "  app:\n    image: y");
        let out = reindent("          a: 1\n  b: 2");
        assert_eq!(out, "  a: 1\n  b: 2");
    }

    #[test]
    fn test_substitute_known_keys() {
        let settings = Settings {
            puid: "1001".into(),
            tz: "Europe/Paris".into(),
            ..Settings::default()
        };
        let out = substitute("- PUID=${PUID}\n- TZ=${TZ}", &settings);
        assert_eq!(out, "- PUID=1001\n- TZ=Europe/Paris");
    }

    #[test]
    fn test_substitute_leaves_unknown_and_malformed() {
        let settings = Settings::default();
        assert_eq!(substitute("${API_KEY}", &settings), "${API_KEY}");
        assert_eq!(substitute("${PUID:-1000}", &settings), "${PUID:-1000}");
        assert_eq!(substitute("x ${PUID", &settings), "x ${PUID");
        assert_eq!(substitute("$PUID", &settings), "$PUID");
    }

    #[test]
    fn test_substitute_inside_default() {
        let settings = Settings::default();
        assert_eq!(
            substitute("user: ${APP_UID:-${PUID}}", &settings),
            "user: ${APP_UID:-1000}"
        );
        assert_eq!(
            substitute("${A:-${B:-${TZ}}} ${PGID}", &settings),
            "${A:-${B:-Etc/UTC}} 1000"
        );
        assert_eq!(substitute("${}", &settings), "${}");
    }

    #[test]
    fn test_substitute_empty_value() {
        let settings = Settings::default();
        assert_eq!(
            substitute("container_name: ${CONTAINER_PREFIX}sonarr", &settings),
            "container_name: sonarr"
        );
    }

    #[test]
    fn test_assemble_empty() {
        let doc = assemble(&[], &Settings::default(), false);
        assert_eq!(doc, format!("{HEADER}\n\nservices:\n"));
    }

    #[test]
    fn test_assemble_annotates_and_orders() {
        let sonarr = ServiceFragment::new("sonarr", "Sonarr", "TV series", SONARR);
        let web = ServiceFragment::new("web", "Web", "", "services:\n  web:\n    image: nginx\n");
        let doc = assemble(&[web, sonarr], &Settings::default(), false);

        let web_at = doc.find("  # Web\n  web:").unwrap();
        let sonarr_at = doc.find("  # Sonarr - TV series\n  sonarr:").unwrap();
        assert!(web_at < sonarr_at);
        assert!(doc.contains("      - 8989:8989\n"));
        assert!(doc.contains("${PUID}"));
    }

    #[test]
    fn test_assemble_interpolates() {
        let sonarr = ServiceFragment::new("sonarr", "Sonarr", "", SONARR);
        let doc = assemble(&[sonarr], &Settings::default(), true);
        assert!(doc.contains("      - PUID=1000\n"));
        assert!(doc.contains("    restart: unless-stopped\n"));
        assert!(!doc.contains("${"));
    }

    #[test]
    fn test_assemble_skips_empty_fragment() {
        let empty = ServiceFragment::new("empty", "Empty", "", "services:\n\n");
        let doc = assemble(&[empty], &Settings::default(), false);
        assert!(!doc.contains("Empty"));
    }
}
