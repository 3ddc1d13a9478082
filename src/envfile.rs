// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Companion `.env` file generation

use crate::types::{ServiceFragment, Settings};
use std::borrow::Cow;
use std::collections::HashSet;

/// Collect `(NAME, value)` pairs declared under `environment:` keys.
///
/// Both list form (`- NAME=value`, optionally quoted) and mapping form
/// (`NAME: value`) are recognised, in the order they appear.
#[must_use]
pub fn extract_env_vars(body: &str) -> Vec<(String, String)> {
    let mut vars = Vec::new();
    let mut block_indent: Option<usize> = None;

    for line in body.lines() {
        let content = line.trim_start();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        let indent = line.len() - content.len();
        let content = content.trim_end();

        if let Some(env_indent) = block_indent {
            if indent > env_indent {
                if let Some(pair) = parse_entry(content) {
                    vars.push(pair);
                }
                continue;
            }
            block_indent = None;
        }

        if content == "environment:" || content == "- environment:" {
            block_indent = Some(indent);
        }
    }

    vars
}

fn parse_entry(content: &str) -> Option<(String, String)> {
    let (name, value) = match content.strip_prefix('-') {
        Some(item) => unquote(item.trim()).split_once('=')?,
        None => {
            let (name, value) = content.split_once(':')?;
            (name.trim(), unquote(value.trim()))
        }
    };

    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then(|| (name.to_string(), value.to_string()))
}

fn unquote(s: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|q| s.strip_prefix(*q).and_then(|rest| rest.strip_suffix(*q)))
        .unwrap_or(s)
}

/// Quote a value that an env-file parser would otherwise trim or cut at `#`.
///
/// Single quotes keep the value literal; values that contain a single
/// quote fall back to double quotes with backslashes and `"` escaped.
#[must_use]
pub fn quote_value(value: &str) -> Cow<'_, str> {
    let needs_quotes = value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\''));
    if !needs_quotes {
        return Cow::Borrowed(value);
    }
    if value.contains('\'') {
        Cow::Owned(format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\"")))
    } else {
        Cow::Owned(format!("'{value}'"))
    }
}

/// Render the env file for the given settings and fragments.
///
/// Shared settings come first; each fragment then contributes a block of
/// the variables it declares that have not been emitted yet.
#[must_use]
pub fn render_env(settings: &Settings, fragments: &[ServiceFragment]) -> String {
    let mut out = String::from("# Shared settings\n");
    let mut seen: HashSet<String> = HashSet::new();

    for (key, value) in settings.entries() {
        out.push_str(&format!("{key}={}\n", quote_value(value)));
        seen.insert(key.to_string());
    }

    for fragment in fragments {
        let fresh: Vec<_> = extract_env_vars(&fragment.compose)
            .into_iter()
            .filter(|(name, _)| seen.insert(name.clone()))
            .collect();
        if fresh.is_empty() {
            continue;
        }

        out.push_str(&format!("\n# {}\n", fragment.name));
        for (name, value) in fresh {
            out.push_str(&format!("{name}={}\n", quote_value(&value)));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const QBIT: &str = "services:
  qbittorrent:
    image: lscr.io/linuxserver/qbittorrent
    environment:
      - PUID=${PUID}
      - WEBUI_PORT=8080
      - \"TORRENTING_PORT=6881\"
    volumes:
      - ${CONFIG_PATH}/qbittorrent:/config
";

    #[test]
    fn test_extract_list_form() {
        let vars = extract_env_vars(QBIT);
        assert_eq!(
            vars,
            vec![
                ("PUID".to_string(), "${PUID}".to_string()),
                ("WEBUI_PORT".to_string(), "8080".to_string()),
                ("TORRENTING_PORT".to_string(), "6881".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_mapping_form() {
        let body = "services:\n  db:\n    environment:\n      POSTGRES_USER: app\n      POSTGRES_DB: 'app'\n    ports:\n      - 5432:5432\n";
        let vars = extract_env_vars(body);
        assert_eq!(
            vars,
            vec![
                ("POSTGRES_USER".to_string(), "app".to_string()),
                ("POSTGRES_DB".to_string(), "app".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_ignores_other_blocks() {
        let body = "services:\n  a:\n    labels:\n      - FOO=bar\n    command: X=1\n";
        assert!(extract_env_vars(body).is_empty());
    }

    #[test]
    fn test_render_suppresses_duplicates() {
        let qbit = ServiceFragment::new("qbittorrent", "qBittorrent", "", QBIT);
        let again = ServiceFragment::new(
            "other",
            "Other",
            "",
            "services:\n  other:\n    environment:\n      - WEBUI_PORT=9090\n",
        );
        let env = render_env(&Settings::default(), &[qbit, again]);

        assert!(env.starts_with("# Shared settings\nCONFIG_PATH=/opt/appdata\n"));
        assert_eq!(env.matches("PUID=").count(), 1);
        assert!(env.contains("\n# qBittorrent\nWEBUI_PORT=8080\nTORRENTING_PORT=6881\n"));
        assert!(!env.contains("WEBUI_PORT=9090"));
        assert!(!env.contains("# Other"));
    }

    #[test]
    fn test_quote_value() {
        assert_eq!(quote_value("/srv/data"), "/srv/data");
        assert_eq!(quote_value(""), "");
        assert_eq!(quote_value("/srv/my media"), "'/srv/my media'");
        assert_eq!(quote_value("pa#ss"), "'pa#ss'");
        assert_eq!(quote_value("it's \"here\""), "\"it's \\\"here\\\"\"");
    }

    #[test]
    fn test_render_quotes_values_with_spaces() {
        let settings = Settings {
            data_path: "/srv/my media".into(),
            ..Settings::default()
        };
        let java = ServiceFragment::new(
            "app",
            "App",
            "",
            "services:\n  app:\n    environment:\n      - \"JAVA_OPTS=-Xmx1g -Xms1g\"\n",
        );
        let env = render_env(&settings, &[java]);
        assert!(env.contains("DATA_PATH='/srv/my media'\n"));
        assert!(env.contains("JAVA_OPTS='-Xmx1g -Xms1g'\n"));
    }

    #[test]
    fn test_render_without_fragments() {
        let env = render_env(&Settings::default(), &[]);
        assert_eq!(env.lines().count(), 10);
        assert!(env.contains("CONTAINER_PREFIX=\n"));
    }
}
