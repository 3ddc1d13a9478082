// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Snapshot of a full assembled document built from the builtin catalog

use compose_forge::catalog::Catalog;
use compose_forge::prelude::*;

#[test]
fn test_download_stack_snapshot() {
    let catalog = Catalog::builtin().unwrap();
    let fragments = catalog.select(&["sonarr", "qbittorrent", "sabnzbd"]).unwrap();

    let Generation { document, report } = generate(&fragments, &Settings::default(), false);

    insta::assert_snapshot!("download_stack", document);

    let report = report.unwrap();
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].description(), "Port 8080 claimed by qbittorrent, sabnzbd");
    assert_eq!(report.changes().next().unwrap().to_string(), "sabnzbd: 8080 → 8081");
}
