// src/report.rs

//! Read-only views over the live state and the project index

use crate::config::WorkonConfig;
use crate::error::Result;
use crate::index::{self, InfoRow};
use crate::key::PackageKey;
use crate::portage::{ebuilds_to_packages, scan_packages_by_keyword};
use crate::session::Session;
use crate::store;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Live packages of the session's target, in the order they were started
pub fn list_live_for_target(session: &Session) -> Result<Vec<PackageKey>> {
    session.store().list_live()
}

/// Live packages of every target that has any
pub fn list_live_all_targets(config: &WorkonConfig) -> Result<BTreeMap<String, Vec<PackageKey>>> {
    store::list_all_live(&config.state_dir(), &config.live_version)
}

/// Sorted, deduplicated packages that can be worked on for `keyword`
pub fn list_workon_eligible(session: &Session, keyword: &str) -> Result<Vec<PackageKey>> {
    let env = session.env()?;
    let ebuilds =
        scan_packages_by_keyword(&env.overlays, keyword, session.store().live_version())?;
    Ok(ebuilds_to_packages(&ebuilds))
}

/// Package, project and checkout path of each key
pub fn workon_info(session: &Session, keys: &[PackageKey]) -> Result<Vec<InfoRow>> {
    let keyword = session.workon_keyword()?;
    index::workon_info(session, keys, &keyword)
}

/// One key per line
pub fn format_keys(keys: &[PackageKey]) -> String {
    keys.iter().fold(String::new(), |mut out, key| {
        let _ = writeln!(out, "{}", key);
        out
    })
}

/// `target:` header, one key per line, blank line between targets
pub fn format_all_targets(all: &BTreeMap<String, Vec<PackageKey>>) -> String {
    let mut out = String::new();
    for (target, keys) in all {
        let _ = writeln!(out, "{}:", target);
        out.push_str(&format_keys(keys));
        out.push('\n');
    }
    out
}

/// One row per line
pub fn format_info(rows: &[InfoRow]) -> String {
    rows.iter().fold(String::new(), |mut out, row| {
        let _ = writeln!(out, "{}", row);
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PackageKey {
        PackageKey::parse(s).unwrap()
    }

    #[test]
    fn test_format_keys() {
        assert_eq!(format_keys(&[key("a/b"), key("c/d")]), "a/b\nc/d\n");
        assert_eq!(format_keys(&[]), "");
    }

    #[test]
    fn test_format_all_targets() {
        let mut all = BTreeMap::new();
        all.insert("host".to_string(), vec![key("dev-util/tool")]);
        all.insert("eve".to_string(), vec![key("cat/a"), key("cat/b")]);
        assert_eq!(
            format_all_targets(&all),
            "eve:\ncat/a\ncat/b\n\nhost:\ndev-util/tool\n\n"
        );
    }
}
