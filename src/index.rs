// src/index.rs

//! Mapping between checkout projects and packages
//!
//! Nothing here is persisted: the project ↔ package relation is rebuilt from
//! the overlays and the manifest on every query.

use crate::error::Result;
use crate::key::PackageKey;
use crate::portage::{declared_projects, scan_packages_by_keyword};
use crate::session::Session;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Placeholder for a column with no value
pub const PLACEHOLDER: &str = "-";

/// `(project, package)` for every live ebuild accepting `keyword`
pub fn project_ebuild_map(session: &Session, keyword: &str) -> Result<Vec<(String, PackageKey)>> {
    let env = session.env()?;
    let ebuilds =
        scan_packages_by_keyword(&env.overlays, keyword, session.store().live_version())?;

    let mut map = Vec::new();
    for ebuild in &ebuilds {
        let key = match PackageKey::from_ebuild_path(ebuild) {
            Ok(key) => key,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };
        let text = fs::read_to_string(ebuild)?;
        for project in declared_projects(&text, &key) {
            map.push((project, key.clone()));
        }
    }

    debug!("Mapped {} project/package pairs", map.len());
    Ok(map)
}

/// `(project, path)` for every checkout project
pub fn project_path_map(session: &Session) -> Result<Vec<(String, PathBuf)>> {
    Ok(session
        .project_paths()?
        .iter()
        .map(|p| (p.project.clone(), p.path.clone()))
        .collect())
}

/// Project whose checkout directory contains `dir` (the deepest match wins)
pub fn project_for_dir(session: &Session, dir: &Path) -> Result<Option<String>> {
    Ok(session
        .project_paths()?
        .iter()
        .filter(|p| dir.starts_with(session.checkout_path(&p.path)))
        .max_by_key(|p| p.path.components().count())
        .map(|p| p.project.clone()))
}

/// One line of `info` output
///
/// `projects` and `paths` are parallel: entry `i` of `paths` is the checkout
/// of `projects[i]`, or `None` when the manifest does not list it. A project
/// checked out at several paths appears once per path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRow {
    pub key: PackageKey,
    pub projects: Vec<String>,
    pub paths: Vec<Option<PathBuf>>,
}

impl fmt::Display for InfoRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.projects.is_empty() {
            return write!(f, "{} {} {}", self.key, PLACEHOLDER, PLACEHOLDER);
        }
        let paths = self
            .paths
            .iter()
            .map(|p| match p {
                Some(path) => path.display().to_string(),
                None => PLACEHOLDER.to_string(),
            })
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{} {} {}", self.key, self.projects.join(","), paths)
    }
}

/// Left outer join of `keys` with the project maps, sorted by key
///
/// Every key yields exactly one row; unmatched columns render as `-`.
pub fn workon_info(session: &Session, keys: &[PackageKey], keyword: &str) -> Result<Vec<InfoRow>> {
    let mut projects_by_key: BTreeMap<&PackageKey, Vec<String>> = BTreeMap::new();
    let ebuild_map = project_ebuild_map(session, keyword)?;
    for (project, key) in &ebuild_map {
        let projects = projects_by_key.entry(key).or_default();
        if !projects.contains(project) {
            projects.push(project.clone());
        }
    }

    let mut paths_by_project: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for (project, path) in project_path_map(session)? {
        paths_by_project.entry(project).or_default().push(path);
    }

    let mut keys = keys.to_vec();
    keys.sort();
    keys.dedup();

    Ok(keys
        .into_iter()
        .map(|key| {
            let mut row = InfoRow {
                key,
                projects: Vec::new(),
                paths: Vec::new(),
            };
            for project in projects_by_key.get(&row.key).into_iter().flatten() {
                match paths_by_project.get(project) {
                    Some(paths) => {
                        for path in paths {
                            row.projects.push(project.clone());
                            row.paths.push(Some(path.clone()));
                        }
                    }
                    None => {
                        row.projects.push(project.clone());
                        row.paths.push(None);
                    }
                }
            }
            row
        })
        .collect())
}
