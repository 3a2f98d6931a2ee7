use std::collections::HashSet;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{CapsubError, Result};

/// The file CapCut writes into every project directory
pub const PROJECT_DESCRIPTOR: &str = "draft_content.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Directory name, also used as the display name
    pub id: String,
    pub name: String,
    pub source_file: PathBuf,
    pub modified: Option<DateTime<Local>>,
}

/// A file found under the scanned root
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Path relative to the scanned root, either separator style
    pub relative_path: String,
    pub path: PathBuf,
    pub modified: Option<DateTime<Local>>,
}

/// Group descriptor files by their parent directory name.
///
/// The first descriptor seen for a name wins; the result is ordered most
/// recently modified first, with unknown times last.
pub fn discover_projects(files: &[ScannedFile]) -> Vec<Project> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut projects = Vec::new();

    for file in files {
        if !file.relative_path.ends_with(PROJECT_DESCRIPTOR) {
            continue;
        }

        let parts: Vec<&str> = file.relative_path.split(['/', '\\']).collect();
        if parts.len() < 2 {
            continue;
        }

        let name = parts[parts.len() - 2].to_string();
        if !seen.insert(name.clone()) {
            debug!("Ignoring duplicate project '{}' at {}", name, file.relative_path);
            continue;
        }

        projects.push(Project {
            id: name.clone(),
            name,
            source_file: file.path.clone(),
            modified: file.modified,
        });
    }

    // Stable sort, so equal times keep discovery order
    projects.sort_by(|a, b| match (a.modified, b.modified) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    projects
}

/// Walk `root` and discover the CapCut projects beneath it
pub fn scan_directory<P: AsRef<Path>>(root: P) -> Result<Vec<Project>> {
    let root = root.as_ref();
    info!("Scanning for projects: {}", root.display());

    if !root.is_dir() {
        return Err(CapsubError::FileNotFound(root.display().to_string()));
    }

    let files: Vec<ScannedFile> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|entry| {
            let relative = pathdiff::diff_paths(entry.path(), root)
                .unwrap_or_else(|| entry.path().to_path_buf());
            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Local>::from);

            ScannedFile {
                relative_path: relative.to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
                modified,
            }
        })
        .collect();

    let projects = discover_projects(&files);
    info!("Found {} projects among {} files", projects.len(), files.len());
    Ok(projects)
}

/// Resolve a project directory or a descriptor path to the descriptor file
pub fn resolve_descriptor<P: AsRef<Path>>(input: P) -> Result<PathBuf> {
    let input = input.as_ref();
    let candidate = if input.is_dir() {
        input.join(PROJECT_DESCRIPTOR)
    } else {
        input.to_path_buf()
    };

    if !candidate.is_file() {
        return Err(CapsubError::FileNotFound(candidate.display().to_string()));
    }
    Ok(candidate)
}

/// Output base name derived from a project directory name
pub fn base_name_for(project_name: &str, default_name: &str) -> String {
    let mut name = String::with_capacity(project_name.len());
    let mut in_gap = false;
    for c in project_name.chars() {
        if c.is_whitespace() || c == '_' {
            if !in_gap {
                name.push('-');
            }
            in_gap = true;
        } else {
            name.push(c);
            in_gap = false;
        }
    }

    if name.is_empty() {
        default_name.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn file(relative_path: &str, modified_secs: Option<i64>) -> ScannedFile {
        ScannedFile {
            relative_path: relative_path.to_string(),
            path: PathBuf::from("/drafts").join(relative_path),
            modified: modified_secs.map(|s| Local.timestamp_opt(s, 0).unwrap()),
        }
    }

    #[test]
    fn test_most_recent_first() {
        let projects = discover_projects(&[
            file("A/draft_content.json", Some(1_000)),
            file("A/cover.jpg", Some(9_000)),
            file("B/draft_content.json", Some(2_000)),
        ]);

        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let projects = discover_projects(&[
            file("Trip/draft_content.json", Some(1)),
            file("Other/Trip/draft_content.json", Some(5)),
        ]);

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].source_file, PathBuf::from("/drafts/Trip/draft_content.json"));
    }

    #[test]
    fn test_windows_separators_and_root_descriptor() {
        let projects = discover_projects(&[
            file("draft_content.json", Some(1)),
            file("Clip One\\draft_content.json", None),
        ]);

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "Clip One");
    }

    #[test]
    fn test_unknown_time_sorts_last() {
        let projects = discover_projects(&[
            file("Old/draft_content.json", None),
            file("New/draft_content.json", Some(10)),
        ]);
        assert_eq!(projects[0].name, "New");
        assert_eq!(projects[1].name, "Old");
    }

    #[test]
    fn test_base_name_for() {
        assert_eq!(base_name_for("My  Trip_2024", "subtitles"), "My-Trip-2024");
        assert_eq!(base_name_for("", "subtitles"), "subtitles");
    }
}
