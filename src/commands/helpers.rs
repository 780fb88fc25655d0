use crate::artifact::{Artifact, ArtifactKind, ArtifactSource, SkillFile};
use crate::error::{DroidPortError, Result};
use std::path::{Path, PathBuf};

const PLUGIN_MANIFEST: &str = ".claude-plugin/plugin.json";

/// Build an artifact for a single path given on the command line.
///
/// A skill may be named by its directory or by any file inside it.
pub fn load_artifact(path: &Path, kind: Option<ArtifactKind>) -> Result<Artifact> {
    let kind = kind
        .or_else(|| ArtifactKind::infer(path))
        .ok_or_else(|| DroidPortError::UnknownKind(path.to_path_buf()))?;

    match kind {
        ArtifactKind::Skill => {
            let dir = if path.is_dir() {
                path.to_path_buf()
            } else {
                path.parent().map(Path::to_path_buf).unwrap_or_default()
            };
            skill_artifact(&dir, &plugin_name_for(&dir))
        }
        _ => {
            if !path.is_file() {
                return Err(DroidPortError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} is not a file", path.display()),
                )));
            }
            let name = file_stem(path);
            let plugin = path
                .parent()
                .map(plugin_name_for)
                .unwrap_or_default();
            Ok(Artifact::new(name, kind, plugin, ArtifactSource::local(path)))
        }
    }
}

/// Collect every artifact of a plugin laid out as
/// `agents/*.md`, `commands/*.md` and `skills/<name>/`.
pub fn scan_plugin(root: &Path) -> Result<(String, Vec<Artifact>)> {
    let agents = root.join("agents");
    let commands = root.join("commands");
    let skills = root.join("skills");

    if !agents.is_dir() && !commands.is_dir() && !skills.is_dir() {
        return Err(DroidPortError::NotAPlugin(root.to_path_buf()));
    }

    let plugin = plugin_name(root);
    let mut artifacts = Vec::new();

    for path in markdown_files(&agents)? {
        artifacts.push(Artifact::new(
            file_stem(&path),
            ArtifactKind::Droid,
            plugin.as_str(),
            ArtifactSource::local(&path),
        ));
    }

    for path in markdown_files(&commands)? {
        artifacts.push(Artifact::new(
            file_stem(&path),
            ArtifactKind::Command,
            plugin.as_str(),
            ArtifactSource::local(&path),
        ));
    }

    for dir in sorted_entries(&skills)?.into_iter().filter(|p| p.is_dir()) {
        artifacts.push(skill_artifact(&dir, &plugin)?);
    }

    tracing::debug!(plugin = %plugin, artifacts = artifacts.len(), "scanned plugin");
    Ok((plugin, artifacts))
}

fn skill_artifact(dir: &Path, plugin: &str) -> Result<Artifact> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut files = Vec::new();
    collect_files(dir, dir, &mut files)?;

    Ok(Artifact::new(name, ArtifactKind::Skill, plugin, ArtifactSource::local(dir)).with_files(files))
}

fn collect_files(root: &Path, dir: &Path, files: &mut Vec<SkillFile>) -> Result<()> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            collect_files(root, &path, files)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            let relative: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect();
            files.push(SkillFile {
                path: relative.join("/"),
                source: ArtifactSource::local(&path),
            });
        }
    }
    Ok(())
}

fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "md"))
        .collect())
}

/// Directory entries sorted by path; a missing directory has none.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Plugin name from the manifest, falling back to the directory name.
fn plugin_name(root: &Path) -> String {
    let from_manifest = std::fs::read_to_string(root.join(PLUGIN_MANIFEST))
        .ok()
        .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
        .and_then(|json| json.get("name")?.as_str().map(str::to_string));

    from_manifest.unwrap_or_else(|| {
        root.canonicalize()
            .unwrap_or_else(|_| root.to_path_buf())
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    })
}

/// Plugin name for an artifact inside `agents/`, `commands/` or `skills/`.
fn plugin_name_for(dir: &Path) -> String {
    dir.ancestors()
        .find(|a| {
            matches!(
                a.file_name().and_then(|n| n.to_str()),
                Some("agents") | Some("droids") | Some("commands") | Some("skills")
            )
        })
        .and_then(Path::parent)
        .map(plugin_name)
        .unwrap_or_default()
}
