//! Loading documents from files and directories.

use crate::types::Document;
use ragscope_core::{AppError, AppResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions picked up from directories when none are given.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Load documents from files and directories, in argument order.
///
/// A file path is read as is and named by its file name. A directory is
/// walked recursively in file name order, keeping files whose extension is in
/// `extensions` (case-insensitive; [`DEFAULT_EXTENSIONS`] when empty), each
/// named by its path relative to the directory.
pub fn load_documents(paths: &[PathBuf], extensions: &[String]) -> AppResult<Vec<Document>> {
    let extensions: Vec<String> = if extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    } else {
        extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect()
    };

    let mut documents = Vec::new();
    let mut names = HashSet::new();

    for path in paths {
        if path.is_dir() {
            for (name, file) in walk_dir(path, &extensions)? {
                push_document(&mut documents, &mut names, name, &file)?;
            }
        } else if path.is_file() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            push_document(&mut documents, &mut names, name, path)?;
        } else {
            return Err(AppError::Document(format!(
                "Path does not exist: {}",
                path.display()
            )));
        }
    }

    tracing::debug!("Loaded {} documents from {} paths", documents.len(), paths.len());

    Ok(documents)
}

fn walk_dir(root: &Path, extensions: &[String]) -> AppResult<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            AppError::Document(format!("Failed to walk {}: {}", root.display(), e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .path()
            .extension()
            .map(|ext| extensions.contains(&ext.to_string_lossy().to_lowercase()))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((name, entry.path().to_path_buf()));
    }

    Ok(files)
}

fn push_document(
    documents: &mut Vec<Document>,
    names: &mut HashSet<String>,
    name: String,
    path: &Path,
) -> AppResult<()> {
    if !names.insert(name.clone()) {
        return Err(AppError::Document(format!(
            "Duplicate document name '{}' ({})",
            name,
            path.display()
        )));
    }

    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|_| {
        AppError::Document(format!("File is not valid UTF-8: {}", path.display()))
    })?;

    documents.push(Document::new(name, text));
    Ok(())
}
