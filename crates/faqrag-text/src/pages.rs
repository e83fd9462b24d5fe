//! Page extraction for the offline index build.
//!
//! `.txt` sources are split on form feeds; `.pdf` sources go through the
//! external `pdftotext` tool, whose output uses the same page separator.
//! Pages come back 1-based and may be empty (scanned pages carry no text);
//! callers decide whether to skip them.

use faqrag_core::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const PAGE_BREAK: char = '\x0c';
const SUPPORTED: [&str; 2] = ["pdf", "txt"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub page_number: u32,
    pub text: String,
}

pub fn load_pages(path: &Path) -> Result<Vec<Page>> {
    if !path.is_file() {
        return Err(Error::NotFound(format!("document {}", path.display())));
    }
    let raw = match extension(path).as_deref() {
        Some("txt") => read_file_content(path)?,
        Some("pdf") => pdftotext(path)?,
        _ => return Err(Error::Validation(format!("unsupported document type: {}", path.display()))),
    };
    Ok(split_pages(&raw))
}

/// Split extracted text into pages on form feeds. A trailing separator does
/// not open an extra page.
pub fn split_pages(raw: &str) -> Vec<Page> {
    let raw = raw.strip_suffix(PAGE_BREAK).unwrap_or(raw);
    raw.split(PAGE_BREAK)
        .enumerate()
        .map(|(i, text)| Page {
            page_number: u32::try_from(i + 1).unwrap_or(u32::MAX),
            text: text.replace('\u{a0}', " ").trim().to_string(),
        })
        .collect()
}

/// A single supported file, or every supported file under a directory in
/// path order.
pub fn collect_sources(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        return Err(Error::NotFound(format!("source {}", root.display())));
    }
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| extension(p).is_some_and(|ext| SUPPORTED.contains(&ext.as_str())))
        .collect();
    files.sort();
    Ok(files)
}

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase)
}

fn read_file_content(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).into_owned()),
    }
}

fn pdftotext(path: &Path) -> Result<String> {
    tracing::debug!("extracting {} with pdftotext", path.display());
    let output = Command::new("pdftotext")
        .args(["-enc", "UTF-8"])
        .arg(path)
        .arg("-")
        .output()
        .map_err(|e| Error::Capability(format!("failed to run pdftotext: {e}")))?;
    if !output.status.success() {
        return Err(Error::Capability(format!(
            "pdftotext failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
