use crate::entities::types::StoredFile;
use anyhow::{Result, anyhow};
use std::path::Path;

/// Extensions refused regardless of the declared MIME type
pub const BLOCKED_EXTENSIONS: &[&str] = &[
    "exe", "dll", "bat", "cmd", "com", "msi", "sh", "ps1", "php", "js", "jar", "vbs", "scr",
];

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates file size against maximum limit
pub fn validate_file_size(size: usize, max_size: usize) -> Result<()> {
    if size > max_size {
        return Err(anyhow!(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} bytes ({} MB)",
                size,
                max_size,
                max_size / 1024 / 1024
            ),
        }));
    }
    Ok(())
}

/// Lowercased MIME essence without parameters (`text/plain; charset=utf-8` -> `text/plain`)
pub fn normalize_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// Validates MIME type against the configured allowlist
pub fn validate_mime_type(content_type: &str, allowed: &[String]) -> Result<()> {
    let normalized = normalize_mime(content_type);

    if allowed.iter().any(|a| a.eq_ignore_ascii_case(&normalized)) {
        return Ok(());
    }

    Err(anyhow!(ValidationError {
        code: "INVALID_MIME_TYPE",
        message: format!("MIME type '{}' is not allowed", content_type),
    }))
}

/// Pick the MIME type to trust for an upload. A declared type wins unless it
/// is missing or generic, in which case the content is sniffed.
pub fn resolve_mime(declared: Option<&str>, data: &[u8]) -> String {
    let declared = declared.map(normalize_mime).filter(|m| !m.is_empty());

    match declared {
        Some(m) if m != mime::APPLICATION_OCTET_STREAM.essence_str() => m,
        _ => infer::get(data)
            .map(|t| t.mime_type().to_string())
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.essence_str().to_string()),
    }
}

/// Sanitizes filename to prevent path traversal and injection attacks
/// Returns the sanitized filename or an error if the name is invalid
pub fn sanitize_filename(filename: &str) -> Result<String> {
    // Treat both separators as path boundaries before taking the last component
    let unified = filename.replace('\\', "/");
    let name = Path::new(&unified)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "INVALID_FILENAME",
            message: "Filename cannot be empty".to_string(),
        }));
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|' | ';') {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    if let Some(ext) = Path::new(&sanitized).extension().and_then(|e| e.to_str()) {
        let ext_lower = ext.to_lowercase();
        if BLOCKED_EXTENSIONS.contains(&ext_lower.as_str()) {
            return Err(anyhow!(ValidationError {
                code: "BLOCKED_EXTENSION",
                message: format!("File extension '.{}' is not allowed", ext_lower),
            }));
        }
    }

    if sanitized.starts_with('.') {
        return Err(anyhow!(ValidationError {
            code: "HIDDEN_FILE",
            message: "Hidden files (starting with '.') are not allowed".to_string(),
        }));
    }

    Ok(sanitized)
}

/// Checks if file content appears to be executable
pub fn is_executable_content(header: &[u8]) -> bool {
    if header.len() < 4 {
        return false;
    }

    // ELF, PE/COFF
    if header.starts_with(&[0x7F, 0x45, 0x4C, 0x46]) || header.starts_with(&[0x4D, 0x5A]) {
        return true;
    }

    // Mach-O
    if header.starts_with(&[0xFE, 0xED, 0xFA, 0xCE])
        || header.starts_with(&[0xFE, 0xED, 0xFA, 0xCF])
        || header.starts_with(&[0xCE, 0xFA, 0xED, 0xFE])
        || header.starts_with(&[0xCF, 0xFA, 0xED, 0xFE])
    {
        return true;
    }

    header.starts_with(b"#!")
}

/// Checks the `{id, filename, size, type, url, hash}` shape of client supplied
/// file lists before they are persisted.
pub fn validate_stored_files(files: &[StoredFile], max_size: usize) -> Result<()> {
    for (index, file) in files.iter().enumerate() {
        let blank = [
            ("id", &file.id),
            ("filename", &file.filename),
            ("type", &file.content_type),
            ("url", &file.url),
            ("hash", &file.hash),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((field, _)) = blank {
            return Err(anyhow!(ValidationError {
                code: "INVALID_FILE",
                message: format!("files[{}].{} must not be empty", index, field),
            }));
        }

        if file.filename.contains('/') || file.filename.contains('\\') {
            return Err(anyhow!(ValidationError {
                code: "INVALID_FILE",
                message: format!("files[{}].filename must not contain a path", index),
            }));
        }

        if file.size < 0 {
            return Err(anyhow!(ValidationError {
                code: "INVALID_FILE",
                message: format!("files[{}].size must not be negative", index),
            }));
        }

        validate_file_size(file.size as usize, max_size)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["image/png".to_string(), "application/pdf".to_string()]
    }

    fn file(name: &str) -> StoredFile {
        StoredFile {
            id: "f-1".to_string(),
            filename: name.to_string(),
            size: 10,
            content_type: "image/png".to_string(),
            url: "http://cdn/f-1".to_string(),
            hash: "abcd".to_string(),
        }
    }

    #[test]
    fn test_validate_file_size() {
        assert!(validate_file_size(1024, 2048).is_ok());
        assert!(validate_file_size(2048, 2048).is_ok());
        assert!(validate_file_size(2049, 2048).is_err());
    }

    #[test]
    fn test_validate_mime_type() {
        assert!(validate_mime_type("image/png", &allowed()).is_ok());
        assert!(validate_mime_type("Application/PDF; q=1", &allowed()).is_ok());
        assert!(validate_mime_type("text/html", &allowed()).is_err());
    }

    #[test]
    fn test_resolve_mime_sniffs_generic() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(resolve_mime(None, &png), "image/png");
        assert_eq!(resolve_mime(Some("application/octet-stream"), &png), "image/png");
        assert_eq!(resolve_mime(Some("text/plain"), b"hello"), "text/plain");
        assert_eq!(resolve_mime(None, b"hello"), "application/octet-stream");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("logo.png").unwrap(), "logo.png");
        assert_eq!(sanitize_filename("my<draft>.pdf").unwrap(), "my_draft_.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini").unwrap(), "boot.ini");
        assert!(sanitize_filename("virus.exe").is_err());
        assert!(sanitize_filename(".env").is_err());
        assert!(sanitize_filename("").is_err());
    }

    #[test]
    fn test_is_executable_content() {
        assert!(is_executable_content(&[0x7F, 0x45, 0x4C, 0x46, 0x00]));
        assert!(is_executable_content(b"#!/bin/sh"));
        assert!(!is_executable_content(&[0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn test_validate_stored_files() {
        assert!(validate_stored_files(&[file("a.png")], 100).is_ok());

        let mut missing_hash = file("a.png");
        missing_hash.hash = " ".to_string();
        let err = validate_stored_files(&[missing_hash], 100).unwrap_err();
        assert!(err.to_string().contains("files[0].hash"));

        assert!(validate_stored_files(&[file("dir/a.png")], 100).is_err());

        let mut huge = file("a.png");
        huge.size = 1000;
        assert!(validate_stored_files(&[huge], 100).is_err());
    }
}
