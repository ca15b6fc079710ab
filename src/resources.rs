use std::{
    collections::HashSet,
    fs,
    io::Write,
    path::Path,
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::info;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// One embedded artifact: the constant name and the raw bytes behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub name: String,
    pub payload: Vec<u8>,
}

impl ResourceEntry {
    pub fn new(name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self { name: name.into(), payload }
    }

    /// Reads `path`, naming the entry after the file stem.
    pub fn from_file(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| Error::InvalidResourceName(path.display().to_string()))?;
        Ok(Self::new(name, fs::read(path)?))
    }
}

/// Shape of the generated table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Name of the exported namespace wrapping every constant
    pub namespace: String,
    /// MIME type declared in each data URI, never sniffed from the payload
    pub mime: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            namespace: "Resources".to_string(),
            mime: "image/png".to_string(),
        }
    }
}

const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "implements",
    "import", "in", "instanceof", "interface", "let", "new", "null", "package", "private",
    "protected", "public", "return", "static", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "yield",
];

/// Whether `name` can be used verbatim as a TypeScript constant name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    head_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !RESERVED_WORDS.contains(&name)
}

/// Whether `mime` fits inside the quoted data URI unescaped.
pub fn is_mime_type(mime: &str) -> bool {
    !mime.is_empty() && mime.bytes().all(|b| b.is_ascii_graphic() && b != b'"' && b != b'\\')
}

/// Renders every entry, in order, as a data-URI constant inside one exported namespace.
pub fn generate(entries: &[ResourceEntry], config: &TableConfig) -> Result<String> {
    if !is_identifier(&config.namespace) {
        return Err(Error::InvalidResourceName(config.namespace.clone()));
    }
    if !is_mime_type(&config.mime) {
        return Err(Error::InvalidMimeType(config.mime.clone()));
    }
    let mut seen = HashSet::new();
    for entry in entries {
        if !is_identifier(&entry.name) {
            return Err(Error::InvalidResourceName(entry.name.clone()));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(Error::DuplicateResourceName(entry.name.clone()));
        }
    }

    let mut table = format!("export namespace {} {{\n", config.namespace);
    for entry in entries {
        table.push_str(&format!(
            "\texport const {} = \"data:{};base64,{}\"\n",
            entry.name,
            config.mime,
            STANDARD.encode(&entry.payload)
        ));
    }
    table.push_str("}\n");
    Ok(table)
}

/// Replaces `destination` with `table` in one rename, leaving any previous file intact on failure.
pub fn write_table(table: &str, destination: &Path) -> Result<()> {
    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory)?;

    let mut staging = NamedTempFile::new_in(directory)?;
    staging.write_all(table.as_bytes())?;
    staging.as_file().sync_all()?;
    staging.persist(destination).map_err(|err| err.error)?;

    info!("wrote resource table {}", destination.display());
    Ok(())
}
