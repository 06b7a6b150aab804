//! Discovery of the Solidity sources a contract depends on
//!
//! Every file is identified by its source unit name, the key under which the
//! compiler knows it. Project files are named by their path relative to the
//! project root; package imports keep the path they were imported by.

use std::{
    collections::{BTreeMap, VecDeque},
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use deploy_config::version::VersionReq;
use itertools::Itertools;
use tracing::debug;

use crate::{constants::NODE_MODULES_DIR, errors::ScriptError};

/// A single Solidity file in the dependency graph
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// The source unit name
    pub name: String,
    /// The location of the file on disk
    pub path: PathBuf,
    /// The file contents
    pub content: String,
    /// The `pragma solidity` requirements declared in the file
    pub pragmas: Vec<VersionReq>,
    /// The source unit names of the file's imports
    pub imports: Vec<String>,
}

/// The transitive closure of a source file's imports
#[derive(Debug, Clone)]
pub struct SourceGraph {
    /// The name of the unit the graph was resolved from
    entry: String,
    /// All units in the graph, by name
    units: BTreeMap<String, SourceUnit>,
}

impl SourceGraph {
    /// Resolve the graph of sources reachable from `entry`
    pub fn resolve(root: &Path, entry: &str) -> Result<Self, ScriptError> {
        let entry = normalize(entry);
        let mut units = BTreeMap::new();
        let mut queue = VecDeque::from([(entry.clone(), None::<String>)]);

        while let Some((name, importer)) = queue.pop_front() {
            if units.contains_key(&name) {
                continue;
            }

            let path = locate(root, &name).ok_or_else(|| match &importer {
                Some(importer) => ScriptError::CompilationError(format!(
                    "source {} imported by {} not found",
                    name, importer
                )),
                None => ScriptError::CompilationError(format!("source {} not found", name)),
            })?;
            let content = fs::read_to_string(&path)
                .map_err(|e| ScriptError::CompilationError(format!("{}: {}", name, e)))?;

            let unit = parse_unit(name.clone(), path, content)?;
            debug!(unit = %unit.name, imports = unit.imports.len(), "resolved source");
            for import in &unit.imports {
                queue.push_back((import.clone(), Some(name.clone())));
            }
            units.insert(name, unit);
        }

        Ok(Self { entry, units })
    }

    /// The name of the unit the graph was resolved from
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Every unit in the graph, ordered by name
    pub fn units(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units.values()
    }

    /// Every version requirement declared across the graph
    pub fn pragmas(&self) -> Vec<VersionReq> {
        self.units()
            .flat_map(|unit| unit.pragmas.iter().cloned())
            .unique_by(|req| req.as_str().to_string())
            .collect()
    }
}

/// Find a source unit on disk, first under the project root and then under
/// the installed packages
fn locate(root: &Path, name: &str) -> Option<PathBuf> {
    [root.join(name), root.join(NODE_MODULES_DIR).join(name)]
        .into_iter()
        .find(|path| path.is_file())
}

/// Extract the pragmas and imports of a source file
fn parse_unit(name: String, path: PathBuf, content: String) -> Result<SourceUnit, ScriptError> {
    let mut pragmas = Vec::new();
    let mut imports = Vec::new();

    let stripped = strip_comments(&content);
    for statement in stripped.split(';') {
        let statement = statement.trim_start_matches(|c: char| c == '}' || c.is_whitespace());

        if let Some(req) = statement.strip_prefix("pragma solidity") {
            let req = VersionReq::from_str(req).map_err(|e| {
                ScriptError::CompilationError(format!("{}: {}", name, e))
            })?;
            pragmas.push(req);
        } else if is_import(statement) {
            let path = first_string_literal(statement).ok_or_else(|| {
                ScriptError::CompilationError(format!(
                    "{}: malformed import `{}`",
                    name,
                    statement.trim()
                ))
            })?;
            imports.push(resolve_import(&name, path));
        }
    }

    Ok(SourceUnit { name, path, content, pragmas, imports })
}

/// Whether a statement is an import directive rather than one merely
/// starting with an identifier like `importCount`
fn is_import(statement: &str) -> bool {
    statement.strip_prefix("import").is_some_and(|rest| {
        rest.starts_with(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '{' | '*'))
    })
}

/// The source unit name an import refers to
///
/// Relative imports are resolved against the importing unit's name, all
/// others are taken as written.
pub fn resolve_import(importer: &str, import: &str) -> String {
    if import.starts_with("./") || import.starts_with("../") {
        let dir = importer.rsplit_once('/').map(|(dir, _)| dir).unwrap_or_default();
        normalize(&format!("{dir}/{import}"))
    } else {
        normalize(import)
    }
}

/// Collapse `.` and `..` segments and unify separators
fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    segments.join("/")
}

/// The contents of the first double- or single-quoted string in `s`
fn first_string_literal(s: &str) -> Option<&str> {
    let (start, quote) = s.char_indices().find(|(_, c)| *c == '"' || *c == '\'')?;
    let rest = &s[start + 1..];
    let end = rest.find(quote)?;
    Some(&rest[..end])
}

/// Remove line and block comments, leaving string literals intact
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                out.push(' ');
            }
            ('"' | '\'', _) => {
                quote = Some(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}
