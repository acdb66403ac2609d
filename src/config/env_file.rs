//! `.env` file handling
//!
//! - Values are read with `dotenvy`: quoting, escapes, `export` prefixes and
//!   inline comments follow the usual dotenv rules
//! - Rewrites are line based so comments, blank lines and unrelated
//!   assignments survive untouched

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use super::errors::{ConfigError, ConfigResult};
use super::registry::CONFIG_REGISTRY;
use crate::observability::{log_event_with_fields, Event, Logger};

const HEADER: &str = "# da-story-edit environment configuration\n\
# Fill in required values before running live API operations.\n";

/// Key of an assignment line, `None` for comments and blank lines
fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let (key, _) = trimmed.split_once('=')?;
    let key = key.trim();
    let key = key.strip_prefix("export ").map(str::trim).unwrap_or(key);
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

fn into_io(err: dotenvy::Error) -> io::Error {
    match err {
        dotenvy::Error::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
    }
}

/// Drain a dotenv iterator; unparsable lines are skipped with a warning
fn collect_values<R: Read>(
    entries: dotenvy::Iter<R>,
    source: &str,
) -> io::Result<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();
    for entry in entries {
        match entry {
            Ok((key, value)) => {
                values.insert(key, value);
            }
            Err(dotenvy::Error::Io(e)) => return Err(e),
            Err(e) => {
                let detail = e.to_string();
                Logger::warn(
                    Event::ConfigLineIgnored.as_str(),
                    &[("detail", &detail), ("path", source)],
                );
            }
        }
    }
    Ok(values)
}

/// Parse `.env` text; a later assignment of the same key wins
pub fn parse_env(text: &str) -> BTreeMap<String, String> {
    // In-memory reads only fail on invalid UTF-8, which `&str` rules out
    collect_values(dotenvy::from_read_iter(text.as_bytes()), "<text>").unwrap_or_default()
}

/// Parsed contents of `path`, empty when the file does not exist
pub fn read_env_file(path: &Path) -> ConfigResult<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let entries = dotenvy::from_path_iter(path).map_err(|e| ConfigError::io(path, into_io(e)))?;
    let shown = path.display().to_string();
    collect_values(entries, &shown).map_err(|e| ConfigError::io(path, e))
}

fn ensure_parent(path: &Path) -> ConfigResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Create `path` if needed and append a template for every registry key
/// not yet assigned
///
/// Existing values are never touched. Returns the keys that were added.
pub fn bootstrap_env_file(path: &Path) -> ConfigResult<Vec<String>> {
    ensure_parent(path)?;
    if !path.exists() {
        fs::write(path, HEADER).map_err(|e| ConfigError::io(path, e))?;
    }

    let original = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let existing = parse_env(&original);

    let missing: Vec<_> = CONFIG_REGISTRY
        .iter()
        .filter(|var| !existing.contains_key(var.name))
        .collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }

    let blocks: Vec<String> = missing.iter().map(|var| var.template()).collect();
    let separator = if !original.is_empty() && !original.ends_with('\n') {
        "\n"
    } else {
        ""
    };
    let contents = format!("{}{}{}\n", original, separator, blocks.join("\n\n"));
    fs::write(path, contents).map_err(|e| ConfigError::io(path, e))?;

    let added: Vec<String> = missing.iter().map(|var| var.name.to_string()).collect();
    let joined = added.join(",");
    let shown = path.display().to_string();
    log_event_with_fields(Event::ConfigBootstrapped, &[("added", &joined), ("path", &shown)]);
    Ok(added)
}

/// Rewrite `KEY=value` lines in place, appending keys that are not present
///
/// Comments, blank lines and unrelated assignments are preserved.
pub fn upsert_env_values(path: &Path, updates: &[(&str, &str)]) -> ConfigResult<()> {
    if !path.exists() {
        bootstrap_env_file(path)?;
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();

    for (key, value) in updates {
        let new_line = format!("{}={}", key, value);
        match lines.iter().rposition(|line| line_key(line) == Some(*key)) {
            Some(index) => lines[index] = new_line,
            None => {
                if lines.last().is_some_and(|last| !last.trim().is_empty()) {
                    lines.push(String::new());
                }
                lines.push(new_line);
            }
        }
    }

    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(path, contents).map_err(|e| ConfigError::io(path, e))?;

    let keys: Vec<&str> = updates.iter().map(|(k, _)| *k).collect();
    let joined = keys.join(",");
    log_event_with_fields(Event::ConfigUpdated, &[("keys", &joined)]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_env_basics() {
        let values = parse_env(
            "# comment\n\nA=1\nexport B = two \nC=\"quoted value\"\nD='x'\nE=\nnot a line\n",
        );
        assert_eq!(values["A"], "1");
        assert_eq!(values["B"], "two");
        assert_eq!(values["C"], "quoted value");
        assert_eq!(values["D"], "x");
        assert_eq!(values["E"], "");
        assert_eq!(values.len(), 5);
    }

    #[test]
    fn test_parse_env_dotenv_rules() {
        let values = parse_env(
            "F=six # trailing note\nG=\"say \\\"hi\\\"\"\nBAD=two words\nH=after\n",
        );
        assert_eq!(values["F"], "six");
        assert_eq!(values["G"], "say \"hi\"");
        assert!(!values.contains_key("BAD"));
        assert_eq!(values["H"], "after");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let values = parse_env("URL=http://x/?a=b\n");
        assert_eq!(values["URL"], "http://x/?a=b");
    }

    #[test]
    fn test_bootstrap_creates_file_with_templates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sub").join(".env");

        let added = bootstrap_env_file(&path).unwrap();
        assert_eq!(added.len(), CONFIG_REGISTRY.len());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# da-story-edit environment configuration\n"));
        assert!(text.contains("# Example: http://localhost:8765/callback\nDA_REDIRECT_URI=\n"));
        assert!(text.ends_with("DA_CACHE_DIR=\n"));

        // Second pass adds nothing
        assert!(bootstrap_env_file(&path).unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_bootstrap_keeps_existing_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".env");
        fs::write(&path, "DA_CLIENT_ID=42").unwrap();

        let added = bootstrap_env_file(&path).unwrap();
        assert!(!added.contains(&"DA_CLIENT_ID".to_string()));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("DA_CLIENT_ID=42\n# OAuth2 client secret"));
        assert_eq!(read_env_file(&path).unwrap()["DA_CLIENT_ID"], "42");
    }

    #[test]
    fn test_upsert_replaces_and_appends() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".env");
        fs::write(&path, "# keep me\nOTHER=x\nDA_ACCESS_TOKEN=old\n").unwrap();

        upsert_env_values(
            &path,
            &[("DA_ACCESS_TOKEN", "new"), ("DA_REFRESH_TOKEN", "r1")],
        )
        .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "# keep me\nOTHER=x\nDA_ACCESS_TOKEN=new\n\nDA_REFRESH_TOKEN=r1\n"
        );
    }

    #[test]
    fn test_upsert_missing_file_bootstraps_first() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".env");
        upsert_env_values(&path, &[("DA_ACCESS_TOKEN", "tok")]).unwrap();

        let values = read_env_file(&path).unwrap();
        assert_eq!(values["DA_ACCESS_TOKEN"], "tok");
        assert_eq!(values["DA_CLIENT_ID"], "");
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(read_env_file(&tmp.path().join("none")).unwrap().is_empty());
    }
}
