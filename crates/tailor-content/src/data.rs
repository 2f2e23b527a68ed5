//! The data cascade.
//!
//! Page data is layered lowest to highest: global data files in `_data/`,
//! directory data files from the outermost directory inwards, then the page's
//! own frontmatter.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::ContentError;

/// Directory holding global data files, relative to the input directory.
pub const GLOBAL_DATA_DIR: &str = "_data";

/// Merge `source` into `target`.
///
/// A shallow merge replaces top-level keys. A deep merge recurses into objects
/// and concatenates arrays; any other value replaces what was there.
pub fn merge(target: &mut Value, source: Value, deep: bool) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                if deep {
                    if let Some(existing) = target.get_mut(&key) {
                        merge(existing, value, true);
                        continue;
                    }
                }
                target.insert(key, value);
            }
        }
        (Value::Array(target), Value::Array(source)) if deep => target.extend(source),
        (target, source) => *target = source,
    }
}

/// Resolves the layered data for each page.
#[derive(Debug)]
pub struct DataCascade {
    input_dir: PathBuf,
    global: Map<String, Value>,
    directories: HashMap<PathBuf, Option<Value>>,
    deep: bool,
}

impl DataCascade {
    /// Load global data from `<input>/_data/*.json`, keyed by file stem.
    pub fn load(input_dir: &Path, deep: bool) -> Result<Self, ContentError> {
        let mut global = Map::new();
        let data_dir = input_dir.join(GLOBAL_DATA_DIR);

        if data_dir.is_dir() {
            let entries = fs::read_dir(&data_dir).map_err(|e| ContentError::Read {
                path: data_dir.display().to_string(),
                message: e.to_string(),
            })?;

            let mut files: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            files.sort();

            for path in files {
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let value = read_json(&path)?;
                tracing::debug!("Loaded global data `{}`", stem);
                global.insert(stem.to_string(), value);
            }
        }

        Ok(Self {
            input_dir: input_dir.to_path_buf(),
            global,
            directories: HashMap::new(),
            deep,
        })
    }

    pub fn global(&self) -> &Map<String, Value> {
        &self.global
    }

    /// Data for the page at `relative` (relative to the input directory) with
    /// the given frontmatter.
    pub fn data_for(
        &mut self,
        relative: &Path,
        frontmatter: Map<String, Value>,
    ) -> Result<Value, ContentError> {
        let mut data = Value::Object(self.global.clone());

        let mut dirs: Vec<&Path> = relative
            .ancestors()
            .skip(1)
            .filter(|d| !d.as_os_str().is_empty())
            .collect();
        dirs.reverse();

        for dir in dirs {
            if let Some(dir_data) = self.directory_data(dir)? {
                merge(&mut data, dir_data, self.deep);
            }
        }

        merge(&mut data, Value::Object(frontmatter), self.deep);
        Ok(data)
    }

    /// `<dir>/<dirname>.json`, read once per directory.
    fn directory_data(&mut self, dir: &Path) -> Result<Option<Value>, ContentError> {
        if let Some(cached) = self.directories.get(dir) {
            return Ok(cached.clone());
        }

        let value = match dir.file_name() {
            Some(name) => {
                let mut file_name = name.to_os_string();
                file_name.push(".json");
                let path = self.input_dir.join(dir).join(file_name);
                if path.is_file() {
                    Some(read_json(&path)?)
                } else {
                    None
                }
            }
            None => None,
        };

        self.directories.insert(dir.to_path_buf(), value.clone());
        Ok(value)
    }
}

fn read_json(path: &Path) -> Result<Value, ContentError> {
    let content = fs::read_to_string(path).map_err(|e| ContentError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| ContentError::Data {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn shallow_merge_replaces_top_level_keys() {
        let mut target = json!({ "a": { "x": 1 }, "tags": ["one"] });

        merge(&mut target, json!({ "a": { "y": 2 }, "tags": ["two"] }), false);

        assert_eq!(target, json!({ "a": { "y": 2 }, "tags": ["two"] }));
    }

    #[test]
    fn deep_merge_recurses_and_concatenates() {
        let mut target = json!({ "a": { "x": 1 }, "tags": ["one"], "n": 1 });

        merge(
            &mut target,
            json!({ "a": { "y": 2 }, "tags": ["two"], "n": "replaced" }),
            true,
        );

        assert_eq!(
            target,
            json!({ "a": { "x": 1, "y": 2 }, "tags": ["one", "two"], "n": "replaced" })
        );
    }

    #[test]
    fn layers_global_directory_and_frontmatter() {
        let temp = tempdir().unwrap();
        let input = temp.path();
        fs::create_dir_all(input.join("_data")).unwrap();
        fs::create_dir_all(input.join("docs/guides")).unwrap();
        fs::write(input.join("_data/site.json"), r#"{ "name": "Tailor" }"#).unwrap();
        fs::write(
            input.join("docs/docs.json"),
            r#"{ "layout": "doc.html", "tags": ["docs"] }"#,
        )
        .unwrap();
        fs::write(
            input.join("docs/guides/guides.json"),
            r#"{ "tags": ["guides"] }"#,
        )
        .unwrap();

        let mut cascade = DataCascade::load(input, true).unwrap();
        let mut frontmatter = Map::new();
        frontmatter.insert("title".into(), json!("Intro"));
        frontmatter.insert("tags".into(), json!(["featured"]));

        let data = cascade
            .data_for(Path::new("docs/guides/intro.md"), frontmatter)
            .unwrap();

        assert_eq!(data["site"]["name"], "Tailor");
        assert_eq!(data["layout"], "doc.html");
        assert_eq!(data["title"], "Intro");
        assert_eq!(data["tags"], json!(["docs", "guides", "featured"]));
    }

    #[test]
    fn rejects_malformed_data_files() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("_data")).unwrap();
        fs::write(temp.path().join("_data/broken.json"), "{ nope").unwrap();

        let err = DataCascade::load(temp.path(), false).unwrap_err();

        assert!(matches!(err, ContentError::Data { .. }));
    }
}
