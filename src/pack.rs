//! Configuration data consumed by a reload.
//!
//! A data pack is a set of named JSON records: family definitions keyed by an
//! arbitrary record name, and translation tables keyed by language code. On
//! disk, these live in the `families/` and `translations/` directories of the
//! pack, one `.json` file per record.

use std::{
    fs,
    path::{Path, PathBuf},
};

/// Errors that may occur when reading a data pack from disk.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pack directory could not be read.
    #[error("{1}: I/O error: {0}")]
    Io(std::io::Error, PathBuf),
}

/// Named configuration records.
#[derive(Clone, Debug, Default)]
pub struct DataPack {
    /// Family records by record name, in load order.
    pub families: Vec<(String, serde_json::Value)>,
    /// Translation tables by language code, in load order.
    pub translations: Vec<(String, serde_json::Value)>,
}

impl DataPack {
    /// The family directory inside a pack.
    const FAMILY_DIR: &'static str = "families";
    /// The translation directory inside a pack.
    const TRANSLATION_DIR: &'static str = "translations";

    /// Adds a family record.
    #[must_use]
    pub fn with_family(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.families.push((name.into(), value));
        self
    }

    /// Adds a translation table.
    #[must_use]
    pub fn with_translation(
        mut self,
        language: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.translations.push((language.into(), value));
        self
    }

    /// Reads a pack from a directory.
    ///
    /// The family directory must exist. Files which cannot be read or parsed
    /// are logged and skipped.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let families = read_records(&path.join(Self::FAMILY_DIR), true)?;
        let translations = read_records(&path.join(Self::TRANSLATION_DIR), false)?;
        log::debug!(
            "Read {} family and {} translation records from {}",
            families.len(),
            translations.len(),
            path.display()
        );
        Ok(Self {
            families,
            translations,
        })
    }
}

/// Reads every `.json` file in `dir`, sorted by name, as a record named by
/// the file stem.
fn read_records(dir: &Path, required: bool) -> Result<Vec<(String, serde_json::Value)>, Error> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Vec::new());
        }
        Err(err) => return Err(Error::Io(err, dir.to_path_buf())),
    };

    let mut paths = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect::<Vec<_>>();
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            log::warn!("{}: skipping file with a non-UTF-8 name", path.display());
            continue;
        };

        let value = fs::read(&path).map_err(|err| err.to_string()).and_then(|data| {
            serde_json::from_slice::<serde_json::Value>(&data).map_err(|err| err.to_string())
        });
        match value {
            Ok(value) => records.push((name.to_string(), value)),
            Err(err) => log::warn!("{}: skipping unreadable record: {err}", path.display()),
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A scratch directory which is removed on drop.
    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!("heywiki-{name}-{}", std::process::id()));
            let _ = fs::remove_dir_all(&path);
            fs::create_dir_all(&path).unwrap();
            Self(path)
        }

        fn write(&self, name: &str, data: &str) {
            let path = self.0.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, data).unwrap();
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn from_dir() {
        let scratch = Scratch::new("from-dir");
        scratch.write("families/b.json", r#"{ "namespaces": ["b"], "wikis": [] }"#);
        scratch.write("families/a.json", r#"{ "namespaces": ["a"], "wikis": [] }"#);
        scratch.write("families/broken.json", "{ nope");
        scratch.write("families/readme.txt", "ignored");
        scratch.write("translations/en_us.json", r#"{ "block.minecraft.stone": "Stone" }"#);

        let pack = DataPack::from_dir(&scratch.0).unwrap();
        let names = pack.families.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(
            pack.translations,
            [("en_us".to_string(), json!({ "block.minecraft.stone": "Stone" }))]
        );
    }

    #[test]
    fn missing_directories() {
        let scratch = Scratch::new("missing");
        assert!(matches!(DataPack::from_dir(&scratch.0), Err(Error::Io(..))));

        scratch.write("families/a.json", r#"{ "namespaces": ["a"], "wikis": [] }"#);
        let pack = DataPack::from_dir(&scratch.0).unwrap();
        assert_eq!(pack.families.len(), 1);
        assert!(pack.translations.is_empty(), "translations are optional");
    }
}
