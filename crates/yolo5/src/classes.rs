//! Class-index → class-name table
//!
//! Loaded once at startup from the `names` key of the YOLOv5 dataset YAML.
//! Both layouts YOLOv5 has shipped are accepted:
//!
//! ```yaml
//! names: ['person', 'bicycle', 'car']
//! ```
//!
//! ```yaml
//! names:
//!   0: person
//!   1: bicycle
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use figment::providers::{Format, Yaml};
use figment::Figment;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassTableError {
    #[error("failed to read class names from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: figment::Error,
    },

    #[error("class index '{0}' is not a non-negative integer")]
    BadIndex(String),

    #[error("class table is missing index {0}")]
    Gap(usize),

    #[error("class table is empty")]
    Empty,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNames {
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassTable {
    names: Vec<String>,
}

impl ClassTable {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Reads the `names` key of a YOLOv5 dataset YAML
    pub fn load(path: &Path) -> Result<Self, ClassTableError> {
        let raw: RawNames = Figment::from(Yaml::file(path))
            .extract_inner("names")
            .map_err(|source| ClassTableError::Load {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawNames) -> Result<Self, ClassTableError> {
        let names = match raw {
            RawNames::List(names) => names,
            RawNames::Map(map) => {
                let mut indexed = map
                    .into_iter()
                    .map(|(key, name)| {
                        key.trim()
                            .parse::<usize>()
                            .map(|index| (index, name))
                            .map_err(|_| ClassTableError::BadIndex(key))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                indexed.sort_by_key(|(index, _)| *index);

                let mut names = Vec::with_capacity(indexed.len());
                for (expected, (index, name)) in indexed.into_iter().enumerate() {
                    if index != expected {
                        return Err(ClassTableError::Gap(expected));
                    }
                    names.push(name);
                }
                names
            }
        };

        if names.is_empty() {
            return Err(ClassTableError::Empty);
        }
        Ok(Self { names })
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_list_form() {
        let file = yaml_file("path: ../datasets/coco128\nnc: 3\nnames: ['person', 'bicycle', 'car']\n");
        let table = ClassTable::load(file.path()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.name(0), Some("person"));
        assert_eq!(table.name(2), Some("car"));
        assert_eq!(table.name(3), None);
    }

    #[test]
    fn test_load_map_form() {
        let file = yaml_file("names:\n  0: person\n  1: bicycle\n  2: car\n  10: fire hydrant\n");
        let err = ClassTable::load(file.path()).unwrap_err();
        assert!(matches!(err, ClassTableError::Gap(3)));

        let file = yaml_file("names:\n  1: bicycle\n  0: person\n");
        let table = ClassTable::load(file.path()).unwrap();
        assert_eq!(table.name(0), Some("person"));
        assert_eq!(table.name(1), Some("bicycle"));
    }

    #[test]
    fn test_missing_file_fails() {
        let err = ClassTable::load(Path::new("/no/such/coco128.yaml")).unwrap_err();
        assert!(matches!(err, ClassTableError::Load { .. }));
    }

    #[test]
    fn test_missing_names_key_fails() {
        let file = yaml_file("nc: 80\n");
        assert!(ClassTable::load(file.path()).is_err());
    }
}
