//! Class-name reference table shipped alongside the audio-event model.

use std::path::Path;

use crate::error::{Error, Result};

/// Ordered display names, one per model output column. Loaded once at
/// startup; index i names column i of the score matrix.
#[derive(Debug, Clone)]
pub struct ClassMap {
    names: Vec<String>,
}

impl ClassMap {
    /// Load the `display_name` column from the model's class-map CSV
    /// (the YAMNet format: `index,mid,display_name`).
    pub fn from_csv_file(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            Error::ModelNotAvailable(format!("class map {}: {e}", path.display()))
        })?;

        let headers = reader
            .headers()
            .map_err(|e| Error::ModelNotAvailable(format!("class map header: {e}")))?;
        let column = headers
            .iter()
            .position(|h| h == "display_name")
            .ok_or_else(|| {
                Error::ModelNotAvailable("class map has no display_name column".into())
            })?;

        let mut names = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| Error::ModelNotAvailable(format!("class map row: {e}")))?;
            let name = record.get(column).ok_or_else(|| {
                Error::ModelNotAvailable(format!("class map row {} too short", names.len() + 1))
            })?;
            names.push(name.to_string());
        }

        if names.is_empty() {
            return Err(Error::ModelNotAvailable("class map is empty".into()));
        }

        Ok(Self { names })
    }

    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_display_names_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "index,mid,display_name").unwrap();
        writeln!(file, "0,/m/09x0r,Speech").unwrap();
        writeln!(file, "1,/m/05zppz,\"Male speech, man speaking\"").unwrap();
        writeln!(file, "2,/m/0bt9lr,Dog").unwrap();

        let map = ClassMap::from_csv_file(file.path()).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.names()[0], "Speech");
        // Quoted names with embedded commas survive.
        assert_eq!(map.names()[1], "Male speech, man speaking");
        assert_eq!(map.names()[2], "Dog");
    }

    #[test]
    fn missing_column_is_a_model_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "index,mid,name").unwrap();
        writeln!(file, "0,/m/09x0r,Speech").unwrap();

        assert!(matches!(
            ClassMap::from_csv_file(file.path()),
            Err(Error::ModelNotAvailable(_))
        ));
    }

    #[test]
    fn empty_file_is_a_model_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "index,mid,display_name").unwrap();

        assert!(ClassMap::from_csv_file(file.path()).is_err());
    }
}
