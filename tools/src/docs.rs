//! Documentation blob loader.
//!
//! Reads the JSON object from disk once at startup and hands it to
//! [`pinelint_core::reference::ReferenceIndex::from_json`] — the core crate
//! never touches the filesystem itself.

use std::fs;
use std::path::Path;

use pinelint_core::reference::ReferenceIndex;

use crate::error::{ToolsError, ToolsResult};

pub fn load_reference_index(path: &Path) -> ToolsResult<ReferenceIndex> {
    let blob = fs::read_to_string(path).map_err(|e| ToolsError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    ReferenceIndex::from_json(&blob).map_err(|e| ToolsError::InvalidDocsBlob(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_entries_keyed_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"{{"ta_macd": {{"title": "ta.macd", "type": "function", "content": "MACD", "tags": ["indicator"], "examples": [], "canonical_name": "ta.macd"}}}}"#
        )
        .unwrap();

        let index = load_reference_index(&path).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.by_canonical_name("ta.macd").is_some());
    }

    #[test]
    fn missing_file_is_an_error() {
        let missing = Path::new("/nonexistent/pinelint/docs.json");
        assert!(load_reference_index(missing).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_reference_index(&path).is_err());
    }
}
