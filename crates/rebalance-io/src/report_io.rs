use rebalance_core::{RebalanceError, RebalanceResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Save any serializable value (typically a study report) as pretty JSON.
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> RebalanceResult<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| RebalanceError::Serialization(e.to_string()))?;
    fs::write(path, json).map_err(|source| RebalanceError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load a value previously written by [`save_json`].
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> RebalanceResult<T> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| RebalanceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|e| RebalanceError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Summary {
        name: String,
        accuracy: f64,
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let s = Summary {
            name: "smote + forest".into(),
            accuracy: 0.84,
        };
        save_json(&s, &path).unwrap();
        let back: Summary = load_json(&path).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_load_garbage_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = load_json::<Summary>(&path).unwrap_err();
        assert!(matches!(err, RebalanceError::Serialization(_)));
    }
}
