use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON scenario file and deserialise it.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let resolved = resolve_path(path)?;
    let contents = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?;
    Ok(value)
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !resolved.exists() {
        return Err(format!("File not found: {}", resolved.display()).into());
    }
    if !resolved.is_file() {
        return Err(format!("Not a file: {}", resolved.display()).into());
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_proforma_core::proforma::ModelConfig;

    #[test]
    fn test_read_json_file() {
        let path = std::env::temp_dir().join(format!("pf_cli_cfg_{}.json", std::process::id()));
        fs::write(&path, r#"{"discount_rate": "0.09"}"#).unwrap();
        let cfg: ModelConfig = read_json(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.discount_rate.to_string(), "0.09");
        assert_eq!(cfg.project_life_years, 25);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_and_directory_rejected() {
        let missing = std::env::temp_dir().join("pf_cli_definitely_missing.json");
        let err = read_json::<ModelConfig>(missing.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("File not found"));

        let dir = std::env::temp_dir();
        let err = read_json::<ModelConfig>(dir.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("Not a file"));
    }
}
