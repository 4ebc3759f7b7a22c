use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::ImportError;
use crate::models::{Profile, SessionEntry, WellnessEntry};

pub mod csv;

pub use self::csv::CsvImporter;

pub const PROFILES_FILE: &str = "profiles.csv";
pub const WELLNESS_FILE: &str = "wellness.csv";
pub const SESSIONS_FILE: &str = "sessions.csv";

/// Rows for a squad as exported from the backend tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSet {
    pub profiles: Vec<Profile>,
    pub wellness: Vec<WellnessEntry>,
    pub sessions: Vec<SessionEntry>,
}

impl DataSet {
    /// Load `profiles.csv`, `wellness.csv` and `sessions.csv` from a directory
    ///
    /// Profiles are required. A missing wellness or sessions file is treated
    /// as an empty table.
    pub fn load_dir(dir: &Path) -> Result<Self, ImportError> {
        let importer = CsvImporter::new();

        let profiles = importer.import_profiles(&dir.join(PROFILES_FILE))?;
        let wellness = Self::optional(dir.join(WELLNESS_FILE), |p| importer.import_wellness(p))?;
        let sessions = Self::optional(dir.join(SESSIONS_FILE), |p| importer.import_sessions(p))?;

        Ok(DataSet {
            profiles,
            wellness,
            sessions,
        })
    }

    fn optional<T>(
        path: PathBuf,
        import: impl Fn(&Path) -> Result<Vec<T>, ImportError>,
    ) -> Result<Vec<T>, ImportError> {
        if path.exists() {
            import(&path)
        } else {
            warn!(file = %path.display(), "data file missing, treating as empty");
            Ok(Vec::new())
        }
    }

    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_dir_with_optional_files() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(PROFILES_FILE),
            "id,display_name,role,position,squad_number,active\np1,Sam Carter,player,,,\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(SESSIONS_FILE),
            "user_id,date,duration_minutes,rpe,session_type\np1,2024-09-22,60,7,\n",
        )
        .unwrap();

        let data = DataSet::load_dir(dir.path()).unwrap();

        assert_eq!(data.profiles.len(), 1);
        assert!(data.wellness.is_empty());
        assert_eq!(data.sessions.len(), 1);
        assert!(data.profile("p1").is_some());
        assert!(data.profile("p2").is_none());
    }

    #[test]
    fn test_load_dir_requires_profiles() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            DataSet::load_dir(dir.path()),
            Err(ImportError::FileNotFound { .. })
        ));
    }
}
