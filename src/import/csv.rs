use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{ImportError, ValidationError};
use crate::models::{Profile, Role, SessionEntry, WellnessEntry};

/// Wellness export row; blank cells are nulls
#[derive(Debug, Deserialize)]
struct WellnessRow {
    user_id: String,
    date: NaiveDate,
    bed_time: Option<String>,
    wake_time: Option<String>,
    sleep_quality: Option<u8>,
    fatigue: Option<u8>,
    soreness: Option<u8>,
    stress: Option<u8>,
    mood: Option<u8>,
    motivation: Option<u8>,
    bodyweight_kg: Option<String>,
    illness: Option<bool>,
    /// `part:value` pairs separated by `;`, e.g. `hamstring:6;calf:3`
    body_soreness: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionRow {
    user_id: String,
    date: NaiveDate,
    duration_minutes: u16,
    rpe: Option<u8>,
    session_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: String,
    display_name: String,
    role: Role,
    position: Option<String>,
    squad_number: Option<u8>,
    active: Option<bool>,
}

/// Reads backend table exports in CSV form
///
/// Rows go through the same validation as app submissions, so derived
/// fields (sleep hours, session load) are recomputed rather than trusted.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvImporter;

impl CsvImporter {
    pub fn new() -> Self {
        CsvImporter
    }

    fn open(path: &Path) -> Result<File, ImportError> {
        File::open(path).map_err(|_| ImportError::FileNotFound {
            path: path.to_path_buf(),
        })
    }

    fn read_rows<T, R>(reader: R, source: &Path) -> Result<Vec<(u64, T)>, ImportError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let parse_error = |row: u64, e: csv::Error| ImportError::ParseError {
            path: source.to_path_buf(),
            row,
            reason: e.to_string(),
        };

        let headers = csv_reader.headers().map_err(|e| parse_error(1, e))?.clone();

        let mut rows = Vec::new();
        // File line where each record starts; quoted cells may span lines
        let mut last_row = 1;
        for result in csv_reader.records() {
            let record = result.map_err(|e| {
                let row = e.position().map_or(last_row + 1, |p| p.line());
                parse_error(row, e)
            })?;
            let row = record.position().map_or(last_row + 1, |p| p.line());
            last_row = row;

            let parsed = record
                .deserialize::<T>(Some(&headers))
                .map_err(|e| parse_error(row, e))?;
            rows.push((row, parsed));
        }

        debug!(source = %source.display(), rows = rows.len(), "csv rows read");
        Ok(rows)
    }

    pub fn import_wellness(&self, path: &Path) -> Result<Vec<WellnessEntry>, ImportError> {
        let entries = self.read_wellness(Self::open(path)?, path)?;
        info!(file = %path.display(), entries = entries.len(), "wellness imported");
        Ok(entries)
    }

    pub fn import_sessions(&self, path: &Path) -> Result<Vec<SessionEntry>, ImportError> {
        let sessions = self.read_sessions(Self::open(path)?, path)?;
        info!(file = %path.display(), sessions = sessions.len(), "sessions imported");
        Ok(sessions)
    }

    pub fn import_profiles(&self, path: &Path) -> Result<Vec<Profile>, ImportError> {
        let profiles = self.read_profiles(Self::open(path)?, path)?;
        info!(file = %path.display(), profiles = profiles.len(), "profiles imported");
        Ok(profiles)
    }

    /// Read wellness rows from any reader; `source` is used in error messages
    pub fn read_wellness<R: Read>(&self, reader: R, source: &Path) -> Result<Vec<WellnessEntry>, ImportError> {
        let invalid = |row: u64, e: ValidationError| ImportError::InvalidRow {
            path: source.to_path_buf(),
            row,
            source: e,
        };

        let mut entries: Vec<WellnessEntry> = Vec::new();
        for (row, record) in Self::read_rows::<WellnessRow, R>(reader, source)? {
            crate::validation::ensure_first_submission(&entries, &record.user_id, record.date)
                .map_err(|e| invalid(row, e))?;

            let bodyweight_kg = record
                .bodyweight_kg
                .as_deref()
                .map(|value| {
                    Decimal::from_str(value).map_err(|_| ImportError::ParseError {
                        path: source.to_path_buf(),
                        row,
                        reason: format!("invalid bodyweight '{}'", value),
                    })
                })
                .transpose()?;

            let body_soreness = match record.body_soreness.as_deref() {
                Some(raw) => parse_body_soreness(raw).map_err(|reason| ImportError::ParseError {
                    path: source.to_path_buf(),
                    row,
                    reason,
                })?,
                None => BTreeMap::new(),
            };

            let entry = WellnessEntry {
                bed_time: record.bed_time,
                wake_time: record.wake_time,
                sleep_quality: record.sleep_quality,
                fatigue: record.fatigue,
                soreness: record.soreness,
                stress: record.stress,
                mood: record.mood,
                motivation: record.motivation,
                bodyweight_kg,
                illness: record.illness,
                body_soreness,
                notes: record.notes,
                ..WellnessEntry::new(record.user_id, record.date)
            }
            .submit()
            .map_err(|e| invalid(row, e))?;

            entries.push(entry);
        }

        Ok(entries)
    }

    pub fn read_sessions<R: Read>(&self, reader: R, source: &Path) -> Result<Vec<SessionEntry>, ImportError> {
        Self::read_rows::<SessionRow, R>(reader, source)?
            .into_iter()
            .map(|(row, record)| {
                SessionEntry {
                    session_type: record.session_type,
                    ..SessionEntry::new(record.user_id, record.date, record.duration_minutes, record.rpe)
                }
                .submit()
                .map_err(|e| ImportError::InvalidRow {
                    path: source.to_path_buf(),
                    row,
                    source: e,
                })
            })
            .collect()
    }

    pub fn read_profiles<R: Read>(&self, reader: R, source: &Path) -> Result<Vec<Profile>, ImportError> {
        Ok(Self::read_rows::<ProfileRow, R>(reader, source)?
            .into_iter()
            .map(|(_, record)| Profile {
                position: record.position,
                squad_number: record.squad_number,
                active: record.active.unwrap_or(true),
                ..Profile::new(record.id, record.display_name, record.role)
            })
            .collect())
    }
}

fn parse_body_soreness(raw: &str) -> Result<BTreeMap<String, u8>, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (part, value) = pair
                .split_once(':')
                .ok_or_else(|| format!("invalid body soreness '{}'", pair))?;
            let value = value
                .trim()
                .parse::<u8>()
                .map_err(|_| format!("invalid body soreness value '{}'", pair))?;
            Ok((part.trim().to_lowercase(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const WELLNESS_CSV: &str = "\
user_id,date,bed_time,wake_time,sleep_quality,fatigue,soreness,stress,mood,motivation,bodyweight_kg,illness,body_soreness,notes
p1,2024-09-22,23:00,07:00,8,3,2,2,9,,78.4,false,hamstring:6; calf:3,
p2,2024-09-22,,,5,7,6,4,6,5,,,,late night
";

    fn source() -> &'static Path {
        Path::new("wellness.csv")
    }

    #[test]
    fn test_read_wellness() {
        let importer = CsvImporter::new();
        let entries = importer.read_wellness(WELLNESS_CSV.as_bytes(), source()).unwrap();

        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.user_id, "p1");
        assert_eq!(first.sleep_hours, Some(8.0));
        assert_eq!(first.motivation, None);
        assert_eq!(first.bodyweight_kg, Some(dec!(78.4)));
        assert_eq!(first.illness, Some(false));
        assert_eq!(first.body_soreness.get("hamstring"), Some(&6));
        assert_eq!(first.body_soreness.get("calf"), Some(&3));
        assert_eq!(first.notes, None);

        let second = &entries[1];
        assert_eq!(second.bed_time, None);
        assert_eq!(second.sleep_hours, None);
        assert_eq!(second.notes.as_deref(), Some("late night"));
    }

    #[test]
    fn test_duplicate_wellness_day_rejected() {
        let csv = "\
user_id,date,bed_time,wake_time,sleep_quality,fatigue,soreness,stress,mood,motivation,bodyweight_kg,illness,body_soreness,notes
p1,2024-09-22,,,8,,,,,,,,,
p1,2024-09-22,,,6,,,,,,,,,
";
        let err = CsvImporter::new().read_wellness(csv.as_bytes(), source()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidRow {
                row: 3,
                source: ValidationError::AlreadySubmitted { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_row_reports_line() {
        let csv = "\
user_id,date,duration_minutes,rpe,session_type
p1,2024-09-22,60,7,pitch
p1,2024-09-22,45,12,gym
";
        let err = CsvImporter::new()
            .read_sessions(csv.as_bytes(), Path::new("sessions.csv"))
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidRow { row: 3, .. }));
    }

    #[test]
    fn test_multiline_note_keeps_file_lines() {
        let csv = "\
user_id,date,bed_time,wake_time,sleep_quality,fatigue,soreness,stress,mood,motivation,bodyweight_kg,illness,body_soreness,notes
p1,2024-09-22,23:00,07:00,8,3,2,2,9,,,,,\"slept badly
woke twice
tight calf\"
p2,2024-09-22,,,11,,,,,,,,,
";
        let err = CsvImporter::new().read_wellness(csv.as_bytes(), source()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidRow { row: 5, .. }));

        let valid = csv.replace(",11,", ",7,");
        let entries = CsvImporter::new().read_wellness(valid.as_bytes(), source()).unwrap();
        assert_eq!(
            entries[0].notes.as_deref(),
            Some("slept badly\nwoke twice\ntight calf")
        );
    }

    #[test]
    fn test_read_sessions_computes_load() {
        let csv = "\
user_id,date,duration_minutes,rpe,session_type
p1,2024-09-22,60,7,pitch
p1,2024-09-22,30,,recovery
";
        let sessions = CsvImporter::new()
            .read_sessions(csv.as_bytes(), Path::new("sessions.csv"))
            .unwrap();

        assert_eq!(sessions[0].load, Some(420.0));
        assert_eq!(sessions[0].session_type.as_deref(), Some("pitch"));
        assert_eq!(sessions[1].load, None);
    }

    #[test]
    fn test_unparseable_row() {
        let csv = "\
user_id,date,duration_minutes,rpe,session_type
p1,yesterday,60,7,
";
        let err = CsvImporter::new()
            .read_sessions(csv.as_bytes(), Path::new("sessions.csv"))
            .unwrap_err();
        assert!(matches!(err, ImportError::ParseError { row: 2, .. }));
    }

    #[test]
    fn test_import_profiles_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id,display_name,role,position,squad_number,active").unwrap();
        writeln!(file, "p1,Sam Carter,player,winger,11,").unwrap();
        writeln!(file, "s1,Coach Reid,staff,,,true").unwrap();
        writeln!(file, "p9,Old Boy,player,,,false").unwrap();

        let profiles = CsvImporter::new().import_profiles(file.path()).unwrap();

        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].role, Role::Player);
        assert_eq!(profiles[0].squad_number, Some(11));
        assert!(profiles[0].active);
        assert!(profiles[1].is_staff());
        assert!(!profiles[2].active);
    }

    #[test]
    fn test_missing_file() {
        let err = CsvImporter::new()
            .import_sessions(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound { .. }));
    }

    #[test]
    fn test_parse_body_soreness() {
        let map = parse_body_soreness("Quad:4;;groin : 2").unwrap();
        assert_eq!(map.get("quad"), Some(&4));
        assert_eq!(map.get("groin"), Some(&2));
        assert!(parse_body_soreness("knee").is_err());
    }
}
