use crate::error::ExportError;

/// Serialize any report structure to pretty JSON
pub fn to_json_string<T: serde::Serialize>(data: &T) -> Result<String, ExportError> {
    serde_json::to_string_pretty(data).map_err(|e| ExportError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::SquadAnalyzer;
    use crate::models::{Profile, Role, SessionEntry};
    use chrono::NaiveDate;

    #[test]
    fn test_snapshot_json() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 23).unwrap();
        let player = Profile::new("p1", "Sam Carter", Role::Player);
        let sessions = vec![SessionEntry::new("p1", date, 60, Some(7))];

        let snapshot = SquadAnalyzer::new().player_snapshot(&player, &[], &sessions, date);
        let json = to_json_string(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["player_id"], "p1");
        assert_eq!(value["load"]["weekly_load"], 420.0);
        assert_eq!(value["as_of"], "2024-09-23");
        assert!(value["readiness"].is_null());
    }
}
