//! Identity types shared across the scheduling engine.

crate::define_key_type!(TeamId);
crate::define_key_type!(StudentId);
crate::define_key_type!(FacultyId);
crate::define_key_type!(PanelId);

crate::define_id_type!(i64, ScheduleRecordId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_order_lexicographically() {
        let mut ids = vec![TeamId::from("T10"), TeamId::from("T02"), TeamId::from("T1")];
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(TeamId::as_str).collect();
        assert_eq!(ordered, vec!["T02", "T1", "T10"]);
    }

    #[test]
    fn test_key_serializes_as_plain_string() {
        let id = FacultyId::new("F-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"F-7\"");
        let back: FacultyId = serde_json::from_str("\"F-7\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(ScheduleRecordId::new(42).to_string(), "42");
        assert_eq!(ScheduleRecordId::from(3).value(), 3);
    }
}
