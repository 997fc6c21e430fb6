//! Backup list formatting

use chrono::{DateTime, Utc};

use crate::backup::BackupInfo;

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Coarse age of a backup ("45s", "3h", "12d")
pub fn format_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(created_at).num_seconds().max(0);
    match seconds {
        s if s < 60 => format!("{}s", s),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s => format!("{}d", s / 86_400),
    }
}

/// Numbered list of backups, newest first
pub fn format_backup_list(backups: &[BackupInfo], now: DateTime<Utc>) -> String {
    if backups.is_empty() {
        return "No backups found.\nCreate one with: budget-lens backup create\n".to_string();
    }

    let mut output = String::new();
    for (i, backup) in backups.iter().enumerate() {
        output.push_str(&format!(
            "{:>3}. {} ({} ago, {})\n",
            i + 1,
            backup.filename,
            format_age(backup.created_at, now),
            format_size(backup.size_bytes)
        ));
    }
    output.push_str(&format!("\nTotal: {} backup(s)\n", backups.len()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::path::PathBuf;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_backup_list() {
        let now = Utc.with_ymd_and_hms(2025, 8, 20, 12, 0, 0).unwrap();
        let backups = vec![BackupInfo {
            filename: "backup-20250818-120000-000.json".into(),
            path: PathBuf::from("backup-20250818-120000-000.json"),
            created_at: now - Duration::days(2),
            size_bytes: 900,
            label: None,
        }];

        let out = format_backup_list(&backups, now);
        assert!(out.starts_with("  1. backup-20250818-120000-000.json (2d ago, 900 B)"));
        assert!(out.ends_with("Total: 1 backup(s)\n"));
        assert!(format_backup_list(&[], now).starts_with("No backups found."));
    }
}
