//! Roll-call export files: one plain-text artifact per session.
//!
//! Layout: a title line, a separator line, then one line per student in the
//! form `Name: <name> (<regno>) - <status>`. The session date is carried in
//! the filename as the token before the first `_`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub student_name: String,
    pub regno: String,
    pub status: String,
}

#[derive(Debug, Default)]
pub struct ParsedExport {
    pub records: Vec<ExportRecord>,
    /// Data lines that did not match the line grammar and were dropped.
    pub skipped_lines: usize,
    /// True when the file had no data section at all (fewer than 2 lines).
    pub empty: bool,
}

pub fn export_filename(date: &str) -> String {
    format!("{}_rollcall.txt", date)
}

/// Date token for display: everything before the first `_`, or the whole
/// filename when it has no `_`.
pub fn date_token(filename: &str) -> &str {
    filename.split('_').next().unwrap_or(filename)
}

pub fn render_export(date: &str, records: &[ExportRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Attendance - {}\n", date));
    out.push_str("------------------------------\n");
    for r in records {
        out.push_str(&format!(
            "Name: {} ({}) - {}\n",
            r.student_name, r.regno, r.status
        ));
    }
    out
}

/// Parse export file content back into records.
///
/// The first two lines (title + separator) are skipped at a fixed offset,
/// never detected. A data line must split on `" - "` into exactly two parts
/// and carry a `Name: ... (<regno>)` left side; anything else is dropped and
/// counted, and parsing continues with the next line.
pub fn parse_export(content: &str) -> ParsedExport {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 2 {
        return ParsedExport {
            empty: true,
            ..Default::default()
        };
    }

    let mut parsed = ParsedExport::default();
    for raw in &lines[2..] {
        let line = raw.trim();
        let parts: Vec<&str> = line.split(" - ").collect();
        if parts.len() != 2 {
            parsed.skipped_lines += 1;
            continue;
        }

        let info: Vec<&str> = parts[0].split('(').collect();
        if info.len() < 2 {
            parsed.skipped_lines += 1;
            continue;
        }
        let Some(name) = info[0].split(": ").nth(1) else {
            parsed.skipped_lines += 1;
            continue;
        };
        let regno = info[1].replace(')', "");

        parsed.records.push(ExportRecord {
            student_name: name.trim().to_string(),
            regno: regno.trim().to_string(),
            status: parts[1].trim().to_string(),
        });
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, regno: &str, status: &str) -> ExportRecord {
        ExportRecord {
            student_name: name.to_string(),
            regno: regno.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn parse_well_formed_file() {
        let content = "Title\n---\nName: Ann Lee (R001) - Present\nName: Bo Tan (R002) - Absent\n";
        let parsed = parse_export(content);
        assert!(!parsed.empty);
        assert_eq!(parsed.skipped_lines, 0);
        assert_eq!(
            parsed.records,
            vec![rec("Ann Lee", "R001", "Present"), rec("Bo Tan", "R002", "Absent")]
        );
    }

    #[test]
    fn parse_header_only_yields_no_records() {
        let parsed = parse_export("Attendance - 2024-05-01\n---\n");
        assert!(!parsed.empty);
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.skipped_lines, 0);
    }

    #[test]
    fn short_file_sets_empty_flag() {
        for content in ["", "just a title\n"] {
            let parsed = parse_export(content);
            assert!(parsed.empty, "{:?} should be empty", content);
            assert!(parsed.records.is_empty());
        }
    }

    #[test]
    fn malformed_lines_are_dropped_and_counted() {
        let content = "Title\n---\n\
            Name: Ann Lee (R001) - Present\n\
            no separator here\n\
            a - b - c\n\
            missing paren R003 - Present\n\
            no name prefix (R004) - Present\n\
            Name: Bo Tan (R002) - Absent\n";
        let parsed = parse_export(content);
        assert_eq!(
            parsed.records,
            vec![rec("Ann Lee", "R001", "Present"), rec("Bo Tan", "R002", "Absent")]
        );
        assert_eq!(parsed.skipped_lines, 4);
    }

    #[test]
    fn blank_data_line_is_counted_as_skipped() {
        let parsed = parse_export("Title\n---\n\nName: Ann Lee (R001) - Present\n");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.skipped_lines, 1);
    }

    #[test]
    fn status_is_an_open_set() {
        let parsed = parse_export("Title\n---\nName: Ann Lee (R001) - Late\n");
        assert_eq!(parsed.records, vec![rec("Ann Lee", "R001", "Late")]);
    }

    #[test]
    fn date_token_from_filename() {
        assert_eq!(date_token("2024-05-01_rollcall.txt"), "2024-05-01");
        assert_eq!(date_token("2024-05-01_extra_parts.txt"), "2024-05-01");
        assert_eq!(date_token("nodate.txt"), "nodate.txt");
    }

    #[test]
    fn render_then_parse_preserves_records() {
        let records = vec![rec("Ann Lee", "R001", "Present"), rec("Bo Tan", "R002", "Absent")];
        let content = render_export("2024-05-01", &records);
        let parsed = parse_export(&content);
        assert_eq!(parsed.records, records);
        assert_eq!(parsed.skipped_lines, 0);
    }

    #[test]
    fn export_filename_carries_date_token() {
        let name = export_filename("2024-05-01");
        assert_eq!(date_token(&name), "2024-05-01");
    }
}
