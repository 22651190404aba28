//! Report exporters.
//!
//! The CSV layout is a shell contract for spreadsheet users:
//!
//! ```text
//! Message,,val1,val2,<identity columns A>,,<identity columns B>,
//! <message>,,"<value A>","<value B>",<identity values A>,,<identity values B>,
//! ```
//!
//! The two value fields are always quoted; every other field is quoted only
//! when it needs to be. Identity value slots for a side without rows stay
//! empty so every record has the header's field count.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use csv::QuoteStyle;

use tablemirror::{MirrorReport, Value};

use crate::error::ExportError;

/// `<YYYY-MM-DD HH:MM:SS>_results.csv`
pub fn report_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_results.csv", at.format("%Y-%m-%d %H:%M:%S"))
}

pub fn write_csv_report(report: &MirrorReport, mut writer: impl Write) -> Result<(), ExportError> {
    let ids_a = &report.meta.identity_columns_a;
    let ids_b = &report.meta.identity_columns_b;

    let mut header: Vec<&str> = vec!["Message", "", "val1", "val2"];
    header.extend(ids_a.iter().map(String::as_str));
    header.push("");
    header.extend(ids_b.iter().map(String::as_str));
    header.push("");
    let fields = header
        .iter()
        .map(|f| encode_field(f, QuoteStyle::Necessary))
        .collect::<Result<Vec<_>, _>>()?;
    writeln!(writer, "{}", fields.join(","))?;

    for d in &report.diagnostics {
        let mut fields = Vec::with_capacity(header.len());
        fields.push(encode_field(&d.message, QuoteStyle::Necessary)?);
        fields.push(String::new());
        // value columns are always quoted, even when empty
        fields.push(encode_field(&render(d.value_a.as_ref()), QuoteStyle::Always)?);
        fields.push(encode_field(&render(d.value_b.as_ref()), QuoteStyle::Always)?);
        push_identity(&mut fields, &d.identity_a, ids_a.len())?;
        fields.push(String::new());
        push_identity(&mut fields, &d.identity_b, ids_b.len())?;
        fields.push(String::new());
        writeln!(writer, "{}", fields.join(","))?;
    }

    writer.flush()?;
    Ok(())
}

/// One field in CSV form. Empty fields stay empty unless quoting is forced.
fn encode_field(field: &str, style: QuoteStyle) -> Result<String, ExportError> {
    if field.is_empty() && !matches!(style, QuoteStyle::Always) {
        return Ok(String::new());
    }
    let mut csv = csv::WriterBuilder::new()
        .quote_style(style)
        .from_writer(Vec::new());
    csv.write_field(field)?;
    let bytes = csv
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn render(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_default()
}

fn push_identity(fields: &mut Vec<String>, values: &[Value], width: usize) -> Result<(), ExportError> {
    for i in 0..width {
        fields.push(encode_field(&render(values.get(i)), QuoteStyle::Necessary)?);
    }
    Ok(())
}

/// Write the CSV report to `path`, creating parent directories.
pub fn write_csv_report_file(report: &MirrorReport, path: &Path) -> Result<(), ExportError> {
    let file = create(path)?;
    write_csv_report(report, BufWriter::new(file))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Write the CSV report into `dir` under its timestamped name.
pub fn write_csv_report_to_dir<Tz: TimeZone>(
    report: &MirrorReport,
    dir: &Path,
    at: &DateTime<Tz>,
) -> Result<PathBuf, ExportError>
where
    Tz::Offset: std::fmt::Display,
{
    let path = dir.join(report_file_name(at));
    write_csv_report_file(report, &path)?;
    Ok(path)
}

pub fn write_json_report(report: &MirrorReport, path: &Path) -> Result<(), ExportError> {
    let json = report.to_json_pretty()?;
    let mut file = create(path)?;
    file.write_all(json.as_bytes())?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn create(path: &Path) -> Result<File, ExportError> {
    let write_err = |e: std::io::Error| ExportError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    File::create(path).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use tablemirror::{FieldLink, Mirror, RowSet};

    fn report() -> MirrorReport {
        let mut a = RowSet::new(["uid", "amount"]);
        a.push(vec![Value::text("U1"), Value::Integer(10)]).unwrap();
        a.push(vec![Value::text("U3"), Value::Integer(100)]).unwrap();
        let mut b = RowSet::new(["id", "amount"]);
        b.push(vec![Value::text("U3"), Value::Integer(150)]).unwrap();

        Mirror::new(
            "export",
            vec![FieldLink::new("uid", "id").identity(), FieldLink::new("amount", "amount")],
        )
        .unwrap()
        .compare(a, b)
        .unwrap()
    }

    #[test]
    fn csv_layout() {
        let mut out = Vec::new();
        write_csv_report(&report(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Message,,val1,val2,uid,,id,",
                r#"Matching record not found,,"","",U1,,,"#,
                r#"Columns 'amount' and 'amount' values not match,,"100","150",U3,,U3,"#,
            ]
        );
    }

    #[test]
    fn csv_quotes_when_needed() {
        let mut a = RowSet::new(["uid", "note"]);
        a.push(vec![Value::text("U1"), Value::text("a,b")]).unwrap();
        let mut b = RowSet::new(["uid", "note"]);
        b.push(vec![Value::text("U1"), Value::text("say \"hi\"")]).unwrap();
        let report = Mirror::new(
            "q",
            vec![FieldLink::new("uid", "uid").identity(), FieldLink::new("note", "note")],
        )
        .unwrap()
        .compare(a, b)
        .unwrap();

        let mut out = Vec::new();
        write_csv_report(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#",,"a,b","say ""hi""",U1,,U1,"#), "{text}");
    }

    #[test]
    fn identity_fields_quoted_only_when_needed() {
        let mut a = RowSet::new(["uid"]);
        a.push(vec![Value::text("Smith, J")]).unwrap();
        let report = Mirror::new("q", vec![FieldLink::new("uid", "uid").identity()])
            .unwrap()
            .compare(a, RowSet::new(["uid"]))
            .unwrap();

        let mut out = Vec::new();
        write_csv_report(&report, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().nth(1),
            Some(r#"Matching record not found,,"","","Smith, J",,,"#)
        );
    }

    #[test]
    fn timestamped_file_name() {
        let at = Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2026, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 7)
                .unwrap(),
        );
        assert_eq!(report_file_name(&at), "2026-03-09 14:05:07_results.csv");
    }

    #[test]
    fn writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = report();
        let csv_path = write_csv_report_to_dir(&report, &dir.path().join("out"), &Utc::now()).unwrap();
        assert!(csv_path.file_name().unwrap().to_string_lossy().ends_with("_results.csv"));
        assert!(std::fs::read_to_string(&csv_path).unwrap().starts_with("Message,,"));

        let json_path = dir.path().join("report.json");
        write_json_report(&report, &json_path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["summary"]["divergent"], 2);
    }
}
