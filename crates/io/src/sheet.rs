//! Check-in sheet import (xlsx and csv).
//!
//! The xlsx layout follows the ticketing platform's attendance export:
//! session metadata in the header block, one ticket per row from row 9
//! onward, reading stops at the first fully empty row.

use std::fmt;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use tally_core::{session_span, AttendanceBlock, CheckinRecord, TimeBlock};

// Ticket-row layout of the attendance export (0-based columns).
const COL_CHECKED_IN: usize = 10;
const COL_CHECKIN_TIME: usize = 11;
const COL_STUDENT_ID: usize = 16;

/// First ticket row, 0-based. Rows 1-8 are the export's header block.
const FIRST_TICKET_ROW: usize = 8;

/// Header cells carrying the session start and end, 0-based (A6 and A7).
const META_START_ROW: usize = 5;
const META_END_ROW: usize = 6;

#[derive(Debug)]
pub enum SheetError {
    /// File could not be opened or read.
    Io(String),
    /// Workbook or CSV structure could not be parsed.
    Parse(String),
    /// Parsed fine but carries no usable session span.
    NoSpan(String),
    /// Extension is neither xlsx-family nor csv.
    UnsupportedFormat(String),
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "sheet IO error: {msg}"),
            Self::Parse(msg) => write!(f, "sheet parse error: {msg}"),
            Self::NoSpan(name) => {
                write!(f, "sheet '{name}' has no session span and no check-in timestamps")
            }
            Self::UnsupportedFormat(ext) => write!(f, "unsupported sheet format '{ext}'"),
        }
    }
}

impl std::error::Error for SheetError {}

/// One imported check-in sheet: the session it describes plus its raw
/// ticket records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinSheet {
    pub name: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub records: Vec<CheckinRecord>,
}

impl CheckinSheet {
    /// Load a sheet, dispatching on the file extension.
    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xls" | "xlsb" | "ods" => Self::load_xlsx(path),
            "csv" => Self::load_csv(path),
            other => Err(SheetError::UnsupportedFormat(other.to_string())),
        }
    }

    /// The sheet as an attendance list over its session block.
    pub fn attendance_block(&self, title: impl Into<String>) -> AttendanceBlock {
        let block = TimeBlock {
            title: title.into(),
            date: self.date,
            start: self.start,
            end: self.end,
        };
        AttendanceBlock::from_records(block, &self.records)
    }

    // -----------------------------------------------------------------------
    // xlsx
    // -----------------------------------------------------------------------

    fn load_xlsx(path: &Path) -> Result<Self, SheetError> {
        let mut workbook = open_workbook_auto(path).map_err(|e| SheetError::Io(e.to_string()))?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SheetError::Parse("workbook has no sheets".into()))?;
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| SheetError::Parse(e.to_string()))?;

        let rows: Vec<&[Data]> = range.rows().collect();
        let mut records = Vec::new();
        for row in rows.iter().skip(FIRST_TICKET_ROW) {
            if row.iter().all(|cell| matches!(cell, Data::Empty)) {
                break;
            }
            records.push(ticket_record(row)?);
        }

        // Session span from the header block when the export carries it,
        // else from the check-in timestamp extremes.
        let meta_span = match (cell_datetime(&rows, META_START_ROW), cell_datetime(&rows, META_END_ROW)) {
            (Some(start), Some(end)) => Some((start.date(), start.time(), end.time())),
            _ => None,
        };
        let (date, start, end) = meta_span
            .or_else(|| session_span(&records))
            .ok_or_else(|| SheetError::NoSpan(sheet_name.clone()))?;

        Ok(Self { name: sheet_name, date, start, end, records })
    }

    // -----------------------------------------------------------------------
    // csv
    // -----------------------------------------------------------------------

    fn load_csv(path: &Path) -> Result<Self, SheetError> {
        let content = read_file_as_utf8(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("sheet")
            .to_string();
        Self::from_csv_str(name, &content)
    }

    /// Parse the csv form: headers `name,checkedin,checkin_time,student_id`.
    /// The session span comes from the timestamp extremes.
    pub fn from_csv_str(name: String, content: &str) -> Result<Self, SheetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(content.as_bytes());

        let headers = reader.headers().map_err(|e| SheetError::Parse(e.to_string()))?;
        let col = |field: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(field))
                .ok_or_else(|| SheetError::Parse(format!("missing column '{field}'")))
        };
        let checked_in_col = col("checkedin")?;
        let time_col = col("checkin_time")?;
        let id_col = col("student_id")?;

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result.map_err(|e| SheetError::Parse(e.to_string()))?;
            let checked_in = row
                .get(checked_in_col)
                .map(truthy)
                .unwrap_or(false);
            let checked_in_at = match row.get(time_col).filter(|s| !s.is_empty()) {
                Some(raw) => Some(parse_timestamp(raw)?),
                None => None,
            };
            let student_id = row
                .get(id_col)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            records.push(CheckinRecord { student_id, checked_in, checked_in_at });
        }

        let (date, start, end) =
            session_span(&records).ok_or_else(|| SheetError::NoSpan(name.clone()))?;

        Ok(Self { name, date, start, end, records })
    }
}

/// One ticket row into a check-in record: checked-in flag, optional
/// check-in timestamp, optional student id.
fn ticket_record(row: &[Data]) -> Result<CheckinRecord, SheetError> {
    let checked_in = matches!(row.get(COL_CHECKED_IN), Some(Data::String(s)) if s == "Sim");

    let checked_in_at = match row.get(COL_CHECKIN_TIME) {
        Some(Data::String(s)) if !s.is_empty() => Some(parse_timestamp(s)?),
        Some(cell) => cell.as_datetime(),
        None => None,
    };

    // Student ids arrive as numeric cells; render without the float tail.
    let student_id = match row.get(COL_STUDENT_ID) {
        Some(Data::Float(n)) => Some(format!("{}", *n as i64)),
        Some(Data::Int(n)) => Some(n.to_string()),
        Some(Data::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    };

    Ok(CheckinRecord { student_id, checked_in, checked_in_at })
}

fn cell_datetime(rows: &[&[Data]], row: usize) -> Option<NaiveDateTime> {
    rows.get(row)?.first()?.as_datetime()
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, SheetError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| SheetError::Parse(format!("bad check-in timestamp '{raw}'")))
}

fn truthy(field: &str) -> bool {
    matches!(field.to_ascii_lowercase().as_str(), "true" | "yes" | "sim" | "1")
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252 exports).
fn read_file_as_utf8(path: &Path) -> Result<String, SheetError> {
    let mut file = std::fs::File::open(path).map_err(|e| SheetError::Io(e.to_string()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| SheetError::Io(e.to_string()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    const SAMPLE: &str = "\
name,checkedin,checkin_time,student_id
Ana,true,2019-09-30 10:12:00,14200743
Bia,true,2019-09-30 09:58:00,15100643
Caio,false,,16100999
Dora,true,2019-09-30 11:47:00,
";

    #[test]
    fn csv_span_from_timestamp_extremes() {
        let sheet = CheckinSheet::from_csv_str("week1".into(), SAMPLE).unwrap();
        assert_eq!(sheet.date, NaiveDate::from_ymd_opt(2019, 9, 30).unwrap());
        assert_eq!(sheet.start, t(9, 58));
        assert_eq!(sheet.end, t(11, 47));
        assert_eq!(sheet.records.len(), 4);
    }

    #[test]
    fn csv_attendance_block_keeps_checked_in_with_ids() {
        // Caio never checked in, Dora has no student id: both dropped.
        let sheet = CheckinSheet::from_csv_str("week1".into(), SAMPLE).unwrap();
        let att = sheet.attendance_block("Week 1");
        assert_eq!(att.block.title, "Week 1");
        assert_eq!(att.attenders.iter().collect::<Vec<_>>(), vec!["14200743", "15100643"]);
    }

    #[test]
    fn csv_missing_column_is_fatal() {
        let err = CheckinSheet::from_csv_str("bad".into(), "name,checkedin\nAna,true\n").unwrap_err();
        assert!(matches!(err, SheetError::Parse(_)));
    }

    #[test]
    fn csv_without_timestamps_has_no_span() {
        let content = "name,checkedin,checkin_time,student_id\nAna,true,,1\n";
        let err = CheckinSheet::from_csv_str("empty".into(), content).unwrap_err();
        assert!(matches!(err, SheetError::NoSpan(_)));
    }

    #[test]
    fn csv_bad_timestamp_is_fatal() {
        let content = "name,checkedin,checkin_time,student_id\nAna,true,yesterday,1\n";
        let err = CheckinSheet::from_csv_str("bad".into(), content).unwrap_err();
        assert!(matches!(err, SheetError::Parse(_)));
    }

    #[test]
    fn truthy_accepts_export_spellings() {
        assert!(truthy("Sim"));
        assert!(truthy("true"));
        assert!(truthy("1"));
        assert!(!truthy("Não"));
        assert!(!truthy(""));
    }

    #[test]
    fn timestamp_accepts_space_and_t_separators() {
        assert_eq!(
            parse_timestamp("2019-09-30 10:12:00").unwrap(),
            parse_timestamp("2019-09-30T10:12:00").unwrap()
        );
    }

    #[test]
    fn ticket_row_renders_numeric_id_without_float_tail() {
        let mut row = vec![Data::Empty; 17];
        row[COL_CHECKED_IN] = Data::String("Sim".into());
        row[COL_CHECKIN_TIME] = Data::String("2019-09-30 10:12:00".into());
        row[COL_STUDENT_ID] = Data::Float(14200743.0);

        let record = ticket_record(&row).unwrap();
        assert!(record.checked_in);
        assert_eq!(record.student_id.as_deref(), Some("14200743"));
        assert_eq!(
            record.checked_in_at,
            Some(
                NaiveDate::from_ymd_opt(2019, 9, 30)
                    .unwrap()
                    .and_time(t(10, 12))
            )
        );
    }

    #[test]
    fn ticket_row_not_checked_in() {
        let mut row = vec![Data::Empty; 17];
        row[COL_CHECKED_IN] = Data::String("Não".into());
        let record = ticket_record(&row).unwrap();
        assert!(!record.checked_in);
        assert_eq!(record.checked_in_at, None);
        assert_eq!(record.student_id, None);
    }

    #[test]
    fn unknown_extension_rejected() {
        let err = CheckinSheet::load(Path::new("sheet.pdf")).unwrap_err();
        assert!(matches!(err, SheetError::UnsupportedFormat(ref ext) if ext == "pdf"));
    }
}
