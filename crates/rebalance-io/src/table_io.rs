use rebalance_core::{Matrix, RebalanceError, RebalanceResult};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::frame::{Column, Frame};

/// Read a delimited table from disk.
///
/// Two layouts are accepted:
/// - KEEL `.dat`: `@relation`/`@attribute`/`@inputs`/`@outputs` header lines
///   naming the columns, terminated by `@data`.
/// - Plain CSV: the first non-empty line is the header.
///
/// Cells are trimmed. A column whose every non-missing cell parses as a float
/// becomes numeric; anything else stays categorical. Empty cells and `?`
/// count as missing.
pub fn read_table(path: impl AsRef<Path>) -> RebalanceResult<Frame> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| RebalanceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let frame = read_table_str(&text)?;
    info!(
        path = %path.display(),
        rows = frame.n_rows(),
        cols = frame.n_cols(),
        "loaded table"
    );
    Ok(frame)
}

/// Parse a table already held in memory. See [`read_table`].
pub fn read_table_str(text: &str) -> RebalanceResult<Frame> {
    let header = parse_header(text)?;
    debug!(columns = ?header.names, keel = header.keel, "parsed header");

    let body = &text[header.body_start..];
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .comment(Some(b'%'))
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); header.names.len()];
    for result in rdr.records() {
        let record = result.map_err(|e| csv_error(e, header.lines_before_body))?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(0)
            + header.lines_before_body;
        if record.len() != header.names.len() {
            return Err(RebalanceError::Parse {
                line,
                message: format!(
                    "expected {} fields, found {}",
                    header.names.len(),
                    record.len()
                ),
            });
        }
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    if cells.first().map_or(true, Vec::is_empty) {
        return Err(RebalanceError::EmptyInput(
            "table has a header but no data rows".into(),
        ));
    }

    let columns = header
        .names
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw))
        .collect();
    Frame::new(columns)
}

struct Header {
    names: Vec<String>,
    body_start: usize,
    lines_before_body: usize,
    keel: bool,
}

fn parse_header(text: &str) -> RebalanceResult<Header> {
    let mut names = Vec::new();
    let mut consumed = 0;
    let mut keel = false;

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        consumed += line.len();
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }

        if !keel && !trimmed.starts_with('@') {
            return Ok(Header {
                names: split_header_line(trimmed, idx + 1)?,
                body_start: consumed,
                lines_before_body: idx + 1,
                keel: false,
            });
        }

        keel = true;
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("@attribute") {
            let name = attribute_name(&trimmed["@attribute".len()..])
                .ok_or_else(|| RebalanceError::Parse {
                    line: idx + 1,
                    message: "@attribute without a name".into(),
                })?;
            names.push(name.to_string());
        } else if lower.starts_with("@data") {
            if names.is_empty() {
                return Err(RebalanceError::Parse {
                    line: idx + 1,
                    message: "@data before any @attribute".into(),
                });
            }
            return Ok(Header {
                names,
                body_start: consumed,
                lines_before_body: idx + 1,
                keel: true,
            });
        }
    }

    if keel {
        Err(RebalanceError::Parse {
            line: text.lines().count(),
            message: "KEEL header is missing @data".into(),
        })
    } else {
        Err(RebalanceError::EmptyInput("table has no header".into()))
    }
}

/// Name of an `@attribute` declaration. Quoted names may contain spaces.
fn attribute_name(decl: &str) -> Option<&str> {
    let decl = decl.trim_start();
    let name = match decl.chars().next() {
        Some(q @ ('\'' | '"')) => {
            let rest = &decl[1..];
            &rest[..rest.find(q)?]
        }
        _ => {
            let word = decl.split_whitespace().next()?;
            word.split('{').next().unwrap_or(word)
        }
    };
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

fn split_header_line(line: &str, line_no: usize) -> RebalanceResult<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());
    let record = rdr
        .records()
        .next()
        .transpose()
        .map_err(|e| csv_error(e, line_no - 1))?
        .ok_or_else(|| RebalanceError::EmptyInput("empty header line".into()))?;
    Ok(record.iter().map(|s| s.to_string()).collect())
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell == "?"
}

fn infer_column(name: String, raw: Vec<String>) -> Column {
    let numeric: Option<Vec<f64>> = raw
        .iter()
        .map(|s| {
            if is_missing(s) {
                Some(f64::NAN)
            } else {
                s.parse::<f64>().ok()
            }
        })
        .collect();
    match numeric {
        Some(values) if raw.iter().any(|s| !is_missing(s)) => Column::numeric(name, values),
        _ => Column::categorical(
            name,
            raw.into_iter()
                .map(|s| if s == "?" { String::new() } else { s })
                .collect(),
        ),
    }
}

fn csv_error(e: csv::Error, line_offset: usize) -> RebalanceError {
    let line = e
        .position()
        .map(|p| p.line() as usize + line_offset)
        .unwrap_or(line_offset);
    RebalanceError::Parse {
        line,
        message: e.to_string(),
    }
}

/// Write features plus a label column to a CSV file.
pub fn write_csv(
    path: impl AsRef<Path>,
    feature_names: &[String],
    x: &Matrix,
    label_name: &str,
    labels: &[String],
) -> RebalanceResult<()> {
    let path = path.as_ref();
    if feature_names.len() != x.cols() || labels.len() != x.rows() {
        return Err(RebalanceError::ShapeMismatch {
            expected: vec![x.rows(), x.cols()],
            got: vec![labels.len(), feature_names.len()],
        });
    }
    let io_err = |e: csv::Error| RebalanceError::Io {
        path: path.display().to_string(),
        source: e.into(),
    };

    let mut wtr = csv::Writer::from_path(path).map_err(io_err)?;
    let mut header: Vec<&str> = feature_names.iter().map(String::as_str).collect();
    header.push(label_name);
    wtr.write_record(&header).map_err(io_err)?;

    for (row, label) in x.iter_rows().zip(labels) {
        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(label.clone());
        wtr.write_record(&record).map_err(io_err)?;
    }

    wtr.flush().map_err(|source| RebalanceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), rows = x.rows(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEEL: &str = "@relation abalone9-18
@attribute Sex {M, F, I}
@attribute Length real [0.075, 0.815]
@attribute Diameter real [0.055, 0.65]
@attribute Class {positive, negative}
@inputs Sex, Length, Diameter
@outputs Class
@data
M, 0.455, 0.365, negative
F, 0.53, 0.42, positive
I, 0.33, 0.255, negative
";

    #[test]
    fn test_reads_keel_header() {
        let frame = read_table_str(KEEL).unwrap();
        assert_eq!(frame.column_names(), vec!["Sex", "Length", "Diameter", "Class"]);
        assert_eq!(frame.n_rows(), 3);
        assert!(!frame.column("Sex").unwrap().is_numeric());
        assert_eq!(frame.column("Length").unwrap().as_numeric().unwrap()[1], 0.53);
        assert_eq!(frame.column("Class").unwrap().display_value(1), "positive");
    }

    #[test]
    fn test_quoted_keel_names_keep_spaces() {
        let text = "@relation shells
@attribute 'Whole weight' real [0.002, 2.8]
@attribute \"Shell weight\" real
@attribute Sex{M,F,I}
@attribute Class {positive, negative}
@data
0.51, 0.15, M, negative
";
        let frame = read_table_str(text).unwrap();
        assert_eq!(
            frame.column_names(),
            vec!["Whole weight", "Shell weight", "Sex", "Class"]
        );
        assert_eq!(frame.column("Whole weight").unwrap().as_numeric().unwrap(), &[0.51]);
        assert!(read_table_str("@attribute 'unterminated real\n@data\n1\n").is_err());
    }

    #[test]
    fn test_reads_csv_header_with_padded_names() {
        let text = "Sex, Length, Diameter, Class\nM, 0.455, 0.365, negative\n\nF, 0.53, ?, positive\n";
        let frame = read_table_str(text).unwrap();
        assert_eq!(frame.column_names(), vec!["Sex", "Length", "Diameter", "Class"]);
        assert_eq!(frame.n_rows(), 2);
        let diameter = frame.column("Diameter").unwrap();
        assert!(diameter.is_numeric());
        assert_eq!(diameter.null_count(), 1);
    }

    #[test]
    fn test_ragged_row_reports_line() {
        let text = "a,b\n1,2\n3\n";
        match read_table_str(text) {
            Err(RebalanceError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(matches!(
            read_table_str("a,b\n"),
            Err(RebalanceError::EmptyInput(_))
        ));
        assert!(matches!(
            read_table_str("@relation x\n@attribute a real\n"),
            Err(RebalanceError::Parse { .. })
        ));
    }

    #[test]
    fn test_read_table_from_disk_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KEEL.as_bytes()).unwrap();
        let frame = read_table(file.path()).unwrap();
        assert_eq!(frame.shape(), (3, 4));

        let err = read_table("/definitely/not/here.dat").unwrap_err();
        assert!(matches!(err, RebalanceError::Io { .. }));
    }

    #[test]
    fn test_write_csv_round_trips_through_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let x = Matrix::from_rows(&[vec![0.5, 1.0], vec![0.25, 2.0]]).unwrap();
        let names = vec!["Length".to_string(), "Diameter".to_string()];
        let labels = vec!["negative".to_string(), "positive".to_string()];
        write_csv(&path, &names, &x, "Class", &labels).unwrap();

        let frame = read_table(&path).unwrap();
        assert_eq!(frame.column_names(), vec!["Length", "Diameter", "Class"]);
        assert_eq!(frame.column("Diameter").unwrap().as_numeric().unwrap(), &[1.0, 2.0]);

        assert!(write_csv(&path, &names[..1], &x, "Class", &labels).is_err());
    }
}
