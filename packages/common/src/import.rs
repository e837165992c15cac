use serde::Serialize;
use thiserror::Error;

/// Work types accepted by the bulk user importer.
pub const KNOWN_WORK_TYPES: &[&str] = &["full_time", "part_time"];

/// Column labels recognized in the header row, after normalization.
const COL_EMAIL: &str = "email";
const COL_NAME: &str = "name";
const COL_ROLE: &str = "role";
const COL_WORK_TYPE: &str = "work_type";

/// File-level failure while reading an uploaded sheet. Per-row problems are
/// collected as [`RowError`]s instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file is not valid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("no header row with an 'Email' column found")]
    HeaderNotFound,
}

/// A validated row ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedRow {
    /// 1-based row number in the uploaded file.
    pub line: usize,
    pub email: String,
    pub name: String,
    pub role: String,
    pub work_type: String,
}

/// A row that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct RowError {
    /// 1-based row number in the uploaded file, 0 for file-level errors.
    pub line: usize,
    pub message: String,
}

impl RowError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Normalize an enum-like cell value: trimmed, lowercased, spaces and hyphens
/// collapsed to underscores ("Full Time" -> "full_time").
pub fn normalize_enum(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

fn normalize_header(value: &str) -> String {
    normalize_enum(value)
}

/// Parse an uploaded CSV into validated rows plus per-row errors.
///
/// The header row is located by scanning for a cell labelled `Email`, which
/// tolerates banner or title rows exported above the real header. Rows that
/// fail validation are reported in the error list and never partially
/// inserted; valid and invalid rows can coexist in one file.
pub fn parse_rows(
    bytes: &[u8],
    known_roles: &[&str],
) -> Result<(Vec<ImportedRow>, Vec<RowError>), ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let records = reader
        .records()
        .collect::<Result<Vec<csv::StringRecord>, csv::Error>>()?;

    let header_idx = records
        .iter()
        .position(|rec| rec.iter().any(|cell| normalize_header(cell) == COL_EMAIL))
        .ok_or(ImportError::HeaderNotFound)?;

    let headers: Vec<String> = records[header_idx]
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (offset, record) in records.iter().enumerate().skip(header_idx + 1) {
        let line = offset + 1;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let field = |name: &str| -> String {
            headers
                .iter()
                .position(|h| h == name)
                .and_then(|i| record.get(i))
                .map(str::trim)
                .unwrap_or_default()
                .to_string()
        };

        match validate_row(
            line,
            &field(COL_EMAIL),
            &field(COL_NAME),
            &field(COL_ROLE),
            &field(COL_WORK_TYPE),
            known_roles,
        ) {
            Ok(row) => rows.push(row),
            Err(e) => errors.push(e),
        }
    }

    Ok((rows, errors))
}

fn validate_row(
    line: usize,
    email: &str,
    name: &str,
    role: &str,
    work_type: &str,
    known_roles: &[&str],
) -> Result<ImportedRow, RowError> {
    if email.is_empty() {
        return Err(RowError::new(line, "Missing required field 'Email'"));
    }
    if !email.contains('@') {
        return Err(RowError::new(line, format!("Invalid email '{email}'")));
    }
    if name.is_empty() {
        return Err(RowError::new(line, "Missing required field 'Name'"));
    }
    if role.is_empty() {
        return Err(RowError::new(line, "Missing required field 'Role'"));
    }
    let role_norm = normalize_enum(role);
    if !known_roles.contains(&role_norm.as_str()) {
        return Err(RowError::new(line, format!("Invalid role '{role}'")));
    }
    if work_type.is_empty() {
        return Err(RowError::new(line, "Missing required field 'Work Type'"));
    }
    let work_type_norm = normalize_enum(work_type);
    if !KNOWN_WORK_TYPES.contains(&work_type_norm.as_str()) {
        return Err(RowError::new(
            line,
            format!("Invalid work type '{work_type}'"),
        ));
    }

    Ok(ImportedRow {
        line,
        email: email.to_string(),
        name: name.to_string(),
        role: role_norm,
        work_type: work_type_norm,
    })
}
