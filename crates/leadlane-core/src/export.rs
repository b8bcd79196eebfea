//! Export formatter: projected table rows to a CSV blob.
//!
//! Pure functions, no state. Exported text is routinely opened in
//! spreadsheet software, so any field that starts with a formula-trigger
//! character is neutralized with a leading apostrophe. Neutralization is
//! idempotent: an already-neutralized value gains no second apostrophe.

use std::borrow::Cow;
use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::model::Lead;

/// UTF-8 byte-order marker; spreadsheet apps need it to pick up accents.
pub const BOM: &str = "\u{feff}";

/// Characters that make a spreadsheet treat a cell as a formula.
const FORMULA_TRIGGERS: [char; 4] = ['=', '+', '-', '@'];

const HEADER: &str = "Fecha,Nombre,Teléfono,Vehículo,Clasificación,Estado";

/// Spanish month abbreviation for a one-based month number.
const fn month_abbr_es(month: u32) -> &'static str {
    match month {
        1 => "ene",
        2 => "feb",
        3 => "mar",
        4 => "abr",
        5 => "may",
        6 => "jun",
        7 => "jul",
        8 => "ago",
        9 => "sep",
        10 => "oct",
        11 => "nov",
        _ => "dic",
    }
}

// ---------------------------------------------------------------------------
// Field-level helpers
// ---------------------------------------------------------------------------

/// Defuse a would-be formula by prefixing an apostrophe. Applying this
/// twice yields the same string: once prefixed, the value no longer
/// starts with a trigger.
#[must_use]
pub fn neutralize(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim();
    if trimmed.starts_with(FORMULA_TRIGGERS) {
        Cow::Owned(format!("'{trimmed}"))
    } else if trimmed.len() == text.len() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(trimmed.to_string())
    }
}

/// Quote a field when it contains the delimiter, quotes, or line breaks.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains(['"', ',', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn sanitize_field(field: &str) -> String {
    escape(neutralize(field).as_ref()).into_owned()
}

/// Calendar-only date in the dashboard's localized form, e.g. "05 ago 2026".
#[must_use]
pub fn format_date_es(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!(
        "{:02} {} {}",
        date.day(),
        month_abbr_es(date.month()),
        date.year()
    )
}

/// Filename for an export performed on `date`: `leads_<ISO-date>.csv`.
#[must_use]
pub fn export_filename(date: NaiveDate) -> String {
    format!("leads_{}.csv", date.format("%Y-%m-%d"))
}

// ---------------------------------------------------------------------------
// Blob rendering
// ---------------------------------------------------------------------------

/// Render the currently projected table sequence as a CSV blob: BOM,
/// header row, one row per lead. Absent classification renders the
/// literal "Pendiente".
#[must_use]
pub fn render_csv(leads: &[Lead]) -> String {
    let mut out = String::with_capacity(64 * (leads.len() + 1));
    out.push_str(BOM);
    out.push_str(HEADER);
    out.push('\n');

    for lead in leads {
        let classification = lead
            .classification
            .map_or("Pendiente".to_string(), |tier| tier.as_str().to_string());
        let row = [
            format_date_es(lead.created_at.date_naive()),
            lead.name.clone(),
            lead.phone.clone(),
            lead.vehicle_interest.clone(),
            classification,
            lead.status.as_str().to_string(),
        ];
        let mut first = true;
        for field in row {
            if !first {
                out.push(',');
            }
            first = false;
            let _ = write!(out, "{}", sanitize_field(&field));
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
