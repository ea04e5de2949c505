//! Record classification for structured bulletin rows.
//!
//! A well-formed row carries exactly nine fields:
//! fecha, hora, latitud, longitud, profundidad, magnitud, epicentro,
//! fechaUTC, horaUTC. The four coordinate/measure fields must parse as
//! floats or the whole row is rejected. Field names follow the bulletin
//! columns (and the `evento` table) rather than being translated.

use thiserror::Error;

/// Number of fields in a well-formed bulletin row.
pub const BULLETIN_ARITY: usize = 9;

/// One structured bulletin row.
#[derive(Debug, Clone, PartialEq)]
pub struct SeismicRecord {
    pub fecha: String,
    pub hora: String,
    pub latitud: f64,
    pub longitud: f64,
    pub profundidad: f64,
    pub magnitud: f64,
    pub epicentro: String,
    pub fecha_utc: String,
    pub hora_utc: String,
}

/// Why a row was rejected.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected {BULLETIN_ARITY} fields, got {got}")]
    Arity { got: usize },

    #[error("field '{field}' is not a number: '{value}'")]
    NumericField { field: &'static str, value: String },
}

/// Classify a field sequence into a [`SeismicRecord`].
///
/// Rows with more than nine fields get one recovery attempt: the feed only
/// overflows when an unquoted epicenter name itself contains the delimiter,
/// so the excess middle fields (6..len-2) are re-joined with the delimiter
/// into a single epicenter string and the arity re-checked. Anything that
/// still is not exactly nine fields is rejected.
pub fn classify(fields: &[String], delimiter: char) -> Result<SeismicRecord, RecordError> {
    if fields.len() < BULLETIN_ARITY {
        return Err(RecordError::Arity { got: fields.len() });
    }

    let merged;
    let fields = if fields.len() > BULLETIN_ARITY {
        let epicentro = fields[6..fields.len() - 2].join(&delimiter.to_string());
        let mut rebuilt: Vec<String> = fields[..6].to_vec();
        rebuilt.push(epicentro);
        rebuilt.extend_from_slice(&fields[fields.len() - 2..]);
        if rebuilt.len() != BULLETIN_ARITY {
            return Err(RecordError::Arity { got: rebuilt.len() });
        }
        merged = rebuilt;
        &merged[..]
    } else {
        fields
    };

    Ok(SeismicRecord {
        fecha: unquote(&fields[0]),
        hora: unquote(&fields[1]),
        latitud: numeric(&fields[2], "latitud")?,
        longitud: numeric(&fields[3], "longitud")?,
        profundidad: numeric(&fields[4], "profundidad")?,
        magnitud: numeric(&fields[5], "magnitud")?,
        epicentro: unquote(&fields[6]),
        fecha_utc: unquote(&fields[7]),
        hora_utc: unquote(&fields[8]),
    })
}

/// A stray header remnant: a lone field holding a bare HH:MM:SS time stamp.
///
/// Some bulletins lead with the generation time on its own line; it is
/// recognized by containing exactly two `:` and skipped by the pipeline.
pub fn is_time_remnant(fields: &[String]) -> bool {
    fields.len() == 1 && fields[0].matches(':').count() == 2
}

fn numeric(raw: &str, field: &'static str) -> Result<f64, RecordError> {
    raw.trim().parse::<f64>().map_err(|_| RecordError::NumericField {
        field,
        value: raw.to_string(),
    })
}

/// Peel a matching pair of enclosing quotes left behind by the splitter.
fn unquote(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    }
}
