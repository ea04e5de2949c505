//! Message formatting.
//!
//! Two shapes leave this module: the fixed multi-line template for a
//! structured record, and size-bounded chunks of free text. The template's
//! label set and ordering are read by downstream channel subscribers and
//! automations; treat them as a wire format and do not reorder.

use crate::record::SeismicRecord;

/// Upper bound, in characters, for one outbound text message.
pub const MAX_MESSAGE_CHARS: usize = 65536;

/// Render one record as the channel announcement template.
pub fn format_record(record: &SeismicRecord) -> String {
    format!(
        "Sismo detectado\n\
         Magnitud: {}\n\
         Epicentro: {}\n\
         Fecha y hora local: {} {}\n\
         Coordenadas: {}, {}\n\
         Profundidad: {} km",
        record.magnitud,
        record.epicentro,
        record.fecha,
        record.hora,
        record.latitud,
        record.longitud,
        record.profundidad,
    )
}

/// Lazily chunk free text into messages of at most [`MAX_MESSAGE_CHARS`]
/// characters.
///
/// Lines (with their newlines) are appended greedily; when the next line
/// would push the buffer past the bound, the buffer is emitted and a fresh
/// one starts with that line. The final non-empty buffer is always emitted,
/// so concatenating the chunks reproduces the input exactly. The iterator
/// borrows the text and is recomputed fresh per file read.
pub fn chunk_text(text: &str) -> ChunkedMessages<'_> {
    ChunkedMessages {
        lines: text.split_inclusive('\n'),
        carry: None,
    }
}

/// Iterator returned by [`chunk_text`].
pub struct ChunkedMessages<'a> {
    lines: std::str::SplitInclusive<'a, char>,
    carry: Option<&'a str>,
}

impl Iterator for ChunkedMessages<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut buffer = String::new();
        let mut buffer_chars = 0usize;

        if let Some(line) = self.carry.take() {
            buffer_chars = line.chars().count();
            buffer.push_str(line);
        }

        for line in self.lines.by_ref() {
            let line_chars = line.chars().count();
            if !buffer.is_empty() && buffer_chars + line_chars > MAX_MESSAGE_CHARS {
                self.carry = Some(line);
                return Some(buffer);
            }
            buffer.push_str(line);
            buffer_chars += line_chars;
        }

        if buffer.is_empty() {
            None
        } else {
            Some(buffer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> SeismicRecord {
        SeismicRecord {
            fecha: "2024-01-01".to_string(),
            hora: "12:00:00".to_string(),
            latitud: 19.4,
            longitud: -99.1,
            profundidad: 10.0,
            magnitud: 4.5,
            epicentro: "CDMX, Mexico".to_string(),
            fecha_utc: "2024-01-01".to_string(),
            hora_utc: "18:00:00".to_string(),
        }
    }

    #[test]
    fn template_keeps_field_order() {
        let message = format_record(&sample_record());
        let magnitude = message.find("Magnitud: 4.5").unwrap();
        let region = message.find("Epicentro: CDMX, Mexico").unwrap();
        let local = message.find("Fecha y hora local: 2024-01-01 12:00:00").unwrap();
        let coords = message.find("Coordenadas: 19.4, -99.1").unwrap();
        let depth = message.find("Profundidad: 10 km").unwrap();
        assert!(magnitude < region && region < local && local < coords && coords < depth);
    }

    #[test]
    fn short_text_is_one_message() {
        let text = "linea uno\nlinea dos\n";
        let chunks: Vec<String> = chunk_text(text).collect();
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn empty_text_yields_no_messages() {
        assert_eq!(chunk_text("").count(), 0);
    }

    #[test]
    fn oversized_text_splits_and_round_trips() {
        // Ten lines of 8192 chars each (8191 + newline): 81920 chars total,
        // crossing the bound mid-line.
        let line = format!("{}\n", "x".repeat(8191));
        let text = line.repeat(10);

        let chunks: Vec<String> = chunk_text(&text).collect();
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= MAX_MESSAGE_CHARS);
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn text_without_trailing_newline_round_trips() {
        let text = "primera\nsegunda sin salto";
        let chunks: Vec<String> = chunk_text(text).collect();
        assert_eq!(chunks.concat(), text);
    }
}
