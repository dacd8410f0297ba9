//! CSV word-list upload endpoint.
//!
//! The ingestion boundary: a tabular upload scoped to a room code. The header
//! row must carry `Word` and `Definition` columns; anything else is rejected
//! with a format error and no state mutation. Accepted rows become the room's
//! word list and the room broadcasts the accepted count.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{info, warn};
use serde_json::json;
use word_duel::{GameError, RoomCode, WordEntry};

use super::AppState;

/// Errors produced while parsing an uploaded word list.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid CSV format. Header must include \"Word\" and \"Definition\"")]
    InvalidFormat,

    #[error("Malformed CSV: {0}")]
    MalformedCsv(String),
}

/// Handle `POST /upload/{room_code}`.
pub async fn upload_word_list(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let Some(code) = RoomCode::parse(&room_code) else {
        return error_response(StatusCode::NOT_FOUND, "Room not found");
    };

    let bytes = match read_file_field(&mut multipart).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    let entries = match parse_word_list(&bytes) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Rejected word list for room {}: {}", code, e);
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    match state.room_manager.set_word_list(&code, entries).await {
        Ok(count) => {
            info!("Room {} accepted {} word list rows", code, count);
            (
                StatusCode::OK,
                Json(json!({ "success": true, "count": count })),
            )
        }
        Err(GameError::RoomNotFound) => error_response(StatusCode::NOT_FOUND, "Room not found"),
        Err(e) => error_response(StatusCode::CONFLICT, &e.to_string()),
    }
}

/// Pull the uploaded file's bytes out of the multipart body.
async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, UploadError> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            return field
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| UploadError::MalformedCsv(e.to_string()));
        }
    }

    Err(UploadError::MissingFile)
}

/// Parse CSV bytes into word entries.
///
/// Requires `Word` and `Definition` header columns (extra columns are
/// ignored) and at least one data row.
fn parse_word_list(bytes: &[u8]) -> Result<Vec<WordEntry>, UploadError> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| UploadError::MalformedCsv(e.to_string()))?;

    let word_idx = headers.iter().position(|h| h.trim() == "Word");
    let definition_idx = headers.iter().position(|h| h.trim() == "Definition");

    let (Some(word_idx), Some(definition_idx)) = (word_idx, definition_idx) else {
        return Err(UploadError::InvalidFormat);
    };

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| UploadError::MalformedCsv(e.to_string()))?;

        let term = record.get(word_idx).unwrap_or("").trim();
        let definition = record.get(definition_idx).unwrap_or("").trim();

        // Skip blank padding rows rather than failing the whole upload.
        if term.is_empty() && definition.is_empty() {
            continue;
        }

        entries.push(WordEntry::new(term, definition));
    }

    if entries.is_empty() {
        return Err(UploadError::InvalidFormat);
    }

    Ok(entries)
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({ "error": message })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_word_and_definition_columns() {
        let csv = b"Word,Definition\napple,a fruit\npear,another fruit\n";
        let entries = parse_word_list(csv).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], WordEntry::new("apple", "a fruit"));
        assert_eq!(entries[1], WordEntry::new("pear", "another fruit"));
    }

    #[test]
    fn ignores_extra_columns_and_blank_rows() {
        let csv = b"Id,Word,Definition\n1,apple,a fruit\n,,\n2,pear,another fruit\n";
        let entries = parse_word_list(csv).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].term, "pear");
    }

    #[test]
    fn rejects_missing_required_headers() {
        let csv = b"Term,Meaning\napple,a fruit\n";
        assert_eq!(parse_word_list(csv), Err(UploadError::InvalidFormat));
    }

    #[test]
    fn rejects_empty_uploads() {
        assert_eq!(
            parse_word_list(b"Word,Definition\n"),
            Err(UploadError::InvalidFormat)
        );
    }
}
