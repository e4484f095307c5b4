use crate::error::SkipReason;
use crate::models::{Genre, Movie, Rating};
use crate::services::literal::{parse_record_list, Literal, LiteralRecord};
use crate::services::source::SourceRecord;

pub const MOVIE_COLUMNS: &[&str] = &["id", "title", "imdb_id", "genres"];
pub const RATING_COLUMNS: &[&str] = &["userId", "movieId", "rating"];

/// A movie row that decoded, with the outcome of its embedded genre list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMovie {
    pub movie: Movie,
    pub genres: Result<Vec<Genre>, SkipReason>,
}

/// A ratings row whose user id decoded, with the outcome of the rating itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRating {
    pub user_id: i64,
    pub rating: Result<Rating, SkipReason>,
}

/// Strict integer conversion for key columns; surrounding whitespace is allowed
pub fn parse_key(field: &'static str, value: Option<&str>) -> Result<i64, SkipReason> {
    let raw = value.unwrap_or_default();
    raw.trim().parse::<i64>().map_err(|_| SkipReason::InvalidId {
        field,
        value: raw.to_string(),
    })
}

/// Converts a 0–5 rating to the 0–10 scale, truncating toward zero
pub fn rescale_rating(value: Option<&str>) -> Result<i64, SkipReason> {
    let raw = value.unwrap_or_default();
    let invalid = || SkipReason::InvalidRating {
        value: raw.to_string(),
    };

    let rating: f64 = raw.trim().parse().map_err(|_| invalid())?;
    let scaled = (rating * 2.0).trunc();
    if !scaled.is_finite() || scaled.abs() >= i64::MAX as f64 {
        return Err(invalid());
    }
    Ok(scaled as i64)
}

/// Decodes the embedded genre list of a movie row.
///
/// Either every record in the list yields a genre or the whole field is rejected.
pub fn decode_genres(value: Option<&str>) -> Result<Vec<Genre>, SkipReason> {
    let raw = value.map(str::trim).unwrap_or_default();
    if raw.is_empty() || raw == "[]" {
        return Err(SkipReason::EmptyEmbeddedList);
    }

    let records = parse_record_list(raw).map_err(|e| SkipReason::MalformedEmbeddedList {
        reason: e.to_string(),
    })?;

    records.iter().map(genre_from_record).collect()
}

fn genre_from_record(record: &LiteralRecord) -> Result<Genre, SkipReason> {
    let malformed = |reason: &str| SkipReason::MalformedEmbeddedList {
        reason: reason.to_string(),
    };

    let genre_id = match record.get("id") {
        Some(Literal::Int(id)) => *id,
        Some(Literal::Str(id)) => id
            .trim()
            .parse()
            .map_err(|_| malformed("genre id is not an integer"))?,
        Some(_) => return Err(malformed("genre id is not an integer")),
        None => return Err(malformed("genre record has no id")),
    };

    let name = match record.get("name") {
        Some(Literal::Str(name)) => name.clone(),
        Some(_) => return Err(malformed("genre name is not a string")),
        None => return Err(malformed("genre record has no name")),
    };

    Ok(Genre { genre_id, name })
}

/// Decodes one row of the movie metadata file
pub fn decode_movie(row: &SourceRecord) -> Result<DecodedMovie, SkipReason> {
    let movie_id = parse_key("id", row.get("id"))?;
    let movie = Movie {
        movie_id,
        title: row.get("title").unwrap_or_default().to_string(),
        imdb_id: row.get("imdb_id").unwrap_or_default().to_string(),
    };

    Ok(DecodedMovie {
        movie,
        genres: decode_genres(row.get("genres")),
    })
}

/// Decodes one row of the ratings file
pub fn decode_rating(row: &SourceRecord) -> Result<DecodedRating, SkipReason> {
    let user_id = parse_key("userId", row.get("userId"))?;

    let rating = parse_key("movieId", row.get("movieId")).and_then(|movie_id| {
        Ok(Rating {
            user_id,
            movie_id,
            value: rescale_rating(row.get("rating"))?,
        })
    });

    Ok(DecodedRating { user_id, rating })
}
