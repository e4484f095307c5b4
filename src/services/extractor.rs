use crate::config::DedupMode;
use crate::error::AppResult;
use crate::models::{ConversionReport, Genre, Movie, MovieGenre, Rating, User};
use crate::services::decoder::{decode_movie, decode_rating};
use crate::services::dedup::Deduplicator;
use crate::services::source::SourceRecord;

/// Node and edge tables built from the movie metadata file
#[derive(Debug, Default)]
pub struct MovieTables {
    pub movies: Vec<Movie>,
    pub genres: Vec<Genre>,
    pub movie_genres: Vec<MovieGenre>,
    pub report: ConversionReport,
}

/// Node and edge tables built from the ratings file
#[derive(Debug, Default)]
pub struct RatingTables {
    pub users: Vec<User>,
    pub ratings: Vec<Rating>,
    pub report: ConversionReport,
}

/// Single forward pass over movie rows.
///
/// Movies come out in input order, genres in order of first appearance and
/// movie–genre edges in discovery order. Only read errors abort the pass.
pub fn extract_movies<I>(rows: I, mode: DedupMode) -> AppResult<MovieTables>
where
    I: IntoIterator<Item = AppResult<SourceRecord>>,
{
    let mut report = ConversionReport::default();
    let mut movies = Deduplicator::for_mode(mode);
    let mut genres = Deduplicator::unique();
    let mut movie_genres = Deduplicator::for_mode(mode);

    for row in rows {
        let row = row?;
        report.rows_read += 1;

        let decoded = match decode_movie(&row) {
            Ok(decoded) => decoded,
            Err(reason) => {
                tracing::debug!(line = row.line, %reason, "Skipping movie row");
                report.record_skip(&reason);
                continue;
            }
        };

        // A repeated movie still contributes its genres and any new edges
        let movie_id = decoded.movie.movie_id;
        if !movies.offer(movie_id, decoded.movie) {
            tracing::debug!(line = row.line, movie_id, "Dropping repeated movie");
        }

        match decoded.genres {
            Ok(found) => {
                for genre in found {
                    let genre_id = genre.genre_id;
                    genres.offer(genre_id, genre);
                    let edge = MovieGenre { movie_id, genre_id };
                    movie_genres.offer(edge, edge);
                }
            }
            Err(reason) => {
                tracing::debug!(line = row.line, movie_id, %reason, "No genres extracted");
                report.record_partial(&reason);
            }
        }
    }

    report.duplicates_dropped = movies.dropped() + movie_genres.dropped();

    Ok(MovieTables {
        movies: movies.into_items(),
        genres: genres.into_items(),
        movie_genres: movie_genres.into_items(),
        report,
    })
}

/// Single forward pass over rating rows.
///
/// A user is recorded the first time its id is seen, even when the rest of
/// that row turns out to be unusable.
pub fn extract_ratings<I>(rows: I, mode: DedupMode) -> AppResult<RatingTables>
where
    I: IntoIterator<Item = AppResult<SourceRecord>>,
{
    let mut report = ConversionReport::default();
    let mut users = Deduplicator::unique();
    let mut ratings = Deduplicator::for_mode(mode);

    for row in rows {
        let row = row?;
        report.rows_read += 1;

        let decoded = match decode_rating(&row) {
            Ok(decoded) => decoded,
            Err(reason) => {
                tracing::debug!(line = row.line, %reason, "Skipping rating row");
                report.record_skip(&reason);
                continue;
            }
        };

        let user_id = decoded.user_id;
        users.offer_with(user_id, || User::generated(user_id));

        match decoded.rating {
            Ok(rating) => {
                ratings.offer((rating.user_id, rating.movie_id), rating);
            }
            Err(reason) => {
                tracing::debug!(line = row.line, user_id, %reason, "No rating extracted");
                report.record_partial(&reason);
            }
        }
    }

    report.duplicates_dropped = ratings.dropped();

    Ok(RatingTables {
        users: users.into_items(),
        ratings: ratings.into_items(),
        report,
    })
}
