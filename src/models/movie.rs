use serde::Serialize;

use super::TableRow;

/// A movie node, one per source row with a usable id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    pub movie_id: i64,
    pub title: String,
    pub imdb_id: String,
}

/// A genre node, discovered inside a movie's embedded genre list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub genre_id: i64,
    pub name: String,
}

/// Edge linking a movie to one of its genres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MovieGenre {
    pub movie_id: i64,
    pub genre_id: i64,
}

impl TableRow for Movie {
    const FILE_NAME: &'static str = "movies.csv";
    const HEADER: &'static [&'static str] = &["movie_id", "title", "imdb_id"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.movie_id.to_string(),
            self.title.clone(),
            self.imdb_id.clone(),
        ]
    }
}

impl TableRow for Genre {
    const FILE_NAME: &'static str = "genres.csv";
    const HEADER: &'static [&'static str] = &["genre_id", "name"];

    fn fields(&self) -> Vec<String> {
        vec![self.genre_id.to_string(), self.name.clone()]
    }
}

impl TableRow for MovieGenre {
    const FILE_NAME: &'static str = "movie_genres.csv";
    const HEADER: &'static [&'static str] = &["movie_id", "genre_id"];

    fn fields(&self) -> Vec<String> {
        vec![self.movie_id.to_string(), self.genre_id.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_fields_follow_header_order() {
        let movie = Movie {
            movie_id: 862,
            title: "Toy Story".to_string(),
            imdb_id: "tt0114709".to_string(),
        };
        assert_eq!(Movie::HEADER.len(), movie.fields().len());
        assert_eq!(movie.fields(), vec!["862", "Toy Story", "tt0114709"]);
    }

    #[test]
    fn test_genre_and_relation_fields() {
        let genre = Genre {
            genre_id: 16,
            name: "Animation".to_string(),
        };
        assert_eq!(genre.fields(), vec!["16", "Animation"]);

        let edge = MovieGenre {
            movie_id: 862,
            genre_id: 16,
        };
        assert_eq!(edge.fields(), vec!["862", "16"]);
    }

    #[test]
    fn test_movie_serializes_with_header_names() {
        let movie = Movie {
            movie_id: 1,
            title: "Heat".to_string(),
            imdb_id: "tt0113277".to_string(),
        };
        let json = serde_json::to_value(&movie).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for column in Movie::HEADER {
            assert!(keys.contains(column), "missing {column}");
        }
    }
}
