use serde::Serialize;

use super::TableRow;

/// A user node synthesized from the ids found in the ratings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_id: i64,
    pub pseudo: String,
}

impl User {
    /// Creates a user with the generated display name
    pub fn generated(user_id: i64) -> Self {
        Self {
            user_id,
            pseudo: format!("Generated User #{}", user_id),
        }
    }
}

/// Edge from a user to a movie, carrying a 0–10 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rating {
    pub user_id: i64,
    pub movie_id: i64,
    pub value: i64,
}

impl TableRow for User {
    const FILE_NAME: &'static str = "generated_users.csv";
    const HEADER: &'static [&'static str] = &["user_id", "pseudo"];

    fn fields(&self) -> Vec<String> {
        vec![self.user_id.to_string(), self.pseudo.clone()]
    }
}

impl TableRow for Rating {
    const FILE_NAME: &'static str = "generated_ratings.csv";
    const HEADER: &'static [&'static str] = &["user_id", "movie_id", "value"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.movie_id.to_string(),
            self.value.to_string(),
        ]
    }
}
