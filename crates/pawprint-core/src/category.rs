use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::AppError;

/// Upload category
///
/// Closed classification of an upload's intended use. Each category is bound to
/// exactly one [`UploadPolicy`](crate::UploadPolicy) and is also the first
/// segment of every storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pets,
    Events,
    Avatars,
    Ongs,
    Temp,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Pets,
        Category::Events,
        Category::Avatars,
        Category::Ongs,
        Category::Temp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Pets => "pets",
            Category::Events => "events",
            Category::Avatars => "avatars",
            Category::Ongs => "ongs",
            Category::Temp => "temp",
        }
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pets" => Ok(Category::Pets),
            "events" => Ok(Category::Events),
            "avatars" => Ok(Category::Avatars),
            "ongs" => Ok(Category::Ongs),
            "temp" => Ok(Category::Temp),
            _ => Err(AppError::UnknownCategory(s.to_string())),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
