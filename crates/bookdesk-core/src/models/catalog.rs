use serde::{Deserialize, Deserializer, Serialize};

/// The four kinds of record the admin API manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Author,
    Audiobook,
    Category,
}

impl EntityKind {
    /// Plural display title, used for page headings.
    pub fn title(&self) -> &'static str {
        match self {
            EntityKind::User => "Users",
            EntityKind::Author => "Authors",
            EntityKind::Audiobook => "Audiobooks",
            EntityKind::Category => "Categories",
        }
    }

    /// Lowercase singular noun, used in notifications ("Failed to delete author.").
    pub fn noun(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Author => "author",
            EntityKind::Audiobook => "audiobook",
            EntityKind::Category => "category",
        }
    }

    /// Field of the list response envelope that holds the rows.
    pub fn envelope_field(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Author => "authors",
            EntityKind::Audiobook => "audiobooks",
            EntityKind::Category => "categories",
        }
    }

    /// Field carrying the identifier in delete/update request bodies.
    pub fn id_field(&self) -> &'static str {
        match self {
            EntityKind::User => "userId",
            EntityKind::Author => "authorId",
            EntityKind::Audiobook => "audiobookId",
            EntityKind::Category => "categoryId",
        }
    }
}

/// A catalog record that can be listed, paged and deleted by id.
pub trait Entity {
    const KIND: EntityKind;

    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Author {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

impl Entity for Author {
    const KIND: EntityKind = EntityKind::Author;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audiobook {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Reference to the owning author's `_id`
    #[serde(default)]
    pub author: Option<String>,
    #[serde(rename = "authorName", default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Entity for Audiobook {
    const KIND: EntityKind = EntityKind::Audiobook;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "keyword_list")]
    pub keywords: Vec<String>,
}

impl Category {
    pub fn keywords_display(&self) -> String {
        self.keywords.join(", ")
    }
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Category;

    fn id(&self) -> &str {
        &self.id
    }
}

fn full_name(first: &Option<String>, last: &Option<String>) -> String {
    let parts: Vec<&str> = [first.as_deref(), last.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    parts.join(" ")
}

/// Split a comma-separated keyword string into trimmed, non-empty keywords.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Categories come back with keywords either as an array or as the raw
/// comma-separated string they were created with.
fn keyword_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Keywords {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<Keywords>::deserialize(deserializer)? {
        Some(Keywords::List(list)) => list
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect(),
        Some(Keywords::Joined(raw)) => split_keywords(&raw),
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_full_name() {
        let user: User = serde_json::from_str(
            r#"{"_id":"u1","first_name":"Ada","last_name":"Lovelace","email":"ada@example.com"}"#,
        )
        .unwrap();
        assert_eq!(user.full_name(), "Ada Lovelace");

        let partial: User = serde_json::from_str(r#"{"_id":"u2","last_name":"Hopper"}"#).unwrap();
        assert_eq!(partial.full_name(), "Hopper");
    }

    #[test]
    fn test_user_requires_id() {
        let result = serde_json::from_str::<User>(r#"{"first_name":"Ada"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_audiobook_author_name_rename() {
        let book: Audiobook = serde_json::from_str(
            r#"{"_id":"b1","title":"Dune","author":"a1","authorName":"Frank Herbert","category":"Sci-Fi"}"#,
        )
        .unwrap();
        assert_eq!(book.author_name.as_deref(), Some("Frank Herbert"));
        assert_eq!(book.author.as_deref(), Some("a1"));
        assert!(book.description.is_none());
    }

    #[test]
    fn test_category_keywords_array_or_string() {
        let from_array: Category =
            serde_json::from_str(r#"{"_id":"c1","name":"Horror","keywords":["scary"," dark "]}"#).unwrap();
        assert_eq!(from_array.keywords, vec!["scary", "dark"]);

        let from_string: Category =
            serde_json::from_str(r#"{"_id":"c2","name":"Poetry","keywords":"verse, rhyme,,"}"#).unwrap();
        assert_eq!(from_string.keywords, vec!["verse", "rhyme"]);
        assert_eq!(from_string.keywords_display(), "verse, rhyme");

        let missing: Category = serde_json::from_str(r#"{"_id":"c3","name":"Misc","keywords":null}"#).unwrap();
        assert!(missing.keywords.is_empty());
    }

    #[test]
    fn test_entity_kind_fields() {
        assert_eq!(EntityKind::User.envelope_field(), "users");
        assert_eq!(EntityKind::Category.id_field(), "categoryId");
        assert_eq!(<Author as Entity>::KIND, EntityKind::Author);
    }
}
