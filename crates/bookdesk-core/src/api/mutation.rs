use serde_json::{json, Value};

use super::endpoints::Mutation;
use crate::models::{EntityKind, NameUpdate, NewCategory};

/// A catalog write the admin asked for, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRequest {
    UpdateUser(NameUpdate),
    UpdateAuthor(NameUpdate),
    AddCategory(NewCategory),
    Delete { kind: EntityKind, id: String },
}

impl MutationRequest {
    pub fn delete(kind: EntityKind, id: impl Into<String>) -> Self {
        MutationRequest::Delete { kind, id: id.into() }
    }

    pub fn mutation(&self) -> Mutation {
        match self {
            MutationRequest::UpdateUser(_) => Mutation::UpdateUser,
            MutationRequest::UpdateAuthor(_) => Mutation::UpdateAuthor,
            MutationRequest::AddCategory(_) => Mutation::AddCategory,
            MutationRequest::Delete { kind, .. } => Mutation::delete_of(*kind),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            MutationRequest::UpdateUser(_) => EntityKind::User,
            MutationRequest::UpdateAuthor(_) => EntityKind::Author,
            MutationRequest::AddCategory(_) => EntityKind::Category,
            MutationRequest::Delete { kind, .. } => *kind,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, MutationRequest::Delete { .. })
    }

    /// JSON body. Identifiers always travel in the body, never the URL.
    pub fn body(&self) -> Value {
        match self {
            MutationRequest::UpdateUser(update) | MutationRequest::UpdateAuthor(update) => {
                let mut body = json!({
                    "first_name": update.first_name,
                    "last_name": update.last_name,
                });
                body[self.kind().id_field()] = Value::String(update.id.clone());
                body
            }
            MutationRequest::AddCategory(category) => json!({
                "name": category.name,
                "keywords": category.keywords,
            }),
            MutationRequest::Delete { kind, id } => {
                let mut body = json!({});
                body[kind.id_field()] = Value::String(id.clone());
                body
            }
        }
    }

    pub fn success_message(&self) -> String {
        let noun = self.kind().noun();
        match self {
            MutationRequest::Delete { .. } => format!("The {} has been deleted.", noun),
            MutationRequest::AddCategory(_) => "Category added successfully!".to_string(),
            _ => format!("{} updated successfully!", capitalize(noun)),
        }
    }

    pub fn failure_message(&self) -> String {
        let noun = self.kind().noun();
        match self {
            MutationRequest::Delete { .. } => format!("Failed to delete {}.", noun),
            MutationRequest::AddCategory(_) => "Failed to add category.".to_string(),
            _ => format!("Failed to update {}.", noun),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
