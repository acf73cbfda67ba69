//! Declarative endpoint table.
//!
//! Each read endpoint names the cache tag it provides; each mutation names
//! the tag it invalidates. The query cache uses nothing else to decide what
//! to refetch after a write.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::cache::Tag;
use crate::models::EntityKind;

/// Read-only endpoints whose results are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    UsersList,
    AuthorsList,
    AudiobooksList,
    CategoriesList,
    AudiobooksOfAuthor,
    UsersCount,
    AuthorsCount,
    AudiobooksCount,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::UsersList => "/api/admin/userslist",
            Endpoint::AuthorsList => "/api/admin/authorslist",
            Endpoint::AudiobooksList => "/api/admin/audiobooks",
            Endpoint::CategoriesList => "/api/admin/categories",
            Endpoint::AudiobooksOfAuthor => "/api/admin/audiobooksofauthor",
            Endpoint::UsersCount => "/api/admin/getuserscount",
            Endpoint::AuthorsCount => "/api/admin/getauthorscount",
            Endpoint::AudiobooksCount => "/api/admin/getaudiobookscount",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::AudiobooksOfAuthor => Method::POST,
            _ => Method::GET,
        }
    }

    pub fn provides(&self) -> Tag {
        match self {
            Endpoint::UsersList => Tag::User,
            Endpoint::AuthorsList => Tag::Author,
            Endpoint::AudiobooksList | Endpoint::AudiobooksOfAuthor => Tag::Audiobook,
            Endpoint::CategoriesList => Tag::Category,
            Endpoint::UsersCount | Endpoint::AuthorsCount | Endpoint::AudiobooksCount => Tag::Admin,
        }
    }

    /// The paginated list endpoint for an entity kind.
    pub fn list_of(kind: EntityKind) -> Self {
        match kind {
            EntityKind::User => Endpoint::UsersList,
            EntityKind::Author => Endpoint::AuthorsList,
            EntityKind::Audiobook => Endpoint::AudiobooksList,
            EntityKind::Category => Endpoint::CategoriesList,
        }
    }
}

/// Write endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    Login,
    Register,
    UpdateUser,
    DeleteUser,
    UpdateAuthor,
    DeleteAuthor,
    DeleteAudiobook,
    AddCategory,
    DeleteCategory,
}

impl Mutation {
    pub fn path(&self) -> &'static str {
        match self {
            Mutation::Login => "/api/admin/login",
            Mutation::Register => "/api/admin/register",
            Mutation::UpdateUser => "/api/admin/updateusers",
            Mutation::DeleteUser => "/api/admin/deleteuser",
            Mutation::UpdateAuthor => "/api/admin/updateauthors",
            Mutation::DeleteAuthor => "/api/admin/deleteauthor",
            Mutation::DeleteAudiobook => "/api/admin/deleteaudiobook",
            Mutation::AddCategory => "/api/admin/addcategories",
            Mutation::DeleteCategory => "/api/admin/deletecategory",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Mutation::Login | Mutation::Register | Mutation::AddCategory => Method::POST,
            Mutation::UpdateUser | Mutation::UpdateAuthor => Method::PUT,
            Mutation::DeleteUser
            | Mutation::DeleteAuthor
            | Mutation::DeleteAudiobook
            | Mutation::DeleteCategory => Method::DELETE,
        }
    }

    /// Tag whose cached queries go stale once this mutation succeeds.
    pub fn invalidates(&self) -> Option<Tag> {
        match self {
            Mutation::Login | Mutation::Register => None,
            Mutation::UpdateUser | Mutation::DeleteUser => Some(Tag::User),
            Mutation::UpdateAuthor | Mutation::DeleteAuthor => Some(Tag::Author),
            Mutation::DeleteAudiobook => Some(Tag::Audiobook),
            Mutation::AddCategory | Mutation::DeleteCategory => Some(Tag::Category),
        }
    }

    pub fn delete_of(kind: EntityKind) -> Self {
        match kind {
            EntityKind::User => Mutation::DeleteUser,
            EntityKind::Author => Mutation::DeleteAuthor,
            EntityKind::Audiobook => Mutation::DeleteAudiobook,
            EntityKind::Category => Mutation::DeleteCategory,
        }
    }
}
