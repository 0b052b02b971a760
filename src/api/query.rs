//! Query parameter structs for list and stream endpoints

use crate::content::MessageFilter;
use crate::events::{ChangeType, Interest, UnknownChangeType};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Helper to deserialize numbers from query string (which are always strings)
fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    use serde::de::Error;
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.is_empty() => s.parse().map_err(D::Error::custom),
        _ => Ok(T::default()),
    }
}

/// Helper to deserialize optional values from query string
fn deserialize_option_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    use serde::de::Error;
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.is_empty() => s.parse().map(Some).map_err(D::Error::custom),
        _ => Ok(None),
    }
}

/// `GET /api/projects?featured=true`
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ProjectsQuery {
    #[serde(default, deserialize_with = "deserialize_option_from_str")]
    pub featured: Option<bool>,
}

/// `GET /api/skills?category=Programming`
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SkillsQuery {
    pub category: Option<String>,
}

impl SkillsQuery {
    /// Blank categories mean "no filter"
    pub fn category(&self) -> Option<String> {
        self.category
            .as_ref()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    }
}

/// `GET /api/contact/messages?offset=0&limit=100&unread_only=false`
#[derive(Debug, Deserialize, Clone)]
pub struct MessagesQuery {
    /// Items to skip; `skip` is accepted as an alias
    #[serde(default, alias = "skip", deserialize_with = "deserialize_from_str")]
    pub offset: usize,
    #[serde(default = "default_limit", deserialize_with = "deserialize_limit")]
    pub limit: usize,
    #[serde(default, deserialize_with = "deserialize_from_str")]
    pub unread_only: bool,
}

fn default_limit() -> usize {
    MessageFilter::default().limit
}

fn deserialize_limit<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_option_from_str(deserializer)?.unwrap_or_else(default_limit))
}

impl Default for MessagesQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: default_limit(),
            unread_only: false,
        }
    }
}

impl MessagesQuery {
    pub fn validate(&self) -> Result<(), String> {
        if self.limit == 0 {
            return Err("limit must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn to_filter(&self) -> MessageFilter {
        MessageFilter {
            offset: self.offset,
            limit: self.limit,
            unread_only: self.unread_only,
        }
    }
}

/// `GET /ws/changes?types=projects,skills`
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ChangeStreamQuery {
    /// Comma-separated change categories; absent means every category
    pub types: Option<String>,
}

impl ChangeStreamQuery {
    pub fn interest(&self) -> Result<Interest, UnknownChangeType> {
        match &self.types {
            None => Ok(Interest::everything()),
            Some(raw) => Ok(ChangeType::parse_list(raw)?.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Query;
    use axum::http::Uri;

    fn parse<T: serde::de::DeserializeOwned>(query: &str) -> T {
        let uri: Uri = format!("/x?{}", query).parse().unwrap();
        Query::<T>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_messages_query_defaults() {
        let q: MessagesQuery = parse("");
        assert_eq!(q.offset, 0);
        assert_eq!(q.limit, 100);
        assert!(!q.unread_only);
    }

    #[test]
    fn test_messages_query_skip_alias() {
        let q: MessagesQuery = parse("skip=5&limit=10&unread_only=true");
        assert_eq!(q.offset, 5);
        assert_eq!(q.limit, 10);
        assert!(q.unread_only);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_messages_query_zero_limit_rejected() {
        let q: MessagesQuery = parse("limit=0");
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_projects_query_featured() {
        let q: ProjectsQuery = parse("featured=true");
        assert_eq!(q.featured, Some(true));
        let q: ProjectsQuery = parse("");
        assert_eq!(q.featured, None);
    }

    #[test]
    fn test_skills_query_blank_category() {
        let q: SkillsQuery = parse("category=");
        assert_eq!(q.category(), None);
        let q: SkillsQuery = parse("category=Programming");
        assert_eq!(q.category().as_deref(), Some("Programming"));
    }

    #[test]
    fn test_change_stream_interest() {
        let q: ChangeStreamQuery = parse("");
        let interest = q.interest().unwrap();
        assert!(interest.matches(ChangeType::Skills));

        let q: ChangeStreamQuery = parse("types=projects");
        let interest = q.interest().unwrap();
        assert!(interest.matches(ChangeType::Projects));
        assert!(!interest.matches(ChangeType::Skills));
        assert!(interest.matches(ChangeType::All));

        let q: ChangeStreamQuery = parse("types=projects,bogus");
        assert!(q.interest().is_err());
    }
}
