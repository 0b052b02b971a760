//! Portfolio content models and request DTOs
//!
//! Field names are snake_case on the wire, as served to the public site and
//! the admin panel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// About
// ============================================================================

/// The single "about me" profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutInfo {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub years_experience: i32,
    #[serde(default)]
    pub ai_projects: i32,
    #[serde(default)]
    pub ml_models: i32,
    #[serde(default)]
    pub accuracy_rate: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateAboutRequest {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub years_experience: i32,
    #[serde(default)]
    pub ai_projects: i32,
    #[serde(default)]
    pub ml_models: i32,
    #[serde(default)]
    pub accuracy_rate: i32,
    #[serde(default)]
    pub cv_url: Option<String>,
}

impl CreateAboutRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty("name", &self.name)?;
        require_non_empty("title", &self.title)?;
        validate_percentage("accuracy_rate", self.accuracy_rate)
    }
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateAboutRequest {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub profile_image: Option<String>,
    pub years_experience: Option<i32>,
    pub ai_projects: Option<i32>,
    pub ml_models: Option<i32>,
    pub accuracy_rate: Option<i32>,
    pub cv_url: Option<String>,
}

impl UpdateAboutRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(title) = &self.title {
            require_non_empty("title", title)?;
        }
        if let Some(rate) = self.accuracy_rate {
            validate_percentage("accuracy_rate", rate)?;
        }
        Ok(())
    }
}

/// A short career highlight shown under the profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub id: i64,
    pub icon: String,
    pub text: String,
    #[serde(default)]
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HighlightRequest {
    pub icon: String,
    pub text: String,
    #[serde(default)]
    pub order_index: i32,
}

impl HighlightRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty("text", &self.text)
    }
}

// ============================================================================
// Experience
// ============================================================================

/// A described, ordered line item (responsibility, achievement, feature, metric)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItemInput {
    pub description: String,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyInput {
    pub name: String,
}

/// A project done as part of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceProject {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceProjectInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

/// A work experience entry with its nested lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub duration: String,
    pub location: String,
    pub employment_type: String,
    #[serde(default)]
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub responsibilities: Vec<ListItem>,
    #[serde(default)]
    pub achievements: Vec<ListItem>,
    #[serde(default)]
    pub projects: Vec<ExperienceProject>,
    #[serde(default)]
    pub technologies: Vec<Technology>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateExperienceRequest {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub location: String,
    pub employment_type: String,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub responsibilities: Vec<ListItemInput>,
    #[serde(default)]
    pub achievements: Vec<ListItemInput>,
    #[serde(default)]
    pub projects: Vec<ExperienceProjectInput>,
    #[serde(default)]
    pub technologies: Vec<TechnologyInput>,
}

impl CreateExperienceRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty("title", &self.title)?;
        require_non_empty("company", &self.company)
    }
}

/// Partial update; a nested list, when present, replaces the stored one
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub order_index: Option<i32>,
    pub responsibilities: Option<Vec<ListItemInput>>,
    pub achievements: Option<Vec<ListItemInput>>,
    pub projects: Option<Vec<ExperienceProjectInput>>,
    pub technologies: Option<Vec<TechnologyInput>>,
}

impl UpdateExperienceRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            require_non_empty("title", title)?;
        }
        if let Some(company) = &self.company {
            require_non_empty("company", company)?;
        }
        Ok(())
    }
}

// ============================================================================
// Projects
// ============================================================================

/// A showcase project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub technologies: Vec<Technology>,
    #[serde(default)]
    pub features: Vec<ListItem>,
    #[serde(default)]
    pub metrics: Vec<ListItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub technologies: Vec<TechnologyInput>,
    #[serde(default)]
    pub features: Vec<ListItemInput>,
    #[serde(default)]
    pub metrics: Vec<ListItemInput>,
}

impl CreateProjectRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty("title", &self.title)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub order_index: Option<i32>,
    pub is_featured: Option<bool>,
    pub technologies: Option<Vec<TechnologyInput>>,
    pub features: Option<Vec<ListItemInput>>,
    pub metrics: Option<Vec<ListItemInput>>,
}

impl UpdateProjectRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            require_non_empty("title", title)?;
        }
        Ok(())
    }
}

// ============================================================================
// Skills
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub category: String,
    /// 0..=100
    #[serde(default)]
    pub proficiency: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateSkillRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub proficiency: i32,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

impl CreateSkillRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty("name", &self.name)?;
        require_non_empty("category", &self.category)?;
        validate_percentage("proficiency", self.proficiency)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateSkillRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub proficiency: Option<i32>,
    pub icon: Option<String>,
    pub order_index: Option<i32>,
}

impl UpdateSkillRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(category) = &self.category {
            require_non_empty("category", category)?;
        }
        if let Some(p) = self.proficiency {
            validate_percentage("proficiency", p)?;
        }
        Ok(())
    }
}

/// Skill as listed inside a [`SkillCategory`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillLevel {
    pub id: i64,
    pub name: String,
    pub level: i32,
}

/// Skills of one category, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub category: String,
    pub skills: Vec<SkillLevel>,
}

// ============================================================================
// Contact
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub id: i64,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateContactInfoRequest {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
}

impl CreateContactInfoRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateContactInfoRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub twitter_url: Option<String>,
    pub website_url: Option<String>,
}

impl UpdateContactInfoRequest {
    pub fn validate(&self) -> Result<(), String> {
        match &self.email {
            Some(email) => validate_email(email),
            None => Ok(()),
        }
    }
}

/// A message left through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateMessageRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

impl CreateMessageRequest {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty("name", &self.name)?;
        validate_email(&self.email)?;
        require_non_empty("message", &self.message)
    }
}

/// Filter for the admin message inbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageFilter {
    pub offset: usize,
    pub limit: usize,
    pub unread_only: bool,
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
            unread_only: false,
        }
    }
}

// ============================================================================
// Validation helpers
// ============================================================================

fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    Ok(())
}

fn validate_percentage(field: &str, value: i32) -> Result<(), String> {
    if !(0..=100).contains(&value) {
        return Err(format!("{} must be between 0 and 100", field));
    }
    Ok(())
}

/// Shape check only: one '@' with something on both sides and a dot in the domain
fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("'{}' is not a valid email address", email))
    }
}
