//! Content API handlers
//!
//! Reads are public. Writes sit behind `require_auth` and, once the store
//! accepts them, announce the matching change category on the server hub.

use super::handlers::{AppError, MessageResponse, PortfolioState};
use super::query::{MessagesQuery, ProjectsQuery, SkillsQuery};
use crate::content::*;
use crate::events::ChangeType;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

fn not_found(entity: &str) -> AppError {
    AppError::NotFound(format!("{} not found", entity))
}

// ============================================================================
// About
// ============================================================================

/// GET /api/about/info
pub async fn get_about(State(state): State<PortfolioState>) -> Result<Json<AboutInfo>, AppError> {
    state
        .store
        .get_about()
        .await?
        .map(Json)
        .ok_or_else(|| not_found("About information"))
}

/// POST /api/about/info
pub async fn create_about(
    State(state): State<PortfolioState>,
    Json(req): Json<CreateAboutRequest>,
) -> Result<(StatusCode, Json<AboutInfo>), AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let about = state.store.create_about(req).await?.ok_or_else(|| {
        AppError::BadRequest("About information already exists. Use PUT to update.".to_string())
    })?;

    state.emit(ChangeType::About);
    Ok((StatusCode::CREATED, Json(about)))
}

/// PUT /api/about/info
pub async fn update_about(
    State(state): State<PortfolioState>,
    Json(req): Json<UpdateAboutRequest>,
) -> Result<Json<AboutInfo>, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let about = state
        .store
        .update_about(req)
        .await?
        .ok_or_else(|| not_found("About information"))?;

    state.emit(ChangeType::About);
    Ok(Json(about))
}

// ============================================================================
// Highlights
// ============================================================================

/// GET /api/about/highlights
pub async fn list_highlights(
    State(state): State<PortfolioState>,
) -> Result<Json<Vec<Highlight>>, AppError> {
    Ok(Json(state.store.list_highlights().await?))
}

/// POST /api/about/highlights
pub async fn create_highlight(
    State(state): State<PortfolioState>,
    Json(req): Json<HighlightRequest>,
) -> Result<(StatusCode, Json<Highlight>), AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let highlight = state.store.create_highlight(req).await?;
    state.emit(ChangeType::Highlights);
    Ok((StatusCode::CREATED, Json(highlight)))
}

/// PUT /api/about/highlights/{id}
pub async fn update_highlight(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
    Json(req): Json<HighlightRequest>,
) -> Result<Json<Highlight>, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let highlight = state
        .store
        .update_highlight(id, req)
        .await?
        .ok_or_else(|| not_found("Highlight"))?;

    state.emit(ChangeType::Highlights);
    Ok(Json(highlight))
}

/// DELETE /api/about/highlights/{id}
pub async fn delete_highlight(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_highlight(id).await? {
        return Err(not_found("Highlight"));
    }
    state.emit(ChangeType::Highlights);
    Ok(MessageResponse::new("Highlight deleted successfully"))
}

// ============================================================================
// Experience
// ============================================================================

/// GET /api/experience
pub async fn list_experiences(
    State(state): State<PortfolioState>,
) -> Result<Json<Vec<Experience>>, AppError> {
    Ok(Json(state.store.list_experiences().await?))
}

/// GET /api/experience/{id}
pub async fn get_experience(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
) -> Result<Json<Experience>, AppError> {
    state
        .store
        .get_experience(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Experience"))
}

/// POST /api/experience
pub async fn create_experience(
    State(state): State<PortfolioState>,
    Json(req): Json<CreateExperienceRequest>,
) -> Result<(StatusCode, Json<Experience>), AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let experience = state.store.create_experience(req).await?;
    info!(id = experience.id, company = %experience.company, "Experience created");
    state.emit(ChangeType::Experiences);
    Ok((StatusCode::CREATED, Json(experience)))
}

/// PUT /api/experience/{id}
pub async fn update_experience(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateExperienceRequest>,
) -> Result<Json<Experience>, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let experience = state
        .store
        .update_experience(id, req)
        .await?
        .ok_or_else(|| not_found("Experience"))?;

    state.emit(ChangeType::Experiences);
    Ok(Json(experience))
}

/// DELETE /api/experience/{id}
pub async fn delete_experience(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_experience(id).await? {
        return Err(not_found("Experience"));
    }
    state.emit(ChangeType::Experiences);
    Ok(MessageResponse::new("Experience deleted successfully"))
}

// ============================================================================
// Projects
// ============================================================================

/// GET /api/projects
pub async fn list_projects(
    State(state): State<PortfolioState>,
    Query(query): Query<ProjectsQuery>,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.store.list_projects(query.featured).await?))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, AppError> {
    state
        .store
        .get_project(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Project"))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<PortfolioState>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let project = state.store.create_project(req).await?;
    info!(id = project.id, title = %project.title, "Project created");
    state.emit(ChangeType::Projects);
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/{id}
pub async fn update_project(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let project = state
        .store
        .update_project(id, req)
        .await?
        .ok_or_else(|| not_found("Project"))?;

    state.emit(ChangeType::Projects);
    Ok(Json(project))
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_project(id).await? {
        return Err(not_found("Project"));
    }
    state.emit(ChangeType::Projects);
    Ok(MessageResponse::new("Project deleted successfully"))
}

// ============================================================================
// Skills
// ============================================================================

/// GET /api/skills
pub async fn list_skills(
    State(state): State<PortfolioState>,
    Query(query): Query<SkillsQuery>,
) -> Result<Json<Vec<Skill>>, AppError> {
    Ok(Json(state.store.list_skills(query.category()).await?))
}

/// GET /api/skills/grouped
pub async fn skills_grouped(
    State(state): State<PortfolioState>,
) -> Result<Json<Vec<SkillCategory>>, AppError> {
    Ok(Json(state.store.skills_grouped().await?))
}

/// GET /api/skills/categories
pub async fn skill_categories(
    State(state): State<PortfolioState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.store.skill_categories().await?))
}

/// GET /api/skills/{id}
pub async fn get_skill(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
) -> Result<Json<Skill>, AppError> {
    state
        .store
        .get_skill(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Skill"))
}

/// POST /api/skills
pub async fn create_skill(
    State(state): State<PortfolioState>,
    Json(req): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<Skill>), AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let skill = state.store.create_skill(req).await?;
    state.emit(ChangeType::Skills);
    Ok((StatusCode::CREATED, Json(skill)))
}

/// PUT /api/skills/{id}
pub async fn update_skill(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSkillRequest>,
) -> Result<Json<Skill>, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let skill = state
        .store
        .update_skill(id, req)
        .await?
        .ok_or_else(|| not_found("Skill"))?;

    state.emit(ChangeType::Skills);
    Ok(Json(skill))
}

/// DELETE /api/skills/{id}
pub async fn delete_skill(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_skill(id).await? {
        return Err(not_found("Skill"));
    }
    state.emit(ChangeType::Skills);
    Ok(MessageResponse::new("Skill deleted successfully"))
}

// ============================================================================
// Contact
// ============================================================================

/// GET /api/contact/info
pub async fn get_contact_info(
    State(state): State<PortfolioState>,
) -> Result<Json<ContactInfo>, AppError> {
    state
        .store
        .get_contact_info()
        .await?
        .map(Json)
        .ok_or_else(|| not_found("Contact information"))
}

/// POST /api/contact/info
pub async fn create_contact_info(
    State(state): State<PortfolioState>,
    Json(req): Json<CreateContactInfoRequest>,
) -> Result<(StatusCode, Json<ContactInfo>), AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let info = state.store.create_contact_info(req).await?.ok_or_else(|| {
        AppError::BadRequest(
            "Contact information already exists. Use PUT to update.".to_string(),
        )
    })?;

    state.emit(ChangeType::Contact);
    Ok((StatusCode::CREATED, Json(info)))
}

/// PUT /api/contact/info
pub async fn update_contact_info(
    State(state): State<PortfolioState>,
    Json(req): Json<UpdateContactInfoRequest>,
) -> Result<Json<ContactInfo>, AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let info = state
        .store
        .update_contact_info(req)
        .await?
        .ok_or_else(|| not_found("Contact information"))?;

    state.emit(ChangeType::Contact);
    Ok(Json(info))
}

/// POST /api/contact/messages (public contact form)
///
/// Inbound messages are not site content, so nothing is announced.
pub async fn create_message(
    State(state): State<PortfolioState>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<ContactMessage>), AppError> {
    req.validate().map_err(AppError::BadRequest)?;

    let message = state.store.create_message(req).await?;
    info!(id = message.id, "Contact message received");
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/contact/messages
pub async fn list_messages(
    State(state): State<PortfolioState>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<ContactMessage>>, AppError> {
    query.validate().map_err(AppError::BadRequest)?;
    Ok(Json(state.store.list_messages(query.to_filter()).await?))
}

/// PUT /api/contact/messages/{id}/read
pub async fn mark_message_read(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.mark_message_read(id).await? {
        return Err(not_found("Message"));
    }
    Ok(MessageResponse::new("Message marked as read"))
}

/// DELETE /api/contact/messages/{id}
pub async fn delete_message(
    State(state): State<PortfolioState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_message(id).await? {
        return Err(not_found("Message"));
    }
    Ok(MessageResponse::new("Message deleted successfully"))
}
