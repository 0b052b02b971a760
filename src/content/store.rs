//! Content storage
//!
//! `ContentStore` is the abstract interface the HTTP layer talks to.
//! `InMemoryContentStore` keeps everything in `tokio::sync::RwLock`
//! collections and is what the server runs on.

use super::models::*;
use super::seed;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Abstract interface for portfolio content.
///
/// Lookups and mutations of a single record return `Ok(None)` / `Ok(false)`
/// when the record does not exist; `Err` is reserved for backend failures.
#[async_trait]
pub trait ContentStore: Send + Sync {
    // ========================================================================
    // About
    // ========================================================================

    async fn get_about(&self) -> Result<Option<AboutInfo>>;

    /// Create the profile; `None` if one already exists
    async fn create_about(&self, req: CreateAboutRequest) -> Result<Option<AboutInfo>>;

    async fn update_about(&self, req: UpdateAboutRequest) -> Result<Option<AboutInfo>>;

    /// Highlights by `order_index`
    async fn list_highlights(&self) -> Result<Vec<Highlight>>;

    async fn create_highlight(&self, req: HighlightRequest) -> Result<Highlight>;

    async fn update_highlight(&self, id: i64, req: HighlightRequest) -> Result<Option<Highlight>>;

    async fn delete_highlight(&self, id: i64) -> Result<bool>;

    // ========================================================================
    // Experience
    // ========================================================================

    /// Experiences by `order_index`, highest first
    async fn list_experiences(&self) -> Result<Vec<Experience>>;

    async fn get_experience(&self, id: i64) -> Result<Option<Experience>>;

    async fn create_experience(&self, req: CreateExperienceRequest) -> Result<Experience>;

    async fn update_experience(
        &self,
        id: i64,
        req: UpdateExperienceRequest,
    ) -> Result<Option<Experience>>;

    async fn delete_experience(&self, id: i64) -> Result<bool>;

    // ========================================================================
    // Projects
    // ========================================================================

    /// Projects by `order_index` then title, optionally filtered on `is_featured`
    async fn list_projects(&self, featured: Option<bool>) -> Result<Vec<Project>>;

    async fn get_project(&self, id: i64) -> Result<Option<Project>>;

    async fn create_project(&self, req: CreateProjectRequest) -> Result<Project>;

    async fn update_project(&self, id: i64, req: UpdateProjectRequest) -> Result<Option<Project>>;

    async fn delete_project(&self, id: i64) -> Result<bool>;

    // ========================================================================
    // Skills
    // ========================================================================

    /// Skills by `order_index` then name, optionally limited to one category
    async fn list_skills(&self, category: Option<String>) -> Result<Vec<Skill>>;

    async fn get_skill(&self, id: i64) -> Result<Option<Skill>>;

    async fn create_skill(&self, req: CreateSkillRequest) -> Result<Skill>;

    async fn update_skill(&self, id: i64, req: UpdateSkillRequest) -> Result<Option<Skill>>;

    async fn delete_skill(&self, id: i64) -> Result<bool>;

    /// Skills grouped by category, categories in first-appearance order
    async fn skills_grouped(&self) -> Result<Vec<SkillCategory>> {
        Ok(group_skills(&self.list_skills(None).await?))
    }

    /// Distinct category names, in first-appearance order
    async fn skill_categories(&self) -> Result<Vec<String>> {
        Ok(self
            .skills_grouped()
            .await?
            .into_iter()
            .map(|c| c.category)
            .collect())
    }

    // ========================================================================
    // Contact
    // ========================================================================

    async fn get_contact_info(&self) -> Result<Option<ContactInfo>>;

    /// Create contact info; `None` if it already exists
    async fn create_contact_info(&self, req: CreateContactInfoRequest)
        -> Result<Option<ContactInfo>>;

    async fn update_contact_info(&self, req: UpdateContactInfoRequest)
        -> Result<Option<ContactInfo>>;

    async fn create_message(&self, req: CreateMessageRequest) -> Result<ContactMessage>;

    /// Messages newest first, then `offset`/`limit` applied
    async fn list_messages(&self, filter: MessageFilter) -> Result<Vec<ContactMessage>>;

    async fn mark_message_read(&self, id: i64) -> Result<bool>;

    async fn delete_message(&self, id: i64) -> Result<bool>;
}

/// Group skills (already sorted) by category, keeping first-appearance order
pub fn group_skills(skills: &[Skill]) -> Vec<SkillCategory> {
    let mut groups: Vec<SkillCategory> = Vec::new();
    for skill in skills {
        let level = SkillLevel {
            id: skill.id,
            name: skill.name.clone(),
            level: skill.proficiency,
        };
        match groups.iter_mut().find(|g| g.category == skill.category) {
            Some(group) => group.skills.push(level),
            None => groups.push(SkillCategory {
                category: skill.category.clone(),
                skills: vec![level],
            }),
        }
    }
    groups
}

fn next_id<T>(map: &BTreeMap<i64, T>) -> i64 {
    map.keys().next_back().map_or(1, |max| max + 1)
}

fn number_items(inputs: Vec<ListItemInput>) -> Vec<ListItem> {
    inputs
        .into_iter()
        .zip(1..)
        .map(|(input, id)| ListItem {
            id,
            description: input.description,
            order_index: input.order_index,
        })
        .collect()
}

fn number_technologies(inputs: Vec<TechnologyInput>) -> Vec<Technology> {
    inputs
        .into_iter()
        .zip(1..)
        .map(|(input, id)| Technology {
            id,
            name: input.name,
        })
        .collect()
}

fn number_experience_projects(inputs: Vec<ExperienceProjectInput>) -> Vec<ExperienceProject> {
    inputs
        .into_iter()
        .zip(1..)
        .map(|(input, id)| ExperienceProject {
            id,
            name: input.name,
            description: input.description,
            order_index: input.order_index,
        })
        .collect()
}

/// In-memory content store
///
/// ```
/// use portfolio_hub::content::{ContentStore, InMemoryContentStore};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryContentStore::seeded();
/// let featured = store.list_projects(Some(true)).await.unwrap();
/// assert!(featured.iter().all(|p| p.is_featured));
/// # });
/// ```
#[derive(Default)]
pub struct InMemoryContentStore {
    about: RwLock<Option<AboutInfo>>,
    highlights: RwLock<BTreeMap<i64, Highlight>>,
    experiences: RwLock<BTreeMap<i64, Experience>>,
    projects: RwLock<BTreeMap<i64, Project>>,
    skills: RwLock<BTreeMap<i64, Skill>>,
    contact: RwLock<Option<ContactInfo>>,
    messages: RwLock<BTreeMap<i64, ContactMessage>>,
}

impl InMemoryContentStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with the portfolio's initial content
    pub fn seeded() -> Self {
        let now = Utc::now();
        Self {
            about: RwLock::new(Some(seed::about_info(now))),
            highlights: RwLock::new(seed::highlights(now).into_iter().map(|h| (h.id, h)).collect()),
            experiences: RwLock::new(
                seed::experiences(now)
                    .into_iter()
                    .map(|e| (e.id, e))
                    .collect(),
            ),
            projects: RwLock::new(seed::projects(now).into_iter().map(|p| (p.id, p)).collect()),
            skills: RwLock::new(seed::skills(now).into_iter().map(|s| (s.id, s)).collect()),
            contact: RwLock::new(Some(seed::contact_info(now))),
            messages: RwLock::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn get_about(&self) -> Result<Option<AboutInfo>> {
        Ok(self.about.read().await.clone())
    }

    async fn create_about(&self, req: CreateAboutRequest) -> Result<Option<AboutInfo>> {
        let mut about = self.about.write().await;
        if about.is_some() {
            return Ok(None);
        }
        let info = AboutInfo {
            id: 1,
            name: req.name,
            title: req.title,
            description: req.description,
            profile_image: req.profile_image,
            years_experience: req.years_experience,
            ai_projects: req.ai_projects,
            ml_models: req.ml_models,
            accuracy_rate: req.accuracy_rate,
            cv_url: req.cv_url,
            created_at: Utc::now(),
            updated_at: None,
        };
        *about = Some(info.clone());
        Ok(Some(info))
    }

    async fn update_about(&self, req: UpdateAboutRequest) -> Result<Option<AboutInfo>> {
        let mut about = self.about.write().await;
        let Some(info) = about.as_mut() else {
            return Ok(None);
        };
        if let Some(v) = req.name {
            info.name = v;
        }
        if let Some(v) = req.title {
            info.title = v;
        }
        if let Some(v) = req.description {
            info.description = v;
        }
        if let Some(v) = req.profile_image {
            info.profile_image = Some(v);
        }
        if let Some(v) = req.years_experience {
            info.years_experience = v;
        }
        if let Some(v) = req.ai_projects {
            info.ai_projects = v;
        }
        if let Some(v) = req.ml_models {
            info.ml_models = v;
        }
        if let Some(v) = req.accuracy_rate {
            info.accuracy_rate = v;
        }
        if let Some(v) = req.cv_url {
            info.cv_url = Some(v);
        }
        info.updated_at = Some(Utc::now());
        Ok(Some(info.clone()))
    }

    async fn list_highlights(&self) -> Result<Vec<Highlight>> {
        let mut list: Vec<Highlight> = self.highlights.read().await.values().cloned().collect();
        list.sort_by_key(|h| (h.order_index, h.id));
        Ok(list)
    }

    async fn create_highlight(&self, req: HighlightRequest) -> Result<Highlight> {
        let mut highlights = self.highlights.write().await;
        let highlight = Highlight {
            id: next_id(&highlights),
            icon: req.icon,
            text: req.text,
            order_index: req.order_index,
            created_at: Utc::now(),
        };
        highlights.insert(highlight.id, highlight.clone());
        Ok(highlight)
    }

    async fn update_highlight(&self, id: i64, req: HighlightRequest) -> Result<Option<Highlight>> {
        let mut highlights = self.highlights.write().await;
        Ok(highlights.get_mut(&id).map(|h| {
            h.icon = req.icon;
            h.text = req.text;
            h.order_index = req.order_index;
            h.clone()
        }))
    }

    async fn delete_highlight(&self, id: i64) -> Result<bool> {
        Ok(self.highlights.write().await.remove(&id).is_some())
    }

    async fn list_experiences(&self) -> Result<Vec<Experience>> {
        let mut list: Vec<Experience> = self.experiences.read().await.values().cloned().collect();
        list.sort_by(|a, b| b.order_index.cmp(&a.order_index).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn get_experience(&self, id: i64) -> Result<Option<Experience>> {
        Ok(self.experiences.read().await.get(&id).cloned())
    }

    async fn create_experience(&self, req: CreateExperienceRequest) -> Result<Experience> {
        let mut experiences = self.experiences.write().await;
        let experience = Experience {
            id: next_id(&experiences),
            title: req.title,
            company: req.company,
            duration: req.duration,
            location: req.location,
            employment_type: req.employment_type,
            order_index: req.order_index,
            created_at: Utc::now(),
            updated_at: None,
            responsibilities: number_items(req.responsibilities),
            achievements: number_items(req.achievements),
            projects: number_experience_projects(req.projects),
            technologies: number_technologies(req.technologies),
        };
        experiences.insert(experience.id, experience.clone());
        Ok(experience)
    }

    async fn update_experience(
        &self,
        id: i64,
        req: UpdateExperienceRequest,
    ) -> Result<Option<Experience>> {
        let mut experiences = self.experiences.write().await;
        let Some(e) = experiences.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = req.title {
            e.title = v;
        }
        if let Some(v) = req.company {
            e.company = v;
        }
        if let Some(v) = req.duration {
            e.duration = v;
        }
        if let Some(v) = req.location {
            e.location = v;
        }
        if let Some(v) = req.employment_type {
            e.employment_type = v;
        }
        if let Some(v) = req.order_index {
            e.order_index = v;
        }
        if let Some(v) = req.responsibilities {
            e.responsibilities = number_items(v);
        }
        if let Some(v) = req.achievements {
            e.achievements = number_items(v);
        }
        if let Some(v) = req.projects {
            e.projects = number_experience_projects(v);
        }
        if let Some(v) = req.technologies {
            e.technologies = number_technologies(v);
        }
        e.updated_at = Some(Utc::now());
        Ok(Some(e.clone()))
    }

    async fn delete_experience(&self, id: i64) -> Result<bool> {
        Ok(self.experiences.write().await.remove(&id).is_some())
    }

    async fn list_projects(&self, featured: Option<bool>) -> Result<Vec<Project>> {
        let mut list: Vec<Project> = self
            .projects
            .read()
            .await
            .values()
            .filter(|p| featured.map_or(true, |f| p.is_featured == f))
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            a.order_index
                .cmp(&b.order_index)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(list)
    }

    async fn get_project(&self, id: i64) -> Result<Option<Project>> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn create_project(&self, req: CreateProjectRequest) -> Result<Project> {
        let mut projects = self.projects.write().await;
        let project = Project {
            id: next_id(&projects),
            title: req.title,
            description: req.description,
            image: req.image,
            github_url: req.github_url,
            live_url: req.live_url,
            order_index: req.order_index,
            is_featured: req.is_featured,
            created_at: Utc::now(),
            updated_at: None,
            technologies: number_technologies(req.technologies),
            features: number_items(req.features),
            metrics: number_items(req.metrics),
        };
        projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: i64, req: UpdateProjectRequest) -> Result<Option<Project>> {
        let mut projects = self.projects.write().await;
        let Some(p) = projects.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = req.title {
            p.title = v;
        }
        if let Some(v) = req.description {
            p.description = v;
        }
        if let Some(v) = req.image {
            p.image = Some(v);
        }
        if let Some(v) = req.github_url {
            p.github_url = Some(v);
        }
        if let Some(v) = req.live_url {
            p.live_url = Some(v);
        }
        if let Some(v) = req.order_index {
            p.order_index = v;
        }
        if let Some(v) = req.is_featured {
            p.is_featured = v;
        }
        if let Some(v) = req.technologies {
            p.technologies = number_technologies(v);
        }
        if let Some(v) = req.features {
            p.features = number_items(v);
        }
        if let Some(v) = req.metrics {
            p.metrics = number_items(v);
        }
        p.updated_at = Some(Utc::now());
        Ok(Some(p.clone()))
    }

    async fn delete_project(&self, id: i64) -> Result<bool> {
        Ok(self.projects.write().await.remove(&id).is_some())
    }

    async fn list_skills(&self, category: Option<String>) -> Result<Vec<Skill>> {
        let mut list: Vec<Skill> = self
            .skills
            .read()
            .await
            .values()
            .filter(|s| category.as_ref().map_or(true, |c| &s.category == c))
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            a.order_index
                .cmp(&b.order_index)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(list)
    }

    async fn get_skill(&self, id: i64) -> Result<Option<Skill>> {
        Ok(self.skills.read().await.get(&id).cloned())
    }

    async fn create_skill(&self, req: CreateSkillRequest) -> Result<Skill> {
        let mut skills = self.skills.write().await;
        let skill = Skill {
            id: next_id(&skills),
            name: req.name,
            category: req.category,
            proficiency: req.proficiency,
            icon: req.icon,
            order_index: req.order_index,
            created_at: Utc::now(),
        };
        skills.insert(skill.id, skill.clone());
        Ok(skill)
    }

    async fn update_skill(&self, id: i64, req: UpdateSkillRequest) -> Result<Option<Skill>> {
        let mut skills = self.skills.write().await;
        let Some(s) = skills.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = req.name {
            s.name = v;
        }
        if let Some(v) = req.category {
            s.category = v;
        }
        if let Some(v) = req.proficiency {
            s.proficiency = v;
        }
        if let Some(v) = req.icon {
            s.icon = Some(v);
        }
        if let Some(v) = req.order_index {
            s.order_index = v;
        }
        Ok(Some(s.clone()))
    }

    async fn delete_skill(&self, id: i64) -> Result<bool> {
        Ok(self.skills.write().await.remove(&id).is_some())
    }

    async fn get_contact_info(&self) -> Result<Option<ContactInfo>> {
        Ok(self.contact.read().await.clone())
    }

    async fn create_contact_info(
        &self,
        req: CreateContactInfoRequest,
    ) -> Result<Option<ContactInfo>> {
        let mut contact = self.contact.write().await;
        if contact.is_some() {
            return Ok(None);
        }
        let info = ContactInfo {
            id: 1,
            email: req.email,
            phone: req.phone,
            location: req.location,
            linkedin_url: req.linkedin_url,
            github_url: req.github_url,
            twitter_url: req.twitter_url,
            website_url: req.website_url,
            created_at: Utc::now(),
            updated_at: None,
        };
        *contact = Some(info.clone());
        Ok(Some(info))
    }

    async fn update_contact_info(
        &self,
        req: UpdateContactInfoRequest,
    ) -> Result<Option<ContactInfo>> {
        let mut contact = self.contact.write().await;
        let Some(info) = contact.as_mut() else {
            return Ok(None);
        };
        if let Some(v) = req.email {
            info.email = v;
        }
        if let Some(v) = req.phone {
            info.phone = Some(v);
        }
        if let Some(v) = req.location {
            info.location = Some(v);
        }
        if let Some(v) = req.linkedin_url {
            info.linkedin_url = Some(v);
        }
        if let Some(v) = req.github_url {
            info.github_url = Some(v);
        }
        if let Some(v) = req.twitter_url {
            info.twitter_url = Some(v);
        }
        if let Some(v) = req.website_url {
            info.website_url = Some(v);
        }
        info.updated_at = Some(Utc::now());
        Ok(Some(info.clone()))
    }

    async fn create_message(&self, req: CreateMessageRequest) -> Result<ContactMessage> {
        let mut messages = self.messages.write().await;
        let message = ContactMessage {
            id: next_id(&messages),
            name: req.name,
            email: req.email,
            subject: req.subject,
            message: req.message,
            is_read: false,
            created_at: Utc::now(),
        };
        messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn list_messages(&self, filter: MessageFilter) -> Result<Vec<ContactMessage>> {
        let messages = self.messages.read().await;
        // Ids grow with creation time, so reverse id order is newest first
        Ok(messages
            .values()
            .rev()
            .filter(|m| !filter.unread_only || !m.is_read)
            .skip(filter.offset)
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn mark_message_read(&self, id: i64) -> Result<bool> {
        let mut messages = self.messages.write().await;
        Ok(messages
            .get_mut(&id)
            .map(|m| m.is_read = true)
            .is_some())
    }

    async fn delete_message(&self, id: i64) -> Result<bool> {
        Ok(self.messages.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(description: &str, order_index: i32) -> ListItemInput {
        ListItemInput {
            description: description.into(),
            order_index,
        }
    }

    fn message(name: &str) -> CreateMessageRequest {
        CreateMessageRequest {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            subject: None,
            message: "Hi".into(),
        }
    }

    #[tokio::test]
    async fn test_experiences_ordered_by_order_index_desc() {
        let store = InMemoryContentStore::seeded();
        let list = store.list_experiences().await.unwrap();
        let order: Vec<i32> = list.iter().map(|e| e.order_index).collect();
        assert_eq!(order, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_skills_ordered_and_grouped() {
        let store = InMemoryContentStore::seeded();
        let skills = store.list_skills(None).await.unwrap();
        // order_index 1 across categories, then by name
        let first: Vec<&str> = skills.iter().take(4).map(|s| s.name.as_str()).collect();
        assert_eq!(first, vec!["AWS", "PostgreSQL", "Python", "TensorFlow"]);

        let grouped = store.skills_grouped().await.unwrap();
        assert_eq!(grouped.len(), 4);
        let total: usize = grouped.iter().map(|g| g.skills.len()).sum();
        assert_eq!(total, 14);

        let categories = store.skill_categories().await.unwrap();
        assert_eq!(categories[0], "Cloud & DevOps");
        assert!(categories.contains(&"AI/ML Frameworks".to_string()));

        let devops = store
            .list_skills(Some("Cloud & DevOps".into()))
            .await
            .unwrap();
        assert_eq!(devops.len(), 4);
    }

    #[tokio::test]
    async fn test_create_assigns_max_plus_one() {
        let store = InMemoryContentStore::seeded();
        store.delete_skill(3).await.unwrap();
        let created = store
            .create_skill(CreateSkillRequest {
                name: "Rust".into(),
                category: "Programming Languages".into(),
                proficiency: 70,
                icon: None,
                order_index: 4,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 15);
    }

    #[tokio::test]
    async fn test_update_replaces_and_renumbers_nested_lists() {
        let store = InMemoryContentStore::seeded();
        let updated = store
            .update_experience(
                1,
                UpdateExperienceRequest {
                    achievements: Some(vec![item("Shipped", 5), item("Scaled", 2)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        let ids: Vec<i64> = updated.achievements.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(updated.achievements[0].order_index, 5);
        // Untouched list kept as is
        assert_eq!(updated.responsibilities.len(), 4);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_missing_records() {
        let store = InMemoryContentStore::new();
        assert!(store.get_about().await.unwrap().is_none());
        assert!(store
            .update_about(UpdateAboutRequest::default())
            .await
            .unwrap()
            .is_none());
        assert!(store.get_project(9).await.unwrap().is_none());
        assert!(!store.delete_highlight(9).await.unwrap());
        assert!(!store.mark_message_read(9).await.unwrap());
    }

    #[tokio::test]
    async fn test_singleton_create_only_once() {
        let store = InMemoryContentStore::seeded();
        let again = store
            .create_contact_info(CreateContactInfoRequest {
                email: "new@example.com".into(),
                phone: None,
                location: None,
                linkedin_url: None,
                github_url: None,
                twitter_url: None,
                website_url: None,
            })
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_projects_featured_filter() {
        let store = InMemoryContentStore::seeded();
        store
            .update_project(
                2,
                UpdateProjectRequest {
                    is_featured: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let featured = store.list_projects(Some(true)).await.unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].id, 1);
        assert_eq!(store.list_projects(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_messages_newest_first_with_paging() {
        let store = InMemoryContentStore::new();
        for name in ["Ann", "Bob", "Cat"] {
            store.create_message(message(name)).await.unwrap();
        }
        store.mark_message_read(3).await.unwrap();

        let all = store.list_messages(MessageFilter::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Cat", "Bob", "Ann"]);

        let unread = store
            .list_messages(MessageFilter {
                unread_only: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(unread.len(), 2);

        let page = store
            .list_messages(MessageFilter {
                offset: 1,
                limit: 1,
                unread_only: false,
            })
            .await
            .unwrap();
        assert_eq!(page[0].name, "Bob");
    }
}
