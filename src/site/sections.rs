//! Public-site sections, each kept fresh by the change bus

use super::client::PortfolioClient;
use super::fallback;
use crate::content::{AboutInfo, ContactInfo, Experience, Highlight, Project, SkillCategory};
use crate::events::{ChangeHub, ChangeType, Interest};
use crate::refresh::Refreshable;
use anyhow::Result;
use std::future::Future;

/// Everything the public site renders, one [`Refreshable`] per section
#[derive(Debug)]
pub struct SiteSections {
    pub about: Refreshable<AboutInfo>,
    pub highlights: Refreshable<Vec<Highlight>>,
    pub experiences: Refreshable<Vec<Experience>>,
    pub projects: Refreshable<Vec<Project>>,
    pub skills: Refreshable<Vec<SkillCategory>>,
    pub contact: Refreshable<ContactInfo>,
}

/// Build a fetcher that calls `op` on its own clone of `client`
fn fetcher<T, F, Fut>(client: &PortfolioClient, op: F) -> impl Fn() -> Fut + Send + Sync + 'static
where
    F: Fn(PortfolioClient) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let client = client.clone();
    move || op(client.clone())
}

impl SiteSections {
    /// Start every section's first fetch and subscribe each to its category.
    ///
    /// Must be called inside a tokio runtime.
    pub fn mount(hub: &ChangeHub, client: &PortfolioClient) -> Self {
        Self {
            about: Refreshable::new(
                "about",
                hub,
                fetcher(client, |c| async move { c.about().await }),
                fallback::about(),
                Some(Interest::from(ChangeType::About)),
            ),
            highlights: Refreshable::new(
                "highlights",
                hub,
                fetcher(client, |c| async move { c.highlights().await }),
                fallback::highlights(),
                Some(Interest::from(ChangeType::Highlights)),
            ),
            experiences: Refreshable::new(
                "experiences",
                hub,
                fetcher(client, |c| async move { c.experiences().await }),
                fallback::experiences(),
                Some(Interest::from(ChangeType::Experiences)),
            ),
            projects: Refreshable::new(
                "projects",
                hub,
                fetcher(client, |c| async move { c.projects(None).await }),
                fallback::projects(),
                Some(Interest::from(ChangeType::Projects)),
            ),
            skills: Refreshable::new(
                "skills",
                hub,
                fetcher(client, |c| async move { c.skills_grouped().await }),
                fallback::skills(),
                Some(Interest::from(ChangeType::Skills)),
            ),
            contact: Refreshable::new(
                "contact",
                hub,
                fetcher(client, |c| async move { c.contact_info().await }),
                fallback::contact(),
                Some(Interest::from(ChangeType::Contact)),
            ),
        }
    }

    /// Wait until no section has a fetch in flight
    pub async fn settled(&self) {
        self.about.settled().await;
        self.highlights.settled().await;
        self.experiences.settled().await;
        self.projects.settled().await;
        self.skills.settled().await;
        self.contact.settled().await;
    }

    /// `(label, error)` for every section whose last fetch failed
    pub fn errors(&self) -> Vec<(&str, String)> {
        [
            (self.about.label(), self.about.error()),
            (self.highlights.label(), self.highlights.error()),
            (self.experiences.label(), self.experiences.error()),
            (self.projects.label(), self.projects.error()),
            (self.skills.label(), self.skills.error()),
            (self.contact.label(), self.contact.error()),
        ]
        .into_iter()
        .filter_map(|(label, error)| error.map(|e| (label, e)))
        .collect()
    }
}
