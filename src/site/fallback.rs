//! Static content shown until the first fetch succeeds, or when the API is down

use crate::content::{
    group_skills, seed, AboutInfo, ContactInfo, Experience, Highlight, Project, SkillCategory,
};
use chrono::{DateTime, Utc};

/// Fallbacks carry a fixed timestamp so they compare equal across calls
fn stamp() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

pub fn about() -> AboutInfo {
    seed::about_info(stamp())
}

pub fn highlights() -> Vec<Highlight> {
    seed::highlights(stamp())
}

pub fn experiences() -> Vec<Experience> {
    seed::experiences(stamp())
}

pub fn projects() -> Vec<Project> {
    seed::projects(stamp())
}

pub fn skills() -> Vec<SkillCategory> {
    group_skills(&seed::skills(stamp()))
}

pub fn contact() -> ContactInfo {
    seed::contact_info(stamp())
}
