//! Initial portfolio content
//!
//! Loaded into a fresh in-memory store and reused by the public site as the
//! fallback shown before (or instead of) a successful fetch.

use super::models::*;
use chrono::{DateTime, Utc};

fn items(descriptions: &[&str]) -> Vec<ListItem> {
    descriptions
        .iter()
        .zip(1..)
        .map(|(d, i)| ListItem {
            id: i,
            description: d.to_string(),
            order_index: i as i32,
        })
        .collect()
}

fn technologies(names: &[&str]) -> Vec<Technology> {
    names
        .iter()
        .zip(1..)
        .map(|(n, i)| Technology {
            id: i,
            name: n.to_string(),
        })
        .collect()
}

pub fn about_info(now: DateTime<Utc>) -> AboutInfo {
    AboutInfo {
        id: 1,
        name: "Zahid Rashid".into(),
        title: "AI Engineer & Machine Learning Specialist".into(),
        description: "Passionate AI Engineer with expertise in machine learning, deep learning, \
                      and data science. I specialize in developing innovative AI solutions, \
                      building predictive models, and integrating cutting-edge AI technologies \
                      into business applications to drive digital transformation."
            .into(),
        profile_image: Some("/assets/zahid-profile.jpeg".into()),
        years_experience: 3,
        ai_projects: 25,
        ml_models: 50,
        accuracy_rate: 98,
        cv_url: Some("/resume.pdf".into()),
        created_at: now,
        updated_at: None,
    }
}

pub fn highlights(now: DateTime<Utc>) -> Vec<Highlight> {
    [
        ("🚀", "Building the Future with AI"),
        ("💡", "Innovative Problem Solver"),
        ("⚡", "Performance Optimizer"),
    ]
    .into_iter()
    .zip(1..)
    .map(|((icon, text), i)| Highlight {
        id: i,
        icon: icon.into(),
        text: text.into(),
        order_index: i as i32,
        created_at: now,
    })
    .collect()
}

pub fn experiences(now: DateTime<Utc>) -> Vec<Experience> {
    vec![
        Experience {
            id: 1,
            title: "Senior AI Engineer".into(),
            company: "CareCloud".into(),
            duration: "Jan 2025 - Present".into(),
            location: "Bagh AJK, Pakistan".into(),
            employment_type: "Full-time".into(),
            order_index: 3,
            created_at: now,
            updated_at: None,
            responsibilities: items(&[
                "Lead development of machine learning models for predictive analytics and business intelligence",
                "Architect and implement scalable AI solutions using TensorFlow, PyTorch, and cloud platforms",
                "Collaborate with cross-functional teams to integrate AI solutions into existing products",
                "Mentor junior developers and conduct technical workshops on AI/ML best practices",
            ]),
            achievements: items(&[
                "Increased model accuracy by 25% through advanced optimization techniques",
                "Reduced inference time by 40% through model optimization and deployment strategies",
                "Led a team of 5 engineers in developing a real-time recommendation system",
                "Presented research findings at Pakistan AI Summit 2023",
                "RCM automation",
            ]),
            projects: Vec::new(),
            technologies: technologies(&[
                "Python",
                "TensorFlow",
                "PyTorch",
                "AWS",
                "Docker",
                "Langchain",
                "LangGraph",
                "RAG",
            ]),
        },
        Experience {
            id: 2,
            title: "AI/ML Engineer".into(),
            company: "CareCloud".into(),
            duration: "Jan 2024 - Dec 2024".into(),
            location: "Bagh AJK, Pakistan".into(),
            employment_type: "Full-time".into(),
            order_index: 2,
            created_at: now,
            updated_at: None,
            responsibilities: items(&[
                "Developed end-to-end machine learning pipelines for data processing and model training",
                "Built computer vision models for image classification and object detection",
                "Implemented natural language processing solutions for text analysis",
                "Created data visualization dashboards for business stakeholders",
            ]),
            achievements: items(&[
                "Deployed 10+ ML models in production with 99.5% uptime",
                "Improved data processing efficiency by 35% through pipeline optimization",
                "Developed an automated anomaly detection system that reduced manual monitoring by 60%",
                "Work on the Charges automation",
            ]),
            projects: Vec::new(),
            technologies: technologies(&[
                "Python",
                "Scikit-learn",
                "OpenCV",
                "NLTK",
                "SQL",
                "FastAPI",
                "Selenium",
                "PyAutoGUI",
                "PyAutoIT",
            ]),
        },
    ]
}

pub fn projects(now: DateTime<Utc>) -> Vec<Project> {
    vec![
        Project {
            id: 1,
            title: "Intelligent Customer Analytics Platform".into(),
            description: "End-to-end ML platform for customer behavior prediction and segmentation \
                          using advanced deep learning techniques."
                .into(),
            image: Some("/projects/analytics-platform.jpg".into()),
            github_url: Some("https://github.com/zahidrashid".into()),
            live_url: Some("https://analytics-platform.demo.com".into()),
            order_index: 1,
            is_featured: true,
            created_at: now,
            updated_at: None,
            technologies: technologies(&["Python", "TensorFlow", "AWS", "React", "SQL"]),
            features: items(&[
                "Real-time customer behavior prediction",
                "Advanced customer segmentation algorithms",
                "Interactive analytics dashboard",
                "Automated model retraining pipeline",
            ]),
            metrics: items(&[
                "25% increase in customer retention",
                "40% improvement in marketing ROI",
            ]),
        },
        Project {
            id: 2,
            title: "AI-Powered Content Recommendation Engine".into(),
            description: "Scalable recommendation system using collaborative filtering and deep \
                          learning for personalized content delivery."
                .into(),
            image: Some("/projects/recommendation-engine.jpg".into()),
            github_url: Some("https://github.com/zahidrashid".into()),
            live_url: Some("https://recommendation-engine.demo.com".into()),
            order_index: 2,
            is_featured: true,
            created_at: now,
            updated_at: None,
            technologies: technologies(&["PyTorch", "FastAPI", "Docker", "MongoDB"]),
            features: items(&[
                "Hybrid recommendation algorithms",
                "Real-time inference API",
                "A/B testing framework",
                "Scalable microservices architecture",
            ]),
            metrics: items(&[
                "35% increase in user engagement",
                "50% reduction in content discovery time",
            ]),
        },
    ]
}

pub fn skills(now: DateTime<Utc>) -> Vec<Skill> {
    [
        ("TensorFlow", "AI/ML Frameworks", 90, "🧠", 1),
        ("PyTorch", "AI/ML Frameworks", 85, "🔥", 2),
        ("Scikit-learn", "AI/ML Frameworks", 95, "📊", 3),
        ("Keras", "AI/ML Frameworks", 88, "🧪", 4),
        ("Hugging Face", "AI/ML Frameworks", 80, "🤗", 5),
        ("Python", "Programming Languages", 95, "🐍", 1),
        ("JavaScript", "Programming Languages", 85, "📜", 2),
        ("SQL", "Programming Languages", 90, "🗄️", 3),
        ("AWS", "Cloud & DevOps", 85, "☁️", 1),
        ("Docker", "Cloud & DevOps", 80, "🐳", 2),
        ("MLflow", "Cloud & DevOps", 85, "📈", 3),
        ("Git", "Cloud & DevOps", 90, "🔀", 4),
        ("PostgreSQL", "Data & Databases", 85, "🐘", 1),
        ("MongoDB", "Data & Databases", 80, "🍃", 2),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, category, proficiency, icon, order_index), id)| Skill {
        id,
        name: name.into(),
        category: category.into(),
        proficiency,
        icon: Some(icon.into()),
        order_index,
        created_at: now,
    })
    .collect()
}

pub fn contact_info(now: DateTime<Utc>) -> ContactInfo {
    ContactInfo {
        id: 1,
        email: "zahid@example.com".into(),
        phone: Some("+92-123-456-7890".into()),
        location: Some("Bagh AJK, Pakistan".into()),
        linkedin_url: Some("https://linkedin.com/in/zahidrashid".into()),
        github_url: Some("https://github.com/zahidrashid".into()),
        twitter_url: Some("https://twitter.com/zahidrashid".into()),
        website_url: Some("https://zahidrashid.dev".into()),
        created_at: now,
        updated_at: None,
    }
}
