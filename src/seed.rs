use tracing::{info, warn};

use crate::{
    auth::{dto::SignupRequest, AuthService},
    error::AppError,
    store::TeammateStore,
    teammates::repo_types::NewTeammate,
};

pub const DEV_USER_EMAIL: &str = "test@example.com";
pub const DEV_USER_PASSWORD: &str = "password123";

fn teammate(name: &str, skills: &[&str], availability: &str, bio: &str, avatar: &str) -> NewTeammate {
    NewTeammate {
        name: name.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        availability: availability.to_string(),
        bio: bio.to_string(),
        avatar: Some(avatar.to_string()),
    }
}

pub fn sample_teammates() -> Vec<NewTeammate> {
    vec![
        teammate(
            "Alice Johnson",
            &["Python", "Machine Learning", "Data Science"],
            "Now",
            "AI researcher with 5 years of experience",
            "https://randomuser.me/api/portraits/women/1.jpg",
        ),
        teammate(
            "Bob Smith",
            &["JavaScript", "React", "UI/UX Design"],
            "Later Today",
            "Frontend developer passionate about creating beautiful interfaces",
            "https://randomuser.me/api/portraits/men/2.jpg",
        ),
        teammate(
            "Charlie Davis",
            &["AI", "Design", "Project Management"],
            "This Weekend",
            "Product designer with AI expertise",
            "https://randomuser.me/api/portraits/men/3.jpg",
        ),
        teammate(
            "Diana Miller",
            &["Node.js", "MongoDB", "AWS"],
            "Next Week",
            "Backend developer specialized in cloud architecture",
            "https://randomuser.me/api/portraits/women/4.jpg",
        ),
        teammate(
            "Ethan Wilson",
            &["Mobile Dev", "Flutter", "Firebase"],
            "Now",
            "Mobile app developer who loves creating cross-platform solutions",
            "https://randomuser.me/api/portraits/men/5.jpg",
        ),
    ]
}

/// Insert the sample teammates if the directory is empty.
pub async fn seed_directory(store: &dyn TeammateStore) -> anyhow::Result<()> {
    if store.count().await? > 0 {
        return Ok(());
    }
    let teammates = sample_teammates();
    let n = teammates.len();
    store.insert_many(teammates).await?;
    info!(count = n, "seeded teammate directory");
    Ok(())
}

/// Development login for database-less runs.
pub async fn seed_dev_user(auth: &AuthService) -> anyhow::Result<()> {
    let req = SignupRequest {
        full_name: Some("Test User".into()),
        email: Some(DEV_USER_EMAIL.into()),
        password: Some(DEV_USER_PASSWORD.into()),
        skills: Some(vec!["JavaScript".into(), "React".into()]),
        bio: Some("Test user for development".into()),
        availability: Some("Now".into()),
    };
    match auth.sign_up(req).await {
        Ok(user) => {
            info!(user_id = %user.id, email = DEV_USER_EMAIL, "seeded development user");
            Ok(())
        }
        Err(AppError::Conflict(_)) => Ok(()),
        Err(e) => {
            warn!(error = %e, "could not seed development user");
            Err(e.into())
        }
    }
}
