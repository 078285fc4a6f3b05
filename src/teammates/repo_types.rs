use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_AVATAR: &str = "https://randomuser.me/api/portraits/lego/1.jpg";

/// Directory entry. Browsable only, not a login identity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Teammate {
    pub id: Uuid,
    pub name: String,
    pub skills: Vec<String>,
    pub availability: String,
    pub bio: String,
    pub avatar: String,
}

/// Teammate before it has been assigned an id.
#[derive(Debug, Clone)]
pub struct NewTeammate {
    pub name: String,
    pub skills: Vec<String>,
    pub availability: String,
    pub bio: String,
    pub avatar: Option<String>,
}

impl NewTeammate {
    pub fn into_teammate(self) -> Teammate {
        Teammate {
            id: Uuid::new_v4(),
            name: self.name,
            skills: self.skills,
            availability: self.availability,
            bio: self.bio,
            avatar: self.avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
        }
    }
}

/// Case-insensitive substring filters over the directory.
///
/// Both inputs are matched literally: regex metacharacters are escaped, so
/// `"c++"` matches the skill `"C++"` and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeammateFilter {
    pub skill: Option<String>,
    pub availability: Option<String>,
}

impl TeammateFilter {
    pub fn new(skill: Option<String>, availability: Option<String>) -> Self {
        Self {
            skill: skill.filter(|s| !s.is_empty()),
            availability: availability.filter(|s| !s.is_empty()),
        }
    }

    /// Escaped pattern for the skill filter, usable by both `regex` and
    /// Postgres `~*`.
    pub fn skill_pattern(&self) -> Option<String> {
        self.skill.as_deref().map(regex::escape)
    }

    pub fn availability_pattern(&self) -> Option<String> {
        self.availability.as_deref().map(regex::escape)
    }

    pub fn matcher(&self) -> Result<TeammateMatcher, regex::Error> {
        Ok(TeammateMatcher {
            skill: self.skill_pattern().map(|p| compile(&p)).transpose()?,
            availability: self.availability_pattern().map(|p| compile(&p)).transpose()?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Compiled form of [`TeammateFilter`] for in-process filtering.
pub struct TeammateMatcher {
    skill: Option<Regex>,
    availability: Option<Regex>,
}

impl TeammateMatcher {
    pub fn matches(&self, t: &Teammate) -> bool {
        let skill_ok = self
            .skill
            .as_ref()
            .map_or(true, |re| t.skills.iter().any(|s| re.is_match(s)));
        let availability_ok = self
            .availability
            .as_ref()
            .map_or(true, |re| re.is_match(&t.availability));
        skill_ok && availability_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teammate(skills: &[&str], availability: &str) -> Teammate {
        NewTeammate {
            name: "T".into(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            availability: availability.into(),
            bio: String::new(),
            avatar: None,
        }
        .into_teammate()
    }

    #[test]
    fn empty_filters_are_dropped() {
        let f = TeammateFilter::new(Some(String::new()), Some(String::new()));
        assert_eq!(f, TeammateFilter::default());
        assert!(f.matcher().unwrap().matches(&teammate(&[], "Now")));
    }

    #[test]
    fn skill_matches_any_entry_case_insensitively() {
        let m = TeammateFilter::new(Some("REACT".into()), None).matcher().unwrap();
        assert!(m.matches(&teammate(&["JavaScript", "React"], "Now")));
        assert!(!m.matches(&teammate(&["Python"], "Now")));
    }

    #[test]
    fn metacharacters_are_literal() {
        let m = TeammateFilter::new(Some("c++".into()), None).matcher().unwrap();
        assert!(m.matches(&teammate(&["C++", "Java"], "Now")));
        assert!(!m.matches(&teammate(&["C", "Python"], "Now")));

        let m = TeammateFilter::new(Some("(".into()), None).matcher().unwrap();
        assert!(!m.matches(&teammate(&["Rust"], "Now")));
    }

    #[test]
    fn availability_is_substring_match() {
        let m = TeammateFilter::new(None, Some("week".into())).matcher().unwrap();
        assert!(m.matches(&teammate(&[], "This Weekend")));
        assert!(m.matches(&teammate(&[], "Next Week")));
        assert!(!m.matches(&teammate(&[], "Now")));
    }

    #[test]
    fn missing_avatar_gets_placeholder() {
        assert_eq!(teammate(&[], "Now").avatar, DEFAULT_AVATAR);
    }
}
