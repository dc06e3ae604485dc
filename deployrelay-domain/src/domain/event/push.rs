use super::null_as_default;
use serde::{Deserialize, Serialize};

pub const MAIN_BRANCH_REF: &str = "refs/heads/main";
pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const NO_COMMIT_MESSAGE: &str = "No commit message";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Commit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub author: Option<CommitAuthor>,
}

impl Commit {
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|author| author.name.as_deref())
            .unwrap_or(UNKNOWN_AUTHOR)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PushEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub r#ref: String,
    /// Head of the branch after the push; used when `commits` is empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub after: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub commits: Vec<Commit>,
}

impl PushEvent {
    pub fn is_main_branch(&self) -> bool {
        self.r#ref == MAIN_BRANCH_REF
    }

    /// The commit to announce: the last one pushed, or a placeholder built
    /// from `after` when the push carried no commits.
    pub fn latest_commit(&self) -> Commit {
        match self.commits.last() {
            Some(commit) => commit.clone(),
            None => Commit {
                id: self.after.clone(),
                message: NO_COMMIT_MESSAGE.to_owned(),
                author: None,
            },
        }
    }
}
