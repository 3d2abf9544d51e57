use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Club {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// URL of the uploaded club image, if any
    #[serde(alias = "icon")]
    pub image: Option<String>,
    pub head_coordinators: Vec<String>,
    pub members: Vec<String>,
    pub pending_members: Vec<String>,
}

impl Club {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
