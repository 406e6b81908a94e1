use serde::{Deserialize, Serialize};

use crate::id;

use super::work::WorkId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub author_name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub final_work_id: Option<WorkId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    pub author_name: String,
}

id!(Comment);
