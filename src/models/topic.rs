//! Topic wire model.

use serde::{Deserialize, Serialize};

use crate::db::Topic;

/// Topic as exposed over HTTP, standalone or nested in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicResponse {
    pub id: i64,
    pub name: String,
}

impl From<Topic> for TopicResponse {
    fn from(topic: Topic) -> Self {
        TopicResponse {
            id: topic.id,
            name: topic.name,
        }
    }
}
