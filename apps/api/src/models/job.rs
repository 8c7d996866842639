use serde::{Deserialize, Serialize};

/// A job posting: one directory under the data root holding
/// `jobDescription.txt` and an `applications/` subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub name: String,
    pub description: String,
}
