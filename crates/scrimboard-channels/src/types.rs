use serde::{Deserialize, Serialize};

/// Opaque reference to a sent message, enough to delete it later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageHandle(pub String);

impl std::fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The live board message. `id` is what gets persisted across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardArtifact {
    pub id: String,
}

/// One titled block of the board (a Discord embed field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardField {
    pub name: String,
    pub value: String,
}

impl BoardField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A complete board body, ready to publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedBoard {
    pub title: String,
    pub description: String,
    pub fields: Vec<BoardField>,
}

impl RenderedBoard {
    /// Plain-text rendering, used for logs and non-embed channels.
    pub fn to_text(&self) -> String {
        let mut out = format!("{}\n{}", self.title, self.description);
        for field in &self.fields {
            out.push('\n');
            out.push_str(&field.name);
            out.push('\n');
            out.push_str(&field.value);
        }
        out
    }
}
