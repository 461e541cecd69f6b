#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("link #{link_index} references an unknown node: {node_id}")]
    UnknownNodeReference { link_index: usize, node_id: String },

    #[error("invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
