//! JSON request model of the layout service.
//!
//! A request body looks like
//!
//! ```json
//! {
//!   "nodes": [{"id": "a"}, {"id": "b", "label": "B", "value": 3}],
//!   "links": [{"source": "a", "target": "b", "weight": 2.0}],
//!   "options": {"layout": {"algorithm": "fruchterman_reingold", "seed": 7}}
//! }
//! ```
//!
//! and the response is a serialized [`LayoutResult`].

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{Link, Node};
use crate::options::LayoutOptions;
use crate::result::LayoutResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub options: RequestOptions,
}

/// Request-level options. Only the `layout` section is read; other sections are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    pub layout: LayoutOptions,
}

impl GraphData {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

pub fn generate_layout(data: GraphData) -> Result<LayoutResult> {
    crate::generate(data.nodes, data.links, &data.options.layout)
}
