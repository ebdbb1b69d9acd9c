pub mod config;
pub mod features;
pub mod label;
pub mod merge;
pub mod rasterize;

use figcue_core::config::{load_config, PipelineConfig};
use figcue_core::error::FigcueError;
use figcue_core::model::{Block, LayoutDocument, ZoneRange};
use serde::Deserialize;
use std::path::Path;

/// Config from `--config`, or defaults when none was given.
pub fn effective_config(path: Option<&Path>) -> Result<PipelineConfig, FigcueError> {
    match path {
        Some(p) => load_config(p),
        None => Ok(PipelineConfig::default()),
    }
}

/// Input of the `features` and `label` commands: a layout document plus the
/// token ranges that make up the figure body.
#[derive(Debug, Deserialize)]
pub struct EncodeRequest {
    #[serde(flatten)]
    pub document: LayoutDocument,
    #[serde(default)]
    pub body: Vec<ZoneRange>,
}

impl EncodeRequest {
    pub fn load(path: &Path) -> Result<EncodeRequest, FigcueError> {
        let bytes = std::fs::read(path)?;
        let mut request: EncodeRequest = serde_json::from_slice(&bytes)?;
        // Without explicit blocks the whole stream is one block.
        if request.document.blocks.is_empty() && !request.document.tokens.is_empty() {
            request.document.blocks.push(Block {
                page_number: request.document.tokens[0].page_number,
                start_token: 0,
                end_token: request.document.tokens.len(),
            });
        }
        if request.body.is_empty() {
            request.body.push(request.document.full_range());
        }
        Ok(request)
    }
}
