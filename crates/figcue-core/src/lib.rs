pub mod clipzone;
pub mod config;
pub mod error;
pub mod features;
pub mod labels;
pub mod layout;
pub mod model;
pub mod oracle;
pub mod rasterize;
pub mod tools;
pub mod vecfile;

use clipzone::{MergeOptions, MergedZones};
use error::FigcueError;
use features::FeaturedBody;
use labels::LabeledToken;
use layout::AssetLayout;
use model::{LayoutDocument, ZoneRange};
use oracle::SequenceLabeler;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Parse one page's vector XML and merge its clip zones.
pub fn merge_vec(xml: &str, options: &MergeOptions) -> Result<MergedZones, FigcueError> {
    let primitives = vecfile::parse_vec(xml)?;
    Ok(clipzone::merge(primitives, options))
}

/// One zone file written by the separation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenZone {
    pub key: String,
    pub page_number: usize,
    pub path: PathBuf,
    pub members: usize,
    pub regions: usize,
}

/// Merge the zones of one raw page file and write every surviving zone
/// into `out_dir`.
///
/// On error, zone files already written for this page are removed again.
pub fn process_vec_file(
    path: &Path,
    out_dir: &Path,
    options: &MergeOptions,
) -> Result<Vec<WrittenZone>, FigcueError> {
    let xml = std::fs::read_to_string(path)?;
    let zones = merge_vec(&xml, options)?;
    let plan = clipzone::naming::plan_outputs(&zones)?;

    let mut written: Vec<WrittenZone> = Vec::with_capacity(plan.len());
    for output in plan {
        let Some(group) = zones.get(&output.key) else {
            continue;
        };
        let target = out_dir.join(&output.file_name);
        if let Err(e) = vecfile::write_zone_file(&target, group.members()) {
            for zone in &written {
                if let Err(remove_err) = std::fs::remove_file(&zone.path) {
                    tracing::warn!(
                        file = %zone.path.display(),
                        error = %remove_err,
                        "could not remove partial zone output"
                    );
                }
            }
            return Err(e);
        }
        tracing::debug!(
            key = %output.key,
            file = %target.display(),
            members = group.len(),
            "wrote zone"
        );
        written.push(WrittenZone {
            key: output.key,
            page_number: output.page_number,
            path: target,
            members: group.len(),
            regions: group.region_count(),
        });
    }

    Ok(written)
}

/// Outcome of one raw file in a separation batch.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub zones: Vec<WrittenZone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeparationReport {
    pub files: Vec<FileOutcome>,
}

impl SeparationReport {
    pub fn zone_count(&self) -> usize {
        self.files.iter().map(|f| f.zones.len()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.error.is_some())
    }
}

/// Separate the figures of a whole asset directory: every raw `.vec` file is
/// merged and its zones written to `figureVecs/`.
///
/// Both output directories are emptied first, so `figureVecs/` only ever
/// holds the zones of this run. A file that fails to parse or write is
/// recorded in the report and the batch moves on. Only failures to set up
/// the directories abort.
pub fn separate_figures(
    layout: &AssetLayout,
    options: &MergeOptions,
) -> Result<SeparationReport, FigcueError> {
    layout.prepare(true)?;
    let out_dir = layout.vec_dir();

    let mut report = SeparationReport::default();
    for source in layout.raw_vec_files()? {
        let outcome = match process_vec_file(&source, &out_dir, options) {
            Ok(zones) => FileOutcome {
                source,
                zones,
                error: None,
            },
            Err(e) => {
                tracing::warn!(file = %source.display(), error = %e, "skipping vector file");
                FileOutcome {
                    source,
                    zones: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        report.files.push(outcome);
    }

    tracing::debug!(
        files = report.files.len(),
        zones = report.zone_count(),
        "figure separation finished"
    );
    Ok(report)
}

/// Encode the figure body of a document for the labeler.
pub fn encode_body(
    document: &LayoutDocument,
    ranges: &[ZoneRange],
) -> Result<FeaturedBody, FigcueError> {
    features::encode(document, ranges)
}

/// Encode, label and align in one step.
pub fn label_document(
    document: &LayoutDocument,
    ranges: &[ZoneRange],
    labeler: &dyn SequenceLabeler,
) -> Result<Vec<LabeledToken>, FigcueError> {
    let body = features::encode(document, ranges)?;
    let labeled = oracle::label_body(&body, labeler)?;
    labels::align_labels(&body, &labeled)
}
