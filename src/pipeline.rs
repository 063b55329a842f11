use crate::{
    catalog::ProductOptions,
    compositor::{self, CompositeJob, FrameMetrics},
    editor::PlacementState,
    error::{CaseError, CaseResult},
    model::{Configuration, ConfigurationId},
    store::ConfigurationStore,
    upload::{UploadFile, UploadPipeline},
};

/// Runs one confirm action end to end: measure the live layout, re-render the
/// composite from the current placement, and commit the composite URL plus
/// the chosen options to the configuration as a single write.
///
/// Callers must serialize confirms per configuration (the host UI disables
/// the action while one is in flight); there is no cancellation once started.
/// On any failure the configuration is left untouched and the error's kind is
/// logged while the user sees a generic message.
///
/// Re-running with an unchanged placement and options is idempotent: the
/// composite is re-uploaded but lands on a content-equal configuration.
#[tracing::instrument(skip_all, fields(configuration = %config_id))]
pub fn confirm_design(
    metrics: &dyn FrameMetrics,
    placement: PlacementState,
    options: ProductOptions,
    config_id: &ConfigurationId,
    configurations: &dyn ConfigurationStore,
    uploads: &dyn UploadPipeline,
) -> CaseResult<Configuration> {
    // Measured at the instant of confirm; responsive layout may have moved
    // the frame since the drag started.
    let viewport = metrics
        .viewport_rect()
        .ok_or_else(|| CaseError::geometry("editor viewport is not mounted"))?;
    let template = metrics
        .template_rect()
        .ok_or_else(|| CaseError::geometry("template frame is not mounted"))?;

    let configuration = configurations.find_by_id(config_id)?;

    let source_bytes = uploads.fetch(&configuration.source_image.url)?;
    let source = compositor::decode_source(&source_bytes)?;

    let job = CompositeJob {
        placement,
        viewport,
        template,
        options,
    };
    let artifact = compositor::compose(&job, &source)?;
    tracing::debug!(
        width = artifact.width,
        height = artifact.height,
        "composite rendered"
    );

    let file = UploadFile {
        file_name: format!("{config_id}-case.png"),
        bytes: artifact.png,
    };
    let outcome = uploads.upload_composite(&file, config_id, options)?;
    Ok(outcome.configuration)
}
