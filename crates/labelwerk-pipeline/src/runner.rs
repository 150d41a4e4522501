// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The per-file pipeline: classify → claim → transform → dispatch, with the
// failure path parking evidence in failed/. One invocation handles exactly
// one file; the watcher that feeds it lives outside this crate.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, instrument, warn};

use labelwerk_core::config::{LabelConfig, Transport};
use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::{ContentKind, JobId};
use labelwerk_document::{crop_pdf, load_image_to_gray, render_pdf_to_gray, scale_to_canvas};
use labelwerk_print::power::{PowerCommand, power_switch};
use labelwerk_print::zpl::{MonoBitmap, encode_gfa, encode_text_field};
use labelwerk_print::{DispatchOptions, PrintDispatcher};

use crate::profiles::{CropRule, LabelProfile, OutputKind, PostCrop, classify};
use crate::staging::{Stage, StagedFile, StagingArea};

/// Result of a successfully processed file.
#[derive(Debug)]
pub struct Outcome {
    pub job_id: JobId,
    /// Final artifact under `printed/`.
    pub artifact: PathBuf,
}

/// Drives one label file through the pipeline.
///
/// The dispatcher is injected so the same orchestration runs against a real
/// network printer in production and a recording double in tests.
pub struct Pipeline<'a, D: PrintDispatcher> {
    config: &'a LabelConfig,
    dispatcher: &'a D,
}

impl<'a, D: PrintDispatcher> Pipeline<'a, D> {
    pub fn new(config: &'a LabelConfig, dispatcher: &'a D) -> Self {
        Self { config, dispatcher }
    }

    /// Process `filename` out of the staging area rooted at `base_dir`.
    ///
    /// On failure the original backup stays in `original/` and the
    /// furthest-progressed evidence lands in `failed/` before the error
    /// propagates.
    #[instrument(skip(self, base_dir))]
    pub async fn process(&self, filename: &str, base_dir: &Path) -> Result<Outcome> {
        let staging = StagingArea::open(base_dir)?;

        let profile = classify(filename);
        info!(profile = profile.name, "File classified");

        let original = staging.claim(filename)?;
        let mut staged = StagedFile::new(filename);
        staged.set_location(Stage::Original);

        match self
            .execute(filename, profile, &original, &staging, &mut staged)
            .await
        {
            Ok(outcome) => {
                staged.set_location(Stage::Printed);
                info!(job_id = %outcome.job_id, "File processed");
                Ok(outcome)
            }
            Err(err) => {
                warn!(%err, "Processing failed, parking evidence");
                if let Err(park_err) = staging.park_failure(&original, staged.artifacts()) {
                    warn!(%park_err, "Could not park failure evidence");
                }
                staged.set_location(Stage::Failed);
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        filename: &str,
        profile: &LabelProfile,
        original: &Path,
        staging: &StagingArea,
        staged: &mut StagedFile,
    ) -> Result<Outcome> {
        if let Some(host) = &self.config.power_host {
            power_switch(host, PowerCommand::On).await;
            sleep(Duration::from_secs(self.config.power_on_delay_secs)).await;
        }

        let artifact = self.transform(filename, profile, original, staging, staged)?;
        let job_id = self.dispatch(filename, profile, &artifact).await?;

        // Power-off only follows a successful print; a failure leaves the
        // printer on for the retry.
        if let Some(host) = &self.config.power_host {
            sleep(Duration::from_secs(self.config.power_off_delay_secs)).await;
            power_switch(host, PowerCommand::Off).await;
        }

        Ok(Outcome { job_id, artifact })
    }

    /// Apply the profile's transform recipe, recording every artifact as it
    /// appears so the failure path knows how far we got.
    fn transform(
        &self,
        filename: &str,
        profile: &LabelProfile,
        original: &Path,
        staging: &StagingArea,
        staged: &mut StagedFile,
    ) -> Result<PathBuf> {
        let final_path = staging.path(Stage::Printed, &profile.artifact_name(filename));

        match profile.output {
            OutputKind::CopyOnly => {
                fs::copy(original, &final_path)?;
            }
            OutputKind::CroppedPdf => {
                let rule = crop_rule(profile)?;
                crop_pdf(original, &final_path, &rule.margins, rule.unit)?;
            }
            OutputKind::ScaledPdf => {
                let rule = crop_rule(profile)?;
                let intermediate =
                    staging.path(Stage::Printed, &profile.intermediate_name(filename));
                crop_pdf(original, &intermediate, &rule.margins, rule.unit)?;
                staged.record_artifact(intermediate.clone());

                let PostCrop::FitToCanvas(canvas) = profile.post_crop else {
                    return Err(LabelwerkError::Config(format!(
                        "profile '{}' produces a scaled PDF but carries no canvas rule",
                        profile.name
                    )));
                };
                scale_to_canvas(
                    &intermediate,
                    &final_path,
                    canvas.width_pt,
                    canvas.height_pt,
                    canvas.rotation_deg,
                    canvas.offset_x,
                    canvas.offset_y,
                )?;
            }
        }

        staged.record_artifact(final_path.clone());
        info!(artifact = %final_path.display(), "Artifact produced");
        Ok(final_path)
    }

    async fn dispatch(
        &self,
        filename: &str,
        profile: &LabelProfile,
        artifact: &Path,
    ) -> Result<JobId> {
        match self.config.transport {
            Transport::Queue => {
                let options = DispatchOptions {
                    job_name: filename.to_string(),
                    fit_to_page: profile.fit_to_page,
                };
                self.dispatcher.send_file(artifact, &options).await
            }
            Transport::Raw => {
                let stream = self.encode_raw(artifact).await?;
                self.dispatcher.send_raw(stream.as_bytes()).await
            }
        }
    }

    /// Turn the finished artifact into a printer-native ZPL stream. Every
    /// content kind yields something printable; binary fidelity ends at the
    /// text fallback.
    async fn encode_raw(&self, artifact: &Path) -> Result<String> {
        let (width, height) = self.config.target_pixels();

        match ContentKind::from_path(artifact) {
            ContentKind::Zpl => {
                let bytes = fs::read(artifact)?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            ContentKind::Pdf => {
                let gray = render_pdf_to_gray(artifact, width, height).await?;
                Ok(encode_gfa(&MonoBitmap::binarize(&gray, self.config.threshold)))
            }
            ContentKind::Png | ContentKind::Jpeg => {
                let gray = load_image_to_gray(artifact, width, height)?;
                Ok(encode_gfa(&MonoBitmap::binarize(&gray, self.config.threshold)))
            }
            ContentKind::Other => {
                let bytes = fs::read(artifact)?;
                let text = String::from_utf8_lossy(&bytes);
                Ok(encode_text_field(
                    text.trim(),
                    width,
                    height,
                    self.config.fallback_font_size,
                    self.config.fallback_text_limit,
                ))
            }
        }
    }
}

fn crop_rule(profile: &LabelProfile) -> Result<&CropRule> {
    profile.crop.as_ref().ok_or_else(|| {
        LabelwerkError::Config(format!(
            "profile '{}' requires a crop but defines no crop rule",
            profile.name
        ))
    })
}
