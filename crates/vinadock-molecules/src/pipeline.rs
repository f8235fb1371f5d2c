//! Orchestrator for a single docking job.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use vinadock_common::{DataCard, ProgressReporter, TracingProgress};
use vinadock_config::{Config, DockingConfig};
use vinadock_datastore::{Datastore, DiskDataStore};

use crate::docking::{PoseGenerator, VinaPoseGenerator};
use crate::error::{DockingError, DockingFailure};
use crate::result::DockingResult;
use crate::scratch::ScratchArea;

const STAGE: &str = "docking";
const PROTEIN_FILE: &str = "protein.pdb";
const LIGAND_FILE: &str = "ligand.sdf";

/// Inputs of one docking job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockingRequest {
    pub protein_address: String,
    pub ligand_address: String,
    /// Results are stored as `{output_name}_results.json`.
    pub output_name: String,
    pub exhaustiveness: u32,
    pub num_modes: u32,
}

impl DockingRequest {
    pub const DEFAULT_EXHAUSTIVENESS: u32 = 10;
    pub const DEFAULT_NUM_MODES: u32 = 9;

    pub fn new(protein_address: &str, ligand_address: &str, output_name: &str) -> Self {
        Self {
            protein_address: protein_address.to_string(),
            ligand_address: ligand_address.to_string(),
            output_name: output_name.to_string(),
            exhaustiveness: Self::DEFAULT_EXHAUSTIVENESS,
            num_modes: Self::DEFAULT_NUM_MODES,
        }
    }

    pub fn with_exhaustiveness(mut self, exhaustiveness: u32) -> Self {
        self.exhaustiveness = exhaustiveness;
        self
    }

    pub fn with_num_modes(mut self, num_modes: u32) -> Self {
        self.num_modes = num_modes;
        self
    }

    /// Take exhaustiveness and mode count from configuration.
    pub fn with_docking_config(self, config: &DockingConfig) -> Self {
        self.with_exhaustiveness(config.exhaustiveness)
            .with_num_modes(config.num_modes)
    }

    pub fn results_name(&self) -> String {
        format!("{}_results.json", self.output_name)
    }
}

pub struct DockingOrchestrator {
    datastore: Option<Arc<dyn Datastore>>,
    generator: Arc<dyn PoseGenerator>,
    progress: Arc<dyn ProgressReporter>,
    scratch_dir: Option<PathBuf>,
}

impl DockingOrchestrator {
    pub fn new(datastore: Option<Arc<dyn Datastore>>, generator: Arc<dyn PoseGenerator>) -> Self {
        Self {
            datastore,
            generator,
            progress: Arc::new(TracingProgress),
            scratch_dir: None,
        }
    }

    /// Disk datastore (when configured) and AutoDock Vina from `config`.
    pub fn from_config(config: &Config) -> Self {
        let datastore = config
            .datastore
            .as_ref()
            .map(|c| Arc::new(DiskDataStore::from_config(c)) as Arc<dyn Datastore>);
        let generator = Arc::new(VinaPoseGenerator::from_config(&config.vina));

        let mut orchestrator = Self::new(datastore, generator);
        orchestrator.scratch_dir = config.docking.scratch_dir.clone();
        orchestrator
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Parent directory for per-run scratch areas.
    pub fn with_scratch_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.scratch_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Dock the requested protein/ligand pair and upload the results summary.
    ///
    /// Returns the datastore address of `{output}_results.json`. Nothing is
    /// uploaded unless docking produced at least one scored pose.
    pub async fn generate_pose(&self, request: &DockingRequest) -> Result<String, DockingFailure> {
        self.run(request).await.map_err(|e| {
            warn!("VINA docking failed for {}: {}", request.output_name, e);
            DockingFailure::from(e)
        })
    }

    async fn run(&self, request: &DockingRequest) -> Result<String, DockingError> {
        let datastore = self.datastore.as_ref().ok_or(DockingError::Configuration)?;
        if request.protein_address.is_empty() || request.ligand_address.is_empty() {
            return Err(DockingError::InputValidation);
        }

        let scratch = ScratchArea::acquire(self.scratch_dir.as_deref())?;

        self.report(10, &format!("downloading protein from {}", request.protein_address));
        let protein_path = scratch.file(PROTEIN_FILE);
        datastore.download_object(&request.protein_address, &protein_path).await?;

        self.report(20, &format!("downloading ligand from {}", request.ligand_address));
        let ligand_path = scratch.file(LIGAND_FILE);
        datastore.download_object(&request.ligand_address, &ligand_path).await?;

        self.report(30, "initializing VINA pose generator");

        self.report(40, &format!("generating {} poses with VINA", request.num_modes));
        let (complexes, scores) = self
            .generator
            .generate_poses(
                (protein_path.as_path(), ligand_path.as_path()),
                request.exhaustiveness,
                request.num_modes,
                scratch.path(),
                true,
            )
            .await
            .map_err(DockingError::Engine)?;

        if complexes.is_empty() || scores.is_empty() {
            return Err(DockingError::NoPoses);
        }

        let actual_modes = (request.num_modes as usize)
            .min(complexes.len())
            .min(scores.len());
        if actual_modes == 0 {
            return Err(DockingError::NoValidModes);
        }
        self.report(50, &format!("generated {} valid poses", actual_modes));

        self.report(60, "preparing results");
        let result = DockingResult::new(&scores[..actual_modes], complexes.len());
        debug!(
            "{} of {} complexes reported for {}",
            result.num_modes, result.complexes_count, request.output_name
        );

        self.report(90, "uploading results summary");
        let card = DataCard::new("json", "docking results");
        let data = serde_json::to_value(&result)?;
        let address = datastore
            .upload_data_from_memory(&data, &request.results_name(), &card)
            .await?
            .ok_or(DockingError::Upload)?;

        self.report(100, "VINA docking completed successfully");
        info!("Docking results for {} stored at {}", request.output_name, address);
        Ok(address)
    }

    fn report(&self, percent: u8, message: &str) {
        self.progress.log_progress(STAGE, percent, message);
    }
}
