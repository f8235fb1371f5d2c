//! Molecular docking using AutoDock Vina.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Mutex;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

use vinadock_config::VinaConfig;

use crate::pdb::SearchBox;
use crate::pdbqt::parse_vina_models;

/// One docked pose of the ligand against the receptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DockedComplex {
    /// 1-based binding mode.
    pub mode: usize,
    pub receptor: PathBuf,
    pub pose_path: PathBuf,
    pub pdbqt: String,
}

/// Black-box docking engine.
#[async_trait]
pub trait PoseGenerator: Send + Sync {
    /// Dock `molecular_complex` (protein path, ligand path), writing pose
    /// files into `out_dir`.
    ///
    /// Returns the generated complexes and, when `generate_scores` is set,
    /// one affinity per complex in the same order.
    async fn generate_poses(
        &self,
        molecular_complex: (&Path, &Path),
        exhaustiveness: u32,
        num_modes: u32,
        out_dir: &Path,
        generate_scores: bool,
    ) -> Result<(Vec<DockedComplex>, Vec<f64>)>;
}

/// Wrapper for AutoDock Vina execution, with Open Babel preparing the
/// PDBQT inputs.
pub struct VinaPoseGenerator {
    executable_path: PathBuf,
    obabel_path: PathBuf,
    box_padding: f64,
    cpu: Option<u32>,
    seed: Option<i64>,
}

impl VinaPoseGenerator {
    /// Create a new VinaPoseGenerator.
    pub fn new<P: AsRef<Path>>(executable_path: P) -> Self {
        let defaults = VinaConfig::default();
        Self {
            executable_path: executable_path.as_ref().to_path_buf(),
            obabel_path: defaults.obabel,
            box_padding: defaults.box_padding,
            cpu: None,
            seed: None,
        }
    }

    pub fn from_config(config: &VinaConfig) -> Self {
        Self {
            executable_path: config.executable.clone(),
            obabel_path: config.obabel.clone(),
            box_padding: config.box_padding,
            cpu: config.cpu,
            seed: config.seed,
        }
    }

    pub fn with_obabel<P: AsRef<Path>>(mut self, obabel_path: P) -> Self {
        self.obabel_path = obabel_path.as_ref().to_path_buf();
        self
    }

    /// Convert a structure with Open Babel. `rigid` marks a receptor.
    async fn convert(&self, input: &Path, output: &Path, rigid: bool) -> Result<()> {
        let mut cmd = Command::new(&self.obabel_path);
        cmd.arg(input);
        if rigid {
            cmd.arg("-xr");
        }
        cmd.arg("-O").arg(output);

        debug!("Converting {:?} -> {:?}", input, output);
        let result = cmd
            .output()
            .await
            .with_context(|| format!("Failed to launch {:?}", self.obabel_path))?;
        check_status("Open Babel", &result)?;

        // obabel reports conversion errors on stderr but can still exit 0
        if !fs::try_exists(output).await? {
            let stderr = String::from_utf8_lossy(&result.stderr);
            bail!("Open Babel produced no output for {:?}: {}", input, stderr.trim());
        }
        Ok(())
    }

    fn vina_args(
        &self,
        receptor: &Path,
        ligand: &Path,
        search_box: &SearchBox,
        exhaustiveness: u32,
        num_modes: u32,
        out: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--receptor".into(),
            receptor.into(),
            "--ligand".into(),
            ligand.into(),
        ];
        for (axis, i) in [("x", 0usize), ("y", 1), ("z", 2)] {
            args.push(format!("--center_{}", axis).into());
            args.push(search_box.center[i].to_string().into());
        }
        for (axis, i) in [("x", 0usize), ("y", 1), ("z", 2)] {
            args.push(format!("--size_{}", axis).into());
            args.push(search_box.size[i].to_string().into());
        }
        args.push("--exhaustiveness".into());
        args.push(exhaustiveness.to_string().into());
        args.push("--num_modes".into());
        args.push(num_modes.to_string().into());
        if let Some(cpu) = self.cpu {
            args.push("--cpu".into());
            args.push(cpu.to_string().into());
        }
        if let Some(seed) = self.seed {
            args.push("--seed".into());
            args.push(seed.to_string().into());
        }
        args.push("--out".into());
        args.push(out.into());
        args
    }
}

#[async_trait]
impl PoseGenerator for VinaPoseGenerator {
    async fn generate_poses(
        &self,
        molecular_complex: (&Path, &Path),
        exhaustiveness: u32,
        num_modes: u32,
        out_dir: &Path,
        generate_scores: bool,
    ) -> Result<(Vec<DockedComplex>, Vec<f64>)> {
        let (protein, ligand) = molecular_complex;
        info!("Running AutoDock Vina on {:?}", ligand);

        let search_box = SearchBox::from_pdb_file(protein, self.box_padding).await?;

        let receptor = out_dir.join("protein.pdbqt");
        let ligand_pdbqt = out_dir.join("ligand.pdbqt");
        self.convert(protein, &receptor, true).await?;
        self.convert(ligand, &ligand_pdbqt, false).await?;

        let out = out_dir.join("ligand_docked.pdbqt");
        let args = self.vina_args(
            &receptor,
            &ligand_pdbqt,
            &search_box,
            exhaustiveness,
            num_modes,
            &out,
        );
        let output = Command::new(&self.executable_path)
            .args(&args)
            .output()
            .await
            .with_context(|| format!("Failed to launch {:?}", self.executable_path))?;
        check_status("AutoDock Vina", &output)?;

        let docked = fs::read_to_string(&out)
            .await
            .with_context(|| format!("AutoDock Vina output missing at {:?}", out))?;
        let models = parse_vina_models(&docked)?;

        let mut complexes = Vec::with_capacity(models.len());
        let mut scores = Vec::new();
        for model in models {
            let pose_path = out_dir.join(format!("pose_{}.pdbqt", model.mode));
            fs::write(&pose_path, &model.pdbqt).await?;
            if generate_scores {
                scores.push(model.affinity);
            }
            complexes.push(DockedComplex {
                mode: model.mode,
                receptor: receptor.clone(),
                pose_path,
                pdbqt: model.pdbqt,
            });
        }

        debug!("AutoDock Vina completed successfully. {} poses in {:?}", complexes.len(), out_dir);
        Ok((complexes, scores))
    }
}

fn check_status(tool: &str, output: &Output) -> Result<()> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{} failed ({}): {}", tool, output.status, stderr.trim());
    }
    Ok(())
}

// ── Stub Implementation for Testing ────────────────────────────────────────

/// Arguments of one `generate_poses` call seen by [`StubPoseGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub struct PoseCall {
    pub protein: PathBuf,
    pub ligand: PathBuf,
    pub exhaustiveness: u32,
    pub num_modes: u32,
    pub out_dir: PathBuf,
    pub generate_scores: bool,
    /// Whether both input files existed when the call was made.
    pub inputs_present: bool,
}

/// Generator returning a fixed number of complexes and fixed scores.
pub struct StubPoseGenerator {
    complexes: usize,
    scores: Vec<f64>,
    failure: Option<String>,
    calls: Mutex<Vec<PoseCall>>,
}

impl StubPoseGenerator {
    pub fn new(complexes: usize, scores: Vec<f64>) -> Self {
        Self {
            complexes,
            scores,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Generator whose every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(0, Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<PoseCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PoseGenerator for StubPoseGenerator {
    async fn generate_poses(
        &self,
        molecular_complex: (&Path, &Path),
        exhaustiveness: u32,
        num_modes: u32,
        out_dir: &Path,
        generate_scores: bool,
    ) -> Result<(Vec<DockedComplex>, Vec<f64>)> {
        let (protein, ligand) = molecular_complex;
        let call = PoseCall {
            protein: protein.to_path_buf(),
            ligand: ligand.to_path_buf(),
            exhaustiveness,
            num_modes,
            out_dir: out_dir.to_path_buf(),
            generate_scores,
            inputs_present: protein.exists() && ligand.exists(),
        };
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }

        if let Some(message) = &self.failure {
            bail!("{}", message);
        }

        let mut complexes = Vec::with_capacity(self.complexes);
        for mode in 1..=self.complexes {
            let pose_path = out_dir.join(format!("pose_{}.pdbqt", mode));
            let pdbqt = format!("MODEL {}\nENDMDL\n", mode);
            fs::write(&pose_path, &pdbqt).await?;
            complexes.push(DockedComplex {
                mode,
                receptor: protein.to_path_buf(),
                pose_path,
                pdbqt,
            });
        }

        let scores = if generate_scores { self.scores.clone() } else { Vec::new() };
        Ok((complexes, scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    const RECEPTOR: &str = "\
ATOM      1  N   ALA A   1      -1.000   2.000   3.000  1.00  0.00           N
ATOM      2  CA  ALA A   1       3.000   4.000   5.000  1.00  0.00           C
";

    #[test]
    fn test_vina_args() {
        let generator = VinaPoseGenerator::from_config(&VinaConfig {
            cpu: Some(4),
            seed: Some(7),
            ..VinaConfig::default()
        });
        let search_box = SearchBox { center: [1.0, 3.0, 4.0], size: [12.0, 10.0, 10.5] };
        let args = generator.vina_args(
            Path::new("r.pdbqt"),
            Path::new("l.pdbqt"),
            &search_box,
            10,
            9,
            Path::new("out.pdbqt"),
        );
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args.join(" "),
            concat!(
                "--receptor r.pdbqt --ligand l.pdbqt ",
                "--center_x 1 --center_y 3 --center_z 4 ",
                "--size_x 12 --size_y 10 --size_z 10.5 ",
                "--exhaustiveness 10 --num_modes 9 ",
                "--cpu 4 --seed 7 ",
                "--out out.pdbqt",
            )
        );
    }

    #[tokio::test]
    async fn test_missing_obabel_is_error() {
        let dir = tempdir().unwrap();
        let protein = dir.path().join("protein.pdb");
        let ligand = dir.path().join("ligand.sdf");
        std::fs::write(&protein, RECEPTOR).unwrap();
        std::fs::write(&ligand, "").unwrap();

        let generator =
            VinaPoseGenerator::new("/nonexistent/vina").with_obabel("/nonexistent/obabel");
        let err = generator
            .generate_poses((protein.as_path(), ligand.as_path()), 8, 9, dir.path(), true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to launch"));
    }

    #[tokio::test]
    async fn test_receptor_without_atoms_is_error() {
        let dir = tempdir().unwrap();
        let protein = dir.path().join("protein.pdb");
        let ligand = dir.path().join("ligand.sdf");
        std::fs::write(&protein, "END\n").unwrap();
        std::fs::write(&ligand, "").unwrap();

        let generator = VinaPoseGenerator::new("/nonexistent/vina");
        let err = generator
            .generate_poses((protein.as_path(), ligand.as_path()), 8, 9, dir.path(), true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no ATOM/HETATM"));
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    const FAKE_OBABEL: &str = r##"#!/bin/sh
while [ "$#" -gt 0 ]; do
  if [ "$1" = "-O" ]; then touch "$2"; fi
  shift
done
"##;

    const FAKE_VINA: &str = r##"#!/bin/sh
args="$*"
while [ "$#" -gt 0 ]; do
  if [ "$1" = "--out" ]; then out="$2"; fi
  shift
done
echo "$args" > "$(dirname "$out")/vina.args"
cat > "$out" <<'PDBQT'
MODEL 1
REMARK VINA RESULT:    -7.4      0.000      0.000
ATOM      1  C   UNL     1       1.000   2.000   3.000  0.00  0.00    +0.000 C
ENDMDL
MODEL 2
REMARK VINA RESULT:    -6.9      1.210      1.874
ATOM      1  C   UNL     1       1.200   2.100   3.300  0.00  0.00    +0.000 C
ENDMDL
PDBQT
"##;

    #[cfg(unix)]
    async fn dock_with_fake_tools(
        generate_scores: bool,
    ) -> (TempDir, Vec<DockedComplex>, Vec<f64>) {
        let tools = tempdir().unwrap();
        let obabel = write_script(tools.path(), "obabel", FAKE_OBABEL);
        let vina = write_script(tools.path(), "vina", FAKE_VINA);

        let work = tempdir().unwrap();
        let protein = work.path().join("protein.pdb");
        let ligand = work.path().join("ligand.sdf");
        std::fs::write(&protein, RECEPTOR).unwrap();
        std::fs::write(&ligand, "ligand\n$$$$\n").unwrap();

        let generator = VinaPoseGenerator::new(&vina).with_obabel(&obabel);
        let (complexes, scores) = generator
            .generate_poses(
                (protein.as_path(), ligand.as_path()),
                8,
                2,
                work.path(),
                generate_scores,
            )
            .await
            .unwrap();
        (work, complexes, scores)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_vina_run_end_to_end() {
        let (work, complexes, scores) = dock_with_fake_tools(true).await;

        assert_eq!(scores, vec![-7.4, -6.9]);
        assert_eq!(complexes.len(), 2);
        assert_eq!(complexes[0].mode, 1);
        assert_eq!(complexes[1].mode, 2);
        assert_eq!(complexes[0].receptor, work.path().join("protein.pdbqt"));
        assert!(work.path().join("protein.pdbqt").exists());
        assert!(work.path().join("ligand.pdbqt").exists());

        for complex in &complexes {
            let expected = work.path().join(format!("pose_{}.pdbqt", complex.mode));
            assert_eq!(complex.pose_path, expected);
            assert_eq!(std::fs::read_to_string(&expected).unwrap(), complex.pdbqt);
        }
        assert!(complexes[1].pdbqt.contains("-6.9"));

        let args = std::fs::read_to_string(work.path().join("vina.args")).unwrap();
        assert!(args.contains("--exhaustiveness 8"));
        assert!(args.contains("--num_modes 2"));
        assert!(args.contains("--center_x 1"));
        assert!(args.contains("ligand_docked.pdbqt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_vina_run_without_scores() {
        let (_work, complexes, scores) = dock_with_fake_tools(false).await;
        assert_eq!(complexes.len(), 2);
        assert!(scores.is_empty());
    }

    #[tokio::test]
    async fn test_stub_writes_pose_files() {
        let dir = tempdir().unwrap();
        let stub = StubPoseGenerator::new(2, vec![-7.0, -6.5]);
        let (complexes, scores) = stub
            .generate_poses((Path::new("p.pdb"), Path::new("l.sdf")), 10, 9, dir.path(), true)
            .await
            .unwrap();

        assert_eq!(complexes.len(), 2);
        assert_eq!(scores, vec![-7.0, -6.5]);
        assert!(complexes[1].pose_path.exists());
        assert_eq!(complexes[1].mode, 2);

        let call = &stub.calls()[0];
        assert!(!call.inputs_present);
        assert_eq!(call.exhaustiveness, 10);
    }

    #[tokio::test]
    async fn test_stub_without_scores() {
        let dir = tempdir().unwrap();
        let stub = StubPoseGenerator::new(1, vec![-7.0]);
        let (_, scores) = stub
            .generate_poses((Path::new("p.pdb"), Path::new("l.sdf")), 1, 1, dir.path(), false)
            .await
            .unwrap();
        assert!(scores.is_empty());
    }
}
