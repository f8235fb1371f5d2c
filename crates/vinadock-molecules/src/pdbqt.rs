//! Parsing of AutoDock Vina output files.

use anyhow::{bail, Context, Result};

/// One `MODEL ... ENDMDL` block of a Vina output file.
#[derive(Debug, Clone, PartialEq)]
pub struct VinaModel {
    /// 1-based mode number, in file order.
    pub mode: usize,
    /// Predicted affinity in kcal/mol.
    pub affinity: f64,
    pub rmsd_lb: f64,
    pub rmsd_ub: f64,
    /// The block text, `MODEL` and `ENDMDL` lines included.
    pub pdbqt: String,
}

const RESULT_REMARK: &str = "REMARK VINA RESULT:";

pub fn parse_vina_models(text: &str) -> Result<Vec<VinaModel>> {
    let mut models = Vec::new();
    let mut block: Option<String> = None;
    let mut result: Option<[f64; 3]> = None;

    for (idx, line) in text.lines().enumerate() {
        if line.starts_with("MODEL") {
            if block.is_some() {
                bail!("Nested MODEL record on line {}", idx + 1);
            }
            block = Some(String::new());
            result = None;
        }

        let Some(current) = block.as_mut() else {
            continue;
        };
        current.push_str(line);
        current.push('\n');

        if let Some(rest) = line.strip_prefix(RESULT_REMARK) {
            result = Some(
                parse_result(rest)
                    .with_context(|| format!("Malformed VINA RESULT on line {}", idx + 1))?,
            );
        }

        if line.starts_with("ENDMDL") {
            let mode = models.len() + 1;
            let [affinity, rmsd_lb, rmsd_ub] =
                result.take().with_context(|| format!("Model {} has no VINA RESULT remark", mode))?;
            models.push(VinaModel {
                mode,
                affinity,
                rmsd_lb,
                rmsd_ub,
                pdbqt: block.take().unwrap_or_default(),
            });
        }
    }

    if block.is_some() {
        bail!("Unterminated MODEL block after {} complete models", models.len());
    }
    Ok(models)
}

fn parse_result(rest: &str) -> Result<[f64; 3]> {
    let values = rest
        .split_whitespace()
        .take(3)
        .map(str::parse::<f64>)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match values.as_slice() {
        [a, lb, ub] => Ok([*a, *lb, *ub]),
        _ => bail!("expected affinity, rmsd l.b. and rmsd u.b."),
    }
}
