//! Receptor geometry from PDB coordinate records.

use anyhow::{bail, Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Docking search box in angstroms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBox {
    pub center: [f64; 3],
    pub size: [f64; 3],
}

impl SearchBox {
    /// Box around every `ATOM`/`HETATM` record, grown by `padding` on each side.
    pub fn from_pdb(text: &str, padding: f64) -> Result<Self> {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        let mut atoms = 0usize;

        for (idx, line) in text.lines().enumerate() {
            if !(line.starts_with("ATOM") || line.starts_with("HETATM")) {
                continue;
            }
            let xyz = parse_coordinates(line)
                .with_context(|| format!("Malformed coordinates on PDB line {}", idx + 1))?;
            for axis in 0..3 {
                min[axis] = min[axis].min(xyz[axis]);
                max[axis] = max[axis].max(xyz[axis]);
            }
            atoms += 1;
        }

        if atoms == 0 {
            bail!("Receptor contains no ATOM/HETATM records");
        }

        let mut center = [0.0; 3];
        let mut size = [0.0; 3];
        for axis in 0..3 {
            center[axis] = (min[axis] + max[axis]) / 2.0;
            size[axis] = (max[axis] - min[axis]) + 2.0 * padding;
        }
        debug!("Search box over {} atoms: center {:?}, size {:?}", atoms, center, size);
        Ok(Self { center, size })
    }

    pub async fn from_pdb_file(path: &Path, padding: f64) -> Result<Self> {
        let text = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read receptor {:?}", path))?;
        Self::from_pdb(&text, padding)
    }
}

// Fixed columns 31-38, 39-46, 47-54.
fn parse_coordinates(line: &str) -> Result<[f64; 3]> {
    let field = |range: std::ops::Range<usize>| -> Result<f64> {
        let raw = line.get(range).context("record too short")?;
        Ok(raw.trim().parse::<f64>()?)
    };
    Ok([field(30..38)?, field(38..46)?, field(46..54)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEPTOR: &str = "\
HEADER    TEST
ATOM      1  N   ALA A   1      -1.000   2.000   3.000  1.00  0.00           N
ATOM      2  CA  ALA A   1       3.000   4.000   5.000  1.00  0.00           C
HETATM    3  O   HOH A 101       1.000  -2.000   7.000  1.00  0.00           O
TER
END
";

    #[test]
    fn test_box_covers_all_atoms() {
        let b = SearchBox::from_pdb(RECEPTOR, 0.0).unwrap();
        assert_eq!(b.center, [1.0, 1.0, 5.0]);
        assert_eq!(b.size, [4.0, 6.0, 4.0]);
    }

    #[test]
    fn test_padding_grows_both_sides() {
        let b = SearchBox::from_pdb(RECEPTOR, 4.0).unwrap();
        assert_eq!(b.center, [1.0, 1.0, 5.0]);
        assert_eq!(b.size, [12.0, 14.0, 12.0]);
    }

    #[test]
    fn test_empty_receptor_is_error() {
        let err = SearchBox::from_pdb("HEADER ONLY\nEND\n", 4.0).unwrap_err();
        assert!(err.to_string().contains("no ATOM/HETATM"));
    }

    #[test]
    fn test_truncated_record_is_error() {
        let err = SearchBox::from_pdb("ATOM      1  N   ALA A   1      -1.000", 4.0).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
