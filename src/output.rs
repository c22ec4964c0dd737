//! Persistence of a community mapping: a reloadable snapshot plus a
//! grouped, human-readable community listing.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::mapping::CommunityMapping;

/// Write both artifacts next to each other: `<prefix>.snap` (reloadable
/// JSON snapshot of the whole mapping) and `<prefix>.grp` (one line per
/// community id, ascending: `<id>,<node>,<node>,...`, members in
/// first-occurrence order of the mapping traversal).
///
/// On any failure every artifact written so far is removed before the
/// error surfaces, so a failed run leaves no half-written output behind.
pub fn write(mapping: &CommunityMapping, prefix: &Path) -> Result<(PathBuf, PathBuf)> {
    let snapshot_path = prefix.with_extension("snap");
    let grouped_path = prefix.with_extension("grp");

    log::info!("creating snapshot (.snap) file.....");
    if let Err(source) = write_snapshot(mapping, &snapshot_path) {
        discard(&[&snapshot_path]);
        return Err(Error::Persist {
            path: snapshot_path,
            source,
        });
    }

    log::info!("creating community (.grp) file.....");
    if let Err(source) = write_grouped(mapping, &grouped_path) {
        discard(&[&snapshot_path, &grouped_path]);
        return Err(Error::Persist {
            path: grouped_path,
            source,
        });
    }

    Ok((snapshot_path, grouped_path))
}

/// Reload a snapshot written by [`write`]. The round trip is identity.
pub fn load_snapshot(path: &Path) -> Result<CommunityMapping> {
    let file = File::open(path).map_err(|source| Error::UnreadableInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::Persist {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}

fn write_snapshot(mapping: &CommunityMapping, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, mapping).map_err(std::io::Error::other)?;
    writer.flush()
}

/// Output prefix convention: `<input_dir>/<tag>_<input_file_name>`.
pub fn output_prefix(input: &Path, tag: &str) -> Result<PathBuf> {
    let name = input
        .file_name()
        .ok_or_else(|| Error::InvalidArgument {
            name: "input-file",
            reason: format!("'{}' has no file name", input.display()),
        })?
        .to_string_lossy();
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    Ok(dir.join(format!("{tag}_{name}")))
}

fn write_grouped(mapping: &CommunityMapping, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for (community, members) in mapping.grouped() {
        write!(writer, "{community}")?;
        for member in members {
            write!(writer, ",{member}")?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

fn discard(paths: &[&Path]) {
    for path in paths {
        if fs::remove_file(path).is_ok() {
            log::warn!("removed partial output '{}'", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeGraph;
    use tempfile::tempdir;

    fn mapping_of(pairs: &[(&str, usize)]) -> CommunityMapping {
        let mut graph = EdgeGraph::new();
        if let [(only, _)] = pairs {
            graph.add_edge(only, only, 1.0);
        }
        for window in pairs.windows(2) {
            graph.add_edge(window[0].0, window[1].0, 1.0);
        }
        let membership: Vec<usize> = pairs.iter().map(|&(_, c)| c).collect();
        CommunityMapping::from_membership(&graph, &membership)
    }

    #[test]
    fn grouped_file_lists_members_per_community() {
        let dir = tempdir().unwrap();
        let mapping = mapping_of(&[("1", 0), ("2", 0), ("3", 1)]);
        let prefix = dir.path().join("louvain_sample.txt");
        let (_, grouped) = write(&mapping, &prefix).unwrap();

        let contents = fs::read_to_string(grouped).unwrap();
        assert_eq!(contents, "0,1,2\n1,3\n");
    }

    #[test]
    fn artifacts_share_the_base_name() {
        let dir = tempdir().unwrap();
        let mapping = mapping_of(&[("1", 0), ("2", 0)]);
        let prefix = dir.path().join("cnm_sample.txt");
        let (snapshot, grouped) = write(&mapping, &prefix).unwrap();
        assert_eq!(snapshot, dir.path().join("cnm_sample.snap"));
        assert_eq!(grouped, dir.path().join("cnm_sample.grp"));
    }

    #[test]
    fn snapshot_round_trips() {
        let dir = tempdir().unwrap();
        let mapping = mapping_of(&[("7", 0), ("8", 1), ("9", 0)]);
        let prefix = dir.path().join("run.txt");
        let (snapshot, _) = write(&mapping, &prefix).unwrap();
        let reloaded = load_snapshot(&snapshot).unwrap();
        assert_eq!(reloaded, mapping);
    }

    #[test]
    fn failure_removes_partial_artifacts() {
        let dir = tempdir().unwrap();
        let mapping = mapping_of(&[("1", 0), ("2", 0)]);
        // Occupy the .grp path with a directory so the grouped write
        // fails after the snapshot succeeded.
        let prefix = dir.path().join("blocked.txt");
        fs::create_dir(dir.path().join("blocked.grp")).unwrap();

        let err = write(&mapping, &prefix).unwrap_err();
        assert!(matches!(err, Error::Persist { .. }));
        assert!(!dir.path().join("blocked.snap").exists());
    }

    #[test]
    fn unwritable_prefix_fails() {
        let mapping = mapping_of(&[("1", 0)]);
        let err = write(&mapping, Path::new("/no/such/dir/out.txt")).unwrap_err();
        assert!(matches!(err, Error::Persist { .. }));
    }

    #[test]
    fn prefix_follows_input_name() {
        let prefix = output_prefix(Path::new("/data/input/edges.csv"), "louvain").unwrap();
        assert_eq!(prefix, PathBuf::from("/data/input/louvain_edges.csv"));
    }
}
