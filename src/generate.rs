//! Synthetic edge-list generation with planted community structure.
//!
//! Nodes are dense integers split into contiguous blocks; each sampled
//! edge stays inside the source's block with the configured probability.
//! Edge sampling fans out on rayon with one rng per worker, and lines
//! funnel through a channel to a single writer thread.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;

use rand::{thread_rng, Rng};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::sanity::Weighting;

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub nodes: usize,
    pub edges: usize,
    /// Number of planted blocks; clamped to the node count.
    pub blocks: usize,
    /// Probability that an edge stays inside its source's block.
    pub intra_probability: f64,
    pub weighting: Weighting,
    pub delimiter: char,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            nodes: 140,
            edges: 500,
            blocks: 4,
            intra_probability: 0.9,
            weighting: Weighting::Unweighted,
            delimiter: ',',
        }
    }
}

/// Write `config.edges` random edges to `path`.
pub fn generate(config: &GenerateConfig, path: &Path) -> Result<PathBuf> {
    if config.nodes == 0 {
        return Err(Error::InvalidArgument {
            name: "nodes",
            reason: "at least one node is required".to_string(),
        });
    }
    if !(0.0..=1.0).contains(&config.intra_probability) {
        return Err(Error::InvalidArgument {
            name: "intra-probability",
            reason: "must be within 0.0..=1.0".to_string(),
        });
    }

    let file = File::create(path).map_err(|source| Error::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    let blocks = config.blocks.clamp(1, config.nodes);
    let block_range = |block: usize| {
        let start = block * config.nodes / blocks;
        let end = ((block + 1) * config.nodes / blocks).max(start + 1);
        start..end
    };
    // Inverse of block_range over the same floor-division boundaries.
    let block_of = |node: usize| ((node + 1) * blocks).div_ceil(config.nodes) - 1;

    log::info!(
        "generating {} edges over {} nodes in {} block(s)",
        config.edges,
        config.nodes,
        blocks
    );

    let (sender, receiver) = crossbeam_channel::bounded::<String>(1024);

    let written = thread::scope(|scope| -> std::io::Result<usize> {
        let writer_handle = scope.spawn(move || -> std::io::Result<usize> {
            let mut written = 0usize;
            for line in receiver {
                writer.write_all(line.as_bytes())?;
                written += 1;
            }
            writer.flush()?;
            Ok(written)
        });

        (0..config.edges).into_par_iter().for_each_init(
            || (thread_rng(), sender.clone()),
            |(rng, sender), _| {
                let source = rng.gen_range(0..config.nodes);
                let target = if rng.gen_bool(config.intra_probability) {
                    let range = block_range(block_of(source));
                    rng.gen_range(range)
                } else {
                    rng.gen_range(0..config.nodes)
                };
                let line = match config.weighting {
                    Weighting::Weighted => {
                        let weight: u32 = rng.gen_range(1..=20);
                        format!(
                            "{source}{d}{target}{d}{weight}\n",
                            d = config.delimiter
                        )
                    }
                    Weighting::Unweighted => {
                        format!("{source}{d}{target}\n", d = config.delimiter)
                    }
                };
                // The writer only hangs up on an I/O error, which the
                // join below reports; a failed send just stops this
                // producer early.
                let _ = sender.send(line);
            },
        );
        drop(sender);

        match writer_handle.join() {
            Ok(result) => result,
            Err(_) => Err(std::io::Error::other("writer thread panicked")),
        }
    })
    .map_err(|source| {
        let _ = std::fs::remove_file(path);
        Error::Persist {
            path: path.to_path_buf(),
            source,
        }
    })?;

    log::info!("wrote {} edge(s) to '{}'", written, path.display());
    Ok(path.to_path_buf())
}
