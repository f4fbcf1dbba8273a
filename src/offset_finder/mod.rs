//! Offline offset discovery
//!
//! The `ComponentToWorld` transform moves around between builds of the
//! target. This module brute-forces it: read a [`Transform`] at every byte
//! offset of a known mesh component and keep the offsets whose translation
//! looks like a small, positive world position. Stand the local player next
//! to the world origin before scanning.
//!
//! This is a diagnostic for `farsight-calibrate`, not part of the per-frame
//! path. Its results go into the offset config by hand.

use crate::engine::Transform;
use crate::math::Vector3;
use crate::memory::Session;
use crate::platform::{MemoryReader, Platform};

/// Byte range and plausibility bounds for a scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOptions {
    /// First offset tried
    pub start: usize,
    /// One past the last offset tried
    pub end: usize,
    /// Exclusive lower bound for every translation component
    pub min: f64,
    /// Exclusive upper bound for every translation component
    pub max: f64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            start: 150,
            end: 800,
            min: 0.0,
            max: 20.0,
        }
    }
}

/// An offset whose transform passed the plausibility bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationHit {
    /// Byte offset inside the mesh component
    pub offset: usize,
    /// Translation of the transform found there
    pub translation: Vector3,
}

/// Offset scanner over one session
pub struct OffsetFinder<'s, P> {
    session: &'s Session<P>,
}

impl<'s, P: Platform> OffsetFinder<'s, P> {
    /// Construct from components
    pub fn new(session: &'s Session<P>) -> Self {
        Self { session }
    }

    /// Candidate `ComponentToWorld` offsets inside the component at `mesh`
    ///
    /// The scan window must start inside a readable region of the target.
    /// When the whole window fits in that region it is fetched with one
    /// read; otherwise each offset is read on its own.
    pub fn component_to_world(&self, mesh: usize, options: &ScanOptions) -> Vec<CalibrationHit> {
        if mesh == 0 || options.end <= options.start {
            return Vec::new();
        }

        let stride = std::mem::size_of::<Transform>();
        let span = options.end - options.start + stride - 1;

        let Some((first, last)) = mesh
            .checked_add(options.start)
            .and_then(|first| Some((first, first.checked_add(span)?)))
        else {
            tracing::warn!("Scan window of {:#x} overflows the address space", mesh);
            return Vec::new();
        };

        let bulk = match self.session.platform().get_memory_regions() {
            Ok(regions) => {
                let Some(region) = regions
                    .iter()
                    .find(|r| r.readable && r.contains(first))
                else {
                    tracing::warn!("{:#x} is not mapped in the target", first);
                    return Vec::new();
                };

                if last <= region.end {
                    self.session.platform().read_bytes(first, span).ok()
                } else {
                    None
                }
            }
            Err(e) => {
                tracing::debug!("Region query failed, reading per offset: {}", e);
                None
            }
        };

        let hits: Vec<CalibrationHit> = (options.start..options.end)
            .filter_map(|offset| {
                let at = offset - options.start;
                let transform: Transform = match &bulk {
                    Some(bytes) => bytemuck::pod_read_unaligned(&bytes[at..at + stride]),
                    None => self.session.read(first + at),
                };

                is_plausible(transform.translation, options).then_some(CalibrationHit {
                    offset,
                    translation: transform.translation,
                })
            })
            .collect();

        tracing::info!(
            "Scanned {:#x}..{:#x} of {:#x}: {} candidate(s)",
            options.start,
            options.end,
            mesh,
            hits.len()
        );

        hits
    }
}

fn is_plausible(t: Vector3, options: &ScanOptions) -> bool {
    [t.x, t.y, t.z]
        .iter()
        .all(|&c| c > options.min && c < options.max)
}
