use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::predict::error::PredictError;
use crate::predict::satellite::Satellite;
use crate::predict::types::SatelliteInfo;
use crate::sgpsdp::tle::parse_tle;
use crate::sgpsdp::{ChecksumPolicy, OrbitalElements, TleError};

pub struct TleEntry {
    pub info: SatelliteInfo,
    pub satellite: Satellite,
}

pub struct TleLoader {
    tle_dir: PathBuf,
    policy: ChecksumPolicy,
    satellites: HashMap<u32, TleEntry>,
}

impl TleLoader {
    pub fn new(tle_dir: PathBuf, policy: ChecksumPolicy) -> Self {
        Self {
            tle_dir,
            policy,
            satellites: HashMap::new(),
        }
    }

    /// Load all TLE files from the directory
    pub fn load_all(&mut self) -> Result<(), PredictError> {
        if !self.tle_dir.exists() {
            return Err(PredictError::DirectoryNotFound(
                self.tle_dir.display().to_string(),
            ));
        }

        self.satellites.clear();

        let entries = fs::read_dir(&self.tle_dir)?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext == "tle" || ext == "txt" {
                        match self.parse_tle_file(&path) {
                            Ok(entries) => {
                                for tle_entry in entries {
                                    self.satellites.insert(tle_entry.info.norad_id, tle_entry);
                                }
                            }
                            Err(e) => {
                                log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                            }
                        }
                    }
                }
            }
        }

        log::info!(
            "Loaded {} satellites from {}",
            self.satellites.len(),
            self.tle_dir.display()
        );
        if self.satellites.is_empty() {
            return Err(PredictError::NoSatellites);
        }
        Ok(())
    }

    /// Parse a single TLE file (may contain multiple satellites)
    fn parse_tle_file(&self, path: &Path) -> Result<Vec<TleEntry>, PredictError> {
        let content = fs::read_to_string(path)?;
        let filename = path.file_name().unwrap_or_default().to_string_lossy().to_string();

        let mut results = Vec::new();
        for parsed in parse_tle_text(&content, self.policy) {
            let elements = parsed.map_err(|e| PredictError::InvalidTle {
                file: filename.clone(),
                message: e.to_string(),
            })?;

            let info = SatelliteInfo {
                name: elements.name.clone(),
                norad_id: elements.catalog_number,
                tle_source: filename.clone(),
            };
            results.push(TleEntry {
                info,
                satellite: Satellite::new(elements)?,
            });
        }

        Ok(results)
    }

    /// Get all loaded satellites, ordered by catalog number
    pub fn satellites(&self) -> Vec<&TleEntry> {
        let mut all: Vec<_> = self.satellites.values().collect();
        all.sort_by_key(|e| e.info.norad_id);
        all
    }

    /// Looks a satellite up by catalog number or, failing that, by
    /// case-insensitive name.
    pub fn find(&self, query: &str) -> Result<&TleEntry, PredictError> {
        let by_id = query
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|id| self.satellites.get(&id));
        by_id
            .or_else(|| {
                self.satellites
                    .values()
                    .find(|e| e.info.name.trim_end().eq_ignore_ascii_case(query.trim()))
            })
            .ok_or_else(|| PredictError::UnknownSatellite(query.to_string()))
    }
}

/// Parses every element set in `content`, one result per set.
pub fn parse_tle_text(content: &str, policy: ChecksumPolicy) -> Vec<Result<OrbitalElements, TleError>> {
    parse_multi_tle(content)
        .into_iter()
        .map(|(name, line1, line2)| parse_tle(name, line1, line2, policy))
        .collect()
}

/// Splits multi-satellite TLE content into (name, line 1, line 2) triples
fn parse_multi_tle(content: &str) -> Vec<(Option<&str>, &str, &str)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim_end())
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ")
            && i + 1 < lines.len()
            && lines[i + 1].starts_with("2 ")
        {
            // 2-line TLE (no name)
            result.push((None, lines[i], lines[i + 1]));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            // 3-line TLE (with name)
            result.push((Some(lines[i]), lines[i + 1], lines[i + 2]));
            i += 3;
        } else {
            i += 1; // Skip unknown line
        }
    }

    result
}
