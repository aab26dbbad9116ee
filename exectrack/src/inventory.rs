//! Listing of BPF programs and maps currently loaded in the kernel.
//!
//! Backs `--programs` and `--maps <PROGRAM_ID>`: what a display front-end
//! shows when browsing a program and the maps it references.

use anyhow::{Context, Result};
use aya::maps::MapInfo;
use aya::programs::loaded_programs;
use std::fmt;

/// A loaded program, as shown in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSummary {
    pub id: u32,
    pub name: String,
}

/// A map referenced by a loaded program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSummary {
    pub id: u32,
    pub name: String,
    pub key_size: u32,
    pub value_size: u32,
    pub max_entries: u32,
}

impl fmt::Display for ProgramSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}  {}", self.id, display_name(&self.name))
    }
}

impl fmt::Display for MapSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>6}  {:<16} key {}B  value {}B  max {}",
            self.id,
            display_name(&self.name),
            self.key_size,
            self.value_size,
            self.max_entries
        )
    }
}

// Kernel objects loaded without a name have an empty one
fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "<anonymous>"
    } else {
        name
    }
}

/// Every program currently loaded in the kernel.
///
/// # Errors
/// Returns an error if the kernel refuses to enumerate programs (usually missing privileges)
pub fn list_programs() -> Result<Vec<ProgramSummary>> {
    let mut programs = Vec::new();
    for info in loaded_programs() {
        let info = info.context("Failed to enumerate loaded programs")?;
        programs.push(ProgramSummary {
            id: info.id(),
            name: info.name_as_str().unwrap_or_default().to_string(),
        });
    }
    programs.sort_by_key(|p| p.id);
    Ok(programs)
}

/// Maps referenced by the loaded program with id `program_id`.
///
/// # Errors
/// Returns an error if no such program is loaded or a map cannot be inspected
pub fn list_maps(program_id: u32) -> Result<Vec<MapSummary>> {
    let mut program = None;
    for info in loaded_programs() {
        let info = info.context("Failed to enumerate loaded programs")?;
        if info.id() == program_id {
            program = Some(info);
            break;
        }
    }
    let program = program.with_context(|| format!("No loaded program with id {program_id}"))?;

    let map_ids = program
        .map_ids()
        .with_context(|| format!("Failed to read map ids of program {program_id}"))?
        .unwrap_or_default();

    map_ids
        .into_iter()
        .map(|id| {
            let info = MapInfo::from_id(id).with_context(|| format!("Failed to inspect map {id}"))?;
            Ok(MapSummary {
                id: info.id(),
                name: info.name_as_str().unwrap_or_default().to_string(),
                key_size: info.key_size(),
                value_size: info.value_size(),
                max_entries: info.max_entries(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_summary_display() {
        let map = MapSummary {
            id: 42,
            name: "EXEC_COUNT".to_string(),
            key_size: 4,
            value_size: 8,
            max_entries: 8192,
        };
        let line = map.to_string();
        assert!(line.contains("EXEC_COUNT"));
        assert!(line.contains("key 4B"));
        assert!(line.contains("max 8192"));
    }

    #[test]
    fn test_unnamed_program_display() {
        let program = ProgramSummary { id: 7, name: String::new() };
        assert!(program.to_string().ends_with("<anonymous>"));
    }
}
