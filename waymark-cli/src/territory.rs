//! Territory resolution shared by the planning and check commands.

use camino::Utf8Path;
use waymark_core::TerritoryConfig;

use crate::{CliError, read_json};

/// Load a territory description, or the Vietnam preset when none is given.
///
/// Fields missing from the file are taken from the preset.
pub(crate) fn load_territory(path: Option<&Utf8Path>) -> Result<TerritoryConfig, CliError> {
    let Some(file) = path else {
        return Ok(TerritoryConfig::vietnam());
    };
    let territory: TerritoryConfig = read_json(file)?;
    territory
        .validate()
        .map_err(|source| CliError::InvalidTerritory {
            path: file.to_path_buf(),
            source,
        })?;
    log::info!("loaded territory {} from {file}", territory.name);
    Ok(territory)
}

