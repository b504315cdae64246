//! Parameter building and preset management.

use anyhow::Result;
use clap::Subcommand;

use mjnodes_core::preset::PresetStore;

use super::args::ParamsArgs;
use crate::config::CliConfig;

#[derive(Subcommand, Debug)]
pub enum PresetCommands {
    /// Save parameter flags under a name
    Save {
        name: String,
        #[command(flatten)]
        params: ParamsArgs,
    },
    /// Print a saved preset
    Load { name: String },
    /// List saved presets
    List,
    /// Delete a saved preset
    Delete { name: String },
}

/// Print the normalized parameters for a set of flags.
pub fn show_params(params: &ParamsArgs) -> Result<()> {
    let params = params.normalize()?;
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}

pub fn handle_preset_command(command: PresetCommands, config: &CliConfig) -> Result<()> {
    let store = PresetStore::new(&config.presets_dir);

    match command {
        PresetCommands::Save { name, params } => {
            let path = store.save(&name, &params.normalize()?)?;
            println!("Saved preset '{name}' to {}", path.display());
        }
        PresetCommands::Load { name } => {
            let params = store.load(&name)?;
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
        PresetCommands::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("No presets in {}", store.dir().display());
            }
            for name in names {
                println!("{name}");
            }
        }
        PresetCommands::Delete { name } => {
            store.delete(&name)?;
            println!("Deleted preset '{name}'");
        }
    }
    Ok(())
}
