//! Keyword list and style reference lookups.

use anyhow::{bail, Result};
use clap::Subcommand;

use mjnodes_core::keywords::{join_keywords, KeywordCatalog};
use mjnodes_core::options::PromptPosition;
use mjnodes_core::style::StyleCatalog;

use crate::config::CliConfig;

#[derive(Subcommand, Debug)]
pub enum KeywordCommands {
    /// List categories, or the keywords of one category
    List { category: Option<String> },
    /// Pick one keyword from a category
    Random {
        category: String,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Join keywords with a base prompt
    Join {
        keywords: Vec<String>,
        #[arg(long, default_value = "")]
        base: String,
        /// First or Last
        #[arg(long, default_value = "First")]
        position: PromptPosition,
        #[arg(long, default_value = ", ")]
        separator: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum StyleCommands {
    /// List style names
    List,
    /// Print the style code and preview path of a style
    Select { name: String },
}

pub fn handle_keyword_command(command: KeywordCommands, config: &CliConfig) -> Result<()> {
    match command {
        KeywordCommands::List { category } => {
            let catalog = KeywordCatalog::load(config.keywords_dirs.as_slice())?;
            match category {
                Some(category) => match catalog.keywords(&category) {
                    Some(keywords) => keywords.iter().for_each(|k| println!("{k}")),
                    None => bail!("Unknown keyword category '{category}'"),
                },
                None => {
                    for category in catalog.categories() {
                        let count = catalog.keywords(category).map_or(0, <[String]>::len);
                        println!("{category} ({count})");
                    }
                }
            }
        }
        KeywordCommands::Random { category, seed } => {
            let catalog = KeywordCatalog::load(config.keywords_dirs.as_slice())?;
            println!("{}", catalog.random(&category, seed));
        }
        KeywordCommands::Join {
            keywords,
            base,
            position,
            separator,
        } => {
            println!("{}", join_keywords(&keywords, &base, position, &separator));
        }
    }
    Ok(())
}

pub fn handle_style_command(command: StyleCommands, config: &CliConfig) -> Result<()> {
    let catalog = StyleCatalog::load(config.styles_dirs.as_slice())?;
    match command {
        StyleCommands::List => {
            for name in catalog.names() {
                println!("{name}");
            }
        }
        StyleCommands::Select { name } => {
            let Some(style) = catalog.select(&name) else {
                bail!("Unknown style '{name}'");
            };
            println!("sref: {}", style.sref);
            println!("preview: {}", style.path.display());
        }
    }
    Ok(())
}
