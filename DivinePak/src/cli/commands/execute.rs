//! Command execution implementations

use super::Commands;
use super::{details, extract, grep, list};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::List {
                archive,
                filter,
                count,
                detailed,
            } => list::execute(archive, *detailed, filter.as_deref(), *count),
            Commands::Extract {
                archive,
                path,
                lsb_to_json,
                output,
            } => extract::execute(archive, path, *lsb_to_json, output.as_deref()),
            Commands::Details { archive, path } => details::execute(archive, path.as_deref()),
            Commands::Grep { archive, pattern } => grep::execute(archive, pattern),
        }
    }
}
