//! Config command implementation - print or save an example liftqc.toml

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;

pub fn execute(out: Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            Config::default().save_to_file(&path)?;
            log::info!("Example configuration written to: {}", path.display());
        }
        None => print!("{}", Config::example_toml()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_command_writes_loadable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("liftqc.toml");
        execute(Some(path.clone())).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.children.wanted, Config::default().children.wanted);
    }
}
