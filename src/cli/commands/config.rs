//! Config command handlers.

use anyhow::Result;

use crate::config::Config;
use crate::paths;

pub fn path() -> Result<()> {
    println!("{}", paths::config_path().display());
    Ok(())
}

pub fn init() -> Result<()> {
    if Config::init()? {
        println!("Created {}", paths::config_path().display());
    } else {
        println!("Config already exists at {}", paths::config_path().display());
    }
    Ok(())
}
