// xv6fsck/src/config.rs

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use xv6fs::prelude::{CheckPhases, XV6_FSSIZE};

use crate::cli::Args;

/// Optional `--config` file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub fs_size: Option<u32>,
    pub skip: Vec<String>,
    pub verbose: Option<bool>,
    pub color: Option<bool>,
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.skipped_phases()?;
        Ok(config)
    }

    pub fn skipped_phases(&self) -> anyhow::Result<CheckPhases> {
        self.skip.iter().try_fold(CheckPhases::empty(), |acc, name| {
            CheckPhases::from_kebab(name)
                .map(|phase| acc | phase)
                .with_context(|| format!("Unknown check '{name}' in skip list"))
        })
    }
}

/// Effective settings: command line first, then the config file, then
/// built-in defaults.
#[derive(Debug)]
pub struct Settings {
    pub image: PathBuf,
    pub fs_size: u32,
    pub skip: CheckPhases,
    pub verbose: bool,
    pub color: bool,
}

impl Settings {
    pub fn resolve(args: &Args, config: &Config) -> anyhow::Result<Self> {
        let image = args.file.clone().context("No image given")?;
        let fs_size = args.fs_size.or(config.fs_size).unwrap_or(XV6_FSSIZE);
        if fs_size < 2 {
            anyhow::bail!("fs_size must be at least 2 blocks, got {fs_size}");
        }
        Ok(Self {
            image,
            fs_size,
            skip: config.skipped_phases()?,
            verbose: args.verbose || config.verbose.unwrap_or(false),
            color: !args.no_color && config.color.unwrap_or(true),
        })
    }
}
