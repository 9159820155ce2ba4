// SPDX-FileCopyrightText: 2025 Greenbone AG
//
// SPDX-License-Identifier: GPL-2.0-or-later WITH x11vnc-openssl-exception

use std::{path::PathBuf, process};

use anyhow::Context;
use clap::{Parser, Subcommand};
use nvticache::{NvtiCache, config::Config};
use serde::Serialize;

/// Inspects the nvticache stored in redis.
#[derive(Parser, Debug)]
#[command(name = "nvticachectl", version)]
struct Args {
    /// Path to a toml config file
    #[arg(short, long, env = "NVTICACHE_CONFIG")]
    config: Option<PathBuf>,
    /// Redis url, overrides the config file
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints the feed version
    FeedVersion,
    /// Prints filename and OID of each VT
    Oids,
    /// Prints the amount of VT files and VTs
    Count,
    /// Prints the metadata of a VT
    Metadata { oid: String },
    /// Prints the references of a VT
    Refs { oid: String },
    /// Prints the parameters of a VT
    Params { oid: String },
    /// Prints metadata, references and parameters of a VT
    Nvt { oid: String },
}

#[derive(Serialize)]
struct Count {
    files: usize,
    nvts: usize,
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(url) = &args.redis_url {
        config.redis.url = url.clone();
    }
    Ok(config)
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("unable to serialize output")?;
    println!("{json}");
    Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    config.logging.init();
    let mut cache = NvtiCache::from_config(&config)
        .with_context(|| format!("unable to use redis on {}", config.redis.url))?;
    match args.command {
        Command::FeedVersion => print(&cache.get_feed_version()?),
        Command::Oids => print(&cache.get_oids()?),
        Command::Count => print(&Count {
            files: cache.get_nvt_files_count()?,
            nvts: cache.get_nvt_count()?,
        }),
        Command::Metadata { oid } => print(&cache.get_nvt_metadata(&oid)?),
        Command::Refs { oid } => print(&cache.get_nvt_refs(&oid)?),
        Command::Params { oid } => print(&cache.get_nvt_params(&oid)?),
        Command::Nvt { oid } => print(&cache.get_nvt(&oid)?),
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        tracing::error!(error = %e, "nvticachectl failed");
        eprintln!("{e:#}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Args, Command, load_config};

    #[test]
    fn parse_subcommand() {
        let args = Args::try_parse_from(["nvticachectl", "metadata", "1.2.3"]).unwrap();
        assert!(matches!(args.command, Command::Metadata { oid } if oid == "1.2.3"));
    }

    #[test]
    fn redis_url_overrides_config() {
        let args = Args::try_parse_from([
            "nvticachectl",
            "--redis-url",
            "redis://localhost:6379",
            "count",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.redis.url, "redis://localhost:6379");
    }

    #[test]
    fn oid_is_required() {
        assert!(Args::try_parse_from(["nvticachectl", "params"]).is_err());
    }
}
