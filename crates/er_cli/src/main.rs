use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use er_core::ops;
use er_core::{CharacterPackage, SaveContainer};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about = "Inspect and edit Elden Ring save containers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the ten character slots.
    List {
        #[arg(value_name = "ER0000.sl2")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Verify every region checksum.
    Check {
        #[arg(value_name = "ER0000.sl2")]
        path: PathBuf,
    },
    /// Copy a slot to another slot in the same file.
    Copy {
        #[arg(value_name = "ER0000.sl2")]
        path: PathBuf,
        from: usize,
        to: usize,
    },
    /// Swap two slots.
    Swap {
        #[arg(value_name = "ER0000.sl2")]
        path: PathBuf,
        a: usize,
        b: usize,
    },
    /// Zero a slot.
    Delete {
        #[arg(value_name = "ER0000.sl2")]
        path: PathBuf,
        slot: usize,
    },
    /// Rename the character in a slot.
    Rename {
        #[arg(value_name = "ER0000.sl2")]
        path: PathBuf,
        slot: usize,
        name: String,
    },
    /// Export one character as a standalone .erc package.
    Export {
        #[arg(value_name = "ER0000.sl2")]
        path: PathBuf,
        slot: usize,
        #[arg(value_name = "OUT.erc")]
        out: PathBuf,
    },
    /// Import a .erc package into a slot, replacing its contents.
    Import {
        #[arg(value_name = "ER0000.sl2")]
        path: PathBuf,
        slot: usize,
        #[arg(value_name = "PACKAGE.erc")]
        package: PathBuf,
    },
    /// Move a character from one save file into another.
    Transfer {
        #[arg(value_name = "SRC.sl2")]
        src: PathBuf,
        from: usize,
        #[arg(value_name = "DST.sl2")]
        dst: PathBuf,
        to: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        process::exit(2);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::List { path, json } => {
            let save = SaveContainer::load(&path)?;
            let listings = save.listings();
            if json {
                let mut root = JsonMap::new();
                root.insert(
                    "platform".to_string(),
                    JsonValue::String(format!("{:?}", save.platform())),
                );
                root.insert("slots".to_string(), serde_json::to_value(&listings)?);
                println!("{}", serde_json::to_string_pretty(&JsonValue::Object(root))?);
            } else {
                for entry in &listings {
                    if entry.active {
                        println!(
                            "slot {}: {} (level {}, {}h {}m)",
                            entry.index,
                            entry.name,
                            entry.level,
                            entry.playtime_seconds / 3600,
                            entry.playtime_seconds % 3600 / 60,
                        );
                    } else {
                        println!("slot {}: <empty>", entry.index);
                    }
                }
            }
        }
        Command::Check { path } => {
            let save = SaveContainer::load(&path)?;
            let issues = save.verify_checksums();
            if issues.is_empty() {
                println!("all checksums ok");
            } else {
                for issue in &issues {
                    println!("checksum mismatch in {}", issue.region);
                }
                process::exit(1);
            }
        }
        Command::Copy { path, from, to } => {
            let mut save = SaveContainer::load(&path)?;
            ops::copy_slot(&mut save, from, to)?;
            save.save_to(&path)?;
            println!("copied slot {from} to slot {to}");
        }
        Command::Swap { path, a, b } => {
            let mut save = SaveContainer::load(&path)?;
            ops::swap_slots(&mut save, a, b)?;
            save.save_to(&path)?;
            println!("swapped slots {a} and {b}");
        }
        Command::Delete { path, slot } => {
            let mut save = SaveContainer::load(&path)?;
            ops::delete_slot(&mut save, slot)?;
            save.save_to(&path)?;
            println!("deleted slot {slot}");
        }
        Command::Rename { path, slot, name } => {
            let mut save = SaveContainer::load(&path)?;
            if slot >= er_core::layout::SLOT_COUNT {
                return Err(format!("invalid slot index {slot}, expected 0..=9").into());
            }
            if save.slot(slot).is_empty() {
                return Err(format!("slot {slot} is empty").into());
            }
            save.slot_mut(slot).name = name.clone();
            save.rebuild_and_checksum(slot)?;
            save.save_to(&path)?;
            println!("renamed slot {slot} to {name}");
        }
        Command::Export { path, slot, out } => {
            let save = SaveContainer::load(&path)?;
            let package = ops::export_character(&save, slot)?;
            package.save_to(&out)?;
            println!("exported slot {slot} to {}", out.display());
        }
        Command::Import {
            path,
            slot,
            package,
        } => {
            let mut save = SaveContainer::load(&path)?;
            let package = CharacterPackage::load(&package)?;
            ops::import_character(&mut save, slot, &package)?;
            save.save_to(&path)?;
            println!("imported into slot {slot}");
        }
        Command::Transfer { src, from, dst, to } => {
            let source = SaveContainer::load(&src)?;
            let mut destination = SaveContainer::load(&dst)?;
            ops::transfer_slot(&source, from, &mut destination, to)?;
            destination.save_to(&dst)?;
            println!(
                "transferred slot {from} of {} into slot {to} of {}",
                src.display(),
                dst.display()
            );
        }
    }
    Ok(())
}
