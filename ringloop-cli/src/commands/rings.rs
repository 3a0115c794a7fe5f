// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `ringloop rings` command - Create configured rings and show diagnostics.

use ringloop_core::{ConfigLoader, DiagnosticCommands, LinkStateCounters, RingRegistry};

pub async fn execute(config_path: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_file(config_path)?;

    let registry = RingRegistry::new_shared();
    let rings = config
        .rings
        .iter()
        .map(|rc| registry.create_from_config(rc))
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        let table =
            DiagnosticCommands::with_defaults(registry.clone(), LinkStateCounters::new_shared())?;
        println!("{}", table.execute("/ring/list")?);
        for ring in &rings {
            let reply = table.execute(&format!("/ring/info,{}", ring.name()))?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════════════════════════════╗");
    println!("║                              CONFIGURED RINGS                                ║");
    println!("╠═══════════════════════════╦══════════╦═══════════╦══════════╦════════════════╣");
    println!("║ Name                      ║ Size     ║ Capacity  ║ Elem (B) ║ Prod / Cons    ║");
    println!("╠═══════════════════════════╬══════════╬═══════════╬══════════╬════════════════╣");

    for ring in &rings {
        let info = ring.info();
        println!(
            "║ {:<25} ║ {:<8} ║ {:<9} ║ {:<8} ║ {:<14} ║",
            info.name,
            info.configured_size,
            info.usable_capacity,
            info.element_size,
            format!("{} / {}", info.producer_sync_type, info.consumer_sync_type)
        );
    }

    println!("╚═══════════════════════════╩══════════╩═══════════╩══════════╩════════════════╝");
    println!();
    println!("Total: {} ring(s)", registry.len());

    Ok(())
}
