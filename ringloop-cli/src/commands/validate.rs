// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `ringloop validate` command - Validate configuration file.

use ringloop_core::ConfigLoader;

pub async fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Pipeline Settings:");
            println!("  Flush Interval:     {}", config.pipeline.flush_interval);
            println!("  Burst Size:         {}", config.pipeline.burst_size);
            println!();
            println!("Receive Cache:");
            println!("  Size:               {}", config.receive_cache.size);
            println!("  Locality:           {}", config.receive_cache.locality);
            println!();
            println!("Rings ({}):", config.rings.len());
            for ring in &config.rings {
                println!(
                    "  - {} (capacity: {}, element size: {}, producer: {}, consumer: {})",
                    ring.name, ring.capacity, ring.element_size, ring.producer, ring.consumer
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
