//! `lane vehicles` — manage the vehicle reference catalog.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use leadlane_core::remote::VehicleCatalog as _;

use crate::demo::DemoEnv;
use crate::output::{OutputMode, pretty_section, render_mode, render_success};

#[derive(Args, Debug)]
pub struct VehiclesArgs {
    #[command(subcommand)]
    pub command: VehiclesCommand,
}

#[derive(Subcommand, Debug)]
pub enum VehiclesCommand {
    /// List catalog entries (name ascending).
    List,
    /// Add a vehicle to the catalog.
    Add {
        /// Display name, e.g. "Toyota Corolla".
        name: String,
    },
    /// Remove a vehicle by id. Existing leads keep their value.
    Rm {
        /// Catalog id, e.g. "veh-001".
        id: String,
    },
}

pub fn run_vehicles(args: &VehiclesArgs, env: &DemoEnv, output: OutputMode) -> Result<()> {
    match &args.command {
        VehiclesCommand::List => {
            let vehicles = env.services.catalog.list().context("loading catalog")?;
            render_mode(
                output,
                &vehicles,
                |vehicles, w| {
                    for vehicle in vehicles {
                        writeln!(w, "{}\t{}", vehicle.id, vehicle.name)?;
                    }
                    Ok(())
                },
                |vehicles, w| {
                    pretty_section(w, &format!("Catálogo de vehículos ({})", vehicles.len()))?;
                    if vehicles.is_empty() {
                        writeln!(w, "  No hay vehículos en el catálogo.")?;
                    }
                    for vehicle in vehicles {
                        writeln!(w, "  {:<9} {}", vehicle.id, vehicle.name)?;
                    }
                    Ok(())
                },
            )
        }
        VehiclesCommand::Add { name } => {
            let vehicle = env
                .services
                .catalog
                .add(name)
                .map_err(leadlane_core::error::SyncError::from)?;
            render_success(output, &format!("{} agregado como {}", vehicle.name, vehicle.id))
        }
        VehiclesCommand::Rm { id } => {
            env.services
                .catalog
                .remove(id)
                .map_err(leadlane_core::error::SyncError::from)?;
            render_success(output, &format!("{id} eliminado del catálogo"))
        }
    }
}
