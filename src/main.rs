//! `eventmd` binary: a thin CLI shell around `eventmd_core`'s scheduler and
//! XML configuration document — parse args, wire up logging, hand off to
//! the library, in the shape `freddiehaddad-oxidized`'s `ox-bin/src/main.rs`
//! uses for its own `clap`/`tracing` driven entry point.

use clap::Parser;
use eventmd_core::cli::{Cli, Commands};
use eventmd_core::context::SimContext;
use eventmd_core::io::xml::{
    self, ConfigDocument, GlobalConfig, LiouvilleanConfig, ParticleDataConfig, SorterConfig,
    SpeciesConfig,
};
use eventmd_core::io::{bin, ensure_data_directory};
use eventmd_core::particle::Particle;
use eventmd_core::scheduler;
use eventmd_core::vector::Vec3;
use tracing::info;
use std::process::ExitCode;

fn build_context(doc: &ConfigDocument) -> Result<SimContext, eventmd_core::Error> {
    let species = doc.to_species_table();
    let walls = doc.to_walls();
    let boundary = doc.global.to_boundary()?;
    let liouvillean = doc.liouvillean.to_liouvillean()?;
    let sorter = doc.sorter.to_sorter(doc.particle_data.count)?;

    let records =
        bin::decode_particle_blob(&doc.particle_data.blob, doc.particle_data.compressed)?;
    let particles: Vec<Particle> = records
        .into_iter()
        .map(|(id, velocity, position)| {
            Particle::new(
                id,
                Vec3::new(position[0], position[1], position[2]),
                Vec3::new(velocity[0], velocity[1], velocity[2]),
                0,
            )
        })
        .collect();

    SimContext::new(
        particles,
        species,
        boundary,
        liouvillean,
        walls,
        doc.global.origin(),
        doc.global.dim(),
        doc.global.oversize,
        sorter,
    )
}

/// Renders the current state of `ctx` back into a configuration document,
/// suitable for resuming a run or inspecting the final particle positions.
fn context_to_document(
    ctx: &SimContext,
    compress: bool,
) -> Result<ConfigDocument, eventmd_core::Error> {
    use eventmd_core::boundary::Boundary;
    use eventmd_core::context::SorterStrategy;
    use eventmd_core::liouvillean::Liouvillean;

    let blob = bin::encode_particle_blob(&ctx.particles, compress)?;
    let origin = ctx.cells.origin();
    let cell_dim = ctx.cells.cell_dimensions();
    let (nx, ny, nz) = ctx.cells.cell_count();

    Ok(ConfigDocument {
        global: GlobalConfig {
            origin_x: origin.x,
            origin_y: origin.y,
            origin_z: origin.z,
            dim_x: cell_dim.x * nx as f64,
            dim_y: cell_dim.y * ny as f64,
            dim_z: cell_dim.z * nz as f64,
            oversize: 1.0,
            boundary: match ctx.boundary {
                Boundary::None => "None".to_string(),
                Boundary::Periodic { .. } => "Periodic".to_string(),
                Boundary::LeesEdwards { .. } => "LeesEdwards".to_string(),
            },
            shear_rate: match ctx.boundary {
                Boundary::LeesEdwards { shear_rate, .. } => Some(shear_rate),
                _ => None,
            },
        },
        liouvillean: LiouvilleanConfig {
            kind: match ctx.liouvillean {
                Liouvillean::Newtonian => "Newtonian".to_string(),
                Liouvillean::NewtonianGravity { .. } => "NewtonianGravity".to_string(),
                Liouvillean::Sllod { .. } => "Sllod".to_string(),
            },
            gx: match ctx.liouvillean {
                Liouvillean::NewtonianGravity { g } => Some(g.x),
                _ => None,
            },
            gy: match ctx.liouvillean {
                Liouvillean::NewtonianGravity { g } => Some(g.y),
                _ => None,
            },
            gz: match ctx.liouvillean {
                Liouvillean::NewtonianGravity { g } => Some(g.z),
                _ => None,
            },
            shear_rate: match ctx.liouvillean {
                Liouvillean::Sllod { shear_rate } => Some(shear_rate),
                _ => None,
            },
        },
        sorter: SorterConfig {
            kind: match &ctx.sorter {
                SorterStrategy::Cbt(_) => "Cbt".to_string(),
                SorterStrategy::Calendar(_) => "Calendar".to_string(),
            },
            bucket_width: None,
        },
        species: ctx
            .species
            .iter()
            .map(|s| SpeciesConfig {
                mass: s.mass,
                diameter: s.diameter,
                elasticity: s.elasticity,
            })
            .collect(),
        walls: Vec::new(),
        particle_data: ParticleDataConfig {
            count: ctx.particles.len(),
            compressed: compress,
            blob,
        },
    })
}

fn run() -> Result<(), eventmd_core::Error> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Load { config } => {
            let doc = xml::load(&config)?;
            info!(
                "configuration `{}` parsed: {} particles, boundary={}, liouvillean={}",
                config.display(),
                doc.particle_data.count,
                doc.global.boundary,
                doc.liouvillean.kind
            );
        }
        Commands::Run {
            config,
            events,
            output,
            compress,
        } => {
            let doc = xml::load(&config)?;
            let mut ctx = build_context(&doc)?;
            info!(
                "loaded {} particles, running for {} events",
                ctx.particles.len(),
                events
            );

            scheduler::rebuild_system_events(&mut ctx);
            let mut executed = 0u64;
            while executed < events {
                if !scheduler::advance(&mut ctx) {
                    info!(
                        "sorter exhausted after {} events at t={}",
                        executed, ctx.time
                    );
                    break;
                }
                executed += 1;
            }

            info!("finished {} events, final time={}", executed, ctx.time);
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    ensure_data_directory(parent)?;
                }
            }
            let out_doc = context_to_document(&ctx, compress)?;
            xml::save(&output, &out_doc)?;
        }
        Commands::Write { template } => {
            let doc = ConfigDocument {
                global: GlobalConfig {
                    origin_x: 0.0,
                    origin_y: 0.0,
                    origin_z: 0.0,
                    dim_x: 10.0,
                    dim_y: 10.0,
                    dim_z: 10.0,
                    oversize: 1.2,
                    boundary: "Periodic".to_string(),
                    shear_rate: None,
                },
                liouvillean: LiouvilleanConfig {
                    kind: "Newtonian".to_string(),
                    gx: None,
                    gy: None,
                    gz: None,
                    shear_rate: None,
                },
                sorter: SorterConfig {
                    kind: "Cbt".to_string(),
                    bucket_width: None,
                },
                species: vec![SpeciesConfig {
                    mass: 1.0,
                    diameter: 1.0,
                    elasticity: 1.0,
                }],
                walls: Vec::new(),
                particle_data: ParticleDataConfig {
                    count: 0,
                    compressed: false,
                    blob: String::new(),
                },
            };
            xml::save(&template, &doc)?;
            info!("wrote template configuration to `{}`", template.display());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
