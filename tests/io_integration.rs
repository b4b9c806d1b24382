//! Round-trips a configuration document through `io::xml`/`io::bin` and
//! confirms a context built from it behaves like one built directly.

use eventmd_core::context::SimContext;
use eventmd_core::io::bin;
use eventmd_core::io::xml::{
    ConfigDocument, GlobalConfig, LiouvilleanConfig, ParticleDataConfig, SorterConfig,
    SpeciesConfig, WallConfig,
};
use eventmd_core::particle::Particle;
use eventmd_core::vector::Vec3;

fn sample_document(compress: bool) -> ConfigDocument {
    let particles = vec![
        Particle::new(0, Vec3::new(-2.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 0),
        Particle::new(1, Vec3::new(2.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), 0),
    ];
    let blob = bin::encode_particle_blob(&particles, compress).unwrap();

    ConfigDocument {
        global: GlobalConfig {
            origin_x: -50.0,
            origin_y: -50.0,
            origin_z: -50.0,
            dim_x: 100.0,
            dim_y: 100.0,
            dim_z: 100.0,
            oversize: 1.0,
            boundary: "None".to_string(),
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
        walls: vec![WallConfig {
            id: 0,
            origin_x: 10.0,
            origin_y: 0.0,
            origin_z: 0.0,
            normal_x: -1.0,
            normal_y: 0.0,
            normal_z: 0.0,
            elasticity: 1.0,
        }],
        particle_data: ParticleDataConfig {
            count: 2,
            compressed: compress,
            blob,
        },
    }
}

#[test]
fn document_round_trips_through_xml_text() {
    let doc = sample_document(false);
    let text = eventmd_core::io::xml::render(&doc).unwrap();
    let parsed = eventmd_core::io::xml::parse(&text).unwrap();
    assert_eq!(parsed.species.len(), 1);
    assert_eq!(parsed.walls.len(), 1);
    assert_eq!(parsed.particle_data.count, 2);
}

#[test]
fn document_builds_a_working_context() {
    let doc = sample_document(true);
    let species = doc.to_species_table();
    let walls = doc.to_walls();
    let boundary = doc.global.to_boundary().unwrap();
    let liouvillean = doc.liouvillean.to_liouvillean().unwrap();
    let sorter = doc.sorter.to_sorter(doc.particle_data.count).unwrap();

    let records =
        bin::decode_particle_blob(&doc.particle_data.blob, doc.particle_data.compressed).unwrap();
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

    let ctx = SimContext::new(
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
    .unwrap();

    assert_eq!(ctx.particles.len(), 2);
    assert_eq!(ctx.walls.len(), 1);
    assert!((ctx.particles[0].position.x - (-2.0)).abs() < 1e-12);
}
