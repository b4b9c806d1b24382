//! Demonstrates the two layers of `eventmd_core::io`: parsing a
//! configuration document and summarizing it as JSON for a quick look
//! without reaching for an XML viewer.

use eventmd_core::io::{bin, xml};
use serde_json::json;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "template.xml".to_string());

    let doc = xml::load(path.as_ref())?;
    let particles = bin::decode_particle_blob(&doc.particle_data.blob, doc.particle_data.compressed)?;

    let summary = json!({
        "boundary": doc.global.boundary,
        "liouvillean": doc.liouvillean.kind,
        "sorter": doc.sorter.kind,
        "species_count": doc.species.len(),
        "wall_count": doc.walls.len(),
        "particle_count": particles.len(),
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
