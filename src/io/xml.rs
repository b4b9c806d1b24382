//! The `spec.md` §6 configuration document: a single XML file describing
//! the box, the boundary condition, the equation of motion, which sorter
//! strategy to use, and the particle data blob. Grounded on
//! `original_source`'s XML-based save/load (`Sim->loadConfiguration`) for
//! the overall shape of "one document, one element per subsystem",
//! expressed here with `quick-xml`'s serde integration instead of the
//! original's `magnet::xml` wrapper.

use crate::boundary::Boundary;
use crate::error::{ConfigError, Error};
use crate::liouvillean::Liouvillean;
use crate::vector::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "Simulation")]
pub struct ConfigDocument {
    #[serde(rename = "Global")]
    pub global: GlobalConfig,
    #[serde(rename = "Liouvillean")]
    pub liouvillean: LiouvilleanConfig,
    #[serde(rename = "Sorter")]
    pub sorter: SorterConfig,
    #[serde(rename = "Species", default)]
    pub species: Vec<SpeciesConfig>,
    #[serde(rename = "Wall", default)]
    pub walls: Vec<WallConfig>,
    #[serde(rename = "ParticleData")]
    pub particle_data: ParticleDataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesConfig {
    #[serde(rename = "@Mass")]
    pub mass: f64,
    #[serde(rename = "@Diameter")]
    pub diameter: f64,
    #[serde(rename = "@Elasticity")]
    pub elasticity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallConfig {
    #[serde(rename = "@Id")]
    pub id: u32,
    #[serde(rename = "@OriginX")]
    pub origin_x: f64,
    #[serde(rename = "@OriginY")]
    pub origin_y: f64,
    #[serde(rename = "@OriginZ")]
    pub origin_z: f64,
    #[serde(rename = "@NormalX")]
    pub normal_x: f64,
    #[serde(rename = "@NormalY")]
    pub normal_y: f64,
    #[serde(rename = "@NormalZ")]
    pub normal_z: f64,
    #[serde(rename = "@Elasticity")]
    pub elasticity: f64,
}

impl WallConfig {
    pub fn to_wall(&self) -> crate::context::Wall {
        crate::context::Wall {
            id: self.id,
            origin: Vec3::new(self.origin_x, self.origin_y, self.origin_z),
            normal: Vec3::new(self.normal_x, self.normal_y, self.normal_z),
            elasticity: self.elasticity,
        }
    }
}

impl SpeciesConfig {
    pub fn to_species(&self, id: crate::species::SpeciesId) -> crate::species::Species {
        crate::species::Species::new(id, self.mass, self.diameter, self.elasticity)
    }
}

impl ConfigDocument {
    /// Species listed in document order become `SpeciesId`s `0..N` in that
    /// same order — the id attribute on `<Particle>` entries in the binary
    /// blob indexes into this table positionally, not by name.
    pub fn to_species_table(&self) -> Vec<crate::species::Species> {
        self.species
            .iter()
            .enumerate()
            .map(|(i, s)| s.to_species(i as crate::species::SpeciesId))
            .collect()
    }

    pub fn to_walls(&self) -> Vec<crate::context::Wall> {
        self.walls.iter().map(WallConfig::to_wall).collect()
    }
}

impl SorterConfig {
    pub fn to_sorter(&self, n_particles: usize) -> Result<crate::context::SorterStrategy, Error> {
        use crate::context::SorterStrategy;
        use crate::sorter::{CalendarSorter, CbtSorter};
        match self.kind.as_str() {
            "Cbt" => Ok(SorterStrategy::Cbt(CbtSorter::new(n_particles))),
            "Calendar" => {
                let bucket_width = self
                    .bucket_width
                    .ok_or(ConfigError::MissingAttribute("BucketWidth"))?;
                Ok(SorterStrategy::Calendar(CalendarSorter::new(
                    n_particles,
                    bucket_width,
                )))
            }
            other => Err(ConfigError::UnknownType {
                element: "Sorter",
                attr: other.to_string(),
            }
            .into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(rename = "@OriginX")]
    pub origin_x: f64,
    #[serde(rename = "@OriginY")]
    pub origin_y: f64,
    #[serde(rename = "@OriginZ")]
    pub origin_z: f64,
    #[serde(rename = "@DimX")]
    pub dim_x: f64,
    #[serde(rename = "@DimY")]
    pub dim_y: f64,
    #[serde(rename = "@DimZ")]
    pub dim_z: f64,
    #[serde(rename = "@Oversize")]
    pub oversize: f64,
    #[serde(rename = "@Boundary")]
    pub boundary: String,
    /// Present only when `Boundary="LeesEdwards"`.
    #[serde(rename = "@ShearRate", skip_serializing_if = "Option::is_none")]
    pub shear_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiouvilleanConfig {
    #[serde(rename = "@Type")]
    pub kind: String,
    #[serde(rename = "@GX", skip_serializing_if = "Option::is_none")]
    pub gx: Option<f64>,
    #[serde(rename = "@GY", skip_serializing_if = "Option::is_none")]
    pub gy: Option<f64>,
    #[serde(rename = "@GZ", skip_serializing_if = "Option::is_none")]
    pub gz: Option<f64>,
    #[serde(rename = "@ShearRate", skip_serializing_if = "Option::is_none")]
    pub shear_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SorterConfig {
    #[serde(rename = "@Type")]
    pub kind: String,
    #[serde(rename = "@BucketWidth", skip_serializing_if = "Option::is_none")]
    pub bucket_width: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleDataConfig {
    #[serde(rename = "@Count")]
    pub count: usize,
    #[serde(rename = "@Compressed")]
    pub compressed: bool,
    #[serde(rename = "$text")]
    pub blob: String,
}

impl GlobalConfig {
    pub fn origin(&self) -> Vec3 {
        Vec3::new(self.origin_x, self.origin_y, self.origin_z)
    }

    pub fn dim(&self) -> Vec3 {
        Vec3::new(self.dim_x, self.dim_y, self.dim_z)
    }

    pub fn to_boundary(&self) -> Result<Boundary, Error> {
        match self.boundary.as_str() {
            "None" => Ok(Boundary::None),
            "Periodic" => Ok(Boundary::Periodic { size: self.dim() }),
            "LeesEdwards" => {
                let shear_rate = self
                    .shear_rate
                    .ok_or(ConfigError::MissingAttribute("ShearRate"))?;
                Ok(Boundary::LeesEdwards {
                    size: self.dim(),
                    shear_rate,
                    shear_offset_time: 0.0,
                })
            }
            other => Err(ConfigError::UnknownType {
                element: "Global",
                attr: other.to_string(),
            }
            .into()),
        }
    }
}

impl LiouvilleanConfig {
    pub fn to_liouvillean(&self) -> Result<Liouvillean, Error> {
        match self.kind.as_str() {
            "Newtonian" => Ok(Liouvillean::Newtonian),
            "NewtonianGravity" => {
                let g = Vec3::new(
                    self.gx.ok_or(ConfigError::MissingAttribute("GX"))?,
                    self.gy.ok_or(ConfigError::MissingAttribute("GY"))?,
                    self.gz.ok_or(ConfigError::MissingAttribute("GZ"))?,
                );
                Ok(Liouvillean::NewtonianGravity { g })
            }
            "Sllod" => {
                let shear_rate = self
                    .shear_rate
                    .ok_or(ConfigError::MissingAttribute("ShearRate"))?;
                Ok(Liouvillean::Sllod { shear_rate })
            }
            other => Err(ConfigError::UnknownType {
                element: "Liouvillean",
                attr: other.to_string(),
            }
            .into()),
        }
    }
}

/// Loads and parses a configuration document from `path`.
pub fn load(path: &Path) -> Result<ConfigDocument, Error> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<ConfigDocument, Error> {
    Ok(quick_xml::de::from_str(text)?)
}

/// Serializes `doc` and writes it to `path`, creating parent directories as
/// needed rather than assuming the output directory already exists.
pub fn save(path: &Path, doc: &ConfigDocument) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = render(doc)?;
    std::fs::write(path, text)?;
    Ok(())
}

pub fn render(doc: &ConfigDocument) -> Result<String, Error> {
    Ok(quick_xml::se::to_string(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> ConfigDocument {
        ConfigDocument {
            global: GlobalConfig {
                origin_x: 0.0,
                origin_y: 0.0,
                origin_z: 0.0,
                dim_x: 10.0,
                dim_y: 10.0,
                dim_z: 10.0,
                oversize: 1.0,
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
        }
    }

    #[test]
    fn render_then_parse_roundtrips() {
        let doc = sample_doc();
        let text = render(&doc).unwrap();
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.global.boundary, "Periodic");
        assert_eq!(parsed.liouvillean.kind, "Newtonian");
    }

    #[test]
    fn periodic_boundary_resolves_from_dim() {
        let doc = sample_doc();
        let boundary = doc.global.to_boundary().unwrap();
        assert!(matches!(boundary, Boundary::Periodic { .. }));
    }

    #[test]
    fn lees_edwards_without_shear_rate_is_an_error() {
        let mut doc = sample_doc();
        doc.global.boundary = "LeesEdwards".to_string();
        assert!(doc.global.to_boundary().is_err());
    }

    #[test]
    fn unknown_liouvillean_type_is_an_error() {
        let mut doc = sample_doc();
        doc.liouvillean.kind = "Bogus".to_string();
        assert!(doc.liouvillean.to_liouvillean().is_err());
    }
}
