//! Binary particle data blob: each particle's ID followed by its three
//! velocity components and three position components, all `f64`, matching
//! `original_source/.../liouvillean.cpp`'s `outputParticleBin64Data` field
//! order exactly so a dump produced by this crate decodes the same way.
//!
//! `spec.md` §6 names base64 as the text-safe encoding this blob rides in
//! inside the XML configuration document, with an optional bzip2 layer
//! underneath for large systems.

use crate::error::Error;
use crate::particle::Particle;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::io::{Read, Write};

const RECORD_BYTES: usize = 8 * 7; // u64 id + 6 f64 (velocity, then position)

/// Packs `particles` into the raw (undilated) binary record format.
fn encode_records(particles: &[Particle]) -> Vec<u8> {
    let mut out = Vec::with_capacity(particles.len() * RECORD_BYTES);
    for p in particles {
        out.extend_from_slice(&(p.id as u64).to_le_bytes());
        out.extend_from_slice(&p.velocity.x.to_le_bytes());
        out.extend_from_slice(&p.velocity.y.to_le_bytes());
        out.extend_from_slice(&p.velocity.z.to_le_bytes());
        out.extend_from_slice(&p.position.x.to_le_bytes());
        out.extend_from_slice(&p.position.y.to_le_bytes());
        out.extend_from_slice(&p.position.z.to_le_bytes());
    }
    out
}

fn decode_records(bytes: &[u8]) -> Result<Vec<(u32, [f64; 3], [f64; 3])>, Error> {
    if bytes.len() % RECORD_BYTES != 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "particle binary blob length is not a multiple of the record size",
        )
        .into());
    }

    let mut out = Vec::with_capacity(bytes.len() / RECORD_BYTES);
    for chunk in bytes.chunks_exact(RECORD_BYTES) {
        let id = u64::from_le_bytes(chunk[0..8].try_into().unwrap()) as u32;
        let read_f64 = |offset: usize| f64::from_le_bytes(chunk[offset..offset + 8].try_into().unwrap());
        let velocity = [read_f64(8), read_f64(16), read_f64(24)];
        let position = [read_f64(32), read_f64(40), read_f64(48)];
        out.push((id, velocity, position));
    }
    Ok(out)
}

/// Encodes `particles` as base64, optionally bzip2-compressing the raw
/// record bytes first (smaller, but only worth it past a few hundred
/// particles since bzip2 has fixed per-block overhead).
pub fn encode_particle_blob(particles: &[Particle], compress: bool) -> Result<String, Error> {
    let raw = encode_records(particles);
    let payload = if compress {
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
        encoder.write_all(&raw)?;
        encoder.finish()?
    } else {
        raw
    };
    Ok(BASE64.encode(payload))
}

/// Inverse of `encode_particle_blob`. `compress` must match how the blob
/// was produced; there is no magic-byte sniffing, matching the original's
/// reliance on the enclosing XML attribute to say which encoding was used.
pub fn decode_particle_blob(
    blob: &str,
    compress: bool,
) -> Result<Vec<(u32, [f64; 3], [f64; 3])>, Error> {
    let decoded = BASE64
        .decode(blob)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let raw = if compress {
        let mut decoder = bzip2::read::BzDecoder::new(&decoded[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        out
    } else {
        decoded
    };
    decode_records(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::SpeciesId;
    use crate::vector::Vec3;

    fn sample_particles() -> Vec<Particle> {
        vec![
            Particle::new(0, Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.1, 0.2, 0.3), 0 as SpeciesId),
            Particle::new(1, Vec3::new(-1.0, -2.0, -3.0), Vec3::new(-0.1, -0.2, -0.3), 0),
        ]
    }

    #[test]
    fn uncompressed_blob_roundtrips() {
        let particles = sample_particles();
        let blob = encode_particle_blob(&particles, false).unwrap();
        let decoded = decode_particle_blob(&blob, false).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].0, 0);
        assert!((decoded[1].2[0] - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn compressed_blob_roundtrips() {
        let particles = sample_particles();
        let blob = encode_particle_blob(&particles, true).unwrap();
        let decoded = decode_particle_blob(&blob, true).unwrap();
        assert_eq!(decoded.len(), 2);
        assert!((decoded[0].1[1] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn malformed_length_is_rejected() {
        let blob = BASE64.encode(vec![0u8; 10]);
        assert!(decode_particle_blob(&blob, false).is_err());
    }
}
