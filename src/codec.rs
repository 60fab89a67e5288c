//! Cache payload codec: gzip-compressed JSON arrays of builds.
//!
//! Compression keeps entries comfortably below key/value size limits even for
//! buckets with a lot of builds.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::Result;
use crate::models::Build;

pub fn encode_builds(builds: &[Build]) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(builds)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

pub fn decode_builds(payload: &[u8]) -> Result<Vec<Build>> {
    let mut decoder = GzDecoder::new(payload);
    let mut json = Vec::new();
    decoder.read_to_end(&mut json)?;

    Ok(serde_json::from_slice(&json)?)
}
