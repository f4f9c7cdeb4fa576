//! Opening savegame files, plain or gzip-compressed.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use super::{read_tag_events, DecodedSavegame, SavegameDecoder};
use crate::config::DecoderConfig;
use crate::error::DecodeError;

/// Decode a savegame from any byte stream.
pub fn decode_reader<R: Read>(
    reader: R,
    config: &DecoderConfig,
) -> Result<DecodedSavegame, DecodeError> {
    let mut decoder = SavegameDecoder::new(config);
    read_tag_events(BufReader::new(reader), |event| decoder.feed(event))?;
    Ok(decoder.finish())
}

/// Decode a savegame file. Files ending in `.gz` are decompressed on the fly.
///
/// The file is closed when this returns, whether decoding succeeded or not.
pub fn load_savegame(
    path: impl AsRef<Path>,
    config: &DecoderConfig,
) -> Result<DecodedSavegame, DecodeError> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading savegame");

    let file = File::open(path).map_err(|source| DecodeError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    if is_gzip_path(path) {
        debug!("decompressing gzip savegame");
        decode_reader(GzDecoder::new(file), config)
    } else {
        decode_reader(file, config)
    }
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("gz"))
}
