use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use tracing::{event, Level};

use crate::content::tile_id::{Scheme, TileId};
use crate::content::types::{LayeredTile, NetworkInfo, NetworkStatus, TileQuad};
use crate::helpers::AlpError;

const FORMAT_VERSION: u8 = 1;
const INDEX_FILE_NAME: &str = "index";

// Guard against nonsense lengths from a corrupted file before allocating.
const MAX_LAYER_BYTES: u32 = 64 * 1024 * 1024;

fn quad_file_name(id: &TileId) -> String {
    let id = id.to_scheme(Scheme::Tms);
    format!("{}_{}_{}.quad", id.zoom_level, id.coords.0, id.coords.1)
}

fn write_tile_id(writer: &mut impl Write, id: &TileId) -> std::io::Result<()> {
    writer.write_u8(id.zoom_level)?;
    writer.write_u32::<LittleEndian>(id.coords.0)?;
    writer.write_u32::<LittleEndian>(id.coords.1)?;
    writer.write_u8(match id.scheme {
        Scheme::Tms => 0,
        Scheme::SlippyMap => 1,
    })?;
    Ok(())
}

fn read_tile_id(reader: &mut impl Read) -> Result<TileId, AlpError> {
    let zoom_level = reader.read_u8()?;
    let x = reader.read_u32::<LittleEndian>()?;
    let y = reader.read_u32::<LittleEndian>()?;
    let scheme = match reader.read_u8()? {
        0 => Scheme::Tms,
        1 => Scheme::SlippyMap,
        other => {
            return Err(AlpError::InvalidInput(format!(
                "unknown tile scheme {other}"
            )))
        }
    };
    Ok(TileId::new(zoom_level, (x, y), scheme))
}

fn write_layer(writer: &mut impl Write, data: &Bytes) -> std::io::Result<()> {
    writer.write_u32::<LittleEndian>(data.len() as u32)?;
    writer.write_all(data)?;
    Ok(())
}

fn read_layer(reader: &mut impl Read) -> Result<Bytes, AlpError> {
    let len = reader.read_u32::<LittleEndian>()?;
    if len > MAX_LAYER_BYTES {
        return Err(AlpError::InvalidInput(format!(
            "layer payload of {len} bytes exceeds the sanity limit"
        )));
    }
    let mut data = vec![0u8; len as usize];
    reader.read_exact(&mut data)?;
    Ok(Bytes::from(data))
}

fn write_quad(writer: &mut impl Write, quad: &TileQuad) -> std::io::Result<()> {
    writer.write_u8(FORMAT_VERSION)?;
    for slot in 0..4 {
        if slot >= quad.n_tiles {
            writer.write_u8(0)?;
            continue;
        }
        let tile = &quad.tiles[slot];
        writer.write_u8(1)?;
        write_tile_id(writer, &tile.id)?;
        writer.write_u8(tile.network_info.status as u8)?;
        writer.write_u64::<LittleEndian>(tile.network_info.timestamp_ms)?;
        write_layer(writer, &tile.ortho)?;
        write_layer(writer, &tile.height)?;
        write_layer(writer, &tile.vector)?;
    }
    Ok(())
}

fn read_quad(reader: &mut impl Read) -> Result<TileQuad, AlpError> {
    let version = reader.read_u8()?;
    if version != FORMAT_VERSION {
        return Err(AlpError::InvalidInput(format!(
            "unsupported quad file version {version}"
        )));
    }
    let mut tiles: [LayeredTile; 4] = Default::default();
    let mut n_tiles = 0;
    for _ in 0..4 {
        if reader.read_u8()? == 0 {
            continue;
        }
        let id = read_tile_id(reader)?;
        let status = match reader.read_u8()? {
            0 => NetworkStatus::Good,
            1 => NetworkStatus::NotFound,
            2 => NetworkStatus::NetworkError,
            other => {
                return Err(AlpError::InvalidInput(format!(
                    "unknown network status {other}"
                )))
            }
        };
        let timestamp_ms = reader.read_u64::<LittleEndian>()?;
        let ortho = read_layer(reader)?;
        let height = read_layer(reader)?;
        let vector = read_layer(reader)?;
        tiles[n_tiles] = LayeredTile {
            id,
            network_info: NetworkInfo::new(status, timestamp_ms),
            ortho,
            height,
            vector,
        };
        n_tiles += 1;
    }
    if n_tiles == 0 {
        return Err(AlpError::InvalidInput("quad file has no tiles".into()));
    }
    Ok(TileQuad {
        id: tiles[0].id.parent(),
        n_tiles,
        tiles,
    })
}

/// Persist quads into `dir`, one file each, plus an index listing them.
/// Individual write failures abort the whole persist; callers treat that as
/// best effort.
pub fn write_quads<'a>(
    dir: &Path,
    quads: impl Iterator<Item = &'a TileQuad>,
) -> Result<(), AlpError> {
    fs::create_dir_all(dir)?;
    let mut index = String::new();
    for quad in quads {
        let file_name = quad_file_name(&quad.id);
        let file = fs::File::create(dir.join(&file_name))?;
        let mut writer = BufWriter::new(file);
        write_quad(&mut writer, quad)?;
        writer.flush()?;
        index.push_str(&file_name);
        index.push('\n');
    }
    fs::write(dir.join(INDEX_FILE_NAME), index)?;
    Ok(())
}

/// Read everything listed in the index. Truncated, corrupted or
/// version-mismatched files are skipped; a missing directory yields an empty
/// result.
pub fn read_quads(dir: &Path) -> Vec<TileQuad> {
    let index = match fs::read_to_string(dir.join(INDEX_FILE_NAME)) {
        Ok(index) => index,
        Err(_) => return Vec::new(),
    };
    let mut quads = Vec::new();
    for file_name in index.lines().filter(|line| !line.is_empty()) {
        let path: PathBuf = dir.join(file_name);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                event!(Level::WARN, "skipping quad file {file_name}: {e}");
                continue;
            }
        };
        match read_quad(&mut BufReader::new(file)) {
            Ok(quad) => quads.push(quad),
            Err(e) => {
                event!(Level::WARN, "dropping corrupt quad file {file_name}: {e}");
            }
        }
    }
    quads
}
