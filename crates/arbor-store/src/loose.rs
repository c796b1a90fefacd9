use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use arbor_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// On-disk store holding one file per object.
///
/// Layout:
/// ```text
/// <root>/objects/<first 2 hex chars>/<remaining 38 hex chars>
/// ```
///
/// Each file holds `zstd("<kind> <len>\0" ++ data)`. Objects are written to
/// a temporary file in the shard directory and then persisted under their
/// final name, so a partially written object is never visible.
#[derive(Debug)]
pub struct LooseObjectStore {
    config: StoreConfig,
}

impl LooseObjectStore {
    /// Open the store described by `config`, creating `objects/` if needed.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(config.objects_dir())?;
        Ok(Self { config })
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the file that holds (or would hold) `id`.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        let (shard, rest) = hex.split_at(2);
        self.config.objects_dir().join(shard).join(rest)
    }

    fn encode(&self, object: &StoredObject) -> StoreResult<Vec<u8>> {
        let mut raw = object.kind.hasher().header(object.data.len());
        raw.extend_from_slice(&object.data);
        Ok(zstd::bulk::compress(&raw, self.config.compression_level)?)
    }

    fn decode(id: &ObjectId, compressed: &[u8]) -> StoreResult<StoredObject> {
        let raw = zstd::stream::decode_all(compressed)?;
        let corrupt = |reason: &str| StoreError::CorruptObject {
            id: *id,
            reason: reason.to_string(),
        };

        let nul = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| corrupt("missing header terminator"))?;
        let header =
            std::str::from_utf8(&raw[..nul]).map_err(|_| corrupt("header is not UTF-8"))?;
        let (kind, len) = header
            .split_once(' ')
            .ok_or_else(|| corrupt("malformed header"))?;
        let kind: ObjectKind = kind.parse().map_err(|e: String| corrupt(&e))?;
        let len: usize = len.parse().map_err(|_| corrupt("malformed length"))?;

        let data = raw[nul + 1..].to_vec();
        if data.len() != len {
            return Err(corrupt(&format!(
                "length mismatch: header says {len}, body has {}",
                data.len()
            )));
        }

        let hasher = kind.hasher();
        if !hasher.verify(&data, id) {
            return Err(StoreError::HashMismatch {
                id: *id,
                computed: hasher.hash(&data),
            });
        }
        Ok(StoredObject::new(kind, data))
    }
}

impl ObjectStore for LooseObjectStore {
    fn put(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        let path = self.object_path(&id);
        if path.exists() {
            return Ok(id);
        }

        let shard = path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.objects_dir());
        fs::create_dir_all(&shard)?;

        let mut tmp = NamedTempFile::new_in(&shard)?;
        tmp.write_all(&self.encode(object)?)?;
        if self.config.fsync {
            tmp.as_file().sync_all()?;
        }

        match tmp.persist_noclobber(&path) {
            Ok(_) => {
                debug!(id = %id, kind = %object.kind, size = object.size, "loose object written");
                Ok(id)
            }
            // A concurrent writer already stored identical content.
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(id),
            Err(e) => Err(e.error.into()),
        }
    }

    fn get(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        let compressed = match fs::read(self.object_path(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id))
            }
            Err(e) => return Err(e.into()),
        };
        Self::decode(id, &compressed).inspect_err(|e| {
            warn!(id = %id, error = %e, "unreadable loose object");
        })
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).try_exists()?)
    }
}
