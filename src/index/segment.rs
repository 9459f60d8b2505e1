//! Segment persistence for index snapshots.
//!
//! A committed snapshot is serialized into a single segment file. The commit
//! path writes the complete segment to a temporary name, fsyncs it, then
//! renames it over the live name; a crash at any point leaves either the old
//! or the new segment fully intact, never a partial one. On open, magic,
//! version, and a trailing crc32 are all verified.
//!
//! Layout (all integers varint unless noted):
//!
//! ```text
//! u32 magic "BNTM" | u32 version
//! next_doc_id | live bitmap byte length | bitmap bytes
//! field count
//!   per field: name | term count
//!     per term: term | posting count
//!       per posting: delta doc_id | term_freq | position count | delta positions
//! stored doc count
//!   per doc: doc_id | external id | field count | (name | value)*
//! u32 crc32 of everything above
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use ahash::AHashMap;
use bit_vec::BitVec;

use crate::error::{BantamError, Result};
use crate::index::dictionary::TermDictionary;
use crate::index::posting::Posting;
use crate::index::snapshot::{IndexSnapshot, StoredDoc};
use crate::storage::structured::{StructReader, StructWriter};
use crate::storage::traits::Storage;

/// Name of the live segment file.
pub const SEGMENT_FILE: &str = "segment.bnt";
/// Name of the in-flight segment file, renamed over [`SEGMENT_FILE`] on
/// successful commit.
pub const SEGMENT_TMP_FILE: &str = "segment.tmp";

const SEGMENT_MAGIC: u32 = 0x424e_544d; // "BNTM"
const SEGMENT_VERSION: u32 = 1;

/// Serialize a snapshot and atomically publish it as the live segment.
pub fn write_segment(storage: &dyn Storage, snapshot: &IndexSnapshot) -> Result<()> {
    let output = storage.create_output(SEGMENT_TMP_FILE)?;
    let mut writer = StructWriter::new(output);

    writer.write_u32(SEGMENT_MAGIC)?;
    writer.write_u32(SEGMENT_VERSION)?;

    writer.write_varint(snapshot.max_doc())?;
    let bitmap = snapshot.live_docs().to_bytes();
    writer.write_varint(bitmap.len() as u64)?;
    writer.write_bytes(&bitmap)?;

    let field_names = snapshot.field_names();
    writer.write_varint(field_names.len() as u64)?;
    for field in field_names {
        let dict = snapshot
            .field_dictionary(field)
            .ok_or_else(|| BantamError::internal(format!("missing dictionary for {field}")))?;
        writer.write_string(field)?;
        writer.write_varint(dict.len() as u64)?;
        for (term, list) in dict.iter_sorted() {
            writer.write_string(term)?;
            writer.write_varint(list.len() as u64)?;
            let mut prev_doc = 0u64;
            for posting in list.iter() {
                writer.write_varint(posting.doc_id - prev_doc)?;
                prev_doc = posting.doc_id;
                writer.write_varint(posting.term_freq as u64)?;
                writer.write_varint(posting.positions.len() as u64)?;
                let mut prev_pos = 0u32;
                for &pos in &posting.positions {
                    writer.write_varint((pos - prev_pos) as u64)?;
                    prev_pos = pos;
                }
            }
        }
    }

    let mut stored: Vec<(u64, &Arc<StoredDoc>)> = (0..snapshot.max_doc())
        .filter_map(|doc_id| snapshot.stored(doc_id).map(|doc| (doc_id, doc)))
        .collect();
    stored.sort_unstable_by_key(|(doc_id, _)| *doc_id);

    writer.write_varint(stored.len() as u64)?;
    for (doc_id, doc) in stored {
        writer.write_varint(doc_id)?;
        writer.write_string(&doc.external_id)?;
        let mut fields: Vec<(&String, &String)> = doc.fields.iter().collect();
        fields.sort_unstable_by_key(|(name, _)| *name);
        writer.write_varint(fields.len() as u64)?;
        for (name, value) in fields {
            writer.write_string(name)?;
            writer.write_string(value)?;
        }
    }

    writer.finish()?;
    storage.rename_file(SEGMENT_TMP_FILE, SEGMENT_FILE)
}

/// Read the live segment back into a snapshot.
pub fn read_segment(storage: &dyn Storage) -> Result<IndexSnapshot> {
    let input = storage.open_input(SEGMENT_FILE)?;
    let mut reader = StructReader::new(input);

    let magic = reader.read_u32()?;
    if magic != SEGMENT_MAGIC {
        return Err(BantamError::index(format!(
            "invalid segment magic: {magic:#010x}"
        )));
    }
    let version = reader.read_u32()?;
    if version != SEGMENT_VERSION {
        return Err(BantamError::index(format!(
            "unsupported segment version: {version}"
        )));
    }

    let next_doc_id = reader.read_varint()?;
    let bitmap_len = reader.read_len()?;
    let bitmap_bytes = reader.read_bytes(bitmap_len)?;
    let mut live = BitVec::from_bytes(&bitmap_bytes);
    live.truncate(next_doc_id as usize);

    let field_count = reader.read_len()?;
    let mut fields: AHashMap<String, TermDictionary> = AHashMap::with_capacity(field_count);
    for _ in 0..field_count {
        let field = reader.read_string()?;
        let term_count = reader.read_len()?;
        let mut dict = TermDictionary::new();
        for _ in 0..term_count {
            let term = reader.read_string()?;
            let posting_count = reader.read_len()?;
            let mut prev_doc = 0u64;
            for _ in 0..posting_count {
                let doc_id = prev_doc + reader.read_varint()?;
                prev_doc = doc_id;
                let term_freq = reader.read_varint()? as u32;
                let position_count = reader.read_len()?;
                let mut positions = Vec::with_capacity(position_count);
                let mut prev_pos = 0u32;
                for _ in 0..position_count {
                    let pos = prev_pos + reader.read_varint()? as u32;
                    positions.push(pos);
                    prev_pos = pos;
                }
                dict.add_posting(&term, Posting::new(doc_id, term_freq, positions))?;
            }
        }
        fields.insert(field, dict);
    }

    let stored_count = reader.read_len()?;
    let mut stored: AHashMap<u64, Arc<StoredDoc>> = AHashMap::with_capacity(stored_count);
    for _ in 0..stored_count {
        let doc_id = reader.read_varint()?;
        let external_id = reader.read_string()?;
        let field_count = reader.read_len()?;
        let mut doc_fields = HashMap::with_capacity(field_count);
        for _ in 0..field_count {
            let name = reader.read_string()?;
            let value = reader.read_string()?;
            doc_fields.insert(name, value);
        }
        stored.insert(
            doc_id,
            Arc::new(StoredDoc {
                external_id,
                fields: doc_fields,
            }),
        );
    }

    reader.verify_checksum()?;

    Ok(IndexSnapshot::restore_parts(fields, stored, live, next_doc_id))
}
