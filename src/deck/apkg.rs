/*!
 * Anki package writer.
 *
 * An `.apkg` file is a zip archive holding a `collection.anki2` SQLite
 * database (schema version 11) and a `media` manifest mapping archive entry
 * names ("0", "1", ...) to the original media file names. The archive is
 * built in a temporary file next to the destination and moved into place
 * only once it is complete.
 */

use chrono::Utc;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::DeckGenerationError;
use super::{Deck, DeckPackager, NoteModel};

/// Name of the collection database inside the archive
const COLLECTION_ENTRY: &str = "collection.anki2";

/// Name of the media manifest inside the archive
const MEDIA_ENTRY: &str = "media";

const SCHEMA_VERSION: i64 = 11;

/// Anki's model type for cloze note types
const MODEL_TYPE_CLOZE: i64 = 1;

static HTML_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").expect("Invalid HTML tag regex")
});

const COLLECTION_SCHEMA: &str = r#"
CREATE TABLE col (
    id              integer primary key,
    crt             integer not null,
    mod             integer not null,
    scm             integer not null,
    ver             integer not null,
    dty             integer not null,
    usn             integer not null,
    ls              integer not null,
    conf            text not null,
    models          text not null,
    decks           text not null,
    dconf           text not null,
    tags            text not null
);
CREATE TABLE notes (
    id              integer primary key,
    guid            text not null,
    mid             integer not null,
    mod             integer not null,
    usn             integer not null,
    tags            text not null,
    flds            text not null,
    sfld            integer not null,
    csum            integer not null,
    flags           integer not null,
    data            text not null
);
CREATE TABLE cards (
    id              integer primary key,
    nid             integer not null,
    did             integer not null,
    ord             integer not null,
    mod             integer not null,
    usn             integer not null,
    type            integer not null,
    queue           integer not null,
    due             integer not null,
    ivl             integer not null,
    factor          integer not null,
    reps            integer not null,
    lapses          integer not null,
    left            integer not null,
    odue            integer not null,
    odid            integer not null,
    flags           integer not null,
    data            text not null
);
CREATE TABLE revlog (
    id              integer primary key,
    cid             integer not null,
    usn             integer not null,
    ease            integer not null,
    ivl             integer not null,
    lastIvl         integer not null,
    factor          integer not null,
    time            integer not null,
    type            integer not null
);
CREATE TABLE graves (
    usn             integer not null,
    oid             integer not null,
    type            integer not null
);
CREATE INDEX ix_notes_usn on notes (usn);
CREATE INDEX ix_cards_usn on cards (usn);
CREATE INDEX ix_revlog_usn on revlog (usn);
CREATE INDEX ix_cards_nid on cards (nid);
CREATE INDEX ix_cards_sched on cards (did, queue, due);
CREATE INDEX ix_revlog_cid on revlog (cid);
CREATE INDEX ix_notes_csum on notes (csum);
"#;

/// Writes decks as Anki `.apkg` packages
#[derive(Debug, Default, Clone)]
pub struct ApkgPackager;

impl ApkgPackager {
    pub fn new() -> Self {
        Self
    }

    /// Create and fill a collection database at `db_path`
    fn write_collection(&self, deck: &Deck, db_path: &Path) -> Result<(), DeckGenerationError> {
        let now = Utc::now();
        let now_secs = now.timestamp();
        let now_millis = now.timestamp_millis();

        let mut conn = Connection::open(db_path)?;
        conn.execute_batch(COLLECTION_SCHEMA)?;

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO col VALUES (NULL, ?1, ?2, ?2, ?3, 0, 0, 0, ?4, ?5, ?6, ?7, '{}')",
            params![
                now_secs,
                now_millis,
                SCHEMA_VERSION,
                collection_conf(deck).to_string(),
                models_json(deck, now_secs).to_string(),
                decks_json(deck, now_secs).to_string(),
                deck_conf_json().to_string(),
            ],
        )?;

        let mut card_id = now_millis;
        for (position, note) in deck.notes.iter().enumerate() {
            let note_id = now_millis + position as i64;
            let sort_field = strip_html(note.fields.first().map(String::as_str).unwrap_or_default());
            tx.execute(
                "INSERT INTO notes VALUES (?1, ?2, ?3, ?4, -1, '', ?5, ?6, ?7, 0, '')",
                params![
                    note_id,
                    note.guid,
                    deck.model.id,
                    now_secs,
                    note.joined_fields(),
                    sort_field,
                    field_checksum(&sort_field),
                ],
            )?;

            let mut ords: Vec<i64> = note.cloze_numbers().iter().map(|n| i64::from(*n) - 1).collect();
            if ords.is_empty() {
                ords.push(0);
            }
            for ord in ords {
                tx.execute(
                    "INSERT INTO cards VALUES (?1, ?2, ?3, ?4, ?5, -1, 0, 0, ?6, 0, 0, 0, 0, 0, 0, 0, 0, '')",
                    params![card_id, note_id, deck.id, ord, now_secs, position as i64 + 1],
                )?;
                card_id += 1;
            }
        }
        tx.commit()?;

        debug!("Wrote collection with {} note(s) to {:?}", deck.notes.len(), db_path);
        Ok(())
    }

    /// Zip the collection and media into `archive`
    fn write_archive(&self, deck: &Deck, db_path: &Path, archive: &File) -> Result<(), DeckGenerationError> {
        let mut zip = ZipWriter::new(archive);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(COLLECTION_ENTRY, options)?;
        std::io::copy(&mut BufReader::new(File::open(db_path)?), &mut zip)?;

        let mut manifest = BTreeMap::new();
        for (index, media_path) in deck.media.iter().enumerate() {
            let name = media_path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .ok_or_else(|| DeckGenerationError::new(format!("Invalid media path: {:?}", media_path)))?;
            let entry = index.to_string();

            zip.start_file(entry.as_str(), options)?;
            std::io::copy(&mut BufReader::new(File::open(media_path)?), &mut zip)?;
            manifest.insert(entry, name);
        }

        let manifest: Map<String, Value> = manifest.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
        zip.start_file(MEDIA_ENTRY, options)?;
        zip.write_all(Value::Object(manifest).to_string().as_bytes())?;

        zip.finish()?;
        Ok(())
    }
}

impl DeckPackager for ApkgPackager {
    fn write(&self, deck: &Deck, path: &Path) -> Result<(), DeckGenerationError> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()?,
        };
        fs::create_dir_all(&parent)?;

        let work_dir = tempfile::tempdir()?;
        let db_path = work_dir.path().join(COLLECTION_ENTRY);
        self.write_collection(deck, &db_path)?;

        let archive = NamedTempFile::new_in(&parent)?;
        self.write_archive(deck, &db_path, archive.as_file())?;
        archive
            .persist(path)
            .map_err(|e| DeckGenerationError::new(format!("Failed to move deck into place: {}", e)))?;

        info!("Deck '{}' written to {}", deck.name, path.display());
        Ok(())
    }
}

/// Sort-field text as Anki stores it: tags removed, non-breaking spaces expanded
fn strip_html(field: &str) -> String {
    HTML_TAG_REGEX.replace_all(field, "").replace("&nbsp;", " ").trim().to_string()
}

/// Duplicate-check checksum: first 32 bits of the SHA-1 of the stripped sort field
fn field_checksum(sort_field: &str) -> i64 {
    use sha1::{Digest, Sha1};
    let digest = Sha1::digest(sort_field.as_bytes());
    i64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

fn collection_conf(deck: &Deck) -> Value {
    json!({
        "activeDecks": [1],
        "curDeck": deck.id,
        "newSpread": 0,
        "collapseTime": 1200,
        "timeLim": 0,
        "estTimes": true,
        "dueCounts": true,
        "curModel": deck.model.id.to_string(),
        "nextPos": deck.notes.len() + 1,
        "sortType": "noteFld",
        "sortBackwards": false,
        "addToCur": true,
    })
}

fn model_json(model: &NoteModel, deck_id: i64, now_secs: i64) -> Value {
    let fields: Vec<Value> = model
        .fields
        .iter()
        .enumerate()
        .map(|(ord, field)| {
            json!({
                "name": field.name,
                "ord": ord,
                "sticky": false,
                "rtl": field.rtl,
                "font": "Arial",
                "size": 20,
                "media": [],
            })
        })
        .collect();

    json!({
        "id": model.id,
        "name": model.name,
        "type": MODEL_TYPE_CLOZE,
        "mod": now_secs,
        "usn": -1,
        "sortf": 0,
        "did": deck_id,
        "tmpls": [{
            "name": "Cloze",
            "ord": 0,
            "qfmt": model.qfmt,
            "afmt": model.afmt,
            "did": null,
            "bqfmt": "",
            "bafmt": "",
        }],
        "flds": fields,
        "css": model.css,
        "latexPre": "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n",
        "latexPost": "\\end{document}",
        "tags": [],
        "vers": [],
    })
}

fn models_json(deck: &Deck, now_secs: i64) -> Value {
    let mut models = Map::new();
    models.insert(deck.model.id.to_string(), model_json(&deck.model, deck.id, now_secs));
    Value::Object(models)
}

fn deck_json(id: i64, name: &str, now_secs: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "desc": "",
        "mod": now_secs,
        "usn": -1,
        "collapsed": false,
        "browserCollapsed": false,
        "newToday": [0, 0],
        "revToday": [0, 0],
        "lrnToday": [0, 0],
        "timeToday": [0, 0],
        "dyn": 0,
        "extendNew": 10,
        "extendRev": 50,
        "conf": 1,
    })
}

fn decks_json(deck: &Deck, now_secs: i64) -> Value {
    let mut decks = Map::new();
    decks.insert("1".to_string(), deck_json(1, "Default", now_secs));
    decks.insert(deck.id.to_string(), deck_json(deck.id, &deck.name, now_secs));
    Value::Object(decks)
}

fn deck_conf_json() -> Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "mod": 0,
            "usn": 0,
            "maxTaken": 60,
            "autoplay": true,
            "timer": 0,
            "replayq": true,
            "dyn": false,
            "new": {
                "delays": [1, 10],
                "ints": [1, 4, 7],
                "initialFactor": 2500,
                "order": 1,
                "perDay": 20,
                "bury": true,
                "separate": true,
            },
            "lapse": {
                "delays": [10],
                "mult": 0,
                "minInt": 1,
                "leechFails": 8,
                "leechAction": 0,
            },
            "rev": {
                "perDay": 100,
                "ease4": 1.3,
                "fuzz": 0.05,
                "minSpace": 1,
                "ivlFct": 1,
                "maxIvl": 36500,
                "bury": true,
            },
        }
    })
}
