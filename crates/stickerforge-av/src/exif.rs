//! Sticker pack metadata as a WEBP EXIF chunk.
//!
//! The chunk is a minimal little-endian TIFF structure with a single IFD
//! entry (tag `0x5741`, type UNDEFINED) whose value is the JSON-encoded pack
//! identity:
//!
//! ```text
//! 49 49 2A 00 08 00 00 00   "II*\0", IFD at offset 8
//! 01 00                     one entry
//! 41 57 07 00               tag 0x5741, type 7
//! LL LL LL LL               value length (u32 LE) = JSON length
//! 16 00 00 00               value offset = 22
//! { ... JSON ... }
//! ```
//!
//! The chunk is spliced into the container by `webpmux`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stickerforge_core::{Error, Result, StickerMetadata};

use crate::command::{CommandRunner, ToolCommand};
use crate::workspace::Workspace;

/// TIFF header, IFD entry count, tag and type.
pub const EXIF_HEADER: [u8; 14] = [
    0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01, 0x00, 0x41, 0x57, 0x07, 0x00,
];

/// Offset of the JSON payload, stored after the length field.
pub const EXIF_TRAILER: [u8; 4] = [0x16, 0x00, 0x00, 0x00];

const PAYLOAD_OFFSET: usize = EXIF_HEADER.len() + 4 + EXIF_TRAILER.len();

const INPUT_FILE: &str = "input_exif.webp";
const CHUNK_FILE: &str = "raw.exif";
const OUTPUT_FILE: &str = "output_exif.webp";

/// JSON shape read by the destination platform. Field order is the
/// serialization order.
#[derive(Debug, Serialize, Deserialize)]
struct PackPayload {
    #[serde(rename = "sticker-pack-id")]
    pack_id: String,
    #[serde(rename = "sticker-pack-name")]
    pack_name: String,
    #[serde(rename = "sticker-pack-publisher")]
    publisher: String,
    emojis: Vec<String>,
}

/// Assemble the EXIF chunk for `metadata`.
///
/// Deterministic: the same metadata always yields the same bytes.
pub fn build_exif_chunk(metadata: &StickerMetadata) -> Result<Vec<u8>> {
    let payload = PackPayload {
        pack_id: metadata.pack_id.clone(),
        pack_name: metadata.pack_name.clone(),
        publisher: metadata.author_name.clone(),
        emojis: metadata.emojis.clone(),
    };
    let json = serde_json::to_vec(&payload)
        .map_err(|e| Error::Encode(format!("failed to serialize pack metadata: {e}")))?;
    let len = u32::try_from(json.len())
        .map_err(|_| Error::validation("pack metadata does not fit in an EXIF chunk"))?;

    let mut chunk = Vec::with_capacity(PAYLOAD_OFFSET + json.len());
    chunk.extend_from_slice(&EXIF_HEADER);
    chunk.extend_from_slice(&len.to_le_bytes());
    chunk.extend_from_slice(&EXIF_TRAILER);
    chunk.extend_from_slice(&json);
    Ok(chunk)
}

/// Read pack metadata back out of a chunk produced by [`build_exif_chunk`].
pub fn parse_exif_chunk(chunk: &[u8]) -> Result<StickerMetadata> {
    if chunk.len() < PAYLOAD_OFFSET {
        return Err(Error::Decode(format!(
            "EXIF chunk is {} bytes, shorter than its {PAYLOAD_OFFSET}-byte header",
            chunk.len()
        )));
    }
    if chunk[..EXIF_HEADER.len()] != EXIF_HEADER {
        return Err(Error::Decode("EXIF chunk header mismatch".into()));
    }
    if chunk[EXIF_HEADER.len() + 4..PAYLOAD_OFFSET] != EXIF_TRAILER {
        return Err(Error::Decode("EXIF chunk value offset mismatch".into()));
    }

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&chunk[EXIF_HEADER.len()..EXIF_HEADER.len() + 4]);
    let declared = u32::from_le_bytes(len_bytes) as usize;
    let json = &chunk[PAYLOAD_OFFSET..];
    if declared != json.len() {
        return Err(Error::Decode(format!(
            "EXIF length field says {declared} bytes but {} follow",
            json.len()
        )));
    }

    let payload: PackPayload = serde_json::from_slice(json)
        .map_err(|e| Error::Decode(format!("EXIF payload is not pack metadata: {e}")))?;
    Ok(StickerMetadata {
        pack_id: payload.pack_id,
        pack_name: payload.pack_name,
        author_name: payload.publisher,
        emojis: payload.emojis,
    })
}

/// Locate the payload of the `EXIF` chunk inside a WEBP container.
///
/// Returns `Ok(None)` for a well-formed container without one.
pub fn find_exif_chunk(webp: &[u8]) -> Result<Option<&[u8]>> {
    if webp.len() < 12 || &webp[..4] != b"RIFF" || &webp[8..12] != b"WEBP" {
        return Err(Error::Decode("not a RIFF/WEBP container".into()));
    }

    let mut pos = 12;
    while pos + 8 <= webp.len() {
        let fourcc = &webp[pos..pos + 4];
        let mut size_bytes = [0u8; 4];
        size_bytes.copy_from_slice(&webp[pos + 4..pos + 8]);
        let size = u32::from_le_bytes(size_bytes) as usize;

        let start = pos + 8;
        let end = start
            .checked_add(size)
            .filter(|end| *end <= webp.len())
            .ok_or_else(|| {
                Error::Decode(format!(
                    "chunk {} at offset {pos} runs past the end of the file",
                    String::from_utf8_lossy(fourcc)
                ))
            })?;
        if fourcc == b"EXIF" {
            return Ok(Some(&webp[start..end]));
        }
        // Chunks are padded to an even length.
        pos = end + (size & 1);
    }
    Ok(None)
}

/// Splices pack metadata into WEBP images with `webpmux`.
#[derive(Debug, Clone)]
pub struct MetadataEmbedder {
    webpmux: PathBuf,
    metadata: StickerMetadata,
}

impl MetadataEmbedder {
    /// Create an embedder using the `webpmux` binary at `webpmux`.
    pub fn new(webpmux: impl Into<PathBuf>, metadata: StickerMetadata) -> Self {
        Self {
            webpmux: webpmux.into(),
            metadata,
        }
    }

    /// Metadata written by this embedder.
    pub fn metadata(&self) -> &StickerMetadata {
        &self.metadata
    }

    /// Path of the multiplexer binary.
    pub fn webpmux(&self) -> &Path {
        &self.webpmux
    }

    /// Embed the chunk into `image`, staging files in `workspace`.
    ///
    /// # Errors
    ///
    /// Every failure (chunk assembly, scratch I/O, `webpmux` exit status)
    /// is reported as [`Error::Mux`].
    pub fn embed(
        &self,
        runner: &dyn CommandRunner,
        workspace: &Workspace,
        image: &[u8],
    ) -> Result<Vec<u8>> {
        self.try_embed(runner, workspace, image)
            .map_err(|e| match e {
                Error::Mux(_) => e,
                other => Error::Mux(other.to_string()),
            })
    }

    fn try_embed(
        &self,
        runner: &dyn CommandRunner,
        workspace: &Workspace,
        image: &[u8],
    ) -> Result<Vec<u8>> {
        let chunk = build_exif_chunk(&self.metadata)?;
        let input = workspace.write(INPUT_FILE, image)?;
        let chunk_path = workspace.write(CHUNK_FILE, &chunk)?;
        let output = workspace.file(OUTPUT_FILE);

        ToolCommand::new(&self.webpmux)
            .args(["-set", "exif"])
            .path_arg(&chunk_path)
            .path_arg(&input)
            .arg("-o")
            .path_arg(&output)
            .current_dir(workspace.dir())
            .execute(runner)?;

        workspace.read(OUTPUT_FILE)
    }

    /// Embed best-effort: on failure log it and return `image` unchanged.
    pub fn embed_or_original(
        &self,
        runner: &dyn CommandRunner,
        workspace: &Workspace,
        image: Vec<u8>,
    ) -> Vec<u8> {
        match self.embed(runner, workspace, &image) {
            Ok(embedded) => embedded,
            Err(e) => {
                tracing::warn!(
                    job = %workspace.job_id(),
                    "metadata embedding failed, keeping original bytes: {e}"
                );
                image
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ToolOutput;
    use stickerforge_core::JobId;

    fn metadata() -> StickerMetadata {
        StickerMetadata {
            pack_id: "bridge.example.".into(),
            pack_name: "Bridge".into(),
            author_name: "Ops".into(),
            emojis: vec!["😀".into(), "🎉".into()],
        }
    }

    #[test]
    fn chunk_layout_is_bit_exact() {
        let chunk = build_exif_chunk(&metadata()).unwrap();
        let json = r#"{"sticker-pack-id":"bridge.example.","sticker-pack-name":"Bridge","sticker-pack-publisher":"Ops","emojis":["😀","🎉"]}"#
            .as_bytes();

        assert_eq!(&chunk[..14], &EXIF_HEADER);
        assert_eq!(&chunk[14..18], &(json.len() as u32).to_le_bytes());
        assert_eq!(&chunk[18..22], &[0x16, 0x00, 0x00, 0x00]);
        assert_eq!(&chunk[22..], &json[..]);
    }

    #[test]
    fn length_field_matches_payload() {
        for meta in [
            metadata(),
            StickerMetadata::default(),
            StickerMetadata {
                emojis: Vec::new(),
                pack_name: "名前 \"quoted\"".into(),
                ..metadata()
            },
        ] {
            let chunk = build_exif_chunk(&meta).unwrap();
            let declared = u32::from_le_bytes(chunk[14..18].try_into().unwrap()) as usize;
            assert_eq!(declared, chunk.len() - 22);
        }
    }

    #[test]
    fn build_is_deterministic() {
        let meta = metadata();
        assert_eq!(build_exif_chunk(&meta).unwrap(), build_exif_chunk(&meta).unwrap());
    }

    #[test]
    fn parse_reads_back_metadata() {
        let meta = metadata();
        let chunk = build_exif_chunk(&meta).unwrap();
        assert_eq!(parse_exif_chunk(&chunk).unwrap(), meta);
    }

    #[test]
    fn parse_rejects_bad_length_field() {
        let mut chunk = build_exif_chunk(&metadata()).unwrap();
        chunk[14] = chunk[14].wrapping_add(1);
        let err = parse_exif_chunk(&chunk).unwrap_err();
        assert!(err.to_string().contains("length field"), "{err}");
    }

    #[test]
    fn parse_rejects_bad_header_and_short_input() {
        let mut chunk = build_exif_chunk(&metadata()).unwrap();
        chunk[0] = b'M';
        assert!(matches!(parse_exif_chunk(&chunk), Err(Error::Decode(_))));
        assert!(matches!(parse_exif_chunk(&EXIF_HEADER), Err(Error::Decode(_))));
    }

    fn riff(chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let mut body = b"WEBP".to_vec();
        for (fourcc, data) in chunks {
            body.extend_from_slice(*fourcc);
            body.extend_from_slice(&(data.len() as u32).to_le_bytes());
            body.extend_from_slice(data);
            if data.len() % 2 == 1 {
                body.push(0);
            }
        }
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn find_exif_skips_padded_chunks() {
        let chunk = build_exif_chunk(&metadata()).unwrap();
        let webp = riff(&[(b"VP8X", &[0u8; 10]), (b"ICCP", b"odd"), (b"EXIF", &chunk)]);

        let found = find_exif_chunk(&webp).unwrap().unwrap();
        assert_eq!(found, &chunk[..]);
        assert_eq!(parse_exif_chunk(found).unwrap(), metadata());
    }

    #[test]
    fn find_exif_absent_and_malformed() {
        let webp = riff(&[(b"VP8L", &[0u8; 6])]);
        assert!(find_exif_chunk(&webp).unwrap().is_none());

        assert!(find_exif_chunk(b"GIF89a").is_err());

        let mut truncated = riff(&[(b"EXIF", &[1u8; 8])]);
        truncated.truncate(truncated.len() - 3);
        assert!(find_exif_chunk(&truncated).is_err());
    }

    struct Webpmux {
        fail: bool,
    }

    impl CommandRunner for Webpmux {
        fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
            if self.fail {
                return Ok(ToolOutput {
                    code: Some(255),
                    stderr: "Failed to set EXIF".into(),
                    ..Default::default()
                });
            }
            let args = command.arguments();
            assert_eq!(&args[..2], ["-set", "exif"]);
            let chunk = std::fs::read(&args[2]).unwrap();
            let mut image = std::fs::read(&args[3]).unwrap();
            assert_eq!(args[4], "-o");
            image.extend_from_slice(&chunk);
            std::fs::write(&args[5], image).unwrap();
            Ok(ToolOutput {
                code: Some(0),
                ..Default::default()
            })
        }
    }

    #[test]
    fn embed_runs_webpmux_and_reads_result() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::acquire(root.path(), &JobId::from(1_i64)).unwrap();
        let embedder = MetadataEmbedder::new("webpmux", metadata());

        let out = embedder.embed(&Webpmux { fail: false }, &ws, b"RIFFimage").unwrap();
        assert!(out.starts_with(b"RIFFimage"));
        assert_eq!(&out[9..], &build_exif_chunk(&metadata()).unwrap()[..]);
    }

    #[test]
    fn embed_failure_is_mux_error() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::acquire(root.path(), &JobId::from(2_i64)).unwrap();
        let embedder = MetadataEmbedder::new("webpmux", metadata());

        let err = embedder.embed(&Webpmux { fail: true }, &ws, b"RIFF").unwrap_err();
        match err {
            Error::Mux(msg) => assert!(msg.contains("Failed to set EXIF"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn embed_or_original_falls_back() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::acquire(root.path(), &JobId::from(3_i64)).unwrap();
        let embedder = MetadataEmbedder::new("webpmux", metadata());

        let out = embedder.embed_or_original(&Webpmux { fail: true }, &ws, b"RIFF".to_vec());
        assert_eq!(out, b"RIFF");
    }
}
