use deflate::write::ZlibEncoder;
use deflate::Compression;
use inflate::inflate_bytes_zlib;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1},
    IResult,
};
use sha1_smol::{Digest, Sha1};
use std::fs::{create_dir_all, read, File};
use std::io::Write;
use std::str::from_utf8;

use crate::error::Error;
use crate::objects::Object;
use crate::repo::Repository;

const TYPE_TAGS: [&[u8]; 4] = [b"blob", b"commit", b"tree", b"tag"];

fn parse_header(input: &[u8]) -> IResult<&[u8], (&[u8], usize)> {
    let (input, type_tag) = alt((
        tag(TYPE_TAGS[0]),
        tag(TYPE_TAGS[1]),
        tag(TYPE_TAGS[2]),
        tag(TYPE_TAGS[3]),
    ))(input)?;
    let (input, _) = nom::character::complete::space1(input)?;
    let (input, len_bytes) = take_till1(|c| c == b'\x00')(input)?;
    let (input, _) = tag(b"\x00")(input)?;
    Ok((input, (type_tag, from_utf8(len_bytes).ok().and_then(|s| s.parse().ok()).unwrap_or(usize::MAX))))
}

// inverse of unwrap_header
fn wrap_header(type_tag: &str, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(type_tag.len() + 1 + 20 + payload.len());
    out.extend_from_slice(type_tag.as_bytes());
    out.push(b' ');
    out.extend_from_slice(payload.len().to_string().as_bytes());
    out.push(b'\x00');
    out.extend_from_slice(payload);
    out
}

fn unwrap_header(framed: &[u8]) -> Result<(&str, &[u8]), Error> {
    let (payload, (type_tag, declared_len)) =
        parse_header(framed).map_err(|_| Error::Malformed("missing object header".to_string()))?;
    if declared_len != payload.len() {
        return Err(Error::Malformed(format!(
            "header declares length {declared_len} but payload is {} bytes",
            payload.len()
        )));
    }
    Ok((from_utf8(type_tag)?, payload))
}

fn object_path(repo: &Repository, digest: &str) -> Result<std::path::PathBuf, Error> {
    repo.path(&["objects", &digest[..2], &digest[2..]], false)
}

pub fn read_object(repo: &Repository, digest: &str) -> Result<Object, Error> {
    let path = object_path(repo, digest)?;
    if !path.exists() {
        return Err(Error::ObjectNotFound(digest.to_string()));
    }
    let compressed = read(&path)?;
    let framed =
        inflate_bytes_zlib(&compressed).map_err(|e| Error::Malformed(format!("zlib inflate failed: {e}")))?;
    let (type_tag, payload) = unwrap_header(&framed)?;
    log::debug!("read object {digest} ({type_tag})");
    Object::deserialize(type_tag, payload)
}

// writes the compressed framed bytes under the digest-derived path; a no-op
// if that path already exists
pub fn write_object(obj: &Object, repo: Option<&Repository>) -> Result<Digest, Error> {
    let framed = wrap_header(obj.type_tag(), &obj.serialize());

    let mut hasher = Sha1::new();
    hasher.update(&framed);
    let digest = hasher.digest();

    if let Some(repo) = repo {
        let hash = digest.to_string();
        let obj_path = object_path(repo, &hash)?;
        if !obj_path.exists() {
            if let Some(dir) = obj_path.parent() {
                create_dir_all(dir)?;
            }
            let file = File::create(&obj_path)?;
            let mut encoder = ZlibEncoder::new(file, Compression::Default);
            encoder.write_all(&framed)?;
            encoder.finish()?;
            log::debug!("wrote object {hash} ({})", obj.type_tag());
        }
    }

    Ok(digest)
}

// reads path's contents and builds the variant named by type_tag from them,
// then writes it the same as any other object
pub fn hash_file(
    path: impl AsRef<std::path::Path>,
    type_tag: &str,
    repo: Option<&Repository>,
) -> Result<Digest, Error> {
    let contents = read(path)?;
    let obj = Object::deserialize(type_tag, &contents)?;
    write_object(&obj, repo)
}
