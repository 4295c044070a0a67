use nom::{
    bytes::complete::{is_not, tag, take, take_till1},
    character::complete::space1,
    multi::many0,
    IResult,
};
use std::str::from_utf8;

use crate::error::Error;

fn parse_leaf(input: &[u8]) -> IResult<&[u8], (&[u8], &[u8], &[u8])> {
    let (input, mode) = is_not(" ")(input)?;
    let (input, _) = space1(input)?;
    let (input, path) = take_till1(|c| c == b'\x00')(input)?;
    let (input, _) = tag(b"\x00")(input)?;
    let (input, digest) = take(20usize)(input)?;
    Ok((input, (mode, path, digest)))
}

// mode is normalized to 6 ASCII digits; git accepts a 5-digit form for
// regular files, left-padded here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: String,
    pub path: String,
    pub digest: String,
}

impl TreeEntry {
    pub fn new(mode: impl Into<String>, path: impl Into<String>, digest: impl Into<String>) -> TreeEntry {
        let mode = mode.into();
        let mode = if mode.len() == 5 {
            format!("0{mode}")
        } else {
            mode
        };
        TreeEntry {
            mode,
            path: path.into(),
            digest: digest.into(),
        }
    }

    // anything not mode-prefix "10" sorts as if its name had a trailing
    // slash, matching git's historical tree ordering
    fn sort_key(&self) -> String {
        if self.mode.starts_with("10") {
            self.path.clone()
        } else {
            format!("{}/", self.path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub contents: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(contents: Vec<TreeEntry>) -> Tree {
        Tree { contents }
    }

    pub fn parse(input: &[u8]) -> Result<Tree, Error> {
        let (_, leaves) = many0(parse_leaf)(input)?;
        let mut contents = Vec::with_capacity(leaves.len());
        for (mode, path, digest) in leaves {
            contents.push(TreeEntry::new(
                from_utf8(mode)?,
                from_utf8(path)?,
                hex::encode(digest),
            ));
        }
        Ok(Tree { contents })
    }

    // sorts a copy of contents by canonical key before emitting, so an
    // unsorted tree still serializes to canonical bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut sorted = self.contents.clone();
        sorted.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut out = Vec::new();
        for entry in &sorted {
            out.extend_from_slice(entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.path.as_bytes());
            out.push(b'\x00');
            let raw = hex::decode(&entry.digest).expect("digest is always valid hex");
            out.extend_from_slice(&raw);
        }
        out
    }
}
