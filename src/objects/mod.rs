pub mod blob;
pub mod kvlm;
pub mod tree;

pub use blob::Blob;
pub use kvlm::Kvlm;
pub use tree::Tree;

// one of Git's four object variants, tagged by type. Identity (the digest)
// is a function of the type tag and the serialized payload, see framing.rs
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Blob(Blob),
    Commit(Kvlm),
    Tree(Tree),
    Tag(Kvlm),
}

impl Object {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Object::Blob(_) => "blob",
            Object::Commit(_) => "commit",
            Object::Tree(_) => "tree",
            Object::Tag(_) => "tag",
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Object::Blob(blob) => blob.serialize(),
            Object::Commit(kvlm) => kvlm.serialize(),
            Object::Tree(tree) => tree.serialize(),
            Object::Tag(kvlm) => kvlm.serialize(),
        }
    }

    pub fn deserialize(type_tag: &str, payload: &[u8]) -> Result<Object, crate::error::Error> {
        match type_tag {
            "blob" => Ok(Object::Blob(Blob::deserialize(payload))),
            "commit" => Ok(Object::Commit(Kvlm::parse(payload)?)),
            "tree" => Ok(Object::Tree(Tree::parse(payload)?)),
            "tag" => Ok(Object::Tag(Kvlm::parse(payload)?)),
            other => Err(crate::error::Error::UnknownType(other.to_string())),
        }
    }
}
