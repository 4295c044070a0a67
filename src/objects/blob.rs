// opaque payload, identity (de)serialization
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub contents: Vec<u8>,
}

impl Blob {
    pub fn new(contents: impl Into<Vec<u8>>) -> Blob {
        Blob {
            contents: contents.into(),
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.contents.clone()
    }

    pub fn deserialize(payload: &[u8]) -> Blob {
        Blob::new(payload.to_vec())
    }
}
