use std::collections::HashMap;

use crate::error::Error;

fn find(haystack: &[u8], needle: u8, from: usize) -> Option<usize> {
    haystack[from..].iter().position(|&b| b == needle).map(|p| p + from)
}

fn escape(value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for &b in value {
        out.push(b);
        if b == b'\n' {
            out.push(b' ');
        }
    }
    out
}

fn unescape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        out.push(b);
        if b == b'\n' && i + 1 < raw.len() && raw[i + 1] == b' ' {
            i += 2;
        } else {
            i += 1;
        }
    }
    out
}

// ordered key-value-list-with-message: zero or more `key SP value \n`
// fields, repeatable keys collect into a list, then a blank line, then a
// free-text message to the end of the payload. order is tracked separately
// from fields since first insertion fixes a key's emitted position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kvlm {
    order: Vec<Vec<u8>>,
    fields: HashMap<Vec<u8>, Vec<Vec<u8>>>,
    pub message: Vec<u8>,
}

impl Kvlm {
    pub fn new(message: impl Into<Vec<u8>>) -> Kvlm {
        Kvlm {
            order: Vec::new(),
            fields: HashMap::new(),
            message: message.into(),
        }
    }

    pub fn push(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        let key = key.into();
        if !self.fields.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.fields.entry(key).or_default().push(value.into());
    }

    pub fn get_all(&self, key: &[u8]) -> &[Vec<u8>] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_first(&self, key: &[u8]) -> Option<&[u8]> {
        self.get_all(key).first().map(Vec::as_slice)
    }

    // explicit cursor loop rather than recursion, so this stays stack-safe
    // on pathological input
    pub fn parse(input: &[u8]) -> Result<Kvlm, Error> {
        let mut kvlm = Kvlm::default();
        let mut pos = 0usize;

        loop {
            let space = find(input, b' ', pos);
            let newline = find(input, b'\n', pos);

            let at_separator = match (space, newline) {
                (Some(s), Some(n)) => n < s,
                (None, _) => true,
                (Some(_), None) => {
                    return Err(Error::Malformed(
                        "kvlm field has no terminating newline".to_string(),
                    ))
                }
            };

            if at_separator {
                let msg_start = newline.map(|n| n + 1).unwrap_or(pos);
                kvlm.message = input[msg_start..].to_vec();
                return Ok(kvlm);
            }

            let space = space.unwrap();
            let key = input[pos..space].to_vec();

            // advance newline-to-newline until the byte after one isn't a
            // continuation space
            let mut end = space;
            loop {
                end = find(input, b'\n', end + 1).ok_or_else(|| {
                    Error::Malformed(format!(
                        "unterminated value for key {:?}",
                        String::from_utf8_lossy(&key)
                    ))
                })?;
                if end + 1 >= input.len() || input[end + 1] != b' ' {
                    break;
                }
            }

            let value = unescape(&input[space + 1..end]);
            kvlm.push(key, value);
            pos = end + 1;
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for key in &self.order {
            for value in &self.fields[key] {
                out.extend_from_slice(key);
                out.push(b' ');
                out.extend_from_slice(&escape(value));
                out.push(b'\n');
            }
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }
}

#[cfg(test)]
mod kvlm_tests {
    use super::*;

    #[test]
    fn round_trips_a_commit_with_two_parents() {
        let payload = crate::test_utils::fake_commit_payload();
        let kvlm = Kvlm::parse(&payload).unwrap();
        assert_eq!(kvlm.get_all(b"parent").len(), 2);
        assert_eq!(kvlm.serialize(), payload);
    }

    #[test]
    fn continuation_escaping_round_trips_embedded_newlines() {
        let mut kvlm = Kvlm::new(b"msg\n".to_vec());
        kvlm.push(b"gpgsig".to_vec(), b"-----BEGIN-----\nline two\n-----END-----".to_vec());

        let bytes = kvlm.serialize();
        let reparsed = Kvlm::parse(&bytes).unwrap();

        assert_eq!(
            reparsed.get_first(b"gpgsig").unwrap(),
            b"-----BEGIN-----\nline two\n-----END-----"
        );
        assert_eq!(reparsed.serialize(), bytes);
    }

    #[test]
    fn preserves_first_insertion_order_on_serialize() {
        let mut kvlm = Kvlm::new(b"".to_vec());
        kvlm.push(b"tree".to_vec(), b"abc".to_vec());
        kvlm.push(b"parent".to_vec(), b"def".to_vec());
        kvlm.push(b"author".to_vec(), b"me".to_vec());

        let bytes = kvlm.serialize();
        let tree_pos = bytes.windows(4).position(|w| w == b"tree").unwrap();
        let parent_pos = bytes.windows(6).position(|w| w == b"parent").unwrap();
        let author_pos = bytes.windows(6).position(|w| w == b"author").unwrap();
        assert!(tree_pos < parent_pos && parent_pos < author_pos);
    }

    #[test]
    fn empty_message_and_zero_fields_round_trips() {
        let payload = b"\n".to_vec();
        let kvlm = Kvlm::parse(&payload).unwrap();
        assert!(kvlm.message.is_empty());
        assert_eq!(kvlm.serialize(), payload);
    }
}
