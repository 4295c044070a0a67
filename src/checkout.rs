use std::fs::create_dir_all;
use std::path::Path;

use crate::error::Error;
use crate::framing::read_object;
use crate::objects::{Kvlm, Object};
use crate::repo::Repository;

pub fn dir_ok_for_checkout(path: &Path) -> Result<(), Error> {
    if !path.exists() {
        return Err(Error::NotADirectory(path.display().to_string()));
    }
    if path.read_dir()?.next().is_some() {
        return Err(Error::NotEmpty(path.display().to_string()));
    }
    Ok(())
}

// symlink-mode entries (12...) are materialized as plain files rather
// than real symlinks
fn checkout_tree(repo: &Repository, digest: &str, dest: &Path) -> Result<(), Error> {
    let tree = match read_object(repo, digest)? {
        Object::Tree(tree) => tree,
        other => {
            return Err(Error::Malformed(format!(
                "expected a tree object, found {}",
                other.type_tag()
            )))
        }
    };

    for entry in &tree.contents {
        let entry_path = dest.join(&entry.path);
        if entry.mode.starts_with("04") {
            create_dir_all(&entry_path)?;
            checkout_tree(repo, &entry.digest, &entry_path)?;
        } else {
            match read_object(repo, &entry.digest)? {
                Object::Blob(blob) => std::fs::write(&entry_path, blob.serialize())?,
                other => {
                    return Err(Error::Malformed(format!(
                        "tree entry {} names a {} object, expected blob or tree",
                        entry.path,
                        other.type_tag()
                    )))
                }
            }
        }
    }

    Ok(())
}

fn tree_digest_of_commit(kvlm: &Kvlm) -> Result<String, Error> {
    let tree = kvlm
        .get_first(b"tree")
        .ok_or_else(|| Error::Malformed("commit has no tree field".to_string()))?;
    Ok(std::str::from_utf8(tree)?.to_owned())
}

// digest may name a tree directly or a commit, whose tree field is
// followed once
pub fn checkout(repo: &Repository, digest: &str, dest: &Path) -> Result<(), Error> {
    dir_ok_for_checkout(dest)?;

    let tree_digest = match read_object(repo, digest)? {
        Object::Tree(_) => digest.to_string(),
        Object::Commit(kvlm) => tree_digest_of_commit(&kvlm)?,
        other => {
            return Err(Error::Malformed(format!(
                "cannot checkout a {} object",
                other.type_tag()
            )))
        }
    };

    checkout_tree(repo, &tree_digest, dest)
}

#[cfg(test)]
mod checkout_tests {
    use super::*;
    use crate::framing::write_object;
    use crate::objects::{Blob, Kvlm, Tree};
    use crate::objects::tree::TreeEntry;
    use crate::test_utils;

    #[test]
    fn checkout_rejects_a_nonempty_destination() {
        let (dir, repo) = test_utils::test_gitdir();
        let digest = write_object(&Object::Tree(Tree::new(Vec::new())), Some(&repo)).unwrap();

        let dest = dir.path().join("work");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("existing"), b"x").unwrap();

        let err = checkout(&repo, &digest.to_string(), &dest).unwrap_err();
        assert!(matches!(err, Error::NotEmpty(_)));
    }

    #[test]
    fn checkout_materializes_a_flat_tree() {
        let (dir, repo) = test_utils::test_gitdir();
        let blob_digest = write_object(&Object::Blob(Blob::new(b"hello\n".to_vec())), Some(&repo)).unwrap();
        let tree = Tree::new(vec![TreeEntry::new("100644", "hello.txt", blob_digest.to_string())]);
        let tree_digest = write_object(&Object::Tree(tree), Some(&repo)).unwrap();

        let dest = dir.path().join("work");
        std::fs::create_dir(&dest).unwrap();
        checkout(&repo, &tree_digest.to_string(), &dest).unwrap();

        assert_eq!(std::fs::read(dest.join("hello.txt")).unwrap(), b"hello\n");
    }

    #[test]
    fn checkout_recurses_into_subtrees() {
        let (dir, repo) = test_utils::test_gitdir();
        let blob_digest = write_object(&Object::Blob(Blob::new(b"nested\n".to_vec())), Some(&repo)).unwrap();
        let inner = Tree::new(vec![TreeEntry::new("100644", "file.txt", blob_digest.to_string())]);
        let inner_digest = write_object(&Object::Tree(inner), Some(&repo)).unwrap();
        let outer = Tree::new(vec![TreeEntry::new("040000", "sub", inner_digest.to_string())]);
        let outer_digest = write_object(&Object::Tree(outer), Some(&repo)).unwrap();

        let dest = dir.path().join("work");
        std::fs::create_dir(&dest).unwrap();
        checkout(&repo, &outer_digest.to_string(), &dest).unwrap();

        assert_eq!(std::fs::read(dest.join("sub/file.txt")).unwrap(), b"nested\n");
    }

    #[test]
    fn checkout_follows_a_commits_tree_field() {
        let (dir, repo) = test_utils::test_gitdir();
        let blob_digest = write_object(&Object::Blob(Blob::new(b"v1\n".to_vec())), Some(&repo)).unwrap();
        let tree = Tree::new(vec![TreeEntry::new("100644", "a.txt", blob_digest.to_string())]);
        let tree_digest = write_object(&Object::Tree(tree), Some(&repo)).unwrap();

        let mut kvlm = Kvlm::new(b"initial commit\n".to_vec());
        kvlm.push(b"tree".to_vec(), tree_digest.to_string().into_bytes());
        let commit_digest = write_object(&Object::Commit(kvlm), Some(&repo)).unwrap();

        let dest = dir.path().join("work");
        std::fs::create_dir(&dest).unwrap();
        checkout(&repo, &commit_digest.to_string(), &dest).unwrap();

        assert_eq!(std::fs::read(dest.join("a.txt")).unwrap(), b"v1\n");
    }
}
