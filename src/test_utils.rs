use tempfile::{tempdir, TempDir};

use crate::repo::Repository;

#[allow(dead_code)]
pub fn test_tempdir() -> TempDir {
    tempdir().expect("failed to create tempdir for test")
}

#[allow(dead_code)]
pub fn test_gitdir() -> (TempDir, Repository) {
    let dir = test_tempdir();
    let repo = Repository::create(dir.path()).expect("failed to create test repo");
    (dir, repo)
}

#[allow(dead_code)]
pub fn fake_commit_payload() -> Vec<u8> {
    [
        "tree 09a13b897d3d0f528d487c704da540cb952d7606\n",
        "parent 8f30e364422bba93030062297731f00a1510984b\n",
        "parent 2c3a0b1f4e5d6c7b8a9908070605040302010000\n",
        "author Zak-Kent <zak.kent@gmail.com> 1673470628 -0700\n",
        "committer Zak-Kent <zak.kent@gmail.com> 1673470628 -0700\n",
        "\n",
        "foo\n",
    ]
    .concat()
    .into_bytes()
}
